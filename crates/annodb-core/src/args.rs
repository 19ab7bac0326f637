//! Argument-list plumbing shared by predicates, column predicates and
//! matrices.

use annodb_model::{FargType, Result, SystemError};

use crate::formal_arg::FormalArgument;
use crate::value::DataValue;
use crate::vocab::ArgListRemap;

/// One empty value per formal argument.
pub(crate) fn empty_args(fargs: &[FormalArgument], tps: u32) -> Result<Vec<DataValue>> {
    fargs
        .iter()
        .map(|farg| farg.construct_empty_arg(tps))
        .collect()
}

/// Checks that `arg` may fill the slot declared by `farg`. An unbound `arg`
/// is bound to `farg` first.
pub(crate) fn validate_arg(
    context: &'static str,
    farg: &FormalArgument,
    arg: &mut DataValue,
    text_allowed: bool,
) -> Result<()> {
    match farg.farg_type() {
        FargType::Undefined => {
            return Err(SystemError::invariant(context, "formal argument type undefined"));
        }
        FargType::Text if !text_allowed => {
            return Err(SystemError::type_mismatch(context, "non-text argument", FargType::Text));
        }
        _ => {}
    }
    if !arg.farg_id().is_valid() {
        return arg.bind(farg);
    }
    if arg.farg_id() != farg.id() {
        return Err(SystemError::invariant(
            context,
            format!("argument bound to farg {} not {}", arg.farg_id(), farg.id()),
        ));
    }
    if arg.farg_type() != farg.farg_type() || !arg.value().fits(farg.farg_type()) {
        return Err(SystemError::type_mismatch(
            context,
            farg.farg_type(),
            arg.class_name(),
        ));
    }
    Ok(())
}

/// Validates a full replacement argument list against `fargs`.
pub(crate) fn validate_args(
    context: &'static str,
    fargs: &[FormalArgument],
    args: &mut [DataValue],
    text_allowed: bool,
) -> Result<()> {
    if args.len() != fargs.len() {
        return Err(SystemError::invariant(
            context,
            format!("{} args for {} formal args", args.len(), fargs.len()),
        ));
    }
    for (farg, arg) in fargs.iter().zip(args.iter_mut()) {
        validate_arg(context, farg, arg, text_allowed)?;
    }
    Ok(())
}

/// Rebuilds an argument list for a new formal-argument list.
///
/// Values at surviving positions move to their new index and pick up any
/// metadata change of their argument; new positions get empty values.
/// Values at deleted positions are dropped.
pub(crate) fn remap_args(
    context: &'static str,
    args: Vec<DataValue>,
    remap: &ArgListRemap,
    tps: u32,
) -> Result<Vec<DataValue>> {
    if bound_to(&args, &remap.new_fargs) && !bound_to(&args, &remap.old_fargs) {
        // already remapped by an earlier delivery of the same change
        return Ok(args);
    }
    if args.len() != remap.old_fargs.len() {
        return Err(SystemError::invariant(
            context,
            format!(
                "{} args but {} old formal args",
                args.len(),
                remap.old_fargs.len()
            ),
        ));
    }
    let mut old: Vec<Option<DataValue>> = args.into_iter().map(Some).collect();
    let mut remapped = Vec::with_capacity(remap.new_fargs.len());
    for (j, farg) in remap.new_fargs.iter().enumerate() {
        let Some(i) = remap.n2o.get(j).copied().flatten() else {
            remapped.push(farg.construct_empty_arg(tps)?);
            continue;
        };
        let mut dv = old.get_mut(i).and_then(Option::take).ok_or_else(|| {
            SystemError::invariant(context, format!("old arg {i} missing or mapped twice"))
        })?;
        if remap.farg_changed(j) {
            dv.update_for_farg_change(
                remap.name_changed[j],
                remap.sub_range_changed[j],
                remap.range_changed[j],
                &remap.old_fargs[i],
                farg,
            )?;
        }
        remapped.push(dv);
    }
    Ok(remapped)
}

/// One value per formal argument, converting the value at the same position
/// of `old` where its payload fits. Each slot keeps the id of the value it
/// replaces.
pub(crate) fn salvage_args(
    fargs: &[FormalArgument],
    old: &[DataValue],
    tps: u32,
) -> Result<Vec<DataValue>> {
    fargs
        .iter()
        .enumerate()
        .map(|(i, farg)| {
            let prior = old.get(i);
            let mut dv = farg.construct_arg_with_salvage(tps, prior)?;
            if let Some(prior) = prior {
                dv.set_id(prior.id());
            }
            Ok(dv)
        })
        .collect()
}

fn bound_to(args: &[DataValue], fargs: &[FormalArgument]) -> bool {
    args.len() == fargs.len() && args.iter().zip(fargs).all(|(a, f)| a.farg_id() == f.id())
}

/// `(argList (a, b))`, or `(argList ())` for a missing or empty list.
pub(crate) fn args_to_db_string(args: Option<&[DataValue]>) -> String {
    match args {
        Some(args) if !args.is_empty() => {
            let items: Vec<String> = args.iter().map(DataValue::to_db_string).collect();
            format!("(argList ({}))", items.join(", "))
        }
        _ => "(argList ())".to_string(),
    }
}

/// `(a, b)`
pub(crate) fn args_to_string(args: &[DataValue]) -> String {
    let items: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("({})", items.join(", "))
}

pub(crate) fn args_logically_equal(a: &[DataValue], b: &[DataValue]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.logically_equal(y))
}
