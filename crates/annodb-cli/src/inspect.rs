//! Name validation and time stamp parsing for the `check-name` and
//! `timestamp` subcommands.

use anyhow::{Context, Result};
use annodb_model::names::{
    is_valid_farg_name, is_valid_nominal, is_valid_pred_name, is_valid_quote_string,
    is_valid_svar_name, is_valid_text_string,
};
use annodb_model::TimeStamp;

use crate::types::{NameKind, TimestampReport};

pub fn check_name(kind: NameKind, value: &str) -> bool {
    match kind {
        NameKind::Farg => is_valid_farg_name(value),
        NameKind::Nominal => is_valid_nominal(value),
        NameKind::Predicate => is_valid_pred_name(value),
        NameKind::Column => is_valid_svar_name(value),
        NameKind::QuoteString => is_valid_quote_string(value),
        NameKind::Text => is_valid_text_string(value),
    }
}

/// Parses `value` as `HH:MM:SS:mmm` (1000 tps) when it contains a colon,
/// otherwise as a tick count at `tps`.
pub fn parse_time_stamp(value: &str, tps: u32, to_tps: Option<u32>) -> Result<TimestampReport> {
    let parsed = if value.contains(':') {
        TimeStamp::parse_hmsm(value)?
    } else {
        let ticks: i64 = value
            .trim()
            .parse()
            .with_context(|| format!("not a tick count: {value:?}"))?;
        TimeStamp::new(tps, ticks)?
    };
    let converted = to_tps
        .map(|rate| parsed.at_tps(rate))
        .transpose()
        .context("cannot convert time stamp")?;
    Ok(TimestampReport { parsed, converted })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(check_name(NameKind::Farg, "<who>"));
        assert!(!check_name(NameKind::Farg, "who"));
        assert!(check_name(NameKind::Predicate, "looks"));
        assert!(!check_name(NameKind::Predicate, "two words"));
        assert!(!check_name(NameKind::QuoteString, "say \"hi\""));
    }

    #[test]
    fn hmsm_converts_down() {
        let report = parse_time_stamp("00:00:01:500", 60, Some(60)).unwrap();
        assert_eq!(report.parsed.tps(), 1000);
        assert_eq!(report.parsed.ticks(), 1500);
        let converted = report.converted.unwrap();
        assert_eq!(converted.ticks(), 90);
        assert_eq!(converted.to_db_string(), "(60,00:00:01:030)");
    }

    #[test]
    fn bad_input() {
        assert!(parse_time_stamp("soon", 60, None).is_err());
        assert!(parse_time_stamp("1:2:3", 60, None).is_err());
        assert!(parse_time_stamp("10", 60, Some(0)).is_err());
        assert!(parse_time_stamp("9999999999999999:00:00:000", 60, None).is_err());
    }
}
