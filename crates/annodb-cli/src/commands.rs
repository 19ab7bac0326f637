use anyhow::Result;
use annodb_cli::demo::{load_options, run_demo as build_and_edit};
use annodb_cli::inspect::{check_name, parse_time_stamp};
use annodb_cli::types::{DemoRun, TimestampReport};
use tracing::{debug, info_span};

use crate::cli::{CheckNameArgs, DemoArgs, TimestampArgs};

pub fn run_demo(args: &DemoArgs) -> Result<DemoRun> {
    let options = load_options(args.config.as_deref())?;
    let span = info_span!("demo", db = %options.name, tps = options.tps);
    let _guard = span.enter();
    debug!(?options, "database options");
    build_and_edit(options)
}

pub fn run_check_name(args: &CheckNameArgs) -> bool {
    check_name(args.kind, &args.value)
}

pub fn run_timestamp(args: &TimestampArgs) -> Result<TimestampReport> {
    parse_time_stamp(&args.value, args.tps, args.to_tps)
}
