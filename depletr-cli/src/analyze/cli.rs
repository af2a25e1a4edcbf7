use clap::{Arg, Command, arg};

use crate::common::read_args;

pub const ANALYZE_CMD: &str = "analyze";

pub fn create_analyze_cli() -> Command {
    Command::new(ANALYZE_CMD)
        .about("Measure coverage depletion over gRNA target regions.")
        .arg(
            arg!(-t --targets <TARGETS>)
                .required(true)
                .help("BED or GTF file of target regions"),
        )
        .arg(
            arg!(--treated <BAM>)
                .required(true)
                .help("Indexed BAM of the depleted (treated) library"),
        )
        .arg(
            arg!(--control <BAM>)
                .required(false)
                .help("Indexed BAM of the untreated control library"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(false)
                .help("Metrics TSV path (default: stdout)"),
        )
        .arg(
            arg!(--stats <STATS>)
                .required(false)
                .help("Write ranking, outliers, summaries, correlations and design advice as JSON"),
        )
        .arg(
            arg!(--weights <WEIGHTS>)
                .required(false)
                .default_value("0.4,0.3,0.2,0.1")
                .help("Composite score weights: depletion,uniformity,zero_coverage,cv"),
        )
        .arg(
            Arg::new("outlier-z")
                .long("outlier-z")
                .required(false)
                .default_value("2.0")
                .value_parser(clap::value_parser!(f64))
                .help("Leave-one-out z-score beyond which a target is an outlier"),
        )
        .arg(
            Arg::new("outlier-percentiles")
                .long("outlier-percentiles")
                .required(false)
                .help("Use quantile cut-offs LOW,HIGH (e.g. 0.05,0.95) instead of z-scores"),
        )
        .args(read_args())
}
