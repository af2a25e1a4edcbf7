use clap::{Arg, Command, arg};

use crate::common::read_args;

pub const COMPARE_CMD: &str = "compare";

/// Argument ids of one comparison group.
pub struct GroupIds {
    pub targets: &'static str,
    pub treated: &'static str,
    pub control: &'static str,
    pub label: &'static str,
    pub default_label: &'static str,
}

pub const GROUP1: GroupIds = GroupIds {
    targets: "targets1",
    treated: "treated1",
    control: "control1",
    label: "label1",
    default_label: "group1",
};

pub const GROUP2: GroupIds = GroupIds {
    targets: "targets2",
    treated: "treated2",
    control: "control2",
    label: "label2",
    default_label: "group2",
};

fn group_args(ids: &GroupIds) -> [Arg; 4] {
    [
        Arg::new(ids.targets)
            .long(ids.targets)
            .required(true)
            .help(format!("BED or GTF file of {} target regions", ids.default_label)),
        Arg::new(ids.treated)
            .long(ids.treated)
            .required(true)
            .help(format!("Indexed treated BAM for {}", ids.default_label)),
        Arg::new(ids.control)
            .long(ids.control)
            .required(false)
            .help(format!("Indexed control BAM for {}", ids.default_label)),
        Arg::new(ids.label)
            .long(ids.label)
            .required(false)
            .default_value(ids.default_label)
            .help("Name of the group in the report"),
    ]
}

pub fn create_compare_cli() -> Command {
    Command::new(COMPARE_CMD)
        .about("Compare depletion metrics of two groups of gRNA targets.")
        .args(group_args(&GROUP1))
        .args(group_args(&GROUP2))
        .arg(
            arg!(--alpha <ALPHA>)
                .required(false)
                .default_value("0.05")
                .value_parser(clap::value_parser!(f64))
                .help("Significance level"),
        )
        .arg(
            arg!(--welch "Use Welch's unequal-variance t-test instead of the pooled test")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(false)
                .help("Comparison JSON path (default: stdout)"),
        )
        .args(read_args())
}
