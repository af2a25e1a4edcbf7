use clap::{Command, arg};

use crate::common::read_args;

pub const OVERLAP_CMD: &str = "overlap";

pub fn create_overlap_cli() -> Command {
    Command::new(OVERLAP_CMD)
        .about("Count aligned reads that overlap a set of feature intervals.")
        .arg(
            arg!(-b --bam <BAM>)
                .required(true)
                .help("Coordinate-sorted BAM file"),
        )
        .arg(
            arg!(-f --features <FEATURES>)
                .required(true)
                .help("BED or GTF file of feature intervals"),
        )
        .arg(
            arg!(--parallel "Classify chromosomes in parallel (needs a .bai or .csi index)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--detail "Report every considered read and the features it hits")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(false)
                .help("Overlap report JSON path (default: stdout)"),
        )
        .args(read_args())
}
