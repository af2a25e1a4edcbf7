use anyhow::{Context, Result};
use clap::ArgMatches;

use depletr_io::BamRecordStream;
use depletr_overlaprs::{OverlapClassifier, OverlapReport};

use crate::common::{
    bam_factory, feature_type, load_intervals, read_filter, spinner, threads, write_json,
};

pub fn run_overlap(matches: &ArgMatches) -> Result<()> {
    let bam = matches.get_one::<String>("bam").expect("--bam is required");
    let features_path = matches
        .get_one::<String>("features")
        .expect("--features is required");

    let features = load_intervals(features_path, feature_type(matches))?;
    let classifier =
        OverlapClassifier::new(&features, read_filter(matches)).with_detail(matches.get_flag("detail"));

    let report = if matches.get_flag("parallel") {
        let factory = bam_factory(bam)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads(matches))
            .build()
            .context("Failed to build thread pool")?;
        pool.install(|| classifier.classify_parallel(&factory))
    } else {
        let pb = spinner(&format!("Classifying {}", bam))?;
        let stream = BamRecordStream::from_path(bam)
            .with_context(|| format!("Failed to open {}", bam))?
            .inspect(|_| pb.inc(1));
        let report = classifier.classify(stream);
        pb.finish_with_message("done");
        report
    }
    .with_context(|| format!("Overlap classification of {} failed", bam))?;

    log_summary(&report);
    write_json(matches.get_one::<String>("output"), &report)
}

fn log_summary(report: &OverlapReport) {
    let s = &report.summary;
    log::info!(
        "{} of {} considered reads overlap a feature ({:.2}%), {} filtered",
        s.overlapping,
        s.total_considered,
        s.percentage,
        s.filtered
    );
    if !report.unmatched_chromosomes.is_empty() {
        log::warn!(
            "No features on: {}",
            report.unmatched_chromosomes.join(", ")
        );
    }
}
