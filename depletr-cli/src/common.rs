use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use depletr_core::filter::ReadFilter;
use depletr_core::models::IntervalStore;
use depletr_coverage::{AnalysisConfig, AnalysisOutput, DepletionAnalyzer};
use depletr_io::{BamSourceFactory, load_store};

/// Read filter and annotation options shared by every subcommand.
pub fn read_args() -> Vec<Arg> {
    vec![
        Arg::new("mapq")
            .long("mapq")
            .required(false)
            .default_value("0")
            .value_parser(clap::value_parser!(u8))
            .help("Ignore reads with a mapping quality below this"),
        Arg::new("proper-pair")
            .long("proper-pair")
            .action(clap::ArgAction::SetTrue)
            .help("Only count reads flagged as properly paired"),
        Arg::new("feature-type")
            .long("feature-type")
            .required(false)
            .default_value("exon")
            .help("GTF feature type to load as intervals"),
        Arg::new("threads")
            .long("threads")
            .short('p')
            .required(false)
            .default_value("0")
            .value_parser(clap::value_parser!(usize))
            .help("Worker threads (0 uses every core)"),
    ]
}

pub fn read_filter(matches: &ArgMatches) -> ReadFilter {
    let min_mapq = matches.get_one::<u8>("mapq").copied().unwrap_or(0);
    ReadFilter::new(min_mapq, matches.get_flag("proper-pair"))
}

pub fn threads(matches: &ArgMatches) -> usize {
    matches.get_one::<usize>("threads").copied().unwrap_or(0)
}

pub fn feature_type(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("feature-type")
        .map(String::as_str)
        .unwrap_or("exon")
}

/// Load an annotation file, refusing one that yields no usable interval.
pub fn load_intervals(path: &str, feature_type: &str) -> Result<IntervalStore> {
    let build = load_store(path, Some(feature_type))
        .with_context(|| format!("Failed to load intervals from {}", path))?;
    if build.store.is_empty() {
        anyhow::bail!(
            "{} contains no usable intervals ({} rejected)",
            path,
            build.rejected.len()
        );
    }
    Ok(build.store)
}

pub fn bam_factory(path: &str) -> Result<BamSourceFactory> {
    BamSourceFactory::new(path).with_context(|| format!("Cannot use {} as an alignment source", path))
}

pub fn progress_bar(len: u64, msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );
    pb.set_message(msg.to_string());
    Ok(pb)
}

pub fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} ({pos} reads)")
            .context("Invalid progress bar template")?,
    );
    pb.set_message(msg.to_string());
    Ok(pb)
}

/// Run the depletion analysis of one treated sample and an optional control.
pub fn analyze_targets(
    targets: &IntervalStore,
    treated: &str,
    control: Option<&str>,
    config: AnalysisConfig,
) -> Result<AnalysisOutput> {
    let treated_factory = bam_factory(treated)?;
    let analyzer = DepletionAnalyzer::new(config)
        .with_progress(progress_bar(targets.len() as u64, "targets")?);

    let output = match control {
        Some(control) => {
            let control_factory = bam_factory(control)?;
            analyzer.analyze_with_control(targets, &treated_factory, &control_factory)
        }
        None => {
            log::info!("No control sample given; depletion efficiency will not be measured");
            analyzer.analyze(targets, &treated_factory)
        }
    }
    .with_context(|| format!("Depletion analysis of {} failed", treated))?;

    Ok(output)
}

/// A buffered writer on `path`, or on stdout when no path is given.
pub fn output_writer(path: Option<&String>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(Path::new(p))
                .with_context(|| format!("Failed to create output file {}", p))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

pub fn write_json<T: Serialize>(path: Option<&String>, value: &T) -> Result<()> {
    let mut writer = output_writer(path)?;
    serde_json::to_writer_pretty(&mut writer, value).context("Failed to serialize JSON")?;
    writeln!(writer)?;
    writer.flush()?;
    if let Some(p) = path {
        log::info!("Wrote {}", p);
    }
    Ok(())
}
