use anyhow::Result;
use clap::ArgMatches;
use serde::Serialize;

use depletr_core::models::DepletionMetrics;
use depletr_coverage::AnalysisConfig;
use depletr_stats::{ComparisonConfig, ComparisonResult, ComparisonStatus, TestKind, compare_groups};

use crate::common::{analyze_targets, feature_type, load_intervals, read_filter, threads, write_json};
use crate::compare::cli::{GROUP1, GROUP2, GroupIds};

#[derive(Serialize)]
struct GroupInfo {
    label: String,
    targets: usize,
    treated: String,
    control: Option<String>,
}

#[derive(Serialize)]
struct ComparisonReport {
    groups: [GroupInfo; 2],
    config: ComparisonConfig,
    results: Vec<ComparisonResult>,
}

pub fn run_compare(matches: &ArgMatches) -> Result<()> {
    let config = ComparisonConfig {
        alpha: matches.get_one::<f64>("alpha").copied().unwrap_or(0.05),
        test: if matches.get_flag("welch") {
            TestKind::Welch
        } else {
            TestKind::Student
        },
    };
    config.validate()?;

    let analysis = AnalysisConfig {
        filter: read_filter(matches),
        threads: threads(matches),
    };

    let (group1, metrics1) = analyze_group(matches, &GROUP1, &analysis)?;
    let (group2, metrics2) = analyze_group(matches, &GROUP2, &analysis)?;

    let results = compare_groups(&metrics1, &metrics2, &config)?;
    for r in results.iter() {
        match r.status {
            ComparisonStatus::Ok => log::info!(
                "{}: t = {:.3}, p = {:.4}, d = {:.3}{}",
                r.metric,
                r.statistic,
                r.p_value,
                r.effect_size,
                if r.significant { " (significant)" } else { "" }
            ),
            ComparisonStatus::InsufficientSample => {
                log::info!("{}: not tested, too few targets", r.metric)
            }
        }
    }

    let report = ComparisonReport {
        groups: [group1, group2],
        config,
        results,
    };
    write_json(matches.get_one::<String>("output"), &report)
}

fn analyze_group(
    matches: &ArgMatches,
    ids: &GroupIds,
    analysis: &AnalysisConfig,
) -> Result<(GroupInfo, Vec<DepletionMetrics>)> {
    let targets_path = matches
        .get_one::<String>(ids.targets)
        .expect("group targets are required");
    let treated = matches
        .get_one::<String>(ids.treated)
        .expect("group treated BAM is required")
        .clone();
    let control = matches.get_one::<String>(ids.control).cloned();
    let label = matches
        .get_one::<String>(ids.label)
        .cloned()
        .unwrap_or_else(|| ids.default_label.to_string());

    log::info!("Analyzing {}", label);
    let targets = load_intervals(targets_path, feature_type(matches))?;
    let out = analyze_targets(&targets, &treated, control.as_deref(), analysis.clone())?;

    let info = GroupInfo {
        label,
        targets: out.metrics.len(),
        treated,
        control,
    };
    Ok((info, out.metrics))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::compare::cli::create_compare_cli;

    #[rstest]
    fn test_group_arguments() {
        let m = create_compare_cli().get_matches_from([
            "compare",
            "--targets1",
            "a.bed",
            "--treated1",
            "a.bam",
            "--targets2",
            "b.bed",
            "--treated2",
            "b.bam",
            "--control2",
            "b_ctl.bam",
            "--welch",
        ]);
        assert_eq!(m.get_one::<String>("label1").unwrap(), "group1");
        assert_eq!(m.get_one::<String>("control1"), None);
        assert_eq!(m.get_one::<String>("control2").unwrap(), "b_ctl.bam");
        assert_eq!(m.get_one::<f64>("alpha"), Some(&0.05));
        assert!(m.get_flag("welch"));
    }

    #[rstest]
    fn test_second_group_required() {
        let res = create_compare_cli().try_get_matches_from([
            "compare",
            "--targets1",
            "a.bed",
            "--treated1",
            "a.bam",
        ]);
        assert!(res.is_err());
    }
}
