use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::Serialize;

use depletr_core::models::DepletionMetrics;
use depletr_coverage::{AnalysisConfig, AnalysisWarning};
use depletr_io::write_metrics_tsv;
use depletr_stats::{
    CorrelationMatrix, DesignThresholds, OutlierRule, Outliers, RankingWeights, Recommendation,
    SummaryStatistics, composite_scores, correlation_matrix, find_outliers, rank_scored,
    recommend_all, severity_counts, summarize,
};

use crate::common::{
    analyze_targets, feature_type, load_intervals, output_writer, read_filter, threads, write_json,
};

#[derive(Serialize)]
struct AnalysisReport {
    targets: usize,
    warnings: Vec<AnalysisWarning>,
    weights: RankingWeights,
    ranking: Vec<DepletionMetrics>,
    outlier_rule: OutlierRule,
    outliers: Outliers,
    summary: Vec<SummaryStatistics>,
    correlation: CorrelationMatrix,
    recommendations: Vec<Recommendation>,
}

pub fn run_analyze(matches: &ArgMatches) -> Result<()> {
    let targets_path = matches
        .get_one::<String>("targets")
        .expect("--targets is required");
    let treated = matches
        .get_one::<String>("treated")
        .expect("--treated is required");
    let control = matches.get_one::<String>("control");
    let output = matches.get_one::<String>("output");
    let stats_path = matches.get_one::<String>("stats");

    let weights = parse_weights(
        matches
            .get_one::<String>("weights")
            .expect("--weights has a default"),
    )?;
    let outlier_rule = outlier_rule(matches)?;

    let targets = load_intervals(targets_path, feature_type(matches))?;
    let config = AnalysisConfig {
        filter: read_filter(matches),
        threads: threads(matches),
    };
    let analysis = analyze_targets(&targets, treated, control.map(String::as_str), config)?;

    // scores stay in target order for the table
    let scores = composite_scores(&analysis.metrics, &weights)?;
    let scored: Vec<DepletionMetrics> = analysis
        .metrics
        .iter()
        .zip(scores)
        .map(|(m, s)| m.with_composite_score(s))
        .collect();

    let mut writer = output_writer(output)?;
    write_metrics_tsv(&mut writer, &scored).context("Failed to write metrics table")?;
    log::info!("Wrote metrics for {} targets", scored.len());

    if stats_path.is_some() {
        let recommendations = recommend_all(&scored, &DesignThresholds::default());
        for (severity, count) in severity_counts(&recommendations) {
            log::info!("{} {} recommendation(s)", count, severity);
        }

        let report = AnalysisReport {
            targets: scored.len(),
            warnings: analysis.warnings,
            weights,
            outliers: find_outliers(&scored, &outlier_rule)?,
            outlier_rule,
            summary: summarize(&scored),
            correlation: correlation_matrix(&scored),
            recommendations,
            ranking: rank_scored(scored),
        };
        write_json(stats_path, &report)?;
    }

    Ok(())
}

fn parse_pair(s: &str) -> Result<(f64, f64)> {
    let values = parse_floats(s)?;
    match values.as_slice() {
        [a, b] => Ok((*a, *b)),
        _ => anyhow::bail!("expected two comma-separated numbers, got `{}`", s),
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("`{}` is not a number", v.trim()))
        })
        .collect()
}

fn parse_weights(s: &str) -> Result<RankingWeights> {
    let values = parse_floats(s)?;
    let [depletion, uniformity, zero_coverage, cv] = values.as_slice() else {
        anyhow::bail!("--weights needs four comma-separated numbers, got `{}`", s);
    };
    RankingWeights::new(*depletion, *uniformity, *zero_coverage, *cv).context("Invalid --weights")
}

fn outlier_rule(matches: &ArgMatches) -> Result<OutlierRule> {
    let rule = match matches.get_one::<String>("outlier-percentiles") {
        Some(p) => {
            let (low, high) = parse_pair(p).context("Invalid --outlier-percentiles")?;
            OutlierRule::Percentile { low, high }
        }
        None => OutlierRule::ZScore {
            threshold: matches.get_one::<f64>("outlier-z").copied().unwrap_or(2.0),
        },
    };
    rule.validate()?;
    Ok(rule)
}
