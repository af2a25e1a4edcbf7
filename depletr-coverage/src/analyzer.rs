use std::fmt::{self, Display};

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use depletr_core::filter::ReadFilter;
use depletr_core::models::{DepletionMetrics, GenomicInterval, IntervalStore};
use depletr_core::source::{AlignmentSession, AlignmentSource, AlignmentSourceFactory};

use crate::coverage::compute_coverage;
use crate::errors::CoverageError;
use crate::metrics::calculate_metrics;

#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub filter: ReadFilter,
    /// Worker threads. `0` lets rayon decide.
    pub threads: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sample {
    Treated,
    Control,
}

impl Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Treated => write!(f, "treated"),
            Sample::Control => write!(f, "control"),
        }
    }
}

/// Conditions that did not stop the analysis but probably deserve a look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisWarning {
    /// Targets sit on a chromosome the alignment file has no reference sequence for. They were
    /// reported with zero coverage in that sample.
    MissingChromosome {
        sample: Sample,
        chromosome: String,
        targets: usize,
    },
}

impl Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::MissingChromosome {
                sample,
                chromosome,
                targets,
            } => write!(
                f,
                "{} target(s) on {} have no matching reference sequence in the {} sample",
                targets, chromosome, sample
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisOutput {
    /// One record per target, in target store order.
    pub metrics: Vec<DepletionMetrics>,
    pub warnings: Vec<AnalysisWarning>,
}

///
/// Runs the coverage engine and metrics calculator over every target in a store.
///
/// Targets are processed in parallel. Each worker opens its own alignment handles through the
/// factories and drops them when it finishes.
///
pub struct DepletionAnalyzer {
    config: AnalysisConfig,
    progress: Option<ProgressBar>,
}

impl DepletionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        DepletionAnalyzer {
            config,
            progress: None,
        }
    }

    /// Tick `bar` once per finished target.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze targets against a treated sample only.
    pub fn analyze<T>(
        &self,
        targets: &IntervalStore,
        treated: &T,
    ) -> Result<AnalysisOutput, CoverageError>
    where
        T: AlignmentSourceFactory,
    {
        self.run::<T, T>(targets, treated, None)
    }

    /// Analyze targets against a treated sample and its control.
    pub fn analyze_with_control<T, C>(
        &self,
        targets: &IntervalStore,
        treated: &T,
        control: &C,
    ) -> Result<AnalysisOutput, CoverageError>
    where
        T: AlignmentSourceFactory,
        C: AlignmentSourceFactory,
    {
        self.run(targets, treated, Some(control))
    }

    fn run<T, C>(
        &self,
        targets: &IntervalStore,
        treated: &T,
        control: Option<&C>,
    ) -> Result<AnalysisOutput, CoverageError>
    where
        T: AlignmentSourceFactory,
        C: AlignmentSourceFactory,
    {
        let mut warnings = missing_chromosomes(targets, treated, Sample::Treated)?;
        if let Some(control) = control {
            warnings.extend(missing_chromosomes(targets, control, Sample::Control)?);
        }
        for w in warnings.iter() {
            log::warn!("{}", w);
        }

        let intervals: Vec<&GenomicInterval> = targets.all().collect();
        log::info!("Computing coverage for {} targets", intervals.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| CoverageError::ThreadPool(e.to_string()))?;

        let filter = self.config.filter;
        let metrics = pool.install(|| {
            intervals
                .par_iter()
                .map_init(
                    || open_handles(treated, control),
                    |handles, target| -> Result<DepletionMetrics, CoverageError> {
                        let (treated_src, control_src) = handles
                            .as_mut()
                            .map_err(|e| CoverageError::Worker(e.clone()))?;

                        let treated_profile = compute_coverage(treated_src, target, &filter)?;
                        let control_profile = match control_src.as_mut() {
                            Some(src) => Some(compute_coverage(src, target, &filter)?),
                            None => None,
                        };

                        let metrics =
                            calculate_metrics(target, &treated_profile, control_profile.as_ref());
                        if let Some(bar) = self.progress.as_ref() {
                            bar.inc(1);
                        }
                        metrics
                    },
                )
                .collect::<Result<Vec<_>, _>>()
        })?;

        if let Some(bar) = self.progress.as_ref() {
            bar.finish_with_message("done");
        }

        Ok(AnalysisOutput { metrics, warnings })
    }
}

type Handles<T, C> = (T, Option<C>);

fn open_handles<T, C>(
    treated: &T,
    control: Option<&C>,
) -> Result<Handles<T::Source, C::Source>, String>
where
    T: AlignmentSourceFactory,
    C: AlignmentSourceFactory,
{
    let t = treated.open().map_err(|e| e.to_string())?;
    let c = match control {
        Some(factory) => Some(factory.open().map_err(|e| e.to_string())?),
        None => None,
    };
    Ok((t, c))
}

/// Chromosomes carrying targets that `factory`'s source does not know, with target counts.
fn missing_chromosomes<F: AlignmentSourceFactory>(
    targets: &IntervalStore,
    factory: &F,
    sample: Sample,
) -> Result<Vec<AnalysisWarning>, CoverageError> {
    let session = AlignmentSession::open(factory)?;
    Ok(targets
        .groups()
        .filter(|(chr, _)| !session.contains_chromosome(chr))
        .map(|(chr, intervals)| AnalysisWarning::MissingChromosome {
            sample,
            chromosome: chr.to_string(),
            targets: intervals.len(),
        })
        .collect())
}
