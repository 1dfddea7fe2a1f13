//! The six-stage interaction filter.
//!
//! Turns raw review rows into the serious-player interaction set:
//!
//! 1. Popularity: drop items with fewer than `min_item_reviews` reviews
//! 2. Outliers: keep playtime within `[Q1 - m·IQR, Q3 + m·IQR]`
//! 3. Mean: post-outlier mean playtime, returned as a value
//! 4. Serious players: keep playtime ≥ `serious_multiplier × mean`
//! 5. Actor ids: drop ids below the namespace floor
//! 6. Ratings: recommendation flag → high/low rating
//!
//! Stages are strictly sequential; each consumes the previous stage's output.
//! Actor-id validation runs after the statistics are fitted, so it never
//! changes the quartiles or the mean.

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{ActorIdFilter, PlaytimeRangeFilter, PopularityFilter, SeriousPlayerFilter};
use crate::rating::rate_all;
use crate::stats::{self, Quartiles};
use crate::traits::Filter;
use data_loader::{FilteredInteraction, InteractionRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Input/output row counts of one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub input: usize,
    pub output: usize,
}

/// A statistic that came out degenerate. The run continues, but the
/// serious-player threshold may not mean much.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionWarning {
    /// Q1 == Q3: the outlier bounds collapse onto a single point
    ZeroSpread { value: f64 },
    /// The post-outlier mean is zero, negative or not finite
    NonPositiveMean { mean: f64 },
}

/// What the filter measured and dropped during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    pub input_rows: usize,
    pub stages: Vec<StageCount>,
    pub popular_items: usize,
    pub quartiles: Quartiles,
    pub playtime_bounds: (f64, f64),
    pub mean_playtime: f64,
    pub serious_floor: f64,
    /// Rows dropped for an actor id below the floor
    pub invalid_actor_rows: usize,
    pub warnings: Vec<DistributionWarning>,
    pub output_rows: usize,
}

/// The fitted stages of one run.
///
/// Re-applying them to the run's own output changes nothing.
#[derive(Debug, Clone)]
pub struct FilterThresholds {
    pub popularity: PopularityFilter,
    pub playtime_range: PlaytimeRangeFilter,
    pub serious_player: SeriousPlayerFilter,
    pub actor_id: ActorIdFilter,
}

impl FilterThresholds {
    /// The fitted stages as a pipeline, in run order
    pub fn pipeline(&self) -> FilterPipeline {
        FilterPipeline::new()
            .add_filter(self.popularity.clone())
            .add_filter(self.playtime_range)
            .add_filter(self.serious_player)
            .add_filter(self.actor_id)
    }

    /// Conjunction of every stage predicate
    pub fn retains(&self, record: &InteractionRecord) -> bool {
        self.popularity.keeps(record)
            && self.playtime_range.keeps(record)
            && self.serious_player.keeps(record)
            && self.actor_id.keeps(record)
    }
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub interactions: Vec<FilteredInteraction>,
    pub report: FilterReport,
    pub thresholds: FilterThresholds,
}

/// Fits and applies the six filtering stages.
#[derive(Debug, Clone, Default)]
pub struct InteractionFilter {
    config: FilterConfig,
}

impl InteractionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run every stage over `records`.
    ///
    /// # Errors
    /// [`FilterError::EmptyCorpus`] if any stage leaves zero rows.
    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub fn run(&self, records: Vec<InteractionRecord>) -> Result<FilterOutcome> {
        let input_rows = records.len();
        let mut stages = Vec::with_capacity(4);

        // 1. Popularity
        let popularity = PopularityFilter::fit(&records, self.config.min_item_reviews);
        let records = run_stage(&popularity, records, &mut stages, || {
            format!(
                "no item has at least {} reviews",
                self.config.min_item_reviews
            )
        })?;

        // 2. Outlier rejection
        let playtimes: Vec<f64> = records.par_iter().map(|r| r.playtime).collect();
        let quartiles = Quartiles::of(playtimes).ok_or_else(|| FilterError::EmptyCorpus {
            stage: popularity.name().to_string(),
            detail: "no playtime values".to_string(),
        })?;
        let mut warnings = Vec::new();
        if quartiles.iqr() == 0.0 {
            warn!(
                "Playtime IQR is zero (Q1 = Q3 = {}); outlier bounds collapse to a single point",
                quartiles.q1
            );
            warnings.push(DistributionWarning::ZeroSpread { value: quartiles.q1 });
        }
        let playtime_range =
            PlaytimeRangeFilter::from_quartiles(&quartiles, self.config.iqr_multiplier);
        let (lower, upper) = playtime_range.bounds();
        debug!(q1 = quartiles.q1, q3 = quartiles.q3, lower, upper, "Fitted playtime bounds");
        let records = run_stage(&playtime_range, records, &mut stages, || {
            format!("no playtime within [{lower}, {upper}]")
        })?;

        // 3. Mean over the outlier-free set
        let playtimes: Vec<f64> = records.par_iter().map(|r| r.playtime).collect();
        let mean_playtime = stats::mean(&playtimes).unwrap_or(0.0);
        if !(mean_playtime.is_finite() && mean_playtime > 0.0) {
            warn!(
                "Mean playtime after outlier removal is {}; serious-player threshold is not meaningful",
                mean_playtime
            );
            warnings.push(DistributionWarning::NonPositiveMean { mean: mean_playtime });
        }

        // 4. Serious players
        let serious_player =
            SeriousPlayerFilter::new(mean_playtime, self.config.serious_multiplier);
        let records = run_stage(&serious_player, records, &mut stages, || {
            format!(
                "no playtime at or above {} ({} x mean {})",
                serious_player.floor(),
                self.config.serious_multiplier,
                mean_playtime
            )
        })?;

        // 5. Actor id validation
        let actor_id = ActorIdFilter::new(self.config.min_actor_id);
        let before = records.len();
        let records = run_stage(&actor_id, records, &mut stages, || {
            format!("no actor id at or above {}", self.config.min_actor_id)
        })?;
        let invalid_actor_rows = before - records.len();

        // 6. Ratings
        let interactions = rate_all(records, &self.config);

        let report = FilterReport {
            input_rows,
            stages,
            popular_items: popularity.popular_items(),
            quartiles,
            playtime_bounds: (lower, upper),
            mean_playtime,
            serious_floor: serious_player.floor(),
            invalid_actor_rows,
            warnings,
            output_rows: interactions.len(),
        };
        info!(
            input = report.input_rows,
            output = report.output_rows,
            popular_items = report.popular_items,
            mean_playtime = report.mean_playtime,
            serious_floor = report.serious_floor,
            invalid_actor_rows = report.invalid_actor_rows,
            "Interaction filter complete"
        );

        Ok(FilterOutcome {
            interactions,
            report,
            thresholds: FilterThresholds {
                popularity,
                playtime_range,
                serious_player,
                actor_id,
            },
        })
    }
}

/// Apply one stage, record its counts, and fail if nothing survives.
fn run_stage(
    filter: &impl Filter,
    records: Vec<InteractionRecord>,
    stages: &mut Vec<StageCount>,
    detail: impl FnOnce() -> String,
) -> Result<Vec<InteractionRecord>> {
    let input = records.len();
    let kept = filter.apply(records);
    debug!(
        "Filter applied: {} ({} -> {} rows)",
        filter.name(),
        input,
        kept.len()
    );
    stages.push(StageCount {
        stage: filter.name().to_string(),
        input,
        output: kept.len(),
    });

    if kept.is_empty() {
        return Err(FilterError::EmptyCorpus {
            stage: filter.name().to_string(),
            detail: detail(),
        });
    }
    Ok(kept)
}
