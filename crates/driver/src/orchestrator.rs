//! # Batch Job
//!
//! Runs the whole recommender once over a static review corpus:
//! 1. Filter raw reviews down to serious-player interactions
//! 2. Fit the actor and item indexers
//! 3. Optionally hold out a share of ratings
//! 4. Train the ALS model
//! 5. Evaluate on training (and holdout) ratings
//! 6. Rank the top K actors for every item
//! 7. Persist mappings, recommendations, model and report
//!
//! Corpus-level failures (empty corpus, singular system) abort the run with
//! context; per-row conditions end up in the [`JobReport`].

use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use data_loader::{
    ActorId, ActorIndexer, ActorMappingRow, ArtifactStore, InteractionIndex, InteractionRecord,
    ItemIndexer, ItemMappingRow, RecommendationRow,
};
use engine::{evaluate, split_holdout, Als, AlsModel, Evaluation, Recommender};
use pipeline::{FilterReport, InteractionFilter};

use crate::config::JobConfig;

pub const ITEM_MAPPING_TABLE: &str = "item_mapping";
pub const ACTOR_MAPPING_TABLE: &str = "actor_mapping";
pub const ITEM_RECOMMENDATIONS_TABLE: &str = "item_recommendations";
pub const MODEL_BLOB: &str = "model.json";
pub const REPORT_BLOB: &str = "report.json";

/// Summary of one batch run, persisted as `report.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub filter: FilterReport,
    pub actors: usize,
    pub items: usize,
    pub train_ratings: usize,
    pub holdout_ratings: usize,
    pub cold_start_actors: usize,
    pub cold_start_items: usize,
    pub train: Evaluation,
    pub holdout: Option<Evaluation>,
    /// Items that received a recommendation list
    pub recommendation_lists: usize,
    pub elapsed_ms: u64,
}

/// One batch run bound to a store.
#[derive(Debug, Clone)]
pub struct BatchJob<S> {
    config: JobConfig,
    store: S,
}

impl<S: ArtifactStore> BatchJob<S> {
    pub fn new(config: JobConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run every stage over `records` and persist the results.
    pub fn run(&self, records: Vec<InteractionRecord>) -> Result<JobReport> {
        let start_time = Instant::now();
        self.config.validate().context("Invalid job configuration")?;

        // Filter
        let outcome = InteractionFilter::new(self.config.filter.clone())
            .run(records)
            .context("Interaction filter failed")?;
        info!(
            "Filtered corpus to {} serious interactions",
            outcome.interactions.len()
        );

        // Index
        let index = InteractionIndex::fit(&outcome.interactions);
        info!(
            "Indexed {} actors and {} items",
            index.actors.len(),
            index.items.len()
        );

        // Split
        let (train, holdout) = split_holdout(
            &index.ratings,
            self.config.holdout_fraction,
            self.config.split_seed,
        )
        .context("Failed to split ratings")?;

        // Train
        let model = Als::new(self.config.als.clone())
            .fit(&train, index.actors.len(), index.items.len())
            .context("ALS training failed")?;
        let cold = model.cold_start();
        if !cold.is_empty() {
            warn!(
                "Cold start: {} actors and {} items have no training ratings",
                cold.actors.len(),
                cold.items.len()
            );
        }

        // Evaluate
        let train_eval = evaluate(&model, &train);
        let holdout_eval = (!holdout.is_empty()).then(|| evaluate(&model, &holdout));

        // Recommend
        let lists = Recommender::new(&model).recommend_all_items(self.config.top_k);
        let rows: Vec<RecommendationRow> = lists.iter().flat_map(|l| l.to_rows()).collect();

        let report = JobReport {
            filter: outcome.report,
            actors: index.actors.len(),
            items: index.items.len(),
            train_ratings: train.len(),
            holdout_ratings: holdout.len(),
            cold_start_actors: cold.actors.len(),
            cold_start_items: cold.items.len(),
            train: train_eval,
            holdout: holdout_eval,
            recommendation_lists: lists.len(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        self.persist(&index, &model, &rows, &report)?;

        info!(
            "Batch job finished in {:.2?}: {} recommendation lists, train rmse {:?}",
            start_time.elapsed(),
            report.recommendation_lists,
            report.train.rmse
        );
        Ok(report)
    }

    fn persist(
        &self,
        index: &InteractionIndex,
        model: &AlsModel,
        rows: &[RecommendationRow],
        report: &JobReport,
    ) -> Result<()> {
        self.store
            .write_table(ITEM_MAPPING_TABLE, &index.items.mapping_rows())
            .context("Failed to write item mapping")?;
        self.store
            .write_table(ACTOR_MAPPING_TABLE, &index.actors.mapping_rows())
            .context("Failed to write actor mapping")?;
        self.store
            .write_table(ITEM_RECOMMENDATIONS_TABLE, rows)
            .context("Failed to write item recommendations")?;

        let model_bytes = model.to_json_bytes().context("Failed to encode model")?;
        self.store
            .write_blob(MODEL_BLOB, &model_bytes)
            .context("Failed to write model")?;

        let report_bytes = serde_json::to_vec_pretty(report).context("Failed to encode report")?;
        self.store
            .write_blob(REPORT_BLOB, &report_bytes)
            .context("Failed to write report")?;

        info!("Persisted {} recommendation rows", rows.len());
        Ok(())
    }
}

/// One recommendation with its raw identifier resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecommendation<K> {
    pub rank: usize,
    pub target: K,
    pub score: f32,
}

/// A persisted model together with the mappings that interpret it.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: AlsModel,
    pub actors: ActorIndexer,
    pub items: ItemIndexer,
}

/// Load the model and rebuild both indexers from their mapping tables.
pub fn load_artifacts<S: ArtifactStore>(store: &S) -> Result<Artifacts> {
    let item_rows: Vec<ItemMappingRow> = store
        .read_table(ITEM_MAPPING_TABLE)
        .context("Failed to read item mapping")?;
    let actor_rows: Vec<ActorMappingRow> = store
        .read_table(ACTOR_MAPPING_TABLE)
        .context("Failed to read actor mapping")?;
    let items = ItemIndexer::from_mapping_rows(item_rows).context("Invalid item mapping")?;
    let actors = ActorIndexer::from_mapping_rows(actor_rows).context("Invalid actor mapping")?;

    let bytes = store.read_blob(MODEL_BLOB).context("Failed to read model")?;
    let model = AlsModel::from_json_bytes(&bytes).context("Failed to decode model")?;

    if model.n_items() != items.len() || model.n_actors() != actors.len() {
        bail!(
            "Model covers {} actors and {} items but the mappings list {} and {}",
            model.n_actors(),
            model.n_items(),
            actors.len(),
            items.len()
        );
    }

    Ok(Artifacts {
        model,
        actors,
        items,
    })
}

impl Artifacts {
    /// Top `limit` actors for a game, by display name
    pub fn actors_for_item(
        &self,
        item_name: &str,
        limit: usize,
    ) -> Result<Vec<ResolvedRecommendation<ActorId>>> {
        let item = self
            .items
            .index_of(item_name)
            .with_context(|| format!("Unknown item '{item_name}'"))?;
        let list = Recommender::new(&self.model)
            .actors_for_item(item, limit)
            .with_context(|| format!("Item '{item_name}' has no trained factors"))?;

        list.items
            .iter()
            .enumerate()
            .map(|(rank, rec)| {
                let actor_id = self
                    .actors
                    .value_of(rec.target)
                    .with_context(|| format!("No actor id for {}", rec.target))?;
                Ok(ResolvedRecommendation {
                    rank: rank + 1,
                    target: *actor_id,
                    score: rec.score,
                })
            })
            .collect()
    }

    /// Top `limit` games for an actor, by raw actor id
    pub fn items_for_actor(
        &self,
        actor_id: ActorId,
        limit: usize,
    ) -> Result<Vec<ResolvedRecommendation<String>>> {
        let actor = self
            .actors
            .index_of(&actor_id)
            .with_context(|| format!("Unknown actor {actor_id}"))?;
        let list = Recommender::new(&self.model)
            .items_for_actor(actor, limit)
            .with_context(|| format!("Actor {actor_id} has no trained factors"))?;

        list.items
            .iter()
            .enumerate()
            .map(|(rank, rec)| {
                let name = self
                    .items
                    .value_of(rec.target)
                    .with_context(|| format!("No item name for {}", rec.target))?;
                Ok(ResolvedRecommendation {
                    rank: rank + 1,
                    target: name.clone(),
                    score: rec.score,
                })
            })
            .collect()
    }
}
