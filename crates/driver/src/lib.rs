//! Batch driver for the serious-player recommender.
//!
//! This crate contains the job that chains every component into one run:
//! filter, index, split, train, evaluate, recommend and persist. It also
//! loads persisted artifacts back for interpretation.

pub mod config;
pub mod orchestrator;

pub use config::JobConfig;
pub use orchestrator::{
    load_artifacts, Artifacts, BatchJob, JobReport, ResolvedRecommendation, ACTOR_MAPPING_TABLE,
    ITEM_MAPPING_TABLE, ITEM_RECOMMENDATIONS_TABLE, MODEL_BLOB, REPORT_BLOB,
};
