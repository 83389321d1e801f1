// src/ranking/mod.rs
//! Cross-platform aggregate ranking: composite scoring + balanced merge.

pub mod merge;
pub mod scoring;

pub use merge::{
    merged_ranking, merged_ranking_with, sort_by_aggregate_score, MergeOptions,
    DEFAULT_BALANCE_HEAD,
};
pub use scoring::{
    freshness_score, normalized_heat_score, rank_score, score, score_at, source_weight_score,
    top_rank_bonus,
};
