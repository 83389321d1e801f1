//! Composite scoring for cross-platform hot-search items.
//!
//! aggregate = 0.40 * rank + 0.40 * normalized heat + 0.15 * (weight * 10)
//!           + 0.05 * freshness + top-position bonus
//!
//! Every function here is total: missing or malformed inputs fall back to the
//! defaults documented on each function.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::model::HotSearchItem;
use crate::source::{self, Source};

pub const RANK_WEIGHT: f64 = 0.40;
pub const HEAT_WEIGHT: f64 = 0.40;
pub const SOURCE_WEIGHT: f64 = 0.15;
pub const FRESHNESS_WEIGHT: f64 = 0.05;

/// Lowest rank that still earns a rank score.
pub const MAX_SCORED_RANK: i64 = 50;

/// Logistic steepness of the heat curve.
const HEAT_STEEPNESS: f64 = 1.5;

/// Freshness band when the capture time is missing or unreadable.
pub const NEUTRAL_FRESHNESS: f64 = 5.0;

/// Linear rank score: rank 1 → 100, rank 50 → 2, outside 1..=50 → 0.
pub fn rank_score(rank: i64) -> f64 {
    if rank <= 0 || rank > MAX_SCORED_RANK {
        return 0.0;
    }
    100.0 * (51 - rank) as f64 / 50.0
}

/// Heat mapped onto 0..=100 by a logistic curve centred on the platform's
/// average heat, so the average always scores 50.
pub fn normalized_heat_score(heat: i64, src: Source) -> f64 {
    let Some(profile) = source::profile(src) else {
        return 0.0;
    };
    if heat <= 0 {
        return 0.0;
    }
    let ratio = heat as f64 / profile.avg_heat;
    let score = 100.0 / (1.0 + (-HEAT_STEEPNESS * (ratio - 1.0)).exp());
    score.clamp(0.0, 100.0)
}

/// Platform influence: `weight * 10`, or 10 for an unknown platform.
pub fn source_weight_score(src: Source) -> f64 {
    source::profile(src).map_or(10.0, |p| p.weight * 10.0)
}

/// Discrete recency band from the capture time relative to `now`.
///
/// - age <= 60 min  → 10
/// - age <= 180 min → 8
/// - age <= 360 min → 5
/// - older          → 2
///
/// Missing or unparseable timestamps give the neutral band (5).
pub fn freshness_score(captured_at: Option<&str>, now: DateTime<Utc>) -> f64 {
    let Some(captured) = captured_at.and_then(parse_timestamp) else {
        return NEUTRAL_FRESHNESS;
    };
    let age_minutes = (now - captured).num_milliseconds() as f64 / 60_000.0;
    if age_minutes <= 60.0 {
        10.0
    } else if age_minutes <= 180.0 {
        8.0
    } else if age_minutes <= 360.0 {
        5.0
    } else {
        2.0
    }
}

/// Fixed bonus that pulls each platform's #1-#3 into the visible head.
pub fn top_rank_bonus(rank: i64) -> f64 {
    match rank {
        1 => 100.0,
        2 => 80.0,
        3 => 60.0,
        _ => 0.0,
    }
}

/// Aggregate score at the current wall-clock time.
pub fn score(item: &HotSearchItem) -> f64 {
    score_at(item, Utc::now())
}

/// Aggregate score with an explicit reference time.
pub fn score_at(item: &HotSearchItem, now: DateTime<Utc>) -> f64 {
    let rank = effective_rank(item);
    let heat = item.heat.unwrap_or(0);

    let base = rank_score(rank) * RANK_WEIGHT
        + normalized_heat_score(heat, item.source) * HEAT_WEIGHT
        + source_weight_score(item.source) * SOURCE_WEIGHT
        + freshness_score(item.captured_at.as_deref(), now) * FRESHNESS_WEIGHT;

    base + top_rank_bonus(rank)
}

/// Missing (or zero) rank counts as the lowest scored tier.
fn effective_rank(item: &HotSearchItem) -> i64 {
    match item.rank {
        Some(r) if r != 0 => r,
        _ => MAX_SCORED_RANK,
    }
}

/// RFC 3339 first; offset-less ISO timestamps are read as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}
