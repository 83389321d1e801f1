//! Balanced merge: score order overall, platform interleaving in the head.
//!
//! 1. Every item gets its aggregate score and the list is sorted descending
//!    (stable, so equal scores keep their input order).
//! 2. The sorted list is split per platform. Platforms take turns, one item
//!    each, in order of first appearance, until the head is full or every
//!    platform is exhausted. Whatever was not emitted follows in score order,
//!    skipping identifiers already used.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::scoring::score_at;
use crate::format::{format_heat, heat_level};
use crate::model::{HotSearchItem, ScoredItem};
use crate::source::Source;

/// Number of interleaved items at the top of the merged list.
pub const DEFAULT_BALANCE_HEAD: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// How many items are interleaved round-robin before pure score order resumes.
    pub balance_head: usize,
    /// Reference time for freshness.
    pub now: DateTime<Utc>,
    /// Emit the top-10 score trace.
    pub debug: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            balance_head: DEFAULT_BALANCE_HEAD,
            now: Utc::now(),
            debug: false,
        }
    }
}

impl MergeOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn balance_head(mut self, n: usize) -> Self {
        self.balance_head = n;
        self
    }

    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }
}

/// Score and sort descending (stable).
pub fn sort_by_aggregate_score(items: &[HotSearchItem], opts: &MergeOptions) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = items
        .iter()
        .map(|it| ScoredItem {
            aggregate_score: score_at(it, opts.now),
            item: it.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.aggregate_score.total_cmp(&a.aggregate_score));

    if opts.debug {
        trace_top(&scored, 10);
    }
    scored
}

/// Merged ranking with default options at the current time.
pub fn merged_ranking(items: &[HotSearchItem]) -> Vec<ScoredItem> {
    merged_ranking_with(items, &MergeOptions::default())
}

pub fn merged_ranking_with(items: &[HotSearchItem], opts: &MergeOptions) -> Vec<ScoredItem> {
    let sorted = sort_by_aggregate_score(items, opts);
    let total = sorted.len();

    // Per-platform queues of indices into `sorted`, platforms in first-seen order.
    let mut groups: Vec<(Source, Vec<usize>)> = Vec::new();
    for (idx, it) in sorted.iter().enumerate() {
        match groups.iter_mut().find(|(s, _)| *s == it.item.source) {
            Some((_, q)) => q.push(idx),
            None => groups.push((it.item.source, vec![idx])),
        }
    }

    let mut slots: Vec<Option<ScoredItem>> = sorted.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(total);
    let mut used_ids: HashSet<i64> = HashSet::new();
    let mut cursors = vec![0usize; groups.len()];
    let mut turn = 0usize;

    while out.len() < opts.balance_head && out.len() < total {
        let g = turn % groups.len();
        if let Some(&idx) = groups[g].1.get(cursors[g]) {
            if let Some(it) = slots[idx].take() {
                used_ids.insert(it.item.id);
                out.push(it);
            }
            cursors[g] += 1;
        }
        turn += 1;

        let exhausted = groups
            .iter()
            .zip(&cursors)
            .all(|((_, q), &c)| c >= q.len());
        if exhausted {
            break;
        }
    }

    out.extend(
        slots
            .into_iter()
            .flatten()
            .filter(|it| !used_ids.contains(&it.item.id)),
    );
    out
}

fn trace_top(sorted: &[ScoredItem], n: usize) {
    for (pos, it) in sorted.iter().take(n).enumerate() {
        debug!(
            target: "ranking",
            pos = pos + 1,
            platform = it.item.source.display_name(),
            title = %it.item.title,
            rank = ?it.item.rank,
            heat_wan = format!("{:.1}", it.item.heat.unwrap_or(0) as f64 / 10_000.0),
            heat = %format_heat(it.item.heat.unwrap_or(0)),
            level = ?heat_level(it.item.heat.unwrap_or(0), it.item.source),
            score = format!("{:.2}", it.aggregate_score),
            "aggregate ranking"
        );
    }
}
