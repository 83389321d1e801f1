//! # Sources
//!
//! The four upstream hot-search platforms and their static heat profiles.
//!
//! Raw heat values are not comparable across platforms (Weibo's average is
//! roughly ten times Toutiao's), so every platform carries its own calibration:
//! - `weight`      : influence multiplier used by the composite score
//! - `avg_heat`    : reference point where the normalized heat score is 50
//! - `high_heat` / `medium_heat` : presentation tiers only, never used in scoring
//!
//! The table is a process-wide constant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream platform an item was scraped from.
///
/// Unrecognized platform strings deserialize to `Unknown` so a single odd row
/// never rejects a whole batch. `Unknown` has no heat profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Weibo,
    Toutiao,
    Bilibili,
    Douyin,
    #[serde(other)]
    Unknown,
}

impl Source {
    /// The known platforms, in canonical order.
    pub const ALL: [Source; 4] = [
        Source::Weibo,
        Source::Toutiao,
        Source::Bilibili,
        Source::Douyin,
    ];

    /// Wire name (`WEIBO`, `TOUTIAO`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Weibo => "WEIBO",
            Source::Toutiao => "TOUTIAO",
            Source::Bilibili => "BILIBILI",
            Source::Douyin => "DOUYIN",
            Source::Unknown => "UNKNOWN",
        }
    }

    /// Human-facing platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Weibo => "微博",
            Source::Toutiao => "今日头条",
            Source::Bilibili => "B站",
            Source::Douyin => "抖音",
            Source::Unknown => "未知",
        }
    }

    /// Heat profile for this platform, `None` for `Unknown`.
    pub fn profile(&self) -> Option<&'static SourceHeatProfile> {
        profile(*self)
    }

    /// Case-insensitive parse of a wire name. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|src| src.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static calibration for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceHeatProfile {
    pub source: Source,
    pub weight: f64,
    pub avg_heat: f64,
    pub high_heat: u64,
    pub medium_heat: u64,
}

static PROFILES: [SourceHeatProfile; 4] = [
    SourceHeatProfile {
        source: Source::Weibo,
        weight: 1.2,
        avg_heat: 25_000_000.0,
        high_heat: 50_000_000,
        medium_heat: 10_000_000,
    },
    SourceHeatProfile {
        source: Source::Toutiao,
        weight: 1.0,
        avg_heat: 2_500_000.0,
        high_heat: 5_000_000,
        medium_heat: 1_000_000,
    },
    SourceHeatProfile {
        source: Source::Bilibili,
        weight: 1.15,
        avg_heat: 10_000_000.0,
        high_heat: 20_000_000,
        medium_heat: 5_000_000,
    },
    SourceHeatProfile {
        source: Source::Douyin,
        weight: 1.25,
        avg_heat: 15_000_000.0,
        high_heat: 30_000_000,
        medium_heat: 8_000_000,
    },
];

/// Look up the heat profile of a platform.
pub fn profile(source: Source) -> Option<&'static SourceHeatProfile> {
    PROFILES.iter().find(|p| p.source == source)
}

/// The whole profile table (for diagnostics / the `/profiles` endpoint).
pub fn profiles() -> &'static [SourceHeatProfile] {
    &PROFILES
}
