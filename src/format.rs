//! Presentation helpers for heat values.

use serde::Serialize;

use crate::source::Source;

/// Display tier of a raw heat value on its own platform's scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    None,
    Low,
    Medium,
    High,
}

/// Fallback thresholds when the platform has no profile.
const DEFAULT_HIGH_HEAT: u64 = 50_000_000;
const DEFAULT_MEDIUM_HEAT: u64 = 10_000_000;

/// "1234.6万", "1.6亿", plain digits below 10k, "暂无数据" for 0.
pub fn format_heat(heat: i64) -> String {
    if heat <= 0 {
        return "暂无数据".to_string();
    }
    let h = heat as f64;
    if heat >= 100_000_000 {
        format!("{:.1}亿", h / 100_000_000.0)
    } else if heat >= 10_000 {
        format!("{:.1}万", h / 10_000.0)
    } else {
        heat.to_string()
    }
}

pub fn heat_level(heat: i64, source: Source) -> HeatLevel {
    if heat <= 0 {
        return HeatLevel::None;
    }
    let (high, medium) = source
        .profile()
        .map_or((DEFAULT_HIGH_HEAT, DEFAULT_MEDIUM_HEAT), |p| {
            (p.high_heat, p.medium_heat)
        });
    let heat = heat as u64;
    if heat >= high {
        HeatLevel::High
    } else if heat >= medium {
        HeatLevel::Medium
    } else {
        HeatLevel::Low
    }
}
