//! Point-in-time snapshot sections of a stock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot files written with the replace policy. Each holds the provider's
/// records verbatim; there is no history across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Competitors,
    /// Market performance over a fixed window of recent trading days.
    Performance,
    GrowthValuation,
}

impl SectionKind {
    /// Processing order within a stock.
    pub const ALL: [SectionKind; 3] = [
        SectionKind::Competitors,
        SectionKind::Performance,
        SectionKind::GrowthValuation,
    ];

    /// Suffix of the on-disk file: `{ticker}_{suffix}.json`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            SectionKind::Competitors => "competitors",
            SectionKind::Performance => "performance",
            SectionKind::GrowthValuation => "growth_valuation",
        }
    }

    /// Path segment used by the upstream provider and the query API.
    pub fn route_segment(self) -> &'static str {
        match self {
            SectionKind::Competitors => "competitors",
            SectionKind::Performance => "performance",
            SectionKind::GrowthValuation => "growth-valuation",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SectionKind::Competitors => "competitors",
            SectionKind::Performance => "performance",
            SectionKind::GrowthValuation => "growth & valuation",
        };
        f.write_str(label)
    }
}
