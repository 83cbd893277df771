//! Query parameters for analytics endpoints.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// `GET /api/analytics/top` parameters.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct TopLinksQuery {
    #[serde(default)]
    pub owner: Option<String>,

    /// Number of links (default: configured limit).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub n: Option<usize>,

    /// Recent events per link (default: configured drill-down size).
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recent: Option<usize>,
}

/// `GET /api/analytics/history` parameters.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub owner: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub days: Option<u32>,
}

/// Upper bound for `n` and `recent`.
pub const MAX_TOP_LINKS: usize = 100;

/// Upper bound for `days`.
pub const MAX_HISTORY_DAYS: u32 = 366;
