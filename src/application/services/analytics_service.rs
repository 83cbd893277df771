//! Read-side analytics computed from stored links and click events.
//!
//! Nothing here is estimated or synthesized: every figure is a count over
//! records returned by the store for the requested scope.

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use crate::domain::entities::{Breakdown, Dimension};
use crate::domain::entities::{ClickEvent, Scope, ShortLink};
use crate::domain::repositories::PersistenceStore;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_urls: u64,
    pub total_clicks: u64,
    pub active_urls: u64,
}

/// One entry of the top-links ranking with its drill-down events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopLink {
    #[serde(flatten)]
    pub link: ShortLink,
    /// Newest first.
    pub recent_clicks: Vec<ClickEvent>,
    /// Events not included in `recent_clicks`.
    pub remaining_clicks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

/// All four breakdowns of one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedBreakdown {
    pub by_source: Breakdown,
    pub by_country: Breakdown,
    pub by_device: Breakdown,
    pub by_hour: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub top_links: Vec<TopLink>,
    pub click_history: Vec<DailyClicks>,
    pub breakdown: DetailedBreakdown,
}

/// Sizes used by [`AnalyticsService::report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub top_links: usize,
    pub recent_clicks: usize,
    pub history_days: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_links: 10,
            recent_clicks: 5,
            history_days: 30,
        }
    }
}

/// Aggregates summary, ranking, history and breakdown views. Read-only.
pub struct AnalyticsService<S: PersistenceStore + ?Sized> {
    store: Arc<S>,
    settings: ReportSettings,
}

impl<S: PersistenceStore + ?Sized> AnalyticsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_settings(store, ReportSettings::default())
    }

    pub fn with_settings(store: Arc<S>, settings: ReportSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> ReportSettings {
        self.settings
    }

    /// Link count, click total and active count over the visible links.
    ///
    /// `active_urls` counts the stored flag; an expired link that was never
    /// looked up still counts as active.
    pub async fn summary(&self, scope: &Scope) -> Result<Summary, AppError> {
        let links = self.store.list_links(scope).await?;
        Ok(summarize(&links))
    }

    /// Top `n` links by clicks, newest first on ties, each with its `k` most
    /// recent events.
    pub async fn top_links(
        &self,
        scope: &Scope,
        n: usize,
        k: usize,
    ) -> Result<Vec<TopLink>, AppError> {
        let mut links = self.store.list_links(scope).await?;
        links.sort_by(|a, b| {
            b.clicks
                .cmp(&a.clicks)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        links.truncate(n);

        let mut top = Vec::with_capacity(links.len());
        for link in links {
            let recent_clicks = if k == 0 {
                Vec::new()
            } else {
                self.store.recent_clicks(link.id, k).await?
            };
            let remaining_clicks = clicks_of(&link).saturating_sub(recent_clicks.len() as u64);

            top.push(TopLink {
                link,
                recent_clicks,
                remaining_clicks,
            });
        }

        Ok(top)
    }

    /// Daily click counts over the trailing `window_days`, ending today (UTC).
    pub async fn click_history(
        &self,
        scope: &Scope,
        window_days: u32,
    ) -> Result<Vec<DailyClicks>, AppError> {
        self.click_history_until(scope, window_days, Utc::now().date_naive())
            .await
    }

    /// Daily click counts for the `window_days` calendar days ending at `today`.
    ///
    /// One entry per day, oldest first; days without events read zero.
    pub async fn click_history_until(
        &self,
        scope: &Scope,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyClicks>, AppError> {
        if window_days == 0 {
            return Ok(Vec::new());
        }

        let start = today
            .checked_sub_days(Days::new(u64::from(window_days - 1)))
            .ok_or_else(|| {
                AppError::bad_request(
                    "History window is out of range",
                    json!({ "days": window_days }),
                )
            })?;
        let since = start.and_time(NaiveTime::MIN).and_utc();

        let mut buckets: BTreeMap<NaiveDate, u64> = start
            .iter_days()
            .take(window_days as usize)
            .map(|day| (day, 0))
            .collect();

        for event in self.store.list_clicks(scope, Some(since)).await? {
            if let Some(count) = buckets.get_mut(&event.timestamp.date_naive()) {
                *count += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(date, clicks)| DailyClicks { date, clicks })
            .collect())
    }

    /// Click counts grouped by one event attribute, counted by the store.
    pub async fn breakdown(&self, scope: &Scope, dimension: Dimension) -> Result<Breakdown, AppError> {
        self.store.count_clicks_by(scope, dimension).await
    }

    /// All four breakdowns.
    pub async fn detailed(&self, scope: &Scope) -> Result<DetailedBreakdown, AppError> {
        Ok(DetailedBreakdown {
            by_source: self.breakdown(scope, Dimension::Source).await?,
            by_country: self.breakdown(scope, Dimension::Country).await?,
            by_device: self.breakdown(scope, Dimension::Device).await?,
            by_hour: self.breakdown(scope, Dimension::HourOfDay).await?,
        })
    }

    /// Dashboard bundle: summary, top links, history and breakdowns.
    pub async fn report(&self, scope: &Scope) -> Result<AnalyticsReport, AppError> {
        let settings = self.settings;

        Ok(AnalyticsReport {
            summary: self.summary(scope).await?,
            top_links: self
                .top_links(scope, settings.top_links, settings.recent_clicks)
                .await?,
            click_history: self.click_history(scope, settings.history_days).await?,
            breakdown: self.detailed(scope).await?,
        })
    }
}

fn clicks_of(link: &ShortLink) -> u64 {
    u64::try_from(link.clicks).unwrap_or(0)
}

fn summarize(links: &[ShortLink]) -> Summary {
    Summary {
        total_urls: links.len() as u64,
        total_clicks: links.iter().map(clicks_of).sum(),
        active_urls: links.iter().filter(|l| l.is_active).count() as u64,
    }
}
