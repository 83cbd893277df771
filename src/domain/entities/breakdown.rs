//! Click counts grouped by one event attribute.

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::entities::ClickEvent;
use crate::error::AppError;

/// Event attribute a breakdown groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Source,
    Country,
    Device,
    HourOfDay,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Source,
        Dimension::Country,
        Dimension::Device,
        Dimension::HourOfDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Source => "source",
            Dimension::Country => "country",
            Dimension::Device => "device",
            Dimension::HourOfDay => "hour",
        }
    }

    /// Text attribute of `event`, or `None` for the hour dimension.
    fn text_of<'a>(&self, event: &'a ClickEvent) -> Option<&'a str> {
        match self {
            Dimension::Source => Some(&event.source),
            Dimension::Country => Some(&event.country),
            Dimension::Device => Some(&event.device),
            Dimension::HourOfDay => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" | "referrer" => Ok(Dimension::Source),
            "country" => Ok(Dimension::Country),
            "device" => Ok(Dimension::Device),
            "hour" | "hour_of_day" | "hourofday" => Ok(Dimension::HourOfDay),
            _ => Err(AppError::bad_request(
                "Unknown breakdown dimension",
                json!({
                    "dimension": s,
                    "allowed": Dimension::ALL.map(|d| d.as_str()),
                }),
            )),
        }
    }
}

/// Category value to click count. Categories without events are absent.
///
/// Hours are keyed numerically so they iterate 0 through 23; both variants
/// serialize as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Breakdown {
    Categories(BTreeMap<String, u64>),
    Hours(BTreeMap<u32, u64>),
}

impl Breakdown {
    /// Empty breakdown of the shape `dimension` produces.
    pub fn empty(dimension: Dimension) -> Self {
        match dimension {
            Dimension::HourOfDay => Breakdown::Hours(BTreeMap::new()),
            _ => Breakdown::Categories(BTreeMap::new()),
        }
    }

    /// Groups `events` in memory. Empty text values are skipped.
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a ClickEvent>,
        dimension: Dimension,
    ) -> Self {
        let mut breakdown = Self::empty(dimension);
        for event in events {
            match &mut breakdown {
                Breakdown::Hours(hours) => *hours.entry(event.hour_of_day()).or_insert(0) += 1,
                Breakdown::Categories(categories) => {
                    if let Some(value) = dimension.text_of(event).filter(|v| !v.is_empty()) {
                        *categories.entry(value.to_string()).or_insert(0) += 1;
                    }
                }
            }
        }
        breakdown
    }

    /// Builds a breakdown from `(category, count)` rows of a grouped query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if a count is negative.
    pub fn from_text_rows(rows: impl IntoIterator<Item = (String, i64)>) -> Result<Self, AppError> {
        rows.into_iter()
            .map(|(category, count)| Ok((category, count_of(count)?)))
            .collect::<Result<_, AppError>>()
            .map(Breakdown::Categories)
    }

    /// Like [`from_text_rows`](Self::from_text_rows) for `(hour, count)` rows.
    /// Hours outside 0-23 are rejected.
    pub fn from_hour_rows(rows: impl IntoIterator<Item = (i32, i64)>) -> Result<Self, AppError> {
        rows.into_iter()
            .map(|(hour, count)| {
                let hour = u32::try_from(hour)
                    .ok()
                    .filter(|h| *h < 24)
                    .ok_or_else(|| {
                        AppError::persistence("count_clicks_by", "hour", "hour out of range")
                    })?;
                Ok((hour, count_of(count)?))
            })
            .collect::<Result<_, AppError>>()
            .map(Breakdown::Hours)
    }

    /// Count for one category. Hour categories are looked up by their number.
    pub fn get(&self, category: &str) -> Option<u64> {
        match self {
            Breakdown::Categories(categories) => categories.get(category).copied(),
            Breakdown::Hours(hours) => category
                .parse::<u32>()
                .ok()
                .and_then(|h| hours.get(&h).copied()),
        }
    }

    /// Categories with their counts in key order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        match self {
            Breakdown::Categories(categories) => {
                categories.iter().map(|(k, v)| (k.clone(), *v)).collect()
            }
            Breakdown::Hours(hours) => hours.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            Breakdown::Categories(categories) => categories.values().sum(),
            Breakdown::Hours(hours) => hours.values().sum(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Breakdown::Categories(categories) => categories.len(),
            Breakdown::Hours(hours) => hours.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn count_of(count: i64) -> Result<u64, AppError> {
    u64::try_from(count)
        .map_err(|_| AppError::persistence("count_clicks_by", count.to_string(), "negative count"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ClickContext, NewClick};
    use chrono::{TimeZone, Utc};

    fn event(hour: u32, source: &str) -> ClickEvent {
        NewClick {
            link_id: 1,
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, hour, 30, 0).unwrap(),
            context: ClickContext::new(source, "DE", "Mobile", "ua"),
        }
        .into_event(0)
    }

    #[test]
    fn test_hours_iterate_numerically() {
        let events = [event(10, "a"), event(2, "a"), event(10, "a"), event(23, "a")];

        let breakdown = Breakdown::from_events(&events, Dimension::HourOfDay);

        let keys: Vec<String> = breakdown.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["2", "10", "23"]);
        assert_eq!(breakdown.get("10"), Some(2));
        assert_eq!(
            serde_json::to_string(&breakdown).unwrap(),
            r#"{"2":1,"10":2,"23":1}"#
        );
    }

    #[test]
    fn test_empty_text_values_are_skipped() {
        let events = [event(1, "google.com"), event(1, ""), event(2, "google.com")];

        let breakdown = Breakdown::from_events(&events, Dimension::Source);

        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown.get("google.com"), Some(2));
        assert_eq!(breakdown.total(), 2);
    }

    #[test]
    fn test_hour_rows_out_of_range_fail() {
        assert!(Breakdown::from_hour_rows([(3, 4), (23, 1)]).is_ok());
        assert!(Breakdown::from_hour_rows([(24, 1)]).is_err());
        assert!(Breakdown::from_text_rows([("x".to_string(), -1)]).is_err());
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("source".parse::<Dimension>().unwrap(), Dimension::Source);
        assert_eq!("Country".parse::<Dimension>().unwrap(), Dimension::Country);
        assert_eq!("hour".parse::<Dimension>().unwrap(), Dimension::HourOfDay);
        assert!("browser".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_unknown_dimension_lists_every_allowed_value() {
        let err = "browser".parse::<Dimension>().unwrap_err();
        let AppError::Validation { details, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(details["allowed"], json!(["source", "country", "device", "hour"]));
    }
}
