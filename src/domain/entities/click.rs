//! Click entity representing a single resolution of a short code.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

/// One recorded visit of a short link.
///
/// Context fields are opaque strings supplied by the calling layer; the engine
/// performs no geolocation or user-agent parsing. Events are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickEvent {
    #[serde(skip)]
    pub id: i64,
    pub link_id: i64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub country: String,
    pub device: String,
    pub user_agent: String,
}

impl ClickEvent {
    /// Hour of day (0-23, UTC) at which the click happened.
    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Request context captured at resolution time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickContext {
    pub source: String,
    pub country: String,
    pub device: String,
    pub user_agent: String,
}

impl ClickContext {
    pub fn new(
        source: impl Into<String>,
        country: impl Into<String>,
        device: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            country: country.into(),
            device: device.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// Input data for recording a click against a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub timestamp: DateTime<Utc>,
    pub context: ClickContext,
}

impl NewClick {
    pub fn into_event(self, id: i64) -> ClickEvent {
        ClickEvent {
            id,
            link_id: self.link_id,
            timestamp: self.timestamp,
            source: self.context.source,
            country: self.context.country,
            device: self.context.device,
            user_agent: self.context.user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_click_into_event() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let click = NewClick {
            link_id: 42,
            timestamp: at,
            context: ClickContext::new("google.com", "Germany", "Mobile", "Mozilla/5.0"),
        };

        let event = click.into_event(3);

        assert_eq!(event.id, 3);
        assert_eq!(event.link_id, 42);
        assert_eq!(event.source, "google.com");
        assert_eq!(event.country, "Germany");
        assert_eq!(event.device, "Mobile");
        assert_eq!(event.user_agent, "Mozilla/5.0");
        assert_eq!(event.hour_of_day(), 15);
    }

    #[test]
    fn test_default_context_is_empty() {
        let ctx = ClickContext::default();
        assert!(ctx.source.is_empty());
        assert!(ctx.user_agent.is_empty());
    }
}
