//! Engine services: code generation, link registry, click recording and analytics.

pub mod analytics_service;
pub mod click_recorder;
pub mod code_generator;
pub mod link_registry;

pub use analytics_service::{
    AnalyticsReport, AnalyticsService, Breakdown, DailyClicks, DetailedBreakdown, Dimension,
    ReportSettings, Summary, TopLink,
};
pub use click_recorder::ClickRecorder;
pub use code_generator::CodeGenerator;
pub use link_registry::{CreateLink, LinkRegistry};
