//! DTOs for link management endpoints.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{LinkStatus, ShortLink};

/// Request to create one short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Absolute http(s) target address. Format is checked by the engine.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional caller-chosen code; case-sensitive.
    #[validate(length(max = 64, message = "Custom code must be at most 64 characters"))]
    pub custom_code: Option<String>,

    /// Days until expiry. Zero or negative yields an already-expired link.
    pub expiration_days: Option<i64>,

    #[validate(length(min = 1, max = 128))]
    pub owner: Option<String>,
}

/// A link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    #[serde(flatten)]
    pub link: ShortLink,
    pub short_url: String,
    pub status: LinkStatus,
}

impl LinkResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        let status = link.status(Utc::now());
        Self {
            link,
            short_url,
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub total: usize,
    pub items: Vec<LinkResponse>,
}

/// Optional owner filter shared by listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    #[serde(default)]
    pub owner: Option<String>,
}
