//! API response models for the localization endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// A selectable timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TimezoneResponse {
    /// Region part of the identifier, e.g. `Europe`
    pub timezone: String,
    /// IANA identifier, e.g. `Europe/Helsinki`
    pub identifier: String,
    /// Current UTC offset, e.g. `GMT+2:00`
    pub offset: String,
    /// Display value, the identifier with underscores as spaces, e.g. `America/New York`
    pub value: String,
}
