//! Selectable languages, locales and timezones.

use axum::{Json, Router, routing::get};
use chrono::{Offset, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};

use crate::{
    AppState,
    api::models::localization::TimezoneResponse,
    resources::users::{LANGUAGES, LOCALES},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/localization/language", get(get_languages))
        .route("/v1/localization/locale", get(get_locales))
        .route("/v1/localization/timezone", get(get_timezones))
}

#[utoipa::path(
    get,
    path = "/v1/localization/language",
    tag = "localization",
    summary = "Supported languages",
    responses((status = 200, description = "Language codes", body = Vec<String>))
)]
pub async fn get_languages() -> Json<Vec<&'static str>> {
    Json(LANGUAGES.to_vec())
}

#[utoipa::path(
    get,
    path = "/v1/localization/locale",
    tag = "localization",
    summary = "Supported locales",
    responses((status = 200, description = "Locale codes", body = Vec<String>))
)]
pub async fn get_locales() -> Json<Vec<&'static str>> {
    Json(LOCALES.to_vec())
}

#[utoipa::path(
    get,
    path = "/v1/localization/timezone",
    tag = "localization",
    summary = "Supported timezones",
    responses((status = 200, description = "IANA timezones with their current offsets", body = Vec<TimezoneResponse>))
)]
pub async fn get_timezones() -> Json<Vec<TimezoneResponse>> {
    Json(timezones())
}

/// `GMT+2:00`, `GMT-3:30`, `GMT+0:00`.
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("GMT{sign}{}:{:02}", minutes / 60, minutes % 60)
}

fn timezone(tz: Tz) -> TimezoneResponse {
    let identifier = tz.name().to_string();
    let offset = Utc::now().with_timezone(&tz).offset().fix().local_minus_utc();

    TimezoneResponse {
        timezone: identifier.split('/').next().unwrap_or_default().to_string(),
        offset: format_offset(offset),
        value: identifier.replace('_', " "),
        identifier,
    }
}

/// Every known timezone, sorted by identifier.
pub fn timezones() -> Vec<TimezoneResponse> {
    let mut zones: Vec<_> = TZ_VARIANTS.iter().copied().map(timezone).collect();
    zones.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    zones
}
