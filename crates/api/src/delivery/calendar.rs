//! Google Calendar events client.
//!
//! Fetches today's events (in the device timezone) for one calendar.
//! The OAuth credential is managed by the external token store; this
//! client just reads the current access token from settings. Missing
//! or insufficient credentials degrade to an empty list so rendering
//! continues without the calendar block.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use framecast_core::calendar::{filter_today, today_bounds, Event};
use framecast_core::error::CoreError;
use framecast_db::repositories::SettingRepo;
use framecast_db::DbPool;
use serde::Deserialize;

const CALENDAR_URL: &str = "https://www.googleapis.com/calendar/v3";
const CALENDAR_TIMEOUT_SECS: u64 = 10;

/// Settings key holding the current OAuth access token, refreshed by
/// the external token store.
const ACCESS_TOKEN_KEY: &str = "google_calendar_access_token";

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    start: RawEventTime,
    #[serde(default)]
    end: RawEventTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventTime {
    /// RFC 3339 for timed events.
    #[serde(default)]
    date_time: String,
    /// `YYYY-MM-DD` for all-day events.
    #[serde(default)]
    date: String,
}

#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(CALENDAR_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: CALENDAR_URL.to_string(),
        }
    }

    /// Point at a different endpoint (tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Today's still-relevant events for `calendar_id`, evaluated in
    /// the given IANA timezone (UTC when empty/unknown).
    ///
    /// Degrades to an empty list when no credential is stored or the
    /// provider answers 401/403.
    pub async fn today_events(
        &self,
        pool: &DbPool,
        calendar_id: &str,
        timezone: &str,
    ) -> Result<Vec<Event>, CoreError> {
        let token = SettingRepo::get(pool, ACCESS_TOKEN_KEY)
            .await
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::debug!("No calendar credential stored, skipping events");
            return Ok(Vec::new());
        };

        let calendar_id = if calendar_id.is_empty() {
            "primary"
        } else {
            calendar_id
        };
        let tz: Tz = timezone.parse().unwrap_or(chrono_tz::UTC);
        let now = Utc::now();
        let (today_start, tomorrow_start) = today_bounds(tz, now);

        let url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults=10",
            self.base_url,
            urlencode(calendar_id),
            urlencode(&today_start.to_rfc3339()),
            urlencode(&tomorrow_start.to_rfc3339()),
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| CoreError::Upstream {
                status: 0,
                message: format!("calendar request failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            // calendar_not_authorized: degrade, don't fail the render.
            tracing::warn!(status = status.as_u16(), "Calendar not authorized");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message: "calendar api error".to_string(),
            });
        }

        let body: EventsResponse = response.json().await.map_err(|e| CoreError::Upstream {
            status: status.as_u16(),
            message: format!("failed to decode calendar response: {e}"),
        })?;

        let events = parse_events(body.items, tz);
        Ok(filter_today(events, today_start, tomorrow_start, now))
    }
}

/// Normalize raw API items into [`Event`]s. All-day dates are parsed
/// as midnight in the device zone so day-overlap checks line up.
fn parse_events(items: Vec<RawEvent>, tz: Tz) -> Vec<Event> {
    items
        .into_iter()
        .filter_map(|item| {
            let (start, all_day) = parse_time(&item.start, tz)?;
            let (end, _) = parse_time(&item.end, tz)?;
            Some(Event {
                summary: item.summary,
                start,
                end,
                all_day,
            })
        })
        .collect()
}

fn parse_time(raw: &RawEventTime, tz: Tz) -> Option<(chrono::DateTime<chrono::FixedOffset>, bool)> {
    if !raw.date_time.is_empty() {
        let parsed = DateTime::parse_from_rfc3339(&raw.date_time).ok()?;
        return Some((parsed, false));
    }
    if !raw.date.is_empty() {
        let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").ok()?;
        let midnight = date.and_time(NaiveTime::MIN);
        let local = tz
            .from_local_datetime(&midnight)
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight));
        return Some((local.fixed_offset(), true));
    }
    None
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
