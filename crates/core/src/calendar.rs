//! Calendar event filtering and curation.
//!
//! The HTTP fetch lives in the API crate; this module owns the pure
//! rules: which of today's events are still relevant, which one leads
//! on the overlay band, and how times are displayed. Events carry
//! their own UTC offset so wall-clock formatting stays in the device's
//! zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A calendar event, already normalized from the provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub all_day: bool,
}

/// Start of today and tomorrow in the device timezone, as UTC instants.
pub fn today_bounds(tz: Tz, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = now.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
    let start = tz
        .from_local_datetime(&local_midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local_midnight));
    let start = start.with_timezone(&Utc);
    (start, start + Duration::hours(24))
}

/// Keep only events relevant to today and sort them by start time.
///
/// All-day events stay if they overlap today; timed events stay if
/// they have not ended yet.
pub fn filter_today(
    events: Vec<Event>,
    today_start: DateTime<Utc>,
    tomorrow_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<Event> {
    let mut filtered: Vec<Event> = events
        .into_iter()
        .filter(|ev| {
            if ev.all_day {
                ev.start.with_timezone(&Utc) < tomorrow_start
                    && ev.end.with_timezone(&Utc) > today_start
            } else {
                ev.end.with_timezone(&Utc) > now
            }
        })
        .collect();
    filtered.sort_by_key(|ev| ev.start.with_timezone(&Utc));
    filtered
}

/// The closest upcoming (or ongoing) event.
pub fn next_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    events
        .iter()
        .find(|ev| ev.all_day || ev.end.with_timezone(&Utc) > now)
}

/// Curate the event list for a layout slot of `max` entries.
///
/// When only a single event fits, timed events win over all-day
/// events; an all-day event shows only if no timed event exists.
pub fn curate(events: &[Event], max: usize) -> Vec<Event> {
    if max <= 1 {
        if events.is_empty() {
            return Vec::new();
        }
        if let Some(timed) = events.iter().find(|ev| !ev.all_day) {
            return vec![timed.clone()];
        }
        return vec![events[0].clone()];
    }
    events.iter().take(max).cloned().collect()
}

/// Display string for an event's time column.
pub fn format_event_time(ev: &Event) -> String {
    if ev.all_day {
        "All day".to_string()
    } else {
        ev.start.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn timed(summary: &str, start: &str, end: &str) -> Event {
        Event {
            summary: summary.to_string(),
            start: at(start),
            end: at(end),
            all_day: false,
        }
    }

    fn all_day(summary: &str, start: &str, end: &str) -> Event {
        Event {
            summary: summary.to_string(),
            start: at(start),
            end: at(end),
            all_day: true,
        }
    }

    #[test]
    fn test_today_bounds_in_device_zone() {
        let now = "2025-06-01T18:30:00Z".parse::<DateTime<Utc>>().unwrap();
        // 18:30 UTC is already June 2nd in Taipei (UTC+8).
        let (start, end) = today_bounds(chrono_tz::Asia::Taipei, now);
        assert_eq!(start.to_rfc3339(), "2025-06-01T16:00:00+00:00");
        assert_eq!(end - start, Duration::hours(24));
    }

    #[test]
    fn test_filter_drops_ended_timed_events() {
        let now = "2025-06-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, end) = today_bounds(chrono_tz::UTC, now);
        let events = vec![
            timed("past", "2025-06-01T08:00:00Z", "2025-06-01T09:00:00Z"),
            timed("ongoing", "2025-06-01T11:00:00Z", "2025-06-01T13:00:00Z"),
            timed("later", "2025-06-01T15:00:00Z", "2025-06-01T16:00:00Z"),
        ];
        let kept = filter_today(events, start, end, now);
        let names: Vec<_> = kept.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(names, ["ongoing", "later"]);
    }

    #[test]
    fn test_filter_keeps_all_day_overlapping_today() {
        let now = "2025-06-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, end) = today_bounds(chrono_tz::UTC, now);
        let events = vec![
            all_day("today", "2025-06-01T00:00:00Z", "2025-06-02T00:00:00Z"),
            all_day("yesterday", "2025-05-31T00:00:00Z", "2025-06-01T00:00:00Z"),
            all_day("tomorrow", "2025-06-02T00:00:00Z", "2025-06-03T00:00:00Z"),
        ];
        let kept = filter_today(events, start, end, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].summary, "today");
    }

    #[test]
    fn test_filter_sorts_by_start() {
        let now = "2025-06-01T06:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (start, end) = today_bounds(chrono_tz::UTC, now);
        let events = vec![
            timed("b", "2025-06-01T14:00:00Z", "2025-06-01T15:00:00Z"),
            timed("a", "2025-06-01T09:00:00Z", "2025-06-01T10:00:00Z"),
        ];
        let kept = filter_today(events, start, end, now);
        assert_eq!(kept[0].summary, "a");
    }

    #[test]
    fn test_curate_prefers_timed_over_all_day() {
        let events = vec![
            all_day("holiday", "2025-06-01T00:00:00Z", "2025-06-02T00:00:00Z"),
            timed("standup", "2025-06-01T09:00:00Z", "2025-06-01T09:15:00Z"),
        ];
        let curated = curate(&events, 1);
        assert_eq!(curated.len(), 1);
        assert_eq!(curated[0].summary, "standup");
    }

    #[test]
    fn test_curate_falls_back_to_all_day() {
        let events = vec![all_day(
            "holiday",
            "2025-06-01T00:00:00Z",
            "2025-06-02T00:00:00Z",
        )];
        let curated = curate(&events, 1);
        assert_eq!(curated[0].summary, "holiday");
    }

    #[test]
    fn test_curate_truncates_to_max() {
        let events: Vec<Event> = (0..5)
            .map(|i| {
                timed(
                    &format!("e{i}"),
                    "2025-06-01T09:00:00Z",
                    "2025-06-01T10:00:00Z",
                )
            })
            .collect();
        assert_eq!(curate(&events, 3).len(), 3);
        assert_eq!(curate(&events, 8).len(), 5);
    }

    #[test]
    fn test_format_event_time_uses_event_local_wall_clock() {
        let ev = timed("x", "2025-06-01T09:30:00+08:00", "2025-06-01T10:00:00+08:00");
        assert_eq!(format_event_time(&ev), "09:30");
        let ad = all_day("y", "2025-06-01T00:00:00Z", "2025-06-02T00:00:00Z");
        assert_eq!(format_event_time(&ad), "All day");
    }

    #[test]
    fn test_next_event_skips_finished() {
        let now = "2025-06-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let events = vec![
            timed("done", "2025-06-01T08:00:00Z", "2025-06-01T09:00:00Z"),
            timed("next", "2025-06-01T15:00:00Z", "2025-06-01T16:00:00Z"),
        ];
        assert_eq!(next_event(&events, now).unwrap().summary, "next");
    }
}
