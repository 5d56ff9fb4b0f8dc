//! `wakecal fetch`: one poll, printed.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use wakecal_core::{
    EventBatch, TimeWindow, WakeupPlanner, format_event_start, format_event_time, format_header,
    to_display, wrap_lines,
};
use wakecal_device::{Clock, DeviceConfig, DeviceError, SystemClock};
use wakecal_providers::google::CalendarFetcher;

use crate::config::ClientConfig;
use crate::error::ClientResult;

const TIME_COLUMN: usize = 9;

/// Fetches the next day of events and prints them with the planned wake-up.
pub async fn fetch(config: &ClientConfig) -> ClientResult<()> {
    let device = config.device_config()?;
    let google = config.google_config()?;
    let (auth, fetcher) = super::connect(&google).await?;

    let now = SystemClock::new().now().map_err(DeviceError::from)?;
    let report = fetch_report(&fetcher, auth.access_token(), &device, now).await?;
    print!("{}", report);
    Ok(())
}

/// Queries the window starting at `now` and renders the result.
pub async fn fetch_report(
    fetcher: &CalendarFetcher,
    access_token: &str,
    device: &DeviceConfig,
    now: DateTime<Utc>,
) -> ClientResult<String> {
    let window = TimeWindow::next_day(now);
    let batch = fetcher
        .fetch(&device.calendar_id, device.max_events, &window, access_token)
        .await
        .map_err(DeviceError::api)?;

    let wakeup = WakeupPlanner::with_lead(device.wakeup_lead).plan(batch.first_start_time);
    Ok(render_report(&window, &batch, wakeup, device))
}

fn render_report(
    window: &TimeWindow,
    batch: &EventBatch,
    wakeup: Option<DateTime<Utc>>,
    device: &DeviceConfig,
) -> String {
    let offset = &device.utc_offset;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({} event(s) in the next 24h)",
        format_header(&to_display(window.start, offset)),
        batch.len()
    );

    for event in &batch.events {
        let time = format_event_start(event.start.as_ref(), offset);
        let mut lines = wrap_lines(&event.summary, device.title_width).into_iter();
        let first = lines.next().unwrap_or_default();
        let _ = writeln!(out, "  {:<width$}{}", time, first, width = TIME_COLUMN);
        for line in lines {
            let _ = writeln!(out, "  {:<width$}{}", "", line, width = TIME_COLUMN);
        }
    }

    match wakeup {
        Some(at) => {
            let local = to_display(at, offset);
            let _ = writeln!(
                out,
                "wake-up: {} {}",
                format_header(&local),
                format_event_time(&local)
            );
        }
        None => {
            let _ = writeln!(out, "wake-up: none (no timed event ahead)");
        }
    }

    out.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::TimeZone;
    use wakecal_providers::testing::ScriptedHttpClient;

    const BODY: &str = r#"{
        "items": [
            {"summary": "Flight to Lisbon", "start": {"dateTime": "2024-03-01T09:00:00Z"}},
            {"summary": "Design review for the new onboarding flow with the mobile team and everyone else", "start": {"dateTime": "2024-03-01T13:05:00Z"}},
            {"summary": "Company holiday", "start": {"date": "2024-03-02"}}
        ]
    }"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn report_lists_events_and_wakeup() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_ok(BODY);
        let fetcher = CalendarFetcher::new(http.clone(), "https://api.test");

        let report = fetch_report(&fetcher, "token", &DeviceConfig::default(), now())
            .await
            .unwrap();

        insta::assert_snapshot!(report, @r"
        Friday Mar. 01, 2024 (3 event(s) in the next 24h)
          9:00am   Flight to Lisbon
          1:05pm   Design review for the new
                   onboarding flow with the
                   mobile team and everyone
                   else
          All day  Company holiday
        wake-up: Friday Mar. 01, 2024 8:00am
        ");
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn report_without_events() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_ok(r#"{"items": []}"#);
        let fetcher = CalendarFetcher::new(http, "https://api.test");

        let report = fetch_report(&fetcher, "token", &DeviceConfig::default(), now())
            .await
            .unwrap();

        insta::assert_snapshot!(report, @r"
        Friday Mar. 01, 2024 (0 event(s) in the next 24h)
        wake-up: none (no timed event ahead)
        ");
    }

    #[tokio::test]
    async fn api_error_is_reported() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push(wakecal_providers::HttpResponse::new(
            401,
            r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#,
        ));
        let fetcher = CalendarFetcher::new(http, "https://api.test");

        let err = fetch_report(&fetcher, "stale", &DeviceConfig::default(), now())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid Credentials"));
    }
}
