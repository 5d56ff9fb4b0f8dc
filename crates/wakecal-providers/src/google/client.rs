//! Google Calendar API client.
//!
//! Issues one `events.list` request per poll and turns the response into an
//! [`EventBatch`]. Item-level problems (missing summary, unparseable start)
//! are logged and defaulted; only transport failures, error payloads and
//! non-JSON bodies fail the fetch.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};
use wakecal_core::{CalendarEvent, EventBatch, EventTime, TimeWindow, parse_timestamp};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::http::{HttpClient, HttpRequest};

use super::config::GoogleConfig;

/// Fetches a time-windowed slice of one calendar.
pub struct CalendarFetcher {
    http: Arc<dyn HttpClient>,
    api_base: String,
}

impl fmt::Debug for CalendarFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarFetcher")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl CalendarFetcher {
    /// Creates a fetcher against the given API base URL.
    pub fn new(http: Arc<dyn HttpClient>, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a fetcher using the base URL from `config`.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &GoogleConfig) -> Self {
        Self::new(http, config.api_base.as_str())
    }

    /// Lists up to `max_events` events starting inside `window`.
    ///
    /// Events come back in the server's `startTime` order and are not
    /// re-sorted.
    pub async fn fetch(
        &self,
        calendar_id: &str,
        max_events: usize,
        window: &TimeWindow,
        access_token: &str,
    ) -> ProviderResult<EventBatch> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        );
        debug!(
            calendar_id,
            time_min = %window.query_min(),
            time_max = %window.query_max(),
            "fetching calendar events"
        );

        let request = HttpRequest::get(url)
            .with_query("maxResults", max_events.to_string())
            .with_query("timeMin", window.query_min())
            .with_query("timeMax", window.query_max())
            .with_query("orderBy", "startTime")
            .with_query("singleEvents", "true")
            .with_bearer(access_token);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|e| e.at_endpoint("calendar"))?;

        let batch = parse_event_list(response.status, &response.body)
            .map_err(|e| e.at_endpoint("calendar"))?;

        debug!(count = batch.len(), "number of events");
        for event in &batch.events {
            debug!(summary = %event.summary, start = ?event.start, "event");
        }
        Ok(batch)
    }
}

/// Parses an `events.list` body.
///
/// A body carrying an `error` object fails regardless of `status`; the code
/// is classified from `error.code`, falling back to the HTTP status.
pub fn parse_event_list(status: u16, body: &str) -> ProviderResult<EventBatch> {
    let response: EventListResponse = serde_json::from_str(body).map_err(|e| {
        if (200..300).contains(&status) {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        } else {
            ProviderError::from_status(status, format!("API error ({}): {}", status, body))
        }
    })?;

    if let Some(error) = response.error {
        return Err(api_error(status, &error));
    }

    if !(200..300).contains(&status) {
        return Err(ProviderError::from_status(
            status,
            format!("API error ({})", status),
        ));
    }

    let events = response
        .items
        .unwrap_or_default()
        .into_iter()
        .map(convert_event)
        .collect();
    Ok(EventBatch::new(events))
}

fn api_error(status: u16, error: &serde_json::Value) -> ProviderError {
    let code = error
        .get("code")
        .and_then(serde_json::Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
        .unwrap_or(status);
    let message = error
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());

    let code = if (200..300).contains(&code) {
        ProviderErrorCode::ApiError
    } else {
        ProviderErrorCode::from_status(code)
    };
    ProviderError::new(code, message)
}

fn convert_event(event: ApiEvent) -> CalendarEvent {
    let summary = event.summary.unwrap_or_default();
    let start = event.start.and_then(|start| parse_start(&summary, start));
    CalendarEvent::new(summary, start)
}

fn parse_start(summary: &str, start: ApiEventTime) -> Option<EventTime> {
    match (start.date_time, start.date) {
        (Some(dt), _) => match parse_timestamp(&dt) {
            Some(parsed) => Some(EventTime::from_utc(parsed)),
            None => {
                warn!(summary, value = %dt, "failed to parse start time");
                None
            }
        },
        (None, Some(date)) => match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(parsed) => Some(EventTime::from_date(parsed)),
            Err(e) => {
                warn!(summary, value = %date, "failed to parse start date: {}", e);
                None
            }
        },
        (None, None) => {
            warn!(summary, "event has no start time");
            None
        }
    }
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<ApiEvent>>,
    error: Option<serde_json::Value>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
struct ApiEvent {
    summary: Option<String>,
    start: Option<ApiEventTime>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::testing::ScriptedHttpClient;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::next_day(utc(2024, 3, 1, 7, 0))
    }

    #[tokio::test]
    async fn builds_events_list_request() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_ok(r#"{"items": []}"#);
        let fetcher = CalendarFetcher::new(http.clone(), "https://api.test/calendar/v3/");

        fetcher
            .fetch("someone@example.com", 5, &window(), "at-1")
            .await
            .unwrap();

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://api.test/calendar/v3/calendars/someone%40example.com/events"
        );
        assert_eq!(request.bearer.as_deref(), Some("at-1"));
        assert_eq!(request.query_value("maxResults"), Some("5"));
        assert_eq!(request.query_value("timeMin"), Some("2024-03-01T07:00:00Z"));
        assert_eq!(request.query_value("timeMax"), Some("2024-03-02T07:00:00Z"));
        assert_eq!(request.query_value("orderBy"), Some("startTime"));
        assert_eq!(request.query_value("singleEvents"), Some("true"));
    }

    #[tokio::test]
    async fn preserves_response_order() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_ok(
            r#"{"items": [
                {"summary": "Second by time", "start": {"dateTime": "2024-03-01T11:00:00Z"}},
                {"summary": "First by time", "start": {"dateTime": "2024-03-01T09:00:00Z"}},
                {"summary": "Offset", "start": {"dateTime": "2024-03-01T09:30:00-05:00"}}
            ]}"#,
        );
        let fetcher = CalendarFetcher::new(http, "https://api.test");

        let batch = fetcher.fetch("primary", 5, &window(), "at").await.unwrap();
        let summaries: Vec<_> = batch.events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Second by time", "First by time", "Offset"]);
        assert_eq!(batch.first_start_time, Some(utc(2024, 3, 1, 11, 0)));
        assert_eq!(batch.events[2].start_time(), Some(utc(2024, 3, 1, 14, 30)));
    }

    #[tokio::test]
    async fn error_payload_fails_fetch() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push(HttpResponse::new(
            401,
            r#"{"error": {"code": 401, "message": "Invalid Credentials"}}"#,
        ));
        let fetcher = CalendarFetcher::new(http, "https://api.test");

        let err = fetcher
            .fetch("primary", 5, &window(), "stale")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert_eq!(err.message(), "Invalid Credentials");
        assert_eq!(err.endpoint(), Some("calendar"));
    }

    #[tokio::test]
    async fn transport_error_is_propagated() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_err(ProviderError::network("request timeout"));
        let fetcher = CalendarFetcher::new(http, "https://api.test");

        let err = fetcher
            .fetch("primary", 5, &window(), "at")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    mod parsing {
        use super::*;

        #[test]
        fn empty_and_missing_items() {
            let batch = parse_event_list(200, r#"{"items": []}"#).unwrap();
            assert!(batch.is_empty());
            assert_eq!(batch.first_start_time, None);

            let batch = parse_event_list(200, r#"{"kind": "calendar#events"}"#).unwrap();
            assert!(batch.is_empty());
        }

        #[test]
        fn defaults_missing_fields() {
            let batch = parse_event_list(
                200,
                r#"{"items": [
                    {"start": {"dateTime": "2024-03-01T09:00:00Z"}},
                    {"summary": "No start"},
                    {"summary": "Bad start", "start": {"dateTime": "tomorrow"}},
                    {"summary": "Holiday", "start": {"date": "2024-03-01"}}
                ]}"#,
            )
            .unwrap();

            assert_eq!(batch.len(), 4);
            assert_eq!(batch.events[0].summary, "");
            assert_eq!(batch.events[0].start_time(), Some(utc(2024, 3, 1, 9, 0)));
            assert_eq!(batch.events[1].start, None);
            assert_eq!(batch.events[2].start, None);
            assert_eq!(
                batch.events[3].start,
                Some(EventTime::from_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
            );
        }

        #[test]
        fn all_day_first_event_has_no_first_start() {
            let batch = parse_event_list(
                200,
                r#"{"items": [
                    {"summary": "Holiday", "start": {"date": "2024-03-01"}},
                    {"summary": "Standup", "start": {"dateTime": "2024-03-01T09:00:00Z"}}
                ]}"#,
            )
            .unwrap();
            assert_eq!(batch.first_start_time, None);
        }

        #[test]
        fn error_codes_are_classified() {
            let err = parse_event_list(
                429,
                r#"{"error": {"code": 429, "message": "Rate Limit Exceeded"}}"#,
            )
            .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::RateLimited);
            assert!(err.is_retryable());

            let err =
                parse_event_list(503, r#"{"error": {"code": 503, "message": "Backend Error"}}"#)
                    .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ServerError);

            let err = parse_event_list(404, r#"{"error": {"code": 404, "message": "Not Found"}}"#)
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ApiError);
            assert!(!err.is_retryable());
        }

        #[test]
        fn error_without_code_uses_status() {
            let err = parse_event_list(500, r#"{"error": "backendError"}"#).unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ServerError);

            let err = parse_event_list(200, r#"{"error": "weird"}"#).unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ApiError);
        }

        #[test]
        fn non_json_bodies() {
            let err = parse_event_list(200, "<html></html>").unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);

            let err = parse_event_list(502, "Bad Gateway").unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ServerError);
        }

        #[test]
        fn error_status_without_error_object() {
            let err = parse_event_list(403, "{}").unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ApiError);
        }
    }
}
