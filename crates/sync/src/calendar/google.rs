// Google Calendar REST client for the user's primary calendar.

use std::time::Duration;

use async_trait::async_trait;
use lexflow_common::calendar::{EventPayload, Reminders};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use super::{CalendarApi, CalendarError};

#[derive(Debug, Serialize)]
struct NewEvent<'a> {
    #[serde(flatten)]
    event: &'a EventPayload,
    reminders: Reminders,
}

#[derive(Debug, Deserialize)]
struct EventResource {
    id: String,
}

#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http: Client,
    events_url: String,
}

impl GoogleCalendarClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_base: &str) -> Result<Self, CalendarError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("lexflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| CalendarError::Transport(error.to_string()))?;
        let events_url = format!("{}/calendars/primary/events", api_base.trim_end_matches('/'));
        Ok(Self { http, events_url })
    }

    fn event_url(&self, event_id: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(event_id.as_bytes()).collect();
        format!("{}/{encoded}", self.events_url)
    }

    async fn send(&self, token: &str, request: RequestBuilder) -> Result<Response, CalendarError> {
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|error| CalendarError::Transport(error.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(CalendarError::Unauthorized),
            status => {
                let body = response.json::<Value>().await.unwrap_or_default();
                let message = body
                    .pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Calendar API error: {}", status.as_u16()));
                Err(CalendarError::Http { status: status.as_u16(), message })
            }
        }
    }

    async fn event_id(response: Response) -> Result<String, CalendarError> {
        response
            .json::<EventResource>()
            .await
            .map(|resource| resource.id)
            .map_err(|error| CalendarError::Decode(error.to_string()))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn create_event(&self, token: &str, event: &EventPayload) -> Result<String, CalendarError> {
        let body = NewEvent { event, reminders: Reminders::default() };
        let response = self.send(token, self.http.post(&self.events_url).json(&body)).await?;
        let id = Self::event_id(response).await?;
        debug!(event_id = %id, date = %event.start.date, "calendar event created");
        Ok(id)
    }

    async fn update_event(
        &self,
        token: &str,
        event_id: &str,
        event: &EventPayload,
    ) -> Result<String, CalendarError> {
        let response = self.send(token, self.http.patch(self.event_url(event_id)).json(event)).await?;
        let id = Self::event_id(response).await?;
        debug!(event_id = %id, date = %event.start.date, "calendar event updated");
        Ok(id)
    }

    async fn delete_event(&self, token: &str, event_id: &str) -> Result<(), CalendarError> {
        match self.send(token, self.http.delete(self.event_url(event_id))).await {
            Ok(_) => {
                debug!(event_id, "calendar event deleted");
                Ok(())
            }
            Err(CalendarError::Http { status: 404 | 410, .. }) => {
                debug!(event_id, "calendar event already gone");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use lexflow_common::calendar::EventDate;
    use serde_json::json;

    use super::*;

    fn payload() -> EventPayload {
        EventPayload {
            summary: "⚖️ Hearing: Rao".into(),
            description: "Case No: 1".into(),
            start: EventDate { date: "2024-03-15".into() },
            end: EventDate { date: "2024-03-16".into() },
            color_id: "9".into(),
        }
    }

    #[test]
    fn created_events_carry_fixed_reminders() {
        let event = payload();
        let body = serde_json::to_value(NewEvent { event: &event, reminders: Reminders::default() })
            .expect("body serializes");
        assert_eq!(body["colorId"], json!("9"));
        assert_eq!(body["start"], json!({ "date": "2024-03-15" }));
        assert_eq!(body["reminders"]["overrides"][0]["minutes"], json!(1440));
        assert_eq!(body["reminders"]["overrides"][1]["minutes"], json!(60));
    }

    #[test]
    fn event_urls_target_the_primary_calendar() {
        let client = GoogleCalendarClient::new("http://127.0.0.1:9/v3/").expect("client builds");
        assert_eq!(client.events_url, "http://127.0.0.1:9/v3/calendars/primary/events");
        assert_eq!(client.event_url("e9k2"), "http://127.0.0.1:9/v3/calendars/primary/events/e9k2");
        assert!(!client.event_url("a/b").ends_with("a/b"));
    }
}
