//! HTTP client for the event service owning the events RSVPs refer to
//!
//! The event service keeps an RSVP counter per event. This client exposes the
//! two calls needed to keep that counter in sync, an authenticated read of a
//! single event and a partial update writing back just the counter.
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("given base url is not a base")]
    NotBaseUrl,
    #[error("event service responded with status {status}")]
    UpstreamStatus { status: StatusCode, body: String },
}

/// An event as returned by the event service
///
/// Only `id` and `rsvpCount` are needed here, the remaining fields are kept
/// so a record can be passed on without another fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: i64,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rsvp_count: i64,
}

/// Body of the partial event update, carrying nothing but the new counter
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CounterUpdate {
    rsvp_count: i64,
}

/// HTTP client to access the event service API
#[derive(Clone)]
pub struct EventServiceClient {
    base_url: Url,
    client: reqwest::Client,
}

impl EventServiceClient {
    /// Create a new client from all required configurations
    pub fn new(client: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::NotBaseUrl);
        }

        Ok(Self { base_url, client })
    }

    /// Fetch a single event
    ///
    /// Any non-success response is returned as [`Error::UpstreamStatus`] with
    /// the upstream status and body.
    pub async fn get_event(&self, event_id: i64, token: Option<&str>) -> Result<EventRecord> {
        let url = self.url(["events", &event_id.to_string()])?;

        let response = authorize(self.client.get(url), token).send().await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }

    /// Write back the event's RSVP counter
    ///
    /// Sends a partial update, other event fields are left untouched.
    pub async fn update_event_counter(
        &self,
        event_id: i64,
        rsvp_count: i64,
        token: Option<&str>,
    ) -> Result<()> {
        let url = self.url(["events", &event_id.to_string()])?;

        let response = authorize(self.client.put(url), token)
            .json(&CounterUpdate { rsvp_count })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// internal url builder
    fn url<I>(&self, path_segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| Error::NotBaseUrl)?
            .extend(path_segments);

        Ok(url)
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    if let Some(token) = token {
        request.header(AUTHORIZATION, format!("Bearer {token}"))
    } else {
        request
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EventServiceClient {
        let base_url = Url::parse(&server.uri()).unwrap();

        EventServiceClient::new(reqwest::Client::new(), base_url).unwrap()
    }

    #[tokio::test]
    async fn get_event_deserializes_the_counter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "organizationId": 7,
                "name": "Launch Party",
                "description": "All hands",
                "date": "2023-06-01",
                "time": "18:00",
                "location": "HQ",
                "category": "social",
                "rsvpCount": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        let event = client.get_event(42, None).await.unwrap();

        assert_eq!(event.id, 42);
        assert_eq!(event.organization_id, Some(7));
        assert_eq!(event.name, "Launch Party");
        assert_eq!(event.rsvp_count, 3);
    }

    #[tokio::test]
    async fn get_event_tolerates_sparse_records() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 5, "rsvpCount": 0 })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);

        let event = client.get_event(5, None).await.unwrap();

        assert_eq!(event.id, 5);
        assert_eq!(event.rsvp_count, 0);
        assert_eq!(event.organization_id, None);
        assert_eq!(event.name, "");
    }

    #[tokio::test]
    async fn get_event_propagates_upstream_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Event not found" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);

        let error = client.get_event(404, None).await.unwrap_err();

        match error {
            Error::UpstreamStatus { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(
                    serde_json::from_str::<serde_json::Value>(&body).unwrap(),
                    json!({ "detail": "Event not found" })
                );
            }
            other => panic!("expected UpstreamStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn counter_update_sends_a_partial_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/events/42"))
            .and(body_json(json!({ "rsvpCount": 4 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        client.update_event_counter(42, 4, None).await.unwrap();
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_given() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/1"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "rsvpCount": 0 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);

        client.get_event(1, Some("secret-token")).await.unwrap();
    }
}
