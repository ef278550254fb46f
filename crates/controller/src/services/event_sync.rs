//! EventSync
//!
//! Keeps the RSVP counter of the event owning service in step with
//! local RSVP writes.
use db_storage::rsvps::EventId;
use event_client::{EventServiceClient, Result};

/// Pushes RSVP count changes to the event service
///
/// The counter change is a read-increment-write across two services
/// without any locking, so concurrent RSVP creates for the same event
/// can lose increments. Closing that gap needs the event service to own
/// the increment itself, which is why the whole exchange is bundled
/// behind this type instead of being inlined into the endpoint.
#[derive(Clone)]
pub struct EventSync {
    client: EventServiceClient,
    token: Option<String>,
}

impl EventSync {
    pub fn new(client: EventServiceClient, token: Option<String>) -> Self {
        Self { client, token }
    }

    /// Bump the RSVP counter of the given event by one
    ///
    /// A failing read is returned to the caller. A failing write is
    /// only logged, the RSVP itself is already committed at this point.
    #[tracing::instrument(err, skip(self))]
    pub async fn record_new_rsvp(&self, event_id: EventId) -> Result<()> {
        let event = self
            .client
            .get_event(event_id.into_inner(), self.token.as_deref())
            .await?;

        let rsvp_count = event.rsvp_count + 1;

        if let Err(e) = self
            .client
            .update_event_counter(event.id, rsvp_count, self.token.as_deref())
            .await
        {
            log::error!("Failed to update rsvp count of event {}, {}", event.id, e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sync_for(server: &MockServer) -> EventSync {
        let base_url = server
            .uri()
            .parse()
            .expect("mock server uri must be a valid url");
        let client = EventServiceClient::new(reqwest::Client::new(), base_url).unwrap();

        EventSync::new(client, None)
    }

    #[tokio::test]
    async fn counter_is_read_incremented_and_written_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "name": "Launch Party",
                "rsvpCount": 3
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/events/7"))
            .and(body_json(serde_json::json!({ "rsvpCount": 4 })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        sync_for(&server)
            .record_new_rsvp(EventId::from(7))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn a_failing_event_read_is_returned() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/7"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Event not found"
            })))
            .mount(&server)
            .await;

        let result = sync_for(&server).record_new_rsvp(EventId::from(7)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn a_failing_counter_write_is_tolerated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "name": "Launch Party",
                "rsvpCount": 3
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/events/7"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        sync_for(&server)
            .record_new_rsvp(EventId::from(7))
            .await
            .expect("a failed counter write must not fail the operation");
    }
}
