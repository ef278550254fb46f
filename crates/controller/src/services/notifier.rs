//! NotificationService
//!
//! Fire-and-forget publishing of RSVP lifecycle events for downstream
//! consumers.
use crate::settings::SharedSettings;
use anyhow::{Context, Result};
use db_storage::rsvps::{EventId, Rsvp, RsvpId};
use serde::Serialize;

/// An RSVP lifecycle event as it is put on the queue
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum RsvpEvent<'a> {
    Create { rsvp: &'a Rsvp, event_id: EventId },
    Update { rsvp: &'a Rsvp },
    Delete { rsvp_id: RsvpId },
}

/// Publishes RSVP lifecycle events to the configured queue
///
/// Publishing is best-effort. Callers log a failed publish and carry on,
/// a broker outage must never fail an already finished CRUD operation.
#[derive(Clone)]
pub struct NotificationService {
    settings: SharedSettings,
    rabbit_mq_channel: lapin::Channel,
}

impl NotificationService {
    pub fn new(settings: SharedSettings, rabbit_mq_channel: lapin::Channel) -> Self {
        Self {
            settings,
            rabbit_mq_channel,
        }
    }

    /// Publish a `create` event for the given RSVP
    pub async fn rsvp_created(&self, rsvp: &Rsvp) -> Result<()> {
        self.send_to_rabbitmq(RsvpEvent::Create {
            rsvp,
            event_id: rsvp.event_id,
        })
        .await
    }

    /// Publish an `update` event for the given RSVP
    pub async fn rsvp_updated(&self, rsvp: &Rsvp) -> Result<()> {
        self.send_to_rabbitmq(RsvpEvent::Update { rsvp }).await
    }

    /// Publish a `delete` event for the given RSVP id
    pub async fn rsvp_deleted(&self, rsvp_id: RsvpId) -> Result<()> {
        self.send_to_rabbitmq(RsvpEvent::Delete { rsvp_id }).await
    }

    async fn send_to_rabbitmq(&self, event: RsvpEvent<'_>) -> Result<()> {
        // The queue name may be changed by a reload, read it per publish
        let queue_name = self.settings.load().rabbit_mq.queue.clone();

        self.rabbit_mq_channel
            .basic_publish(
                "",
                &queue_name,
                Default::default(),
                &serde_json::to_vec(&event).context("Failed to serialize rsvp event")?,
                Default::default(),
            )
            .await
            .context("Failed to publish rsvp event")?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_util::*;

    fn sample_rsvp() -> Rsvp {
        Rsvp {
            id: RsvpId::from(5),
            event_id: EventId::from(9),
            event_name: "Launch Party".into(),
            name: "Ann".into(),
            email: "a@x.com".into(),
            status: "yes".into(),
            user_id: None,
        }
    }

    #[test]
    fn create_event_wire_shape() {
        let rsvp = sample_rsvp();

        assert_eq_json!(
            RsvpEvent::Create {
                rsvp: &rsvp,
                event_id: rsvp.event_id,
            },
            {
                "action": "create",
                "rsvp": {
                    "id": 5,
                    "event_id": 9,
                    "event_name": "Launch Party",
                    "name": "Ann",
                    "email": "a@x.com",
                    "status": "yes",
                    "user_id": null
                },
                "event_id": 9
            }
        );
    }

    #[test]
    fn update_event_wire_shape() {
        let rsvp = sample_rsvp();

        assert_eq_json!(
            RsvpEvent::Update { rsvp: &rsvp },
            {
                "action": "update",
                "rsvp": {
                    "id": 5,
                    "event_id": 9,
                    "event_name": "Launch Party",
                    "name": "Ann",
                    "email": "a@x.com",
                    "status": "yes",
                    "user_id": null
                }
            }
        );
    }

    #[test]
    fn delete_event_wire_shape() {
        assert_eq_json!(
            RsvpEvent::Delete {
                rsvp_id: RsvpId::from(5),
            },
            {
                "action": "delete",
                "rsvp_id": 5
            }
        );
    }
}
