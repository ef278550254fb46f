//! Services wrapping the side effects of the RSVP lifecycle
//!
//! Endpoints reach the message broker and the event service only through
//! these, never through the raw channel or client.
mod event_sync;
mod notifier;

pub use event_sync::EventSync;
pub use notifier::NotificationService;
