//! REST API v1
//!
//! Endpoints, each documented on its handler:
//! - `/` ([GET](welcome))
//! - `/auth/callback` ([POST](auth::callback))
//! - `/events/{event_id}/rsvps/` ([GET](rsvps::list_rsvps), [POST](rsvps::create_rsvp))
//! - `/rsvps/{rsvp_id}` ([GET](rsvps::get_rsvp), [PUT](rsvps::update_rsvp), [DELETE](rsvps::delete_rsvp))

pub use response::{ApiResponse, DefaultApiResult};

pub mod auth;
pub mod middleware;
pub mod response;
pub mod rsvps;

use actix_web::get;
use serde::Serialize;

/// JSON Body of the response coming from the *GET* request on `/`
#[derive(Debug, Serialize)]
pub struct Welcome {
    message: &'static str,
}

/// API Endpoint *GET /*
///
/// Static service greeting, mostly useful as a liveness probe.
#[get("/")]
pub async fn welcome() -> ApiResponse<Welcome> {
    ApiResponse::new(Welcome {
        message: "Welcome to the RSVP Management Service!",
    })
}

#[cfg(test)]
mod test {
    use super::Welcome;
    use test_util::*;

    #[test]
    fn welcome_body() {
        let welcome = Welcome {
            message: "Welcome to the RSVP Management Service!",
        };

        assert_eq_json!(
            welcome,
            {
                "message": "Welcome to the RSVP Management Service!"
            }
        );
    }
}
