//! REST endpoints for the RSVP lifecycle
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::services::{EventSync, NotificationService};
use crate::token::AccessTokenClaims;
use actix_web::web::{Data, Json, Path, Query, ReqData};
use actix_web::{delete, get, post, put};
use database::{DatabaseError, Db};
use db_storage::rsvps::{EventId, NewRsvp, Rsvp, RsvpId, UpdateRsvp};
use serde::{Deserialize, Serialize};

/// API request parameters to create or replace a RSVP
///
/// Any `event_id` sent by the client is dropped here, the event
/// association always comes from the URL path.
#[derive(Debug, Deserialize)]
pub struct RsvpPayload {
    #[serde(default)]
    pub event_name: Option<String>,
    pub name: String,
    pub email: String,
    pub status: String,
}

/// Navigational links of a [`RsvpResource`]
#[derive(Debug, Clone, Serialize)]
pub struct RsvpLinks {
    #[serde(rename = "self")]
    self_link: String,
    update: String,
    delete: String,
    event_rsvps: String,
}

/// The RSVP returned by the API endpoints, decorated with its links
#[derive(Debug, Clone, Serialize)]
pub struct RsvpResource {
    #[serde(flatten)]
    rsvp: Rsvp,
    #[serde(rename = "_links")]
    links: RsvpLinks,
}

impl From<Rsvp> for RsvpResource {
    fn from(rsvp: Rsvp) -> Self {
        let item = format!("/rsvps/{}", rsvp.id);

        let links = RsvpLinks {
            self_link: item.clone(),
            update: item.clone(),
            delete: item,
            event_rsvps: format!("/events/{}/rsvps/", rsvp.event_id),
        };

        Self { rsvp, links }
    }
}

/// Query parameters of the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Maps a missing RSVP row to the canonical 404 response
fn rsvp_not_found(e: DatabaseError) -> ApiError {
    match e {
        DatabaseError::NotFound => ApiError::not_found().with_detail("RSVP not found"),
        e => e.into(),
    }
}

/// API Endpoint *POST /events/{event_id}/rsvps/*
///
/// Persists a new RSVP for the given event and afterwards increments the
/// RSVP counter of the event service. A failing event read fails the
/// request even though the RSVP is already committed at that point.
#[post("/events/{event_id}/rsvps/")]
pub async fn create_rsvp(
    db: Data<Db>,
    event_sync: Data<EventSync>,
    notifier: Data<NotificationService>,
    current_user: ReqData<AccessTokenClaims>,
    event_id: Path<EventId>,
    payload: Json<RsvpPayload>,
) -> DefaultApiResult<RsvpResource> {
    let event_id = event_id.into_inner();
    let payload = payload.into_inner();
    let current_user = current_user.into_inner();

    let rsvp = crate::block(move || -> Result<Rsvp, ApiError> {
        let conn = db.get_conn()?;

        let new_rsvp = NewRsvp {
            event_id,
            event_name: payload.event_name.unwrap_or_default(),
            name: payload.name,
            email: payload.email,
            status: payload.status,
            user_id: Some(current_user.user_id),
        };

        Ok(new_rsvp.insert(&conn)?)
    })
    .await??;

    event_sync.record_new_rsvp(event_id).await?;

    if let Err(e) = notifier.rsvp_created(&rsvp).await {
        log::error!("Failed to publish rsvp creation, {:?}", e);
    }

    Ok(ApiResponse::created(RsvpResource::from(rsvp)))
}

/// API Endpoint *GET /events/{event_id}/rsvps/*
///
/// Returns a page of the RSVPs for the given event.
#[get("/events/{event_id}/rsvps/")]
pub async fn list_rsvps(
    db: Data<Db>,
    event_id: Path<EventId>,
    query: Query<ListQuery>,
) -> DefaultApiResult<Vec<RsvpResource>> {
    let event_id = event_id.into_inner();
    let ListQuery { skip, limit } = query.into_inner();

    let rsvps = crate::block(move || -> Result<Vec<Rsvp>, ApiError> {
        let conn = db.get_conn()?;

        Ok(Rsvp::get_for_event_paginated(&conn, event_id, skip, limit)?)
    })
    .await??;

    let resources = rsvps.into_iter().map(RsvpResource::from).collect();

    Ok(ApiResponse::new(resources))
}

/// API Endpoint *GET /rsvps/{rsvp_id}*
#[get("/rsvps/{rsvp_id}")]
pub async fn get_rsvp(db: Data<Db>, rsvp_id: Path<RsvpId>) -> DefaultApiResult<RsvpResource> {
    let rsvp_id = rsvp_id.into_inner();

    let rsvp = crate::block(move || -> Result<Rsvp, ApiError> {
        let conn = db.get_conn()?;

        Rsvp::get(&conn, rsvp_id).map_err(rsvp_not_found)
    })
    .await??;

    Ok(ApiResponse::new(RsvpResource::from(rsvp)))
}

/// API Endpoint *PUT /rsvps/{rsvp_id}*
///
/// Replaces every mutable field of the RSVP. The event and user
/// associations are kept as they were on creation.
#[put("/rsvps/{rsvp_id}")]
pub async fn update_rsvp(
    db: Data<Db>,
    notifier: Data<NotificationService>,
    rsvp_id: Path<RsvpId>,
    payload: Json<RsvpPayload>,
) -> DefaultApiResult<RsvpResource> {
    let rsvp_id = rsvp_id.into_inner();
    let payload = payload.into_inner();

    let rsvp = crate::block(move || -> Result<Rsvp, ApiError> {
        let conn = db.get_conn()?;

        let changeset = UpdateRsvp {
            event_name: payload.event_name.unwrap_or_default(),
            name: payload.name,
            email: payload.email,
            status: payload.status,
        };

        changeset.apply(&conn, rsvp_id).map_err(rsvp_not_found)
    })
    .await??;

    if let Err(e) = notifier.rsvp_updated(&rsvp).await {
        log::error!("Failed to publish rsvp update, {:?}", e);
    }

    Ok(ApiResponse::new(RsvpResource::from(rsvp)))
}

/// API Endpoint *DELETE /rsvps/{rsvp_id}*
///
/// Returns the deleted RSVP.
#[delete("/rsvps/{rsvp_id}")]
pub async fn delete_rsvp(
    db: Data<Db>,
    notifier: Data<NotificationService>,
    rsvp_id: Path<RsvpId>,
) -> DefaultApiResult<RsvpResource> {
    let rsvp_id = rsvp_id.into_inner();

    let rsvp = crate::block(move || -> Result<Rsvp, ApiError> {
        let conn = db.get_conn()?;

        Rsvp::delete_by_id(&conn, rsvp_id).map_err(rsvp_not_found)
    })
    .await??;

    if let Err(e) = notifier.rsvp_deleted(rsvp.id).await {
        log::error!("Failed to publish rsvp deletion, {:?}", e);
    }

    Ok(ApiResponse::new(RsvpResource::from(rsvp)))
}

#[cfg(test)]
mod test {
    use super::*;
    use db_storage::users::UserId;
    use pretty_assertions::assert_eq;
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
    fn link_decoration_points_at_the_canonical_paths() {
        let resource = RsvpResource::from(sample_rsvp());

        assert_eq_json!(
            resource,
            {
                "id": 5,
                "event_id": 9,
                "event_name": "Launch Party",
                "name": "Ann",
                "email": "a@x.com",
                "status": "yes",
                "user_id": null,
                "_links": {
                    "self": "/rsvps/5",
                    "update": "/rsvps/5",
                    "delete": "/rsvps/5",
                    "event_rsvps": "/events/9/rsvps/"
                }
            }
        );
    }

    #[test]
    fn link_decoration_keeps_the_user_association() {
        let mut rsvp = sample_rsvp();
        rsvp.user_id = Some(UserId::from(3));

        let resource = RsvpResource::from(rsvp);

        let serialized = serde_json::to_value(resource).unwrap();

        assert_eq!(serialized["user_id"], serde_json::json!(3));
    }

    #[test]
    fn payload_drops_a_client_supplied_event_id() {
        let payload: RsvpPayload = serde_json::from_value(serde_json::json!({
            "event_id": 1337,
            "name": "Ann",
            "email": "a@x.com",
            "status": "yes"
        }))
        .unwrap();

        assert_eq!(payload.event_name, None);
        assert_eq!(payload.name, "Ann");
        assert_eq!(payload.email, "a@x.com");
        assert_eq!(payload.status, "yes");
    }

    #[test]
    fn list_query_defaults() {
        let query: ListQuery = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 100);
    }
}
