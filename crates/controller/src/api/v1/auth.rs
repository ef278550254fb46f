//! Login callback endpoint issuing the access tokens of this service
use crate::api::v1::response::{ApiError, ApiResponse, DefaultApiResult};
use crate::token::TokenService;
use actix_web::post;
use actix_web::web::{Data, Json};
use database::Db;
use db_storage::users::{NewUser, User};
use serde::{Deserialize, Serialize};

/// The JSON Body expected when making a *POST* request on `/auth/callback`
///
/// Carries the identity assertion obtained from the external login flow.
#[derive(Debug, Deserialize)]
pub struct AuthCallback {
    email: String,
    id: i64,
}

/// JSON Body of the response coming from the *POST* request on `/auth/callback`
#[derive(Debug, Serialize)]
pub struct AuthCallbackResponse {
    access_token: String,
    token_type: &'static str,
}

/// API Endpoint *POST /auth/callback*
///
/// Upserts the user record for the asserted email address and returns a
/// fresh access token for it.
#[post("/auth/callback")]
pub async fn callback(
    db: Data<Db>,
    token_service: Data<TokenService>,
    body: Json<AuthCallback>,
) -> DefaultApiResult<AuthCallbackResponse> {
    let AuthCallback { email, id } = body.into_inner();

    log::debug!("auth callback for external account {}", id);

    let user = crate::block(move || -> Result<User, ApiError> {
        let conn = db.get_conn()?;

        // The external assertion carries no display name
        let name = email.split('@').next().unwrap_or_default().to_string();

        let new_user = NewUser { name, email };

        Ok(new_user.upsert_by_email(&conn)?)
    })
    .await??;

    let access_token = token_service.issue(&user.email, user.id)?;

    Ok(ApiResponse::new(AuthCallbackResponse {
        access_token,
        token_type: "bearer",
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_util::*;

    #[test]
    fn callback_response_body() {
        let response = AuthCallbackResponse {
            access_token: "header.payload.signature".into(),
            token_type: "bearer",
        };

        assert_eq_json!(
            response,
            {
                "access_token": "header.payload.signature",
                "token_type": "bearer"
            }
        );
    }
}
