//! Error response types for the REST API
use actix_web::body::BoxBody;
use actix_web::error::JsonPayloadError;
use actix_web::http::header::{self, HeaderValue, TryIntoHeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use actix_web_httpauth::headers::www_authenticate::bearer::{Bearer, Error};
use database::DatabaseError;
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Handler installed in the actix JSON extractor config
///
/// Maps every [`JsonPayloadError`] to a `Bad Request` [`ApiError`] whose code
/// tells the caller what was wrong with the payload.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::error::Error {
    let code = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload_overflow"
        }
        JsonPayloadError::ContentType => "invalid_content_type",
        JsonPayloadError::Deserialize(_) | JsonPayloadError::Serialize(_) => "invalid_json",
        _ => "invalid_payload",
    };

    ApiError::bad_request()
        .with_code(code)
        .with_detail(err.to_string())
        .into()
}

/// JSON body of every error response, a machine readable `code` plus a
/// human readable `detail`
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: Cow<'static, str>,
    detail: Cow<'static, str>,
}

/// Failure kinds reported through the `WWW-Authenticate` bearer challenge
#[derive(Debug)]
pub enum AuthenticationError {
    InvalidAccessToken,
    AccessTokenExpired,
}

impl AuthenticationError {
    fn error(&self) -> Error {
        match self {
            Self::InvalidAccessToken | Self::AccessTokenExpired => Error::InvalidToken,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::InvalidAccessToken => "The access token is invalid",
            Self::AccessTokenExpired => "The access token has expired",
        }
    }
}

/// The common REST API error
///
/// Built via the associated functions for the HTTP error it represents. Every
/// variant carries a default code and detail which can be replaced before the
/// error is returned from a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    www_authenticate: Option<HeaderValue>,
    body: ErrorBody,
}

impl ApiError {
    fn new<T>(status: StatusCode, code: T, detail: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self {
            status,
            www_authenticate: None,
            body: ErrorBody {
                code: code.into(),
                detail: detail.into(),
            },
        }
    }

    /// Replaces the default code of the error
    pub fn with_code<T>(mut self, code: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.code = code.into();

        self
    }

    /// Replaces the default detail of the error
    pub fn with_detail<T>(mut self, detail: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        self.body.detail = detail.into();

        self
    }

    /// Adds a `WWW-Authenticate` bearer challenge to the response
    pub fn with_www_authenticate(mut self, authentication_error: AuthenticationError) -> Self {
        let header_value = Bearer::build()
            .error_description(authentication_error.message())
            .error(authentication_error.error())
            .finish()
            .try_into_value()
            .expect("bearer challenges only contain valid header characters");

        self.www_authenticate = Some(header_value);

        self
    }

    /// 400 Bad Request
    pub fn bad_request() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "The request could not be parsed",
        )
    }

    /// 401 Unauthorized
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Could not validate credentials",
        )
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "not_found",
            "The requested resource does not exist",
        )
    }

    /// 409 Conflict
    pub fn conflict() -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "conflict",
            "The request cannot be applied to the current resource state",
        )
    }

    /// 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "An internal server error occurred",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={}, code={}, detail={}",
            self.status, self.body.code, self.body.detail
        )
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let body = serde_json::to_string(&self.body).expect("error body is always serializable");

        let mut response = HttpResponse::new(self.status_code());

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/json; charset=utf-8"),
        );

        if let Some(www_authenticate) = &self.www_authenticate {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, www_authenticate.clone());
        }

        response.set_body(BoxBody::new(body))
    }
}

impl From<crate::BlockingError> for ApiError {
    fn from(e: crate::BlockingError) -> Self {
        log::error!("REST API handler failed with blocking error: {}", e);
        Self::internal()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        log::error!("REST API handler failed with internal error: {:?}", e);
        Self::internal()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(db_error: DatabaseError) -> Self {
        match db_error {
            DatabaseError::NotFound => Self::not_found(),
            DatabaseError::DieselError(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => Self::conflict(),
            e => {
                log::error!("REST API handler failed with database error: {}", e);
                Self::internal()
            }
        }
    }
}

impl From<event_client::Error> for ApiError {
    /// Forwards the status and detail of an upstream event service error
    ///
    /// Transport errors are not the callers fault and map to a 500.
    fn from(e: event_client::Error) -> Self {
        match e {
            event_client::Error::UpstreamStatus { status, body } => {
                let status =
                    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

                Self::new(status, Cow::Borrowed("upstream_error"), upstream_detail(body))
            }
            e => {
                log::error!("REST API handler failed with event service error: {}", e);
                Self::internal()
            }
        }
    }
}

/// Extract the `detail` field from an upstream JSON error body, falling
/// back to the raw body text
fn upstream_detail(body: String) -> Cow<'static, str> {
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from));

    match detail {
        Some(detail) => Cow::Owned(detail),
        None if body.is_empty() => Cow::Borrowed("The event service rejected the request"),
        None => Cow::Owned(body),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_util::*;

    #[test]
    fn api_error_with_code() {
        let error = ApiError::not_found().with_code("custom_code");

        assert_eq_json!(
            error.body,
            {
                "code": "custom_code",
                "detail": "The requested resource does not exist"
            }
        );
    }

    #[test]
    fn api_error_with_detail() {
        let error = ApiError::not_found().with_detail("RSVP not found");

        assert_eq_json!(
            error.body,
            {
                "code": "not_found",
                "detail": "RSVP not found"
            }
        );
    }

    #[test]
    fn unauthorized_default_body() {
        let error = ApiError::unauthorized();

        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);

        assert_eq_json!(
            error.body,
            {
                "code": "unauthorized",
                "detail": "Could not validate credentials"
            }
        );
    }

    #[test]
    fn upstream_error_keeps_status_and_detail() {
        let error = ApiError::from(event_client::Error::UpstreamStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            body: r#"{"detail":"Event not found"}"#.into(),
        });

        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);

        assert_eq_json!(
            error.body,
            {
                "code": "upstream_error",
                "detail": "Event not found"
            }
        );
    }

    #[test]
    fn upstream_error_with_opaque_body() {
        let error = ApiError::from(event_client::Error::UpstreamStatus {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "upstream down".into(),
        });

        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq_json!(
            error.body,
            {
                "code": "upstream_error",
                "detail": "upstream down"
            }
        );
    }
}
