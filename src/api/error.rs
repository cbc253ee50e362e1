//! Translates every fallible component's error into the wire-level
//! `{"message": "..."}` shape, following the catch-all `IntoResponse`
//! pattern used at the edge of the legacy warp API this crate's axum
//! router replaces.

use {
    axum::{http::StatusCode, response::IntoResponse, Json},
    serde::Serialize,
};

#[derive(Serialize)]
struct Body {
    message: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(Body {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<crate::pipeline::Error> for ApiError {
    fn from(err: crate::pipeline::Error) -> Self {
        use crate::pipeline::Error as E;
        match err {
            E::Registry(registry_err) => Self::bad_request(registry_err.to_string()),
            E::CompactId(compact_id_err) => Self::bad_request(compact_id_err.to_string()),
            E::ExpiresOrderViolation => Self::bad_request(err.to_string()),
            E::Witness(witness_err) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, witness_err.to_string()),
        }
    }
}

impl From<crate::api::quote::dto::RequestError> for ApiError {
    fn from(err: crate::api::quote::dto::RequestError) -> Self {
        Self::bad_request(err.to_string())
    }
}
