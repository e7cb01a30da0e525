//! HTTP routes
//!
//! - `GET /?cott=<token>` validates one token and answers with the status
//!   code of the outcome
//! - `GET /healthcheck` reports that the server is up
//!
//! `HEAD` is answered for both routes with the same status and no body.
//! A repeated `cott` parameter is not an error; the first value is checked.
//! In debug mode every origin is allowed, so browser clients served from
//! elsewhere can call the endpoint.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use cott::{
    MemoryKeyStore, MemoryReplayCache, Token, Validation, ValidationOutcome, Validator,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, info_span};
use uuid::Uuid;

pub type SharedValidator = Arc<Validator<MemoryKeyStore, MemoryReplayCache>>;

#[derive(Clone)]
pub struct AppState {
    validator: SharedValidator,
}

impl AppState {
    pub fn new(validator: Validator<MemoryKeyStore, MemoryReplayCache>) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }
}

/// Hex representation of the decoded token fields
#[derive(Debug, Serialize)]
pub struct TokenFields {
    header: String,
    uid: String,
    nonce: String,
    mac: String,
}

impl From<&Token> for TokenFields {
    fn from(token: &Token) -> Self {
        Self {
            header: hex::encode(token.header()),
            uid: token.device_id().to_string(),
            nonce: hex::encode(token.nonce()),
            mac: token.auth_code().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    outcome: ValidationOutcome,
    /// False only when the token was seen before
    fresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<TokenFields>,
    checked_at: DateTime<Utc>,
}

impl From<&Validation> for ValidationResponse {
    fn from(validation: &Validation) -> Self {
        Self {
            outcome: validation.outcome(),
            fresh: validation.outcome() != ValidationOutcome::Replayed,
            token: validation.token().map(TokenFields::from),
            checked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(state: AppState, debug: bool) -> Router {
    let router = Router::new()
        .route("/", get(validate))
        .route("/healthcheck", get(healthcheck))
        .with_state(state);

    if debug {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// First value of the `cott` query parameter
fn first_cott(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(name, _)| name == "cott")
        .map(|(_, value)| value.as_str())
}

async fn validate(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, Json<ValidationResponse>) {
    let span = info_span!("validate", request_id = %Uuid::new_v4());
    let validation = span.in_scope(|| {
        let validation = state.validator.validate(first_cott(&params));
        info!(outcome = %validation.outcome(), "Checked COTT");
        validation
    });

    let status = StatusCode::from_u16(validation.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ValidationResponse::from(&validation)))
}

async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "running" })
}
