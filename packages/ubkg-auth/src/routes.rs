//! `/` and `/umls-auth`

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::AuthError;
use crate::validator::UmlsValidator;

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn UmlsValidator>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn UmlsValidator>) -> Self {
        Self { validator }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyParams {
    #[serde(rename = "umls-key")]
    umls_key: Option<String>,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/umls-auth", get(auth_query).post(auth_form))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index() -> &'static str {
    "Hello! This is UBKG UMLS authentication service."
}

async fn auth_query(State(state): State<AuthState>, Query(params): Query<KeyParams>) -> Result<Json<bool>, AuthError> {
    check(&state, params.umls_key).await
}

async fn auth_form(
    State(state): State<AuthState>,
    form: Result<Form<KeyParams>, FormRejection>,
) -> Result<Json<bool>, AuthError> {
    let params = form.map(|Form(params)| params).unwrap_or_default();
    check(&state, params.umls_key).await
}

async fn check(state: &AuthState, key: Option<String>) -> Result<Json<bool>, AuthError> {
    let key = key.filter(|k| !k.trim().is_empty()).ok_or(AuthError::MissingKey)?;
    if state.validator.validate(&key).await? {
        Ok(Json(true))
    } else {
        Err(AuthError::Rejected)
    }
}
