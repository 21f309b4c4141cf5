use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use db::models::user::{LoginUser, RegisterUser, User};
use services::services::AuthSession;
use tracing::instrument;

use crate::{AppState, error::ApiError, extract::ApiJson, middleware::RequestContext};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[instrument(name = "auth.register_route", skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterUser>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth().register(&payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(name = "auth.login_route", skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginUser>,
) -> Result<Json<AuthSession>, ApiError> {
    Ok(Json(state.auth().login(&payload).await?))
}

#[instrument(name = "auth.me", skip(ctx), fields(user_id = ctx.user.id))]
async fn me(Extension(ctx): Extension<RequestContext>) -> Json<User> {
    Json(ctx.user)
}
