use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use db::models::card::{Card, CreateCard, UpdateCard};
use tracing::instrument;

use super::Deleted;
use crate::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    middleware::RequestContext,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/cards", post(create_card)).route(
        "/cards/{card_id}",
        get(get_card).put(update_card).delete(delete_card),
    )
}

#[instrument(
    name = "cards.create_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id, list_id = payload.list_id)
)]
async fn create_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(payload): ApiJson<CreateCard>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.cards().create(ctx.user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

#[instrument(name = "cards.get_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn get_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(card_id): ApiPath<i64>,
) -> Result<Json<Card>, ApiError> {
    Ok(Json(state.cards().get(ctx.user.id, card_id).await?))
}

/// Edits, repositions, or moves a card to another list (`listId`).
#[instrument(
    name = "cards.update_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id, to_list = ?payload.list_id)
)]
async fn update_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(card_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateCard>,
) -> Result<Json<Card>, ApiError> {
    Ok(Json(
        state.cards().update(ctx.user.id, card_id, &payload).await?,
    ))
}

#[instrument(name = "cards.delete_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn delete_card(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(card_id): ApiPath<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.cards().delete(ctx.user.id, card_id).await?;
    Ok(Json(Deleted::new(card_id)))
}
