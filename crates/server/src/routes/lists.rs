use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use db::models::{
    card::Card,
    list::{CreateList, List, UpdateList},
};
use tracing::instrument;

use super::Deleted;
use crate::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    middleware::RequestContext,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lists", post(create_list))
        .route(
            "/lists/{list_id}",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/lists/{list_id}/cards", get(get_list_cards))
}

#[instrument(
    name = "lists.create_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id, board_id = payload.board_id)
)]
async fn create_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(payload): ApiJson<CreateList>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state.lists().create(ctx.user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

#[instrument(name = "lists.get_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn get_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(list_id): ApiPath<i64>,
) -> Result<Json<List>, ApiError> {
    Ok(Json(state.lists().get(ctx.user.id, list_id).await?))
}

#[instrument(
    name = "lists.update_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id)
)]
async fn update_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(list_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateList>,
) -> Result<Json<List>, ApiError> {
    Ok(Json(
        state.lists().update(ctx.user.id, list_id, &payload).await?,
    ))
}

#[instrument(name = "lists.delete_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn delete_list(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(list_id): ApiPath<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.lists().delete(ctx.user.id, list_id).await?;
    Ok(Json(Deleted::new(list_id)))
}

#[instrument(name = "lists.cards_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn get_list_cards(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(list_id): ApiPath<i64>,
) -> Result<Json<Vec<Card>>, ApiError> {
    Ok(Json(
        state.cards().list_for_list(ctx.user.id, list_id).await?,
    ))
}
