use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use db::models::{
    activity::Activity,
    board::{Board, BoardDetail, CreateBoard, UpdateBoard},
    list::List,
};
use serde::Deserialize;
use tracing::instrument;

use super::Deleted;
use crate::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::RequestContext,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route(
            "/boards/{board_id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/boards/{board_id}/lists", get(get_board_lists))
        .route("/boards/{board_id}/activity", get(get_board_activity))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

#[instrument(name = "boards.list_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn list_boards(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Board>>, ApiError> {
    Ok(Json(state.boards().list_for_owner(ctx.user.id).await?))
}

#[instrument(
    name = "boards.create_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id)
)]
async fn create_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(payload): ApiJson<CreateBoard>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state.boards().create(ctx.user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

#[instrument(name = "boards.get_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn get_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(board_id): ApiPath<i64>,
) -> Result<Json<BoardDetail>, ApiError> {
    Ok(Json(state.boards().get_detail(ctx.user.id, board_id).await?))
}

#[instrument(
    name = "boards.update_route",
    skip(state, ctx, payload),
    fields(user_id = ctx.user.id)
)]
async fn update_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(board_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateBoard>,
) -> Result<Json<Board>, ApiError> {
    Ok(Json(
        state
            .boards()
            .update(ctx.user.id, board_id, &payload)
            .await?,
    ))
}

#[instrument(name = "boards.delete_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn delete_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(board_id): ApiPath<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.boards().delete(ctx.user.id, board_id).await?;
    Ok(Json(Deleted::new(board_id)))
}

#[instrument(name = "boards.lists_route", skip(state, ctx), fields(user_id = ctx.user.id))]
async fn get_board_lists(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(board_id): ApiPath<i64>,
) -> Result<Json<Vec<List>>, ApiError> {
    Ok(Json(
        state.lists().list_for_board(ctx.user.id, board_id).await?,
    ))
}

#[instrument(
    name = "boards.activity_route",
    skip(state, ctx, query),
    fields(user_id = ctx.user.id)
)]
async fn get_board_activity(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(board_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    Ok(Json(
        state
            .activity()
            .list_for_board(ctx.user.id, board_id, query.limit)
            .await?,
    ))
}
