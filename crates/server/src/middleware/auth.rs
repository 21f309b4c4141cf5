use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use chrono::{DateTime, Utc};
use db::models::user::User;
use services::services::ServiceError;
use tracing::debug;

use crate::{AppState, error::ApiError};

/// The authenticated caller, inserted by [`require_session`].
#[derive(Clone)]
pub struct RequestContext {
    pub user: User,
    pub access_token_expires_at: DateTime<Utc>,
}

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = match req.headers().typed_get::<Authorization<Bearer>>() {
        Some(Authorization(token)) => token.token().to_owned(),
        None => {
            debug!("request without bearer token");
            return ApiError::Unauthorized.into_response();
        }
    };

    let (user, token) = match state.auth().authenticate(&bearer).await {
        Ok(authenticated) => authenticated,
        Err(ServiceError::Unauthorized) => return ApiError::Unauthorized.into_response(),
        Err(error) => return ApiError::from(error).into_response(),
    };

    req.extensions_mut().insert(RequestContext {
        user,
        access_token_expires_at: token.expires_at,
    });

    next.run(req).await
}
