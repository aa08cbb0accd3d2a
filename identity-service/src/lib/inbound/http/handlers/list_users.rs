use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::PageRequest;
use crate::inbound::http::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    offset: Option<u64>,
    limit: Option<u64>,
}

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    let Query(query) = query?;

    let page = PageRequest::new(
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(state.pagination.default_limit),
    )
    .clamped(state.pagination.max_limit);

    let users = state.user_service.list_users(page).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        users.iter().map(UserData::from).collect(),
    ))
}
