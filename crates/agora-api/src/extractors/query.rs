//! Feed query extractor

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use agora_service::dto::NotificationListQuery;

use crate::response::ApiError;

/// `?limit=&unread_only=` on the notification feed. The limit is clamped by
/// the service, so any `u32` is accepted here.
#[derive(Debug, Clone, Copy)]
pub struct FeedQuery {
    pub limit: Option<u32>,
    pub unread_only: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for FeedQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<NotificationListQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Self {
            limit: params.limit,
            unread_only: params.unread_only,
        })
    }
}
