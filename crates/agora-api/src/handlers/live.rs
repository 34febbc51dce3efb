//! Live notification feed over WebSocket
//!
//! The client authenticates with `?token=`, receives one `SNAPSHOT` message
//! and then an `UNREAD_COUNT` message whenever its unread counter changes.
//! The connection keeps the user marked online.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::{interval, MissedTickBehavior};

use agora_core::Snowflake;
use agora_service::dto::NotificationResponse;
use agora_service::{NotificationService, ServiceContext, UnreadSubscription};

use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// How often an open connection refreshes the user's presence
const PRESENCE_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct LiveParams {
    pub token: Option<String>,
}

/// Server to client messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveMessage {
    Snapshot {
        unread_count: u64,
        notifications: Vec<NotificationResponse>,
    },
    UnreadCount {
        unread_count: u64,
    },
}

impl LiveMessage {
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// GET /notifications/live?token=
///
/// The subscription is opened before the upgrade so a storage failure is
/// still reported as an HTTP error.
pub async fn live_feed(
    State(state): State<AppState>,
    Query(params): Query<LiveParams>,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let token = params.token.ok_or(ApiError::MissingAuth)?;
    let user_id = state.jwt_service().authenticate(&token)?;

    let subscription = state.projector().subscribe(user_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, socket, subscription)))
}

async fn handle_socket(state: AppState, socket: WebSocket, mut subscription: UnreadSubscription) {
    let user_id = subscription.user_id();
    let ctx = state.service_context();

    tracing::info!(user_id = %user_id, "Live feed connected");
    if let Err(e) = ctx.presence().add_session(user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to register live session");
    }

    let (mut ws_sink, mut ws_stream) = socket.split();

    let notifications = match NotificationService::new(ctx)
        .list(Some(user_id), None, false)
        .await
    {
        Ok(list) => list.into_iter().map(NotificationResponse::from).collect(),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to load live feed snapshot");
            Vec::new()
        }
    };
    let snapshot = LiveMessage::Snapshot {
        unread_count: subscription.count(),
        notifications,
    };

    if send(&mut ws_sink, &snapshot).await.is_ok() {
        let mut presence_tick = interval(PRESENCE_REFRESH_INTERVAL);
        presence_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        presence_tick.tick().await;

        loop {
            tokio::select! {
                changed = subscription.changed() => match changed {
                    Ok(Some(unread_count)) => {
                        if send(&mut ws_sink, &LiveMessage::UnreadCount { unread_count }).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(user_id = %user_id, error = %e, "Unread subscription failed");
                        break;
                    }
                },
                msg = ws_stream.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(user_id = %user_id, "Client closed live feed");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Pings are answered by axum; nothing else is expected
                    }
                    Some(Err(e)) => {
                        tracing::debug!(user_id = %user_id, error = %e, "WebSocket error");
                        break;
                    }
                },
                _ = presence_tick.tick() => mark_online(ctx, user_id).await,
            }
        }
    }

    if let Err(e) = ctx.presence().remove_session(user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to close live session");
    }
    let _ = ws_sink.close().await;
    tracing::info!(user_id = %user_id, "Live feed disconnected");
}

async fn send(sink: &mut SplitSink<WebSocket, Message>, message: &LiveMessage) -> Result<(), ()> {
    let json = message.to_json().map_err(|e| {
        tracing::error!(error = %e, "Failed to encode live message");
    })?;
    sink.send(Message::Text(json)).await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to send live message");
    })
}

async fn mark_online(ctx: &ServiceContext, user_id: Snowflake) {
    if let Err(e) = ctx.presence().mark_online(user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to refresh presence");
    }
}
