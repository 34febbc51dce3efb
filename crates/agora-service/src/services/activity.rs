//! Activity service
//!
//! Announces content written elsewhere (forum posts, replies, chat messages)
//! and drives the notification fan-out for it.

use tracing::{info, instrument, warn};

use agora_core::{ContentKind, DomainError, Snowflake, VotableKind};

use crate::dto::ActivityResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notification::{FanoutReport, NotificationService};

const NEW_POST_STAGE: &str = "new-post";
const NEW_REPLY_STAGE: &str = "new-reply";
const MENTION_STAGE: &str = "mentions";

/// Activity service
pub struct ActivityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ActivityService<'a> {
    /// Create a new ActivityService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Broadcast a new post to online users and notify the users it mentions
    #[instrument(skip(self))]
    pub async fn post_published(
        &self,
        actor_id: Option<Snowflake>,
        post_id: Snowflake,
    ) -> ServiceResult<ActivityResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let post = self
            .ctx
            .votable_repo()
            .find_by_id(VotableKind::Post, post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if post.author_id != user_id {
            return Err(ServiceError::not_authorized());
        }

        let notifications = NotificationService::new(self.ctx);
        let mut report = FanoutReport::new();
        report.absorb(
            NEW_POST_STAGE,
            notifications
                .notify_new_post(post.id, post.title_or_empty(), user_id, post.category_id)
                .await,
        );
        report.absorb(
            MENTION_STAGE,
            notifications
                .notify_mentions(&post.content, user_id, ContentKind::Post, post.id, &[])
                .await,
        );

        Ok(announced("post", post.id, &report))
    }

    /// Tell the post author about a reply, then notify the users it mentions.
    /// The post author is not notified twice.
    #[instrument(skip(self))]
    pub async fn reply_published(
        &self,
        actor_id: Option<Snowflake>,
        reply_id: Snowflake,
    ) -> ServiceResult<ActivityResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let reply = self
            .ctx
            .votable_repo()
            .find_by_id(VotableKind::Reply, reply_id)
            .await?
            .ok_or(DomainError::ReplyNotFound(reply_id))?;
        if reply.author_id != user_id {
            return Err(ServiceError::not_authorized());
        }

        let notifications = NotificationService::new(self.ctx);
        let mut report = FanoutReport::new();
        let mut exclude = Vec::new();

        if let Some(post_id) = reply.parent_id {
            let post_author = match self
                .ctx
                .votable_repo()
                .find_by_id(VotableKind::Post, post_id)
                .await
            {
                Ok(post) => post.map(|post| post.author_id),
                Err(e) => {
                    report.stage_failed(NEW_REPLY_STAGE, &ServiceError::from(e));
                    None
                }
            };

            if let Some(author_id) = post_author {
                let result = notifications
                    .notify_new_reply(reply.id, post_id, &reply.content, user_id, Some(author_id))
                    .await;
                if let Err(e) = &result {
                    warn!(recipient_id = %author_id, error = %e, "Reply notification failed");
                }
                report.push(author_id, result);
                exclude.push(author_id);
            }
        }

        report.absorb(
            MENTION_STAGE,
            notifications
                .notify_mentions(&reply.content, user_id, ContentKind::Reply, reply.id, &exclude)
                .await,
        );

        Ok(announced("reply", reply.id, &report))
    }

    /// Notify the direct-message recipient and the users a message mentions
    #[instrument(skip(self))]
    pub async fn message_sent(
        &self,
        actor_id: Option<Snowflake>,
        message_id: Snowflake,
    ) -> ServiceResult<ActivityResponse> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;
        if message.author_id != user_id {
            return Err(ServiceError::not_authorized());
        }

        let notifications = NotificationService::new(self.ctx);
        let mut report = FanoutReport::new();
        let mut exclude = Vec::new();

        if let Some(recipient_id) = message.recipient_id {
            let result = notifications
                .notify_new_message(message.id, &message.content, user_id, Some(recipient_id))
                .await;
            if let Err(e) = &result {
                warn!(recipient_id = %recipient_id, error = %e, "Message notification failed");
            }
            report.push(recipient_id, result);
            exclude.push(recipient_id);
        }

        report.absorb(
            MENTION_STAGE,
            notifications
                .notify_mentions(
                    &message.content,
                    user_id,
                    ContentKind::Message,
                    message.id,
                    &exclude,
                )
                .await,
        );

        Ok(announced("message", message.id, &report))
    }
}

fn announced(content: &'static str, id: Snowflake, report: &FanoutReport) -> ActivityResponse {
    let response = ActivityResponse::from(report);
    info!(
        content,
        content_id = %id,
        created = response.created,
        existing = response.existing,
        failed = response.failed,
        "Activity announced"
    );
    response
}
