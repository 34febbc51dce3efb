//! Notification service
//!
//! Fan-out entry points that decide who is told about an event, the single
//! `create_notification` write path with duplicate suppression, and the
//! recipient-scoped read side.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use agora_core::entities::{
    ContentKind, NewNotification, Notification, NotificationPayload, RelatedEntity,
};
use agora_core::text::{extract_mentions, preview};
use agora_core::traits::NotificationQuery;
use agora_core::{DomainError, NotificationEvent, ReadTransition, Snowflake};

use crate::dto::ActivityResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Label used when the actor is unknown to the directory
const UNKNOWN_ACTOR: &str = "Someone";

/// Result of one `create_notification` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// A new unread notification was stored
    Created(Snowflake),
    /// An unread notification with the same key already existed
    Existing(Snowflake),
    /// Nothing to do (self-notification or missing participant)
    Skipped,
}

impl NotificationOutcome {
    /// Id of the notification standing for this event, if any
    pub fn notification_id(self) -> Option<Snowflake> {
        match self {
            Self::Created(id) | Self::Existing(id) => Some(id),
            Self::Skipped => None,
        }
    }

    pub fn is_created(self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Per-recipient results of a batch fan-out, plus the stages that failed
/// before reaching any recipient
#[derive(Debug, Default)]
pub struct FanoutReport {
    results: Vec<(Snowflake, ServiceResult<NotificationOutcome>)>,
    failed_stages: Vec<&'static str>,
}

impl FanoutReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, recipient: Snowflake, result: ServiceResult<NotificationOutcome>) {
        self.results.push((recipient, result));
    }

    pub fn extend(&mut self, other: FanoutReport) {
        self.results.extend(other.results);
        self.failed_stages.extend(other.failed_stages);
    }

    /// Record a stage that failed as a whole
    pub fn stage_failed(&mut self, stage: &'static str, error: &ServiceError) {
        warn!(stage, error = %error, "Notification fan-out stage failed");
        self.failed_stages.push(stage);
    }

    /// Merge the report of a stage, or record the stage as failed
    pub fn absorb(&mut self, stage: &'static str, result: ServiceResult<FanoutReport>) {
        match result {
            Ok(report) => self.extend(report),
            Err(e) => self.stage_failed(stage, &e),
        }
    }

    pub fn failed_stages(&self) -> &[&'static str] {
        &self.failed_stages
    }

    pub fn results(&self) -> &[(Snowflake, ServiceResult<NotificationOutcome>)] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.failed_stages.is_empty()
    }

    fn count(&self, pred: impl Fn(&NotificationOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| r.as_ref().is_ok_and(&pred))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, NotificationOutcome::Created(_)))
    }

    pub fn existing(&self) -> usize {
        self.count(|o| matches!(o, NotificationOutcome::Existing(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, NotificationOutcome::Skipped))
    }

    /// Failed recipients plus failed stages
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count() + self.failed_stages.len()
    }

    /// Ids of newly created notifications, in fan-out order
    pub fn created_ids(&self) -> Vec<Snowflake> {
        self.results
            .iter()
            .filter_map(|(_, r)| match r {
                Ok(NotificationOutcome::Created(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Recipients that ended up with a notification (new or existing)
    pub fn notified(&self) -> Vec<Snowflake> {
        self.results
            .iter()
            .filter(|(_, r)| r.as_ref().is_ok_and(|o| o.notification_id().is_some()))
            .map(|(recipient, _)| *recipient)
            .collect()
    }
}

impl From<&FanoutReport> for ActivityResponse {
    fn from(report: &FanoutReport) -> Self {
        Self {
            created: report.created(),
            existing: report.existing(),
            skipped: report.skipped(),
            failed: report.failed(),
            failed_stages: report.failed_stages().to_vec(),
            notification_ids: report.created_ids(),
        }
    }
}

fn mention_title(actor: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Post => format!("{actor} mentioned you in a post"),
        ContentKind::Reply => format!("{actor} mentioned you in a reply"),
        ContentKind::Message => format!("{actor} mentioned you in chat"),
    }
}

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Persist a notification unless it is a self-notification or an unread
    /// one with the same (recipient, type, related id) already exists.
    #[instrument(skip(self, request), fields(recipient_id = %request.recipient_id, notification_type = %request.notification_type()))]
    pub async fn create_notification(
        &self,
        actor_id: Option<Snowflake>,
        request: NewNotification,
    ) -> ServiceResult<NotificationOutcome> {
        let actor_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        if request.recipient_id == actor_id {
            debug!("Skipping self-notification");
            return Ok(NotificationOutcome::Skipped);
        }

        let key = request.suppression_key();
        if let Some(existing) = self.ctx.notification_repo().find_unread(&key).await? {
            debug!(notification_id = %existing.id, "Suppressed duplicate notification");
            return Ok(NotificationOutcome::Existing(existing.id));
        }

        let notification = Notification::from_request(self.ctx.generate_id(), actor_id, request);
        self.ctx.notification_repo().create(&notification).await?;

        info!(
            notification_id = %notification.id,
            actor_id = %actor_id,
            "Notification created"
        );

        self.emit(NotificationEvent::created(
            notification.recipient_id,
            notification.id,
            notification.notification_type(),
        ))
        .await;

        Ok(NotificationOutcome::Created(notification.id))
    }

    /// Tell a mentioned user about the content that mentions them
    #[instrument(skip(self, raw_content))]
    pub async fn notify_mention(
        &self,
        mentioned_id: Option<Snowflake>,
        actor_id: Option<Snowflake>,
        kind: ContentKind,
        related_id: Snowflake,
        raw_content: &str,
    ) -> ServiceResult<NotificationOutcome> {
        let (Some(mentioned_id), Some(actor_id)) = (mentioned_id, actor_id) else {
            return Ok(NotificationOutcome::Skipped);
        };
        if mentioned_id == actor_id {
            return Ok(NotificationOutcome::Skipped);
        }

        let actor = self.actor_label(actor_id).await?;
        let truncated = preview(raw_content, self.ctx.settings().mention_preview_chars);

        self.create_notification(
            Some(actor_id),
            NewNotification {
                recipient_id: mentioned_id,
                title: mention_title(&actor, kind),
                message: truncated.clone(),
                related: RelatedEntity::new(related_id, kind),
                payload: NotificationPayload::Mention {
                    content_type: kind,
                    truncated_content: truncated,
                },
            },
        )
        .await
    }

    /// Detect `@username` mentions in `content` and notify each resolved
    /// user once. The actor and every id in `exclude` are skipped.
    #[instrument(skip(self, content, exclude))]
    pub async fn notify_mentions(
        &self,
        content: &str,
        actor_id: Snowflake,
        kind: ContentKind,
        related_id: Snowflake,
        exclude: &[Snowflake],
    ) -> ServiceResult<FanoutReport> {
        let mut report = FanoutReport::new();
        let usernames = extract_mentions(content);
        if usernames.is_empty() {
            return Ok(report);
        }

        let profiles = self.ctx.user_directory().find_by_usernames(&usernames).await?;

        for username in &usernames {
            let Some(profile) = profiles.iter().find(|p| &p.username == username) else {
                debug!(username = %username, "Mentioned user does not exist");
                continue;
            };
            if profile.id == actor_id || exclude.contains(&profile.id) {
                continue;
            }

            let result = self
                .notify_mention(Some(profile.id), Some(actor_id), kind, related_id, content)
                .await;
            if let Err(e) = &result {
                warn!(recipient_id = %profile.id, error = %e, "Mention notification failed");
            }
            report.push(profile.id, result);
        }

        Ok(report)
    }

    /// Tell a post's author about a new reply
    #[instrument(skip(self, reply_content))]
    pub async fn notify_new_reply(
        &self,
        reply_id: Snowflake,
        post_id: Snowflake,
        reply_content: &str,
        actor_id: Snowflake,
        post_author_id: Option<Snowflake>,
    ) -> ServiceResult<NotificationOutcome> {
        let Some(post_author_id) = post_author_id.filter(|author| *author != actor_id) else {
            return Ok(NotificationOutcome::Skipped);
        };

        let excerpt = preview(reply_content, self.ctx.settings().reply_preview_chars);

        self.create_notification(
            Some(actor_id),
            NewNotification {
                recipient_id: post_author_id,
                title: "New Reply to Your Post".to_string(),
                message: excerpt.clone(),
                related: RelatedEntity::new(reply_id, ContentKind::Reply),
                payload: NotificationPayload::NewReply {
                    post_id,
                    preview: excerpt,
                },
            },
        )
        .await
    }

    /// Tell a post's author that someone liked it
    #[instrument(skip(self, post_title))]
    pub async fn notify_post_liked(
        &self,
        post_id: Snowflake,
        post_title: &str,
        liker_id: Snowflake,
        post_author_id: Option<Snowflake>,
    ) -> ServiceResult<NotificationOutcome> {
        let Some(post_author_id) = post_author_id.filter(|author| *author != liker_id) else {
            return Ok(NotificationOutcome::Skipped);
        };

        let actor = self.actor_label(liker_id).await?;

        self.create_notification(
            Some(liker_id),
            NewNotification {
                recipient_id: post_author_id,
                title: "New Like on Your Post".to_string(),
                message: format!("{actor} liked your post \"{post_title}\""),
                related: RelatedEntity::new(post_id, ContentKind::Post),
                payload: NotificationPayload::PostLiked {
                    post_title: post_title.to_string(),
                },
            },
        )
        .await
    }

    /// Tell currently online users about a new post. Best effort: a presence
    /// failure yields an empty report.
    #[instrument(skip(self, post_title))]
    pub async fn notify_new_post(
        &self,
        post_id: Snowflake,
        post_title: &str,
        actor_id: Snowflake,
        category_id: Option<Snowflake>,
    ) -> ServiceResult<FanoutReport> {
        let mut report = FanoutReport::new();
        let cap = self.ctx.settings().new_post_audience_cap;

        let online = match self.ctx.presence().online_users(cap.saturating_add(1)).await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "Presence lookup failed, skipping new-post broadcast");
                return Ok(report);
            }
        };

        let actor = self.actor_label(actor_id).await?;
        let audience = online.into_iter().filter(|id| *id != actor_id).take(cap);

        for recipient_id in audience {
            let result = self
                .create_notification(
                    Some(actor_id),
                    NewNotification {
                        recipient_id,
                        title: "New Post".to_string(),
                        message: format!("{actor} published \"{post_title}\""),
                        related: RelatedEntity::new(post_id, ContentKind::Post),
                        payload: NotificationPayload::NewPost {
                            post_title: post_title.to_string(),
                            category_id,
                        },
                    },
                )
                .await;
            if let Err(e) = &result {
                warn!(recipient_id = %recipient_id, error = %e, "New-post notification failed");
            }
            report.push(recipient_id, result);
        }

        info!(
            post_id = %post_id,
            notified = report.created(),
            "New post broadcast"
        );

        Ok(report)
    }

    /// Tell the recipient of a direct message about it
    #[instrument(skip(self, content))]
    pub async fn notify_new_message(
        &self,
        message_id: Snowflake,
        content: &str,
        actor_id: Snowflake,
        recipient_id: Option<Snowflake>,
    ) -> ServiceResult<NotificationOutcome> {
        let Some(recipient_id) = recipient_id.filter(|r| *r != actor_id) else {
            return Ok(NotificationOutcome::Skipped);
        };

        let actor = self.actor_label(actor_id).await?;
        let excerpt = preview(content, self.ctx.settings().mention_preview_chars);

        self.create_notification(
            Some(actor_id),
            NewNotification {
                recipient_id,
                title: format!("New message from {actor}"),
                message: excerpt.clone(),
                related: RelatedEntity::new(message_id, ContentKind::Message),
                payload: NotificationPayload::NewMessage { preview: excerpt },
            },
        )
        .await
    }

    /// Tell a message's author about a new emoji reaction
    #[instrument(skip(self))]
    pub async fn notify_message_reaction(
        &self,
        message_id: Snowflake,
        emoji: &str,
        reactor_id: Snowflake,
        author_id: Snowflake,
    ) -> ServiceResult<NotificationOutcome> {
        if reactor_id == author_id {
            return Ok(NotificationOutcome::Skipped);
        }

        let actor = self.actor_label(reactor_id).await?;

        self.create_notification(
            Some(reactor_id),
            NewNotification {
                recipient_id: author_id,
                title: "New Reaction".to_string(),
                message: format!("{actor} reacted {emoji} to your message"),
                related: RelatedEntity::new(message_id, ContentKind::Message),
                payload: NotificationPayload::MessageReaction {
                    emoji: emoji.to_string(),
                },
            },
        )
        .await
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Caller's feed, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        actor_id: Option<Snowflake>,
        limit: Option<u32>,
        unread_only: bool,
    ) -> ServiceResult<Vec<Notification>> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;
        let query = NotificationQuery {
            limit: self.ctx.settings().feed_limit(limit),
            unread_only,
        };
        Ok(self.ctx.notification_repo().list(user_id, query).await?)
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, actor_id: Option<Snowflake>) -> ServiceResult<u64> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;
        Ok(self.ctx.notification_repo().count_unread(user_id).await?)
    }

    /// Mark one of the caller's notifications as read
    #[instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        actor_id: Option<Snowflake>,
        notification_id: Snowflake,
    ) -> ServiceResult<bool> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let transition = self
            .ctx
            .notification_repo()
            .mark_read(notification_id, user_id, Utc::now())
            .await?
            .ok_or(DomainError::NotificationNotFound(notification_id))?;

        if transition == ReadTransition::Marked {
            info!(notification_id = %notification_id, user_id = %user_id, "Notification read");
            self.emit(NotificationEvent::read(user_id, notification_id))
                .await;
        }

        Ok(true)
    }

    /// Mark every unread notification of the caller as read
    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self, actor_id: Option<Snowflake>) -> ServiceResult<bool> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let changed = self
            .ctx
            .notification_repo()
            .mark_all_read(user_id, Utc::now())
            .await?;

        if !changed.is_empty() {
            info!(user_id = %user_id, count = changed.len(), "Notifications read");
            self.emit(NotificationEvent::all_read(user_id, changed)).await;
        }

        Ok(true)
    }

    /// Delete one of the caller's notifications
    #[instrument(skip(self))]
    pub async fn delete_notification(
        &self,
        actor_id: Option<Snowflake>,
        notification_id: Snowflake,
    ) -> ServiceResult<bool> {
        let user_id = actor_id.ok_or_else(ServiceError::not_authorized)?;

        let removed = self
            .ctx
            .notification_repo()
            .delete(notification_id, user_id)
            .await?
            .ok_or(DomainError::NotificationNotFound(notification_id))?;

        info!(notification_id = %notification_id, user_id = %user_id, "Notification deleted");
        self.emit(NotificationEvent::deleted(user_id, notification_id, !removed.read))
            .await;

        Ok(true)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn actor_label(&self, actor_id: Snowflake) -> ServiceResult<String> {
        Ok(self
            .ctx
            .user_directory()
            .find_by_id(actor_id)
            .await?
            .map_or_else(|| UNKNOWN_ACTOR.to_string(), |p| p.label().to_string()))
    }

    /// Events follow a completed write; a failed emit never undoes it
    async fn emit(&self, event: NotificationEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.ctx.event_sink().emit(event).await {
            warn!(event_type, error = %e, "Failed to emit notification event");
        }
    }
}
