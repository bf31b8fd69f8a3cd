//! Workflow Dispatcher.
//!
//! Resolves the acting user, routes the event to exactly one handler and turns
//! every [`WorkflowError`] into replies, so a failing event never escapes and
//! never touches another user's state.

use tracing::{debug, error, info, warn};

use crate::db::{self, DbPool};
use crate::dialogue::WorkflowState;
use crate::errors::{StoreError, WorkflowError};
use crate::localization::t_lang;
use crate::models::{Place, User, UserId};
use crate::session::{SessionField, SessionRegistry, UserLocks};

use super::actions::Action;
use super::dialogue_manager::{handle_photo_step, handle_text_step, StepContext};
use super::event::{EventKind, InboundEvent, MessageHandle, Reply};
use super::ui_builder::{
    create_browse_keyboard, create_manage_keyboard, format_place_card, format_reviews,
    place_card_reply,
};

/// Default number of reviews listed by the "reviews" button
pub const DEFAULT_REVIEW_LIMIT: u32 = 5;

/// The conversational engine shared by every update handler
pub struct Workflow {
    pool: DbPool,
    sessions: SessionRegistry,
    locks: UserLocks,
    review_limit: u32,
}

impl Workflow {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            sessions: SessionRegistry::new(),
            locks: UserLocks::new(),
            review_limit: DEFAULT_REVIEW_LIMIT,
        }
    }

    pub fn with_review_limit(mut self, limit: u32) -> Self {
        self.review_limit = limit.max(1);
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle one inbound event and return what should be sent back.
    ///
    /// Events of the same user are handled one after another. A button press
    /// always yields exactly one callback answer.
    pub async fn handle_event(&self, event: InboundEvent) -> Vec<Reply> {
        let _guard = self.locks.lock(event.user_id).await;
        let language_code = event.language_code.as_deref();
        let action = event_label(&event.kind);

        let replies = match self.load_user(event.user_id).await {
            Ok(user) => {
                let ctx = StepContext {
                    pool: &self.pool,
                    sessions: &self.sessions,
                    user_id: user.id,
                    is_admin: user.is_admin,
                    language_code,
                };
                match self.route(&ctx, user.status, &event.kind).await {
                    Ok(replies) => replies,
                    Err(err) => self.recover(&ctx, user.status, action, err).await,
                }
            }
            Err(err) => {
                error!(user_id = event.user_id, action, error = %err, "Failed to load user");
                vec![Reply::text(t_lang("error-generic", language_code))]
            }
        };

        finish_replies(&event.kind, replies)
    }

    /// Fetch the acting user, registering first-time users
    async fn load_user(&self, user_id: UserId) -> Result<User, StoreError> {
        if !db::user_exists(&self.pool, user_id).await? {
            db::create_user(&self.pool, user_id).await?;
        }

        Ok(db::get_user(&self.pool, user_id).await?.unwrap_or(User {
            id: user_id,
            status: WorkflowState::Idle.code(),
            is_admin: false,
        }))
    }

    async fn route(
        &self,
        ctx: &StepContext<'_>,
        status: i64,
        kind: &EventKind,
    ) -> Result<Vec<Reply>, WorkflowError> {
        if let EventKind::ButtonPress {
            action_tag,
            message,
        } = kind
        {
            return self.handle_button(ctx, status, action_tag, *message).await;
        }

        let Some(state) = WorkflowState::from_code(status) else {
            warn!(user_id = ctx.user_id, status, "No handler for status, showing menu");
            return Ok(vec![ctx.menu()]);
        };

        if state.requires_admin() && !ctx.is_admin {
            warn!(user_id = ctx.user_id, state = ?state, "Admin step held by a non-admin, resetting");
            ctx.reset(state).await?;
            return Ok(vec![ctx.menu()]);
        }

        match kind {
            EventKind::Text(text) => handle_text_step(ctx, state, text).await,
            EventKind::Photo { photo_ref, .. } => handle_photo_step(ctx, state, photo_ref).await,
            EventKind::ButtonPress { .. } => Ok(vec![ctx.menu()]),
        }
    }

    async fn handle_button(
        &self,
        ctx: &StepContext<'_>,
        status: i64,
        action_tag: &str,
        message: Option<MessageHandle>,
    ) -> Result<Vec<Reply>, WorkflowError> {
        let action: Action = match action_tag.parse() {
            Ok(action) => action,
            Err(err) => {
                warn!(user_id = ctx.user_id, error = %err, "Unknown callback payload");
                return Ok(vec![Reply::answer(Some(ctx.t("unknown-action")))]);
            }
        };

        if action.requires_admin() && !ctx.is_admin {
            warn!(user_id = ctx.user_id, action = %action, "Admin action rejected");
            return Ok(vec![Reply::answer(Some(ctx.t("error-admin-only")))]);
        }

        debug!(user_id = ctx.user_id, action = %action, "Handling button press");
        let current = WorkflowState::from_code(status).unwrap_or_default();

        match action {
            Action::AddPlace => {
                let mut replies = vec![Reply::answer(None)];
                replies.extend(ctx.enter(current, WorkflowState::AddName, None).await?);
                Ok(replies)
            }
            Action::EditName(place_id) | Action::EditType(place_id) => {
                if db::get_place(&self.pool, place_id).await?.is_none() {
                    return Ok(vec![Reply::answer(Some(ctx.t("place-gone")))]);
                }
                let target = match action {
                    Action::EditName(_) => WorkflowState::EditName,
                    _ => WorkflowState::EditType,
                };
                let mut replies = vec![Reply::answer(None)];
                replies.extend(
                    ctx.enter(current, target, Some(SessionField::EditPlaceId(place_id)))
                        .await?,
                );
                Ok(replies)
            }
            Action::DeletePlace(place_id) => {
                if !db::delete_place(&self.pool, place_id).await? {
                    return Ok(vec![Reply::answer(Some(ctx.t("place-gone")))]);
                }
                let mut replies = vec![Reply::answer(Some(ctx.t("place-deleted")))];
                replies.extend(message.map(Reply::DeleteMessage));
                Ok(replies)
            }
            Action::ManagePlaces => self.manage_places(ctx).await,
            Action::Places => {
                let places = db::list_places(&self.pool).await?;
                self.browse(ctx, places, "places-empty").await
            }
            Action::MyPlaces => {
                let places = db::list_reviewed_places(&self.pool, ctx.user_id).await?;
                self.browse(ctx, places, "my-places-empty").await
            }
            Action::Favorites => {
                let places = db::list_favorites(&self.pool, ctx.user_id).await?;
                self.browse(ctx, places, "favorites-empty").await
            }
            Action::AddFavorite(place_id) => {
                if db::get_place(&self.pool, place_id).await?.is_none() {
                    return Ok(vec![Reply::answer(Some(ctx.t("place-gone")))]);
                }
                let key = if db::add_favorite(&self.pool, ctx.user_id, place_id).await? {
                    "favorite-added"
                } else {
                    "favorite-already"
                };
                Ok(vec![Reply::answer(Some(ctx.t(key)))])
            }
            Action::RemoveFavorite(place_id) => {
                let key = if db::remove_favorite(&self.pool, ctx.user_id, place_id).await? {
                    "favorite-removed"
                } else {
                    "favorite-not-found"
                };
                Ok(vec![Reply::answer(Some(ctx.t(key)))])
            }
            Action::Visited(place_id) => {
                if db::get_place(&self.pool, place_id).await?.is_none() {
                    return Ok(vec![Reply::answer(Some(ctx.t("place-gone")))]);
                }
                if db::has_reviewed(&self.pool, ctx.user_id, place_id).await? {
                    return Ok(vec![Reply::answer(Some(ctx.t("review-already")))]);
                }
                let mut replies = vec![Reply::answer(None)];
                replies.extend(
                    ctx.enter(
                        current,
                        WorkflowState::AddReview,
                        Some(SessionField::ReviewPlaceId(place_id)),
                    )
                    .await?,
                );
                Ok(replies)
            }
            Action::Reviews(place_id) => {
                let Some(place) = db::get_place(&self.pool, place_id).await? else {
                    return Ok(vec![Reply::answer(Some(ctx.t("place-gone")))]);
                };
                let summary = db::rating_summary(&self.pool, place_id).await?;
                let reviews = db::list_reviews(&self.pool, place_id, self.review_limit).await?;
                Ok(vec![
                    Reply::answer(None),
                    Reply::text(format_reviews(&place, &summary, &reviews, ctx.language_code)),
                ])
            }
        }
    }

    /// One card per place with edit and delete buttons
    async fn manage_places(&self, ctx: &StepContext<'_>) -> Result<Vec<Reply>, WorkflowError> {
        let places = db::list_places(&self.pool).await?;
        if places.is_empty() {
            return Ok(vec![Reply::answer(Some(ctx.t("manage-empty")))]);
        }

        let count = places.len().to_string();
        let mut replies = vec![Reply::answer(Some(
            ctx.t_args("manage-count", &[("count", count.as_str())]),
        ))];
        for place in &places {
            let caption = format_place_card(place, None, ctx.language_code);
            let keyboard = create_manage_keyboard(place.id, ctx.language_code);
            replies.push(place_card_reply(place, caption, keyboard));
        }
        Ok(replies)
    }

    /// One card per place with rating, favorite state and review buttons
    async fn browse(
        &self,
        ctx: &StepContext<'_>,
        places: Vec<Place>,
        empty_key: &str,
    ) -> Result<Vec<Reply>, WorkflowError> {
        if places.is_empty() {
            return Ok(vec![Reply::answer(None), Reply::text(ctx.t(empty_key))]);
        }

        let mut replies = vec![Reply::answer(None)];
        for place in &places {
            let summary = db::rating_summary(&self.pool, place.id).await?;
            let favorite = db::is_favorite(&self.pool, ctx.user_id, place.id).await?;
            let caption = format_place_card(place, Some(&summary), ctx.language_code);
            let keyboard = create_browse_keyboard(place.id, favorite, ctx.language_code);
            replies.push(place_card_reply(place, caption, keyboard));
        }
        Ok(replies)
    }

    /// Turn a failed step into replies
    async fn recover(
        &self,
        ctx: &StepContext<'_>,
        status: i64,
        action: &str,
        err: WorkflowError,
    ) -> Vec<Reply> {
        match err {
            WorkflowError::LostSession { state, missing } => {
                warn!(
                    user_id = ctx.user_id,
                    status,
                    action,
                    missing,
                    "Session lost, returning user to the menu"
                );
                self.reset_after_failure(ctx, state).await;
                vec![Reply::text(ctx.t("session-lost")), ctx.menu()]
            }
            WorkflowError::InvalidInput { state, reason } => {
                debug!(user_id = ctx.user_id, status, reason, "Input rejected");
                let mut replies = vec![Reply::text(ctx.t(reason))];
                replies.extend(ctx.prompt(state));
                replies
            }
            WorkflowError::PlaceGone(place_id) => {
                info!(user_id = ctx.user_id, status, action, place_id, "Workflow target was deleted");
                let state = WorkflowState::from_code(status).unwrap_or_default();
                self.reset_after_failure(ctx, state).await;
                vec![Reply::text(ctx.t("place-gone")), ctx.menu()]
            }
            WorkflowError::Store(err) => {
                error!(user_id = ctx.user_id, status, action, error = %err, "Storage operation failed");
                vec![Reply::text(ctx.t("error-generic"))]
            }
        }
    }

    async fn reset_after_failure(&self, ctx: &StepContext<'_>, state: WorkflowState) {
        self.sessions.remove(ctx.user_id);
        if let Err(err) = ctx.transition(state, WorkflowState::Idle).await {
            error!(user_id = ctx.user_id, error = %err, "Failed to reset status");
        }
    }
}

fn event_label(kind: &EventKind) -> &str {
    match kind {
        EventKind::Text(_) => "text",
        EventKind::Photo { .. } => "photo",
        EventKind::ButtonPress { action_tag, .. } => action_tag,
    }
}

/// Make sure a button press is acknowledged exactly once
fn finish_replies(kind: &EventKind, mut replies: Vec<Reply>) -> Vec<Reply> {
    if matches!(kind, EventKind::ButtonPress { .. })
        && !replies
            .iter()
            .any(|reply| matches!(reply, Reply::AnswerCallback { .. }))
    {
        replies.insert(0, Reply::answer(None));
    }
    replies
}
