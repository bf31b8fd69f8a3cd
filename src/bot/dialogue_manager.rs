//! Dialogue Manager module: the text and photo step handlers of every workflow.
//!
//! Each handler runs for exactly one status value. It checks the session keys
//! the step needs, validates the input, writes through the entity store and
//! then advances or resets the durable status.

use tracing::{debug, info};

use crate::db::{self, DbPool};
use crate::dialogue::{
    is_skip_word, parse_rating, parse_type_choice, validate_address, validate_place_name,
    validate_review_text, WorkflowState,
};
use crate::errors::WorkflowError;
use crate::localization::{t_args_lang, t_lang};
use crate::models::{PlaceType, UserId};
use crate::session::{SessionField, SessionRegistry};

use super::event::Reply;
use super::ui_builder::{menu_reply, prompt_for};

/// Everything a step handler may touch while handling one event
pub struct StepContext<'a> {
    pub pool: &'a DbPool,
    pub sessions: &'a SessionRegistry,
    pub user_id: UserId,
    pub is_admin: bool,
    pub language_code: Option<&'a str>,
}

impl StepContext<'_> {
    /// Persist a new status for the acting user
    pub async fn transition(
        &self,
        from: WorkflowState,
        to: WorkflowState,
    ) -> Result<(), WorkflowError> {
        db::set_status(self.pool, self.user_id, to).await?;
        info!(user_id = self.user_id, from = ?from, to = ?to, "Status changed");
        Ok(())
    }

    /// Back to idle with the session discarded
    pub async fn reset(&self, from: WorkflowState) -> Result<(), WorkflowError> {
        self.transition(from, WorkflowState::Idle).await?;
        self.sessions.remove(self.user_id);
        Ok(())
    }

    /// Start a workflow from a menu button, dropping whatever flow was in progress
    pub async fn enter(
        &self,
        from: WorkflowState,
        to: WorkflowState,
        field: Option<SessionField>,
    ) -> Result<Vec<Reply>, WorkflowError> {
        self.sessions.remove(self.user_id);
        if let Some(field) = field {
            self.sessions.set(self.user_id, field);
        }
        self.transition(from, to).await?;
        Ok(self.prompt(to))
    }

    pub fn t(&self, key: &str) -> String {
        t_lang(key, self.language_code)
    }

    pub fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        t_args_lang(key, args, self.language_code)
    }

    pub fn menu(&self) -> Reply {
        menu_reply(self.is_admin, self.language_code)
    }

    pub fn prompt(&self, state: WorkflowState) -> Vec<Reply> {
        prompt_for(state, self.language_code)
            .map(Reply::text)
            .into_iter()
            .collect()
    }
}

/// Handle a text message for a user in `state`
pub async fn handle_text_step(
    ctx: &StepContext<'_>,
    state: WorkflowState,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    debug!(user_id = ctx.user_id, state = ?state, "Handling text step");

    match state {
        WorkflowState::Idle => Ok(vec![ctx.menu()]),
        WorkflowState::AddName => handle_place_name_input(ctx, text).await,
        WorkflowState::AddType => handle_place_type_input(ctx, text).await,
        WorkflowState::AddAddress => handle_place_address_input(ctx, text).await,
        WorkflowState::AddPhoto => handle_photo_skip_input(ctx, text).await,
        WorkflowState::EditName => handle_edit_name_input(ctx, text).await,
        WorkflowState::EditType => handle_edit_type_input(ctx, text).await,
        WorkflowState::AddReview => handle_review_text_input(ctx, text).await,
        WorkflowState::AddRating => handle_rating_input(ctx, text).await,
    }
}

/// Handle a photo message for a user in `state`
pub async fn handle_photo_step(
    ctx: &StepContext<'_>,
    state: WorkflowState,
    photo_ref: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    match state {
        WorkflowState::Idle => Ok(vec![ctx.menu()]),
        WorkflowState::AddPhoto => handle_place_photo_input(ctx, photo_ref).await,
        _ => Err(WorkflowError::invalid(state, "invalid-photo-unexpected")),
    }
}

async fn handle_place_name_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddName;
    let name = validate_place_name(text).map_err(|reason| WorkflowError::invalid(state, reason))?;

    let next_id = db::next_place_id(ctx.pool).await?.to_string();
    ctx.sessions.set(ctx.user_id, SessionField::PlaceName(name.clone()));
    ctx.transition(state, WorkflowState::AddType).await?;

    let mut replies = vec![Reply::text(ctx.t_args(
        "place-name-saved",
        &[("name", name.as_str()), ("id", next_id.as_str())],
    ))];
    replies.extend(ctx.prompt(WorkflowState::AddType));
    Ok(replies)
}

async fn handle_place_type_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddType;
    let session = ctx.sessions.get(ctx.user_id);
    if session.place_name.is_none() {
        return Err(WorkflowError::lost(state, "place_name"));
    }

    let code = parse_type_choice(text).map_err(|reason| WorkflowError::invalid(state, reason))?;
    ctx.sessions.set(ctx.user_id, SessionField::PlaceType(code));
    ctx.transition(state, WorkflowState::AddAddress).await?;

    Ok(ctx.prompt(WorkflowState::AddAddress))
}

async fn handle_place_address_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddAddress;
    let session = ctx.sessions.get(ctx.user_id);
    let name = session
        .place_name
        .ok_or_else(|| WorkflowError::lost(state, "place_name"))?;
    let code = session
        .place_type
        .ok_or_else(|| WorkflowError::lost(state, "place_type"))?;

    let address = validate_address(text).map_err(|reason| WorkflowError::invalid(state, reason))?;

    // the id is kept as soon as the row exists, a resent address reuses it
    let place_id = match session.place_id {
        Some(id) => id,
        None => {
            let id = db::create_place(ctx.pool, &name, &PlaceType::Numbered(code)).await?;
            ctx.sessions.set(ctx.user_id, SessionField::PlaceId(id));
            id
        }
    };
    if !db::set_place_address(ctx.pool, place_id, &address).await? {
        return Err(WorkflowError::PlaceGone(place_id));
    }
    ctx.transition(state, WorkflowState::AddPhoto).await?;

    let mut replies = vec![Reply::text(ctx.t_args(
        "place-saved",
        &[("name", name.as_str()), ("id", place_id.to_string().as_str())],
    ))];
    replies.extend(ctx.prompt(WorkflowState::AddPhoto));
    Ok(replies)
}

async fn handle_place_photo_input(
    ctx: &StepContext<'_>,
    photo_ref: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddPhoto;
    let session = ctx.sessions.get(ctx.user_id);
    let place_id = session
        .place_id
        .ok_or_else(|| WorkflowError::lost(state, "place_id"))?;

    if !db::set_place_photo(ctx.pool, place_id, photo_ref).await? {
        return Err(WorkflowError::PlaceGone(place_id));
    }
    ctx.reset(state).await?;

    Ok(vec![
        Reply::text(ctx.t("place-created-with-photo")),
        ctx.menu(),
    ])
}

async fn handle_photo_skip_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddPhoto;
    let session = ctx.sessions.get(ctx.user_id);
    if session.place_id.is_none() {
        return Err(WorkflowError::lost(state, "place_id"));
    }

    if !is_skip_word(text) {
        return Err(WorkflowError::invalid(state, "invalid-photo-expected"));
    }
    ctx.reset(state).await?;

    Ok(vec![
        Reply::text(ctx.t("place-created-without-photo")),
        ctx.menu(),
    ])
}

async fn handle_edit_name_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::EditName;
    let place_id = ctx
        .sessions
        .get(ctx.user_id)
        .edit_place_id
        .ok_or_else(|| WorkflowError::lost(state, "edit_place_id"))?;

    let name = validate_place_name(text).map_err(|reason| WorkflowError::invalid(state, reason))?;
    if !db::set_place_name(ctx.pool, place_id, &name).await? {
        return Err(WorkflowError::PlaceGone(place_id));
    }
    ctx.reset(state).await?;

    Ok(vec![
        Reply::text(ctx.t_args("place-renamed", &[("name", name.as_str())])),
        ctx.menu(),
    ])
}

async fn handle_edit_type_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::EditType;
    let place_id = ctx
        .sessions
        .get(ctx.user_id)
        .edit_place_id
        .ok_or_else(|| WorkflowError::lost(state, "edit_place_id"))?;

    let code = parse_type_choice(text).map_err(|reason| WorkflowError::invalid(state, reason))?;
    if !db::set_place_type(ctx.pool, place_id, &PlaceType::Numbered(code)).await? {
        return Err(WorkflowError::PlaceGone(place_id));
    }
    ctx.reset(state).await?;

    Ok(vec![Reply::text(ctx.t("place-type-changed")), ctx.menu()])
}

async fn handle_review_text_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddReview;
    let session = ctx.sessions.get(ctx.user_id);
    let place_id = session
        .review_place_id
        .ok_or_else(|| WorkflowError::lost(state, "review_place_id"))?;

    let body = validate_review_text(text).map_err(|reason| WorkflowError::invalid(state, reason))?;
    if db::get_place(ctx.pool, place_id).await?.is_none() {
        return Err(WorkflowError::PlaceGone(place_id));
    }

    // a review stored by an earlier attempt is rewritten, never stored twice
    match session.review_id {
        Some(review_id) => {
            if !db::set_review_text(ctx.pool, review_id, &body).await? {
                return Err(WorkflowError::PlaceGone(place_id));
            }
        }
        None => {
            let review_id = db::add_review(ctx.pool, ctx.user_id, place_id, &body, None).await?;
            ctx.sessions.set(ctx.user_id, SessionField::ReviewId(review_id));
        }
    }
    ctx.transition(state, WorkflowState::AddRating).await?;

    Ok(ctx.prompt(WorkflowState::AddRating))
}

async fn handle_rating_input(
    ctx: &StepContext<'_>,
    text: &str,
) -> Result<Vec<Reply>, WorkflowError> {
    let state = WorkflowState::AddRating;
    let session = ctx.sessions.get(ctx.user_id);
    let review_id = session
        .review_id
        .ok_or_else(|| WorkflowError::lost(state, "review_id"))?;

    let rating = parse_rating(text).map_err(|reason| WorkflowError::invalid(state, reason))?;
    if !db::set_review_rating(ctx.pool, review_id, rating).await? {
        // the review went away together with its place
        return Err(WorkflowError::PlaceGone(
            session.review_place_id.unwrap_or_default(),
        ));
    }
    ctx.reset(state).await?;

    Ok(vec![Reply::text(ctx.t("review-saved")), ctx.menu()])
}
