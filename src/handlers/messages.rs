use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    response::Json,
    Form,
};
use serde::Deserialize;

use crate::error::{ApiError, WriteAction};
use crate::state::AppState;

pub const CREATED: &str = "Message créé avec succès";
pub const UPDATED: &str = "Mise à jour du message complète";
pub const DELETED: &str = "Message supprimé avec succès";

/// Form body accepted by create and update
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub content: String,
}

fn require_form(form: Result<Form<MessageForm>, FormRejection>) -> Result<MessageForm, ApiError> {
    form.map(|Form(form)| form)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

// Non-numeric ids fall through to 404 like any unknown route.
fn require_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

/// GET / - Content of every message, oldest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let messages = state.store.list().await?;
    Ok(Json(messages.into_iter().map(|m| m.content).collect()))
}

/// POST / - Create a message from the `content` form field
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<MessageForm>, FormRejection>,
) -> Result<&'static str, ApiError> {
    let form = require_form(form)?;

    let message = state
        .store
        .create(&form.content)
        .await
        .map_err(|e| ApiError::from_write(WriteAction::Create, e, state.legacy_error_status()))?;

    tracing::debug!("Created message {}", message.id);
    Ok(CREATED)
}

/// POST /update/:id - Replace the content of an existing message
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    form: Result<Form<MessageForm>, FormRejection>,
) -> Result<&'static str, ApiError> {
    let id = require_id(id)?;
    let message = state.store.get_404(id).await?;
    let form = require_form(form)?;

    state
        .store
        .update_content(message.id, &form.content)
        .await
        .map_err(|e| ApiError::from_write(WriteAction::Update, e, state.legacy_error_status()))?;

    tracing::debug!("Updated message {}", message.id);
    Ok(UPDATED)
}

/// POST /delete/:id - Permanently remove a message
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<&'static str, ApiError> {
    let id = require_id(id)?;
    let message = state.store.get_404(id).await?;

    state
        .store
        .delete(message.id)
        .await
        .map_err(|e| ApiError::from_write(WriteAction::Delete, e, state.legacy_error_status()))?;

    tracing::debug!("Deleted message {}", message.id);
    Ok(DELETED)
}
