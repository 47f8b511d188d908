use axum::{extract::State, Extension, Json};
use tracing::info;

use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{ChatRequest, ChatResponse};
use crate::router::ChatState;
use crate::services::chat::ChatService;

pub async fn chat(
    State(state): State<ChatState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    require_role(&user, &[Role::Patient])?;
    info!("Chat message from patient {}", user.id);

    let service = ChatService::new(&state.config, state.triage.clone(), state.hub.clone());
    let mut conversation = state.store.checkout(user.id).await;
    let result = service
        .handle(user.id, &mut *conversation, &request.user_message)
        .await;
    state.store.checkin(user.id, conversation).await;

    Ok(Json(result?))
}
