use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::error::ApiError;
use crate::web::models::{ChatRequest, ChatResponse};
use crate::web::AppState;

/// Largest accepted chat body.
const JSON_LIMIT: usize = 100 * 1024;

/// Body extraction for the chat API. Unreadable bodies are answered like a
/// missing `message`, oversized ones with 413.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .content_type_required(false)
        .error_handler(|err, _req| {
            let api_err = match &err {
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                    ApiError::PayloadTooLarge
                }
                _ => ApiError::MissingMessage,
            };
            warn!("Rejected chat body: {}", err);
            api_err.into()
        })
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let ChatRequest { message, history } = req.into_inner();

    let message = match message {
        Some(message) if !message.is_empty() => message,
        _ => {
            warn!("Chat request {} rejected: missing 'message'", request_id);
            return Err(ApiError::MissingMessage);
        }
    };

    let conversation = Conversation::assemble(&data.persona.text, history.as_ref(), message);

    let injected = conversation.injected_system_turns();
    if injected > 0 {
        warn!(
            "Chat request {} carries {} system-role history entries; forwarding as-is",
            request_id, injected
        );
    }

    info!(
        "Chat request {}: {} messages ({} from history)",
        request_id,
        conversation.len(),
        conversation.history().len()
    );
    debug!("Conversation for {}: {:?}", request_id, conversation);

    let reply = data
        .completion
        .complete(&conversation)
        .await
        .map_err(|e| {
            error!("Chat request {} failed: {}", request_id, e);
            ApiError::from(e)
        })?;

    info!("Chat request {} answered ({} characters)", request_id, reply.len());
    Ok(HttpResponse::Ok().json(ChatResponse { reply }))
}
