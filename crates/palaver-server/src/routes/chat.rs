use super::{error_response, ErrorResponse};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::Stream;
use palaver::chat::EventReceiver;
use palaver::errors::ChatError;
use palaver::models::{message::Message, role::Role};
use serde::Deserialize;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tracing::{error, info};

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

/// Server-sent events carrying a reply. A failed reply aborts the body, which the
/// client sees as a broken stream.
pub struct SseResponse {
    rx: EventReceiver,
}

impl SseResponse {
    fn new(rx: EventReceiver) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, ChatError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|opt| {
            opt.map(|item| {
                let frame = item?
                    .to_frame()
                    .map_err(|e| ChatError::Internal(e.to_string()))?;
                Ok(Bytes::from(frame))
            })
        })
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONTENT_ENCODING, "none"),
            ],
            Body::from_stream(self),
        )
            .into_response()
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<SseResponse, ErrorResponse> {
    let user_message = match request.messages.last() {
        Some(message) if message.role == Role::User => message.clone(),
        Some(message) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                format!("Last message must be from the user, got {}", message.role.as_str()),
            ))
        }
        None => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "At least one message is required",
            ))
        }
    };

    // Function results only exist inside a reply, with the function name the client lacks
    if request.messages.iter().any(|m| m.role == Role::Function) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Function messages cannot be posted",
        ));
    }

    if let Err(e) = state.store.save(&user_message).await {
        error!(message_id = %user_message.id, "Failed to save user message: {}", e);
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to save message",
        ));
    }
    info!(
        conversation_id = %user_message.conversation_id,
        history = request.messages.len(),
        "replying"
    );

    let rx = state.responder.respond(user_message, request.messages);
    Ok(SseResponse::new(rx))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .with_state(state)
}
