use super::{error_response, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use palaver::models::message::Message;

async fn messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Message>>, ErrorResponse> {
    state
        .store
        .conversation(&conversation_id)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(%conversation_id, "Failed to load conversation: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load conversation")
        })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/conversations/:id/messages", get(messages))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{configure, testing};
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_lists_saved_messages() {
        let state = testing::state(vec![]);
        let user = Message::user("u1", "c1").with_text("Hi");
        let reply = Message::reply_to(&user, "a1").with_text("Hello!");
        state.store.save(&user).await.unwrap();
        state.store.save(&reply).await.unwrap();
        state
            .store
            .save(&Message::user("u2", "c2").with_text("Elsewhere"))
            .await
            .unwrap();
        let app = configure(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/conversations/c1/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let messages: Vec<Message> = serde_json::from_slice(&body).unwrap();
        assert_eq!(messages, vec![user, reply]);
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_empty() {
        let app = configure(testing::state(vec![]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/conversations/missing/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"[]");
    }
}
