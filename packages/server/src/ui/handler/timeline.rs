//! Handlers for `/`: the streaming timeline (GET), posting (POST) and every other method.

use std::sync::Arc;

use axum::{
    Form,
    body::Body,
    extract::{State, rejection::FormRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::ui::state::AppState;

/// Name of the form field carrying the message
const MESSAGE_FIELD: &str = "msg";

/// Open the long-lived chunked response for one client
pub async fn stream_timeline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = Body::from_stream(state.stream_connection_usecase.execute());
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body)
}

/// Admit a post and always redirect back to the timeline with `302 Found`
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> impl IntoResponse {
    let raw = match form {
        Ok(Form(fields)) => first_message(fields),
        Err(rejection) => {
            tracing::debug!("Unreadable post body, treating as empty: {}", rejection);
            String::new()
        }
    };

    match state.submit_message_usecase.execute(&raw) {
        Ok(update) => tracing::info!("Accepted message posted at {}", update.timestamp()),
        Err(e) => tracing::debug!("Ignored post: {}", e),
    }

    (StatusCode::FOUND, [(header::LOCATION, "/")])
}

/// Methods other than GET and POST get an empty `200 OK`
pub async fn ignore_method() -> StatusCode {
    StatusCode::OK
}

/// First value of the message field; repeated fields after it are ignored
fn first_message(fields: Vec<(String, String)>) -> String {
    fields
        .into_iter()
        .find_map(|(name, value)| (name == MESSAGE_FIELD).then_some(value))
        .unwrap_or_default()
}
