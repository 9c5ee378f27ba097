//! Real-time notification stream

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use super::AuthenticatedUser;

/// Subscribe to circulation events over Server-Sent Events. Each event is a
/// JSON payload with its kind and entity identifiers.
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "SSE stream of circulation events"),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn stream_events(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, crate::error::AppError> {
    claims.require_staff()?;

    let receiver = state.notifier.subscribe();

    let stream = BroadcastStream::new(receiver)
        // a lagging client just misses the dropped events
        .filter_map(|message| message.ok())
        .map(|event| Event::default().event(event.kind.as_str()).json_data(&event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
