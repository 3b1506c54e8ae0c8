//! SSE status stream endpoint.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /status
///
/// One SSE event per status envelope addressed to the authenticated
/// user. The subscription is released when the client disconnects.
pub async fn status_stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state
        .gateway
        .open_stream(user.user_id)
        .filter_map(|envelope| async move {
            match Event::default().json_data(&envelope) {
                Ok(event) => Some(Ok::<_, Infallible>(event)),
                Err(e) => {
                    warn!(error = %e, "Failed to encode status event; skipped");
                    None
                }
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
