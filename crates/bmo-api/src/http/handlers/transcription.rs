//! POST /api/v1/transcription - retired endpoint.
//!
//! Speech recognition runs in the browser now; the route stays so old
//! clients get a clear 410 instead of a 404.

use crate::http::error::AppError;

pub const RETIRED_MESSAGE: &str = "Server-side transcription has been retired. \
     Use the browser Web Speech integration shipped in the frontend instead.";

pub async fn transcribe() -> AppError {
    AppError::Gone(RETIRED_MESSAGE.to_string())
}
