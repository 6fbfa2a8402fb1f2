//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::id_generator::SHORT_CODE_ALPHABET;

/// Longest code this service ever generates.
const MAX_CODE_LEN: usize = 32;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Reject codes that could never have been generated
/// 2. Check the cache
/// 3. On a miss or cache error, resolve through the link registry and
///    populate the cache in the background
/// 4. Return `302 Found` with `Location` set to the URL exactly as submitted
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if code.is_empty()
        || code.len() > MAX_CODE_LEN
        || !code.chars().all(|c| SHORT_CODE_ALPHABET.contains(c))
    {
        return Err(AppError::not_found("short link not found"));
    }

    let original_url = match state.cache.get_url(&code).await {
        Ok(Some(url)) => {
            debug!(code = %code, "redirect served from cache");
            url
        }
        Ok(None) => {
            let link = state.link_service.get_by_code(&code).await?;

            let cache = state.cache.clone();
            let url = link.original_url.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_url(&code, &url, None).await {
                    warn!(error = %e, "failed to cache redirect");
                }
            });

            link.original_url
        }
        Err(e) => {
            warn!(error = %e, "cache lookup failed, using link registry");
            state.link_service.get_by_code(&code).await?.original_url
        }
    };

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]))
}
