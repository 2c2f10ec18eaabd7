//! The delivery endpoints: `GET /image/{source}` and the ephemeral
//! thumbnail fetch.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Path, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use framecast_core::processing::{option_map, Palette, ProcessingSettings};
use serde::de::DeserializeOwned;

use crate::delivery::selector::PhotoSource;
use crate::delivery::{panel, pipeline, served_cache};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image/{source}", get(serve_image))
        .route("/served-image-thumbnail/{id}", get(served_thumbnail))
}

/// Compose, process, and return the next image for a polling device.
async fn serve_image(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(source): Path<String>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
) -> AppResult<Response> {
    let source: PhotoSource = source
        .parse()
        .map_err(|_| AppError::NotFound("invalid source".into()))?;

    let resolved = panel::resolve(&state.pool, &headers, client_ip.as_deref()).await?;

    tracing::info!(
        source = ?source,
        device = resolved.device.as_ref().map(|d| d.name.as_str()),
        logical_w = resolved.geometry.logical_w,
        logical_h = resolved.geometry.logical_h,
        "Serving image"
    );

    // Converter options advertised by the request itself.
    let settings: Option<ProcessingSettings> = parse_header_json(&headers, "x-processing-settings");
    let palette: Option<Palette> = parse_header_json(&headers, "x-color-palette");
    let extra = option_map(settings.as_ref(), palette.as_ref());

    let outcome = pipeline::run(&state, &resolved, source, extra).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));

    // Side-channel thumbnail: cache it and advertise the URL.
    if let Some(thumb) = &outcome.thumbnail {
        match served_cache::store(&state.config.data_dir, thumb).await {
            Ok(id) => {
                let request_host = headers
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("localhost");
                let url = format!("http://{request_host}/served-image-thumbnail/{id}");
                if let Ok(value) = url.parse() {
                    response_headers.insert("x-thumbnail-url", value);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to cache served thumbnail");
            }
        }
    }

    Ok((StatusCode::OK, response_headers, outcome.processed).into_response())
}

/// Return a cached thumbnail once; each fetch schedules deletion five
/// minutes out.
async fn served_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if !served_cache::is_valid_id(&id) {
        return Err(AppError::BadRequest("invalid id".into()));
    }

    let bytes = served_cache::read(&state.config.data_dir, &id)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read thumbnail: {e}")))?
        .ok_or_else(|| AppError::NotFound("thumbnail not found".into()))?;

    served_cache::schedule_delete(served_cache::thumb_path(&state.config.data_dir, &id));

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "image/jpeg")],
        bytes,
    )
        .into_response())
}

/// Best client-IP guess for device matching: proxy headers first, then
/// the socket address (absent in in-process tests).
struct ClientIp(Option<String>);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let connect_info = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        Ok(ClientIp(client_ip(&parts.headers, connect_info)))
    }
}

fn client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        if !real_ip.is_empty() {
            return Some(real_ip.to_string());
        }
    }
    connect_info.map(|ci| ci.0.ip().to_string())
}

/// Parse an optional JSON request header; malformed values are logged
/// and ignored rather than failing the request.
fn parse_header_json<T: DeserializeOwned>(headers: &HeaderMap, name: &str) -> Option<T> {
    let raw = headers.get(name)?.to_str().ok()?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(header = name, error = %e, "Ignoring malformed header");
            None
        }
    }
}
