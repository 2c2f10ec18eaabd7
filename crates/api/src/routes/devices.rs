//! Device management: CRUD, server-side push, and remote source
//! configuration.
//!
//! Registration discovers the panel from the device itself: name and
//! dimensions from `/api/system-info`, orientation from `/api/config`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use framecast_core::error::CoreError;
use framecast_core::processing::option_map;
use framecast_core::types::DbId;
use framecast_db::models::device::{CreateDeviceRequest, Device, NewDevice, UpdateDeviceRequest};
use framecast_db::repositories::DeviceRepo;
use serde::Deserialize;
use serde_json::json;

use crate::delivery::panel::ResolvedPanel;
use crate::delivery::pipeline;
use crate::delivery::selector::PhotoSource;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthToken;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(add_device))
        .route("/devices/{id}", put(update_device).delete(delete_device))
        .route("/devices/{id}/push", post(push_to_device))
        .route("/devices/{id}/configure-source", post(configure_source))
}

async fn list_devices(
    _auth: AuthToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Device>>> {
    Ok(Json(DeviceRepo::list(&state.pool).await?))
}

async fn add_device(
    _auth: AuthToken,
    State(state): State<AppState>,
    Json(input): Json<CreateDeviceRequest>,
) -> AppResult<impl IntoResponse> {
    let info = state.frame.fetch_system_info(&input.host).await?;
    let config = state.frame.fetch_device_config(&input.host).await?;

    if info.width == 0 || info.height == 0 {
        return Err(AppError::BadRequest("device dimensions are required".into()));
    }

    let name = if info.device_name.is_empty() {
        input.host.clone()
    } else {
        info.device_name
    };
    let orientation = if config.display_orientation.is_empty() {
        "landscape".to_string()
    } else {
        config.display_orientation
    };
    let display_mode = if input.display_mode.is_empty() {
        "cover".to_string()
    } else {
        input.display_mode
    };

    let device = DeviceRepo::create(
        &state.pool,
        &NewDevice {
            name,
            host: input.host,
            width: info.width,
            height: info.height,
            orientation,
            use_device_parameter: input.use_device_parameter,
            enable_collage: input.enable_collage,
            show_date: input.show_date,
            show_weather: input.show_weather,
            weather_lat: input.weather_lat,
            weather_lon: input.weather_lon,
            layout: input.layout,
            display_mode,
            show_calendar: input.show_calendar,
            calendar_id: input.calendar_id,
            ai_provider: String::new(),
            ai_model: String::new(),
            ai_prompt: String::new(),
        },
    )
    .await?;

    tracing::info!(device_id = device.id, host = %device.host, "Registered device");
    Ok((StatusCode::CREATED, Json(device)))
}

async fn update_device(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeviceRequest>,
) -> AppResult<Json<Device>> {
    let existing = DeviceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "device",
            id,
        }))?;

    let mut name = input.name;
    let mut width = input.width;
    let mut height = input.height;
    let mut orientation = input.orientation;

    // Absent identity fields ask for a refresh from the device.
    let should_refresh = name.is_empty() || width == 0 || height == 0 || orientation.is_empty();
    if should_refresh {
        let info = state.frame.fetch_system_info(&input.host).await?;
        if name.is_empty() {
            name = info.device_name;
        }
        width = info.width;
        height = info.height;

        let config = state.frame.fetch_device_config(&input.host).await?;
        if !config.display_orientation.is_empty() {
            orientation = config.display_orientation;
        }
    }

    if name.is_empty() {
        name = existing.name.clone();
    }
    if name.is_empty() {
        name = input.host.clone();
    }
    if width == 0 || height == 0 {
        return Err(AppError::BadRequest("device dimensions are required".into()));
    }
    let display_mode = if input.display_mode.is_empty() {
        "cover".to_string()
    } else {
        input.display_mode
    };

    let device = DeviceRepo::save(
        &state.pool,
        id,
        &NewDevice {
            name,
            host: input.host,
            width,
            height,
            orientation,
            use_device_parameter: input.use_device_parameter,
            enable_collage: input.enable_collage,
            show_date: input.show_date,
            show_weather: input.show_weather,
            weather_lat: input.weather_lat,
            weather_lon: input.weather_lon,
            layout: input.layout,
            display_mode,
            show_calendar: input.show_calendar,
            calendar_id: input.calendar_id,
            ai_provider: input.ai_provider,
            ai_model: input.ai_model,
            ai_prompt: input.ai_prompt,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "device",
        id,
    }))?;

    Ok(Json(device))
}

async fn delete_device(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    if !DeviceRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "device",
            id,
        }));
    }
    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Default, Deserialize)]
struct PushRequest {
    #[serde(default)]
    source: Option<String>,
}

/// Run the delivery pipeline server-side and push the result to the
/// device instead of returning it.
async fn push_to_device(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: axum::body::Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let mut device = DeviceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "device",
            id,
        }))?;

    // The body is optional; an empty one means "default source".
    let request: PushRequest = if body.is_empty() {
        PushRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid push request: {e}")))?
    };
    let source: PhotoSource = request
        .source
        .unwrap_or_else(|| "google_photos".to_string())
        .parse()
        .map_err(AppError::Core)?;

    // Fetch live panel parameters when the device advertises them.
    let mut extra = std::collections::BTreeMap::new();
    if device.use_device_parameter {
        match state.frame.fetch_system_info(&device.host).await {
            Ok(info) if info.width > 0 && info.height > 0 => {
                device.width = info.width;
                device.height = info.height;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(device = %device.name, error = %e, "Failed to fetch dimensions")
            }
        }

        let settings = match state.frame.fetch_processing_settings(&device.host).await {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(device = %device.name, error = %e, "Failed to fetch processing settings");
                None
            }
        };
        let palette = match state.frame.fetch_palette(&device.host).await {
            Ok(palette) => Some(palette),
            Err(e) => {
                tracing::warn!(device = %device.name, error = %e, "Failed to fetch palette");
                None
            }
        };
        extra = option_map(settings.as_ref(), palette.as_ref());
    }

    let host = device.host.clone();
    let resolved = ResolvedPanel::from_device(device);
    let outcome = pipeline::run(&state, &resolved, source, extra).await?;

    state
        .frame
        .push_image(&host, outcome.processed, outcome.thumbnail)
        .await?;

    Ok(Json(json!({ "status": "pushed" })))
}

/// Forward a configuration map to the device's `/api/config`.
async fn configure_source(
    _auth: AuthToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(config): Json<serde_json::Value>,
) -> AppResult<Json<serde_json::Value>> {
    let device = DeviceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "device",
            id,
        }))?;

    state.frame.push_config(&device.host, &config).await?;
    Ok(Json(json!({ "status": "configured" })))
}
