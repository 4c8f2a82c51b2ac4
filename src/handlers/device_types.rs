use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::*;
use crate::AppState;

use super::ApiError;

/// List all manufacturers
pub async fn list_manufacturers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Manufacturer>>, ApiError> {
    let manufacturers = state.store.list_manufacturers().await?;
    Ok(Json(manufacturers))
}

/// List all device types
pub async fn list_device_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceType>>, ApiError> {
    let device_types = state.store.list_device_types().await?;
    Ok(Json(device_types))
}

/// Get a single device type, with its interface templates, by model name
pub async fn get_device_type(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
) -> Result<Json<DeviceTypeDetail>, ApiError> {
    let detail = state.store.get_device_type_detail(&model).await?;
    Ok(Json(detail))
}
