use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Sse};
use serde::{Deserialize, Serialize};
use shuttersync_api::{AccessoryInfo, AccessorySnapshot};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::errors::ApiError;
use crate::services::{Accessory, EventBus};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueBody<T> {
    pub value: T,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessoryBody {
    pub info: AccessoryInfo,
    pub characteristics: AccessorySnapshot,
}

#[derive(Clone)]
pub struct AccessoryState {
    pub accessory: Arc<Accessory>,
    pub event_bus: EventBus,
}

pub async fn get_accessory(
    State(state): State<AccessoryState>,
) -> Result<impl IntoResponse, ApiError> {
    let characteristics = state.accessory.snapshot().await?;

    Ok(Json(AccessoryBody {
        info: state.accessory.info().clone(),
        characteristics,
    }))
}

pub async fn get_current_position(
    State(state): State<AccessoryState>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state.accessory.current_position().await?;
    Ok(Json(ValueBody { value }))
}

pub async fn get_target_position(
    State(state): State<AccessoryState>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state.accessory.target_position().await?;
    Ok(Json(ValueBody { value }))
}

pub async fn set_target_position(
    State(state): State<AccessoryState>,
    payload: Result<Json<ValueBody<u8>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    state.accessory.set_target_position(body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_position_state(
    State(state): State<AccessoryState>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state.accessory.position_state().await?;
    Ok(Json(ValueBody { value }))
}

pub async fn get_obstruction_detected(
    State(state): State<AccessoryState>,
) -> Result<impl IntoResponse, ApiError> {
    let value = state.accessory.obstruction_detected().await?;
    Ok(Json(ValueBody { value }))
}

pub async fn set_hold_position(
    State(state): State<AccessoryState>,
    payload: Result<Json<ValueBody<bool>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    state.accessory.set_hold_position(body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_on(State(state): State<AccessoryState>) -> Result<impl IntoResponse, ApiError> {
    let value = state.accessory.is_moving().await?;
    Ok(Json(ValueBody { value }))
}

pub async fn set_on(
    State(state): State<AccessoryState>,
    payload: Result<Json<ValueBody<bool>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    state.accessory.set_on(body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn characteristic_events(
    State(state): State<AccessoryState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.event_bus.subscribe();

    // Lagging subscribers skip what they missed
    let stream = BroadcastStream::new(receiver).filter_map(|result| {
        let characteristic = result.ok()?;
        let data = serde_json::to_string(&characteristic).ok()?;
        Some(Ok(Event::default().data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
