//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    error::IntervalError,
    state::{AppState, IntervalMinutes},
    utils::display::format_clock,
};
use super::responses::{ApiError, ApiResponse, BellView, HealthResponse, PresetEntry, StatusResponse};

/// Body of PUT /interval. `minutes` may arrive as a number or a string.
#[derive(Debug, Deserialize)]
pub struct IntervalRequest {
    pub minutes: Value,
}

impl IntervalRequest {
    fn interval(&self) -> Result<IntervalMinutes, IntervalError> {
        match &self.minutes {
            Value::Number(n) => match n.as_i64() {
                Some(minutes) => IntervalMinutes::new(minutes),
                None => Err(IntervalError::NotNumeric(n.to_string())),
            },
            Value::String(s) => s.parse(),
            other => Err(IntervalError::NotNumeric(other.to_string())),
        }
    }
}

/// Handle POST /start - Start chiming with the selected interval
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.start().inspect_err(|e| warn!("Start rejected: {}", e))?;
    info!("Start endpoint called");
    let cycle = snapshot.displayed_cycle();
    Ok(Json(ApiResponse::new(format!("Timer started with a {} cycle", cycle), &snapshot)))
}

/// Handle POST /pause - Pause the running timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.pause().inspect_err(|e| warn!("Pause rejected: {}", e))?;
    info!("Pause endpoint called");
    Ok(Json(ApiResponse::new("Timer paused".to_string(), &snapshot)))
}

/// Handle POST /resume - Resume the paused timer
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.resume().inspect_err(|e| warn!("Resume rejected: {}", e))?;
    info!("Resume endpoint called");
    Ok(Json(ApiResponse::new("Timer resumed".to_string(), &snapshot)))
}

/// Handle POST /stop - Stop the timer and return to idle
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state.stop().inspect_err(|e| warn!("Stop rejected: {}", e))?;
    info!("Stop endpoint called");
    Ok(Json(ApiResponse::new("Timer stopped".to_string(), &snapshot)))
}

/// Handle PUT /interval - Edit the interval selection
pub async fn interval_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IntervalRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(request) = payload.inspect_err(|e| warn!("Interval body rejected: {}", e.body_text()))?;
    let interval = request
        .interval()
        .inspect_err(|e| warn!("Interval rejected: {}", e))?;
    let snapshot = state.set_interval(interval);
    Ok(Json(ApiResponse::new(format!("Interval set to {}", interval), &snapshot)))
}

/// Handle POST /preset/:minutes - Select a quick preset
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<u32>,
) -> Result<Json<ApiResponse>, ApiError> {
    let snapshot = state
        .select_preset(minutes)
        .inspect_err(|e| warn!("Preset rejected: {}", e))?;
    Ok(Json(ApiResponse::new(format!("Interval set to {}m", minutes), &snapshot)))
}

/// Handle GET /presets - List quick presets
pub async fn presets_handler(State(state): State<Arc<AppState>>) -> Json<Vec<PresetEntry>> {
    Json(PresetEntry::list(state.snapshot().selected.get()))
}

/// Handle GET /status - Return the clock and the bell's current status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let snapshot = state.snapshot();
    let clock = state.clock_reading();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        clock: clock.as_ref().map(format_clock),
        loading: clock.is_none(),
        bell: BellView::new(&snapshot, Local::now()),
        presets: PresetEntry::list(snapshot.selected.get()),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
