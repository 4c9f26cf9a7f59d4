//! API response structures

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::{
    error::{IntervalError, TransitionError},
    state::{BellSnapshot, TimerPhase, QUICK_PRESETS},
    utils::display::{chime_wall_time, cycle_label, format_clock, format_countdown},
};

/// Which controls are available in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub start: bool,
    pub pause: bool,
    pub resume: bool,
    pub stop: bool,
}

impl Controls {
    pub fn for_phase(phase: TimerPhase) -> Self {
        Self {
            start: phase == TimerPhase::Idle,
            pause: phase == TimerPhase::Running,
            resume: phase == TimerPhase::Paused,
            stop: phase != TimerPhase::Idle,
        }
    }
}

/// A quick preset and whether it matches the current selection
#[derive(Debug, Clone, Serialize)]
pub struct PresetEntry {
    pub minutes: u32,
    pub selected: bool,
}

impl PresetEntry {
    pub fn list(selected_minutes: u32) -> Vec<Self> {
        QUICK_PRESETS
            .iter()
            .map(|&minutes| Self {
                minutes,
                selected: minutes == selected_minutes,
            })
            .collect()
    }
}

/// Display values derived from a snapshot; recomputed on every request
#[derive(Debug, Clone, Serialize)]
pub struct BellView {
    pub state: TimerPhase,
    pub selected_minutes: u32,
    pub active_cycle_minutes: Option<u32>,
    pub cycle_label: String,
    /// Wall-clock time of the next chime; projected from the remaining time when paused
    pub next_chime_at: Option<String>,
    pub remaining_seconds: Option<u64>,
    pub remaining: Option<String>,
    pub progress: f64,
    pub chimes: u64,
    pub controls: Controls,
}

impl BellView {
    pub fn new(snapshot: &BellSnapshot, now: DateTime<Local>) -> Self {
        let next_chime_at = snapshot
            .remaining
            .and_then(|remaining| chime_wall_time(&now, remaining))
            .map(|at| format_clock(&at));

        Self {
            state: snapshot.phase(),
            selected_minutes: snapshot.selected.get(),
            active_cycle_minutes: snapshot.active_cycle().map(|cycle| cycle.get()),
            cycle_label: cycle_label(snapshot.displayed_cycle()),
            next_chime_at,
            remaining_seconds: snapshot.remaining.map(|r| r.as_secs()),
            remaining: snapshot.remaining.map(format_countdown),
            progress: snapshot.progress,
            chimes: snapshot.chimes,
            controls: Controls::for_phase(snapshot.phase()),
        }
    }
}

/// API response structure for control endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: TimerPhase,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub bell: BellView,
}

impl ApiResponse {
    /// Create a new API response from the snapshot taken by the action
    pub fn new(message: String, snapshot: &BellSnapshot) -> Self {
        Self {
            status: snapshot.phase(),
            message,
            timestamp: Utc::now(),
            bell: BellView::new(snapshot, Local::now()),
        }
    }
}

/// Full status including the clock and server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Current wall clock, `None` until the first tick
    pub clock: Option<String>,
    pub loading: bool,
    #[serde(flatten)]
    pub bell: BellView,
    pub presets: Vec<PresetEntry>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Rejected requests
#[derive(Debug)]
pub enum ApiError {
    Transition(TransitionError),
    Interval(IntervalError),
    /// Body of an interval edit that is not `{"minutes": ...}` JSON
    Body(JsonRejection),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        ApiError::Transition(e)
    }
}

impl From<IntervalError> for ApiError {
    fn from(e: IntervalError) -> Self {
        ApiError::Interval(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Transition(e) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::Interval(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Body(e) => (StatusCode::BAD_REQUEST, e.body_text()),
        };
        let body = ErrorResponse {
            error,
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
