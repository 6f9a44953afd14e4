use super::state::AppState;
use crate::session::{CounterStatus, SessionRecord};
use crate::voice::{VoiceError, VoicePhase};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub mantra: String,
    pub mala_reps: u32,
    pub sound_on_count: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub mantra: Option<String>,
    pub mala_reps: Option<u32>,
    pub sound_on_count: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct VoiceStartResponse {
    pub phase: VoicePhase,
}

#[derive(Debug, Serialize)]
pub struct VoiceFinishResponse {
    /// Chants detected in the recording
    pub added: u64,

    /// Running count after adding them
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Counter Handlers
// ============================================================================

/// GET /counter
/// Current count, malas completed, elapsed time and mantra
pub async fn get_counter(State(state): State<AppState>) -> Json<CounterStatus> {
    Json(state.counter.status())
}

/// POST /counter/increment
pub async fn increment(State(state): State<AppState>) -> Json<CounterStatus> {
    state.counter.increment();
    Json(state.counter.status())
}

/// POST /counter/decrement
pub async fn decrement(State(state): State<AppState>) -> Json<CounterStatus> {
    state.counter.decrement();
    Json(state.counter.status())
}

/// POST /counter/reset
pub async fn reset(State(state): State<AppState>) -> Json<CounterStatus> {
    state.counter.reset();
    Json(state.counter.status())
}

/// POST /counter/save
/// Freeze the current count into a session record; 409 when there is
/// nothing to save
pub async fn save_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.counter.save() {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => error_response(StatusCode::CONFLICT, "nothing to save: count is 0"),
    }
}

// ============================================================================
// History Handlers
// ============================================================================

/// GET /sessions
/// Saved sessions, newest first
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionRecord>> {
    Json(state.counter.sessions())
}

/// DELETE /sessions/:id
/// Remove one saved session; silent when the id is unknown
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Deleting session: {}", id);
    state.counter.delete_session(&id);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Settings Handlers
// ============================================================================

/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsView> {
    let settings = state.counter.settings();
    Json(SettingsView {
        mantra: settings.mantra(),
        mala_reps: settings.mala_reps(),
        sound_on_count: settings.sound_on_count(),
    })
}

/// PUT /settings
/// Partial update; an invalid repetitions-per-mala is rejected with 422
pub async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let settings = state.counter.settings();

    if let Some(mala_reps) = req.mala_reps {
        if let Err(e) = settings.set_mala_reps(mala_reps) {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }
    }

    if let Some(mantra) = req.mantra {
        settings.set_mantra(mantra);
    }

    if let Some(sound_on_count) = req.sound_on_count {
        settings.set_sound_on_count(sound_on_count);
    }

    (
        StatusCode::OK,
        Json(SettingsView {
            mantra: settings.mantra(),
            mala_reps: settings.mala_reps(),
            sound_on_count: settings.sound_on_count(),
        }),
    )
        .into_response()
}

// ============================================================================
// Voice Handlers
// ============================================================================

/// POST /voice/start
/// Begin a voice-counting recording; 409 while a cycle is active
pub async fn voice_start(State(state): State<AppState>) -> impl IntoResponse {
    let Some(voice) = &state.voice else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "voice counting is not enabled");
    };

    match voice.start() {
        Ok(()) => (
            StatusCode::OK,
            Json(VoiceStartResponse {
                phase: voice.phase(),
            }),
        )
            .into_response(),
        Err(e) => voice_error_response(e),
    }
}

/// POST /voice/finish
/// Stop recording, count chants through the endpoint and add them to the
/// running counter
pub async fn voice_finish(State(state): State<AppState>) -> impl IntoResponse {
    let Some(voice) = &state.voice else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "voice counting is not enabled");
    };

    let mantra = state.counter.settings().mantra();

    match voice.finish(&mantra).await {
        Ok(added) => {
            let count = state.counter.add(added);
            (StatusCode::OK, Json(VoiceFinishResponse { added, count })).into_response()
        }
        Err(e) => voice_error_response(e),
    }
}

fn voice_error_response(error: VoiceError) -> axum::response::Response {
    let status = match &error {
        VoiceError::Busy | VoiceError::NotRecording => StatusCode::CONFLICT,
        VoiceError::Capture(_) => StatusCode::SERVICE_UNAVAILABLE,
        VoiceError::EmptyRecording => StatusCode::UNPROCESSABLE_ENTITY,
        VoiceError::Endpoint(_) | VoiceError::Encode(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, error.to_string())
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
