//! HTTP API server, the control surface of the counter
//!
//! This module provides a REST API for driving the counting session:
//! - GET  /counter                - Live count, malas and elapsed time
//! - POST /counter/increment      - Add one repetition
//! - POST /counter/decrement      - Remove one repetition
//! - POST /counter/reset          - Zero the counter
//! - POST /counter/save           - Freeze the session into the history
//! - GET  /sessions               - Saved sessions, newest first
//! - DELETE /sessions/:id         - Remove one saved session
//! - GET/PUT /settings            - Mantra, mala length, sound toggle
//! - POST /voice/start, /voice/finish - Voice counting cycle
//! - GET  /health                 - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
