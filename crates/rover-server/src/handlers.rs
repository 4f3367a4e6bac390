//! HTTP endpoint handlers for the Rover server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Health probe |
//! | `GET` | `/api/maps/{name}` | Map image bytes |
//! | `POST` | `/api/simulation/start` | Start a session, stream events (SSE) |
//! | `POST` | `/api/simulation/pause` | Pause or resume the current session |
//! | `POST` | `/api/simulation/stop` | Stop the current session |
//!
//! The start handler returns a Server-Sent Events stream: one `data:`
//! JSON object per event, ending with exactly one terminal event
//! (`{"status": ...}` or `{"error": ...}`) after which the stream
//! closes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::Stream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use rover_session::{PauseOutcome, ScenarioFile, SessionConfig, SessionEvent, SessionRequest};
use rover_types::{StreamEvent, TerminalStatus};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current session and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (phase, step, session) = state.registry.status().map_or_else(
        || (String::from("idle"), String::from("-"), String::from("-")),
        |status| {
            (
                format!("{:?}", status.phase).to_lowercase(),
                status.step.map_or_else(|| String::from("-"), |s| s.to_string()),
                status.id.to_string(),
            )
        },
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Rover Backend</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.2rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>Rover Backend</h1>
    <p>Robot navigation simulation control surface</p>

    <div>
        <div class="metric">
            <div class="label">Session</div>
            <div class="value">{session}</div>
        </div>
        <div class="metric">
            <div class="label">Phase</div>
            <div class="value">{phase}</div>
        </div>
        <div class="metric">
            <div class="label">Step</div>
            <div class="value">{step}</div>
        </div>
    </div>

    <h2>API</h2>
    <ul>
        <li><code>GET /health</code></li>
        <li><code>GET /api/maps/{{name}}</code></li>
        <li><code>POST /api/simulation/start</code> (SSE)</li>
        <li><code>POST /api/simulation/pause</code></li>
        <li><code>POST /api/simulation/stop</code></li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Health probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rover-backend",
    }))
}

// ---------------------------------------------------------------------------
// GET /api/maps/{name}
// ---------------------------------------------------------------------------

/// Return a map asset's raw bytes.
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.maps.load_bytes(&name).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/start
// ---------------------------------------------------------------------------

/// Start a session and stream its events.
///
/// Validates the request, persists the generated scenario, loads the
/// map, claims the registry slot, and returns the live SSE stream. The
/// stream ends after the terminal event; if the client disconnects
/// early the session is stopped implicitly.
pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SessionRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let config = SessionConfig::build(request, &state.config)?;

    info!(
        map = config.map_name,
        robots = config.robot_count,
        goals = config.goals.len(),
        "start requested"
    );

    ScenarioFile::from_config(&config).save(&state.config.scenario.path)?;

    let background = state.maps.load_image(&config.map_name).await?;
    let session = rover_session::launch(&state.registry, &config, background)?;

    Ok(Sse::new(event_stream(session.events)).keep_alive(KeepAlive::default()))
}

/// Adapt the session's event channel into an SSE stream. The stream
/// ends when the channel closes, which happens only after the worker
/// has pushed its terminal event (or the consumer vanished).
fn event_stream(
    events: mpsc::Receiver<SessionEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(events, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(encode_event(&event)), rx))
    })
}

/// Translate one internal session event into an SSE wire event.
fn encode_event(event: &SessionEvent) -> Event {
    let wire = match event {
        SessionEvent::Frame(frame) => StreamEvent::Frame {
            step: frame.step,
            frame: BASE64.encode(&frame.png),
        },
        SessionEvent::Completed => StreamEvent::Status {
            status: TerminalStatus::Completed,
        },
        SessionEvent::Stopped => StreamEvent::Status {
            status: TerminalStatus::Stopped,
        },
        SessionEvent::Failed(reason) => StreamEvent::Error {
            error: reason.clone(),
        },
    };
    match serde_json::to_string(&wire) {
        Ok(json) => Event::default().data(json),
        Err(err) => {
            // Serialization of these shapes cannot realistically fail;
            // keep the stream alive with an error payload if it does.
            warn!(error = %err, "failed to serialize stream event");
            Event::default().data("{\"error\":\"event serialization failed\"}")
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/simulation/pause
// ---------------------------------------------------------------------------

/// Request body for `POST /api/simulation/pause`.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct PauseRequest {
    /// `true` pauses, `false` resumes. Defaults to pausing.
    #[serde(default = "default_paused")]
    pub paused: bool,
}

const fn default_paused() -> bool {
    true
}

/// Pause or resume the current session.
pub async fn pause(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PauseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.registry.pause(body.paused)?;
    let status = match outcome {
        PauseOutcome::Paused => "paused",
        PauseOutcome::Resumed => "resumed",
    };
    Ok(Json(serde_json::json!({ "status": status })))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/stop
// ---------------------------------------------------------------------------

/// Stop the current session.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.registry.stop()?;
    Ok(Json(serde_json::json!({ "status": "stopped" })))
}
