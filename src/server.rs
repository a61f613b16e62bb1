//! Webhook HTTP server.
//!
//! Every path and method lands on a single handler:
//! - `OPTIONS` answers the CORS preflight
//! - `GET` reports that the bot is running
//! - anything else is treated as a Telegram update and always acknowledged
//!   with `200 {"ok": true}` so the platform never retries

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::bot;
use crate::config::{Config, TokenSource};
use crate::persona::Persona;
use crate::platform::telegram::TelegramClient;
use crate::random::SystemRandom;

/// Updates larger than this are treated as unrecognizable.
const MAX_UPDATE_BYTES: usize = 2 * 1024 * 1024;

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    persona: Arc<Persona>,
    api_base_url: Arc<str>,
    token: Arc<TokenSource>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(persona: Persona, api_base_url: &str, token: TokenSource) -> Self {
        Self {
            persona: Arc::new(persona),
            api_base_url: Arc::from(api_base_url),
            token: Arc::new(token),
            http: reqwest::Client::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new().fallback(handle_webhook).with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let token = config.token_source();
    let state = AppState::new(config.persona, &config.telegram.api_base_url, token);
    if state.token.resolve().is_none() {
        warn!(
            "{} is not set; requests will fail until it is",
            config.telegram.token_env
        );
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;

    info!("Webhook listening on http://{}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutting down"),
                Err(e) => {
                    error!("Failed to listen for Ctrl-C, running until killed: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}

// Takes the raw request so the token and method checks run before the body
// is read; an extractor would reject oversized bodies first.
async fn handle_webhook(State(state): State<AppState>, request: Request) -> Response {
    let Some(token) = state.token.resolve() else {
        error!("Bot token not configured");
        return json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Bot token not configured" }),
        );
    };

    let (parts, body) = request.into_parts();
    let method = parts.method;

    if method == Method::OPTIONS {
        return preflight();
    }

    if method == Method::GET {
        return json_response(
            StatusCode::OK,
            json!({ "status": "Bot is running", "bot_name": state.persona.name }),
        );
    }

    let body = match axum::body::to_bytes(body, MAX_UPDATE_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Ignoring unreadable update body: {}", e);
            return json_response(StatusCode::OK, json!({ "ok": true }));
        }
    };

    let telegram = TelegramClient::new(state.http.clone(), &state.api_base_url, &token);
    let mut rng = SystemRandom::new();

    match bot::handle_update(&telegram, &state.persona, &mut rng, &body).await {
        Ok(outcome) => {
            info!("Update handled: {:?}", outcome);
            json_response(StatusCode::OK, json!({ "ok": true }))
        }
        Err(e) => {
            warn!("Failed to handle update: {:#}", e);
            json_response(
                StatusCode::OK,
                json!({ "ok": true, "error": format!("{:#}", e) }),
            )
        }
    }
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
        .into_response()
}
