// Copyright 2025 The qcmkit Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use qcmkit_core::Strictness;
use qcmkit_core::parse_questions;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::channel;

use crate::cmd::quiz::get::get_handler;
use crate::cmd::quiz::get::report_handler;
use crate::cmd::quiz::post::post_handler;
use crate::cmd::quiz::session::QuizSession;
use crate::cmd::quiz::state::MutableState;
use crate::cmd::quiz::state::ServerState;
use crate::config::validate_time_limit;
use crate::db::Database;
use crate::error::Fallible;
use crate::source::Source;
use crate::utils::CACHE_CONTROL_IMMUTABLE;

pub struct QuizConfig {
    pub input: PathBuf,
    pub title: String,
    pub user: String,
    pub time_limit_minutes: u32,
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub shuffle: bool,
}

pub async fn start_server(config: QuizConfig) -> Fallible<()> {
    validate_time_limit(config.time_limit_minutes)?;
    let source = Source::load(&config.input)?;
    let parsed = parse_questions(&source.text, Strictness::Lenient)?;
    for error in &parsed.errors {
        log::warn!("{}: skipped {error}", source.path.display());
    }
    if parsed.records.is_empty() {
        println!("No questions found in {}.", source.path.display());
        return Ok(());
    }
    log::debug!(
        "Loaded {} questions from {} ({})",
        parsed.records.len(),
        source.name(),
        source.module_key
    );

    let db = Database::open(&config.db_path)?;
    let mut session = QuizSession::new(parsed.records, config.time_limit_minutes, config.shuffle);
    if let Some(snapshot) = db.load_progress(&config.user, &source.module_key)? {
        log::info!(
            "Resuming quiz for {} at question {}",
            config.user,
            snapshot.current_index + 1
        );
        session.resume(snapshot);
    }

    let (shutdown_tx, shutdown_rx) = channel();

    let state = ServerState {
        title: config.title,
        user: config.user,
        module_key: source.module_key,
        mutable: Arc::new(Mutex::new(MutableState { session, db })),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/report", get(report_handler));
    let app = app.route("/script.js", get(script_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;
    Ok(())
}

async fn script_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("script.js");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/javascript"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn shutdown_signal(shutdown_rx: Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let shutdown = async {
        shutdown_rx.await.ok();
    };

    select! {
        _ = ctrl_c => {
            log::debug!("Received Ctrl+C, shutting down gracefully");
        },
        _ = shutdown => {
            log::debug!("Received shutdown signal, shutting down gracefully");
        },
    }
}
