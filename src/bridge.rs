//! JS-facing setup exports: logging, session construction, change feed.
//!
//! Return values follow the `"ok"` / `"error: ..."` string convention the
//! worker script already understands.

use std::rc::Rc;

use js_sys::Function;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_web::MakeWebConsoleWriter;
use wasm_bindgen::prelude::*;

use crate::game::{BrowserScheduler, GameConfig, GameManager, SubscriptionId, session};

/// Install the console logger. `filter` is an `EnvFilter` directive string;
/// empty means `"info"`. Safe to call more than once.
#[wasm_bindgen]
pub fn init_logging(filter: &str) {
    let directives = if filter.trim().is_empty() { "info" } else { filter };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(EnvFilter::new(directives));

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::debug!("logging already initialized");
    }
}

/// Start a new game session from a JSON `GameConfig` (empty = defaults).
/// Any previous session and its timer are discarded.
#[wasm_bindgen]
pub fn init_game(config_json: &str) -> String {
    match GameConfig::from_json(config_json) {
        Ok(config) => {
            tracing::info!(?config, "starting game session");
            session::init_session(GameManager::new(config, Rc::new(BrowserScheduler)));
            "ok".to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected game config");
            format!("error: {}", e)
        }
    }
}

/// Call `callback(json)` with the serialized game after every change
/// (including each clock tick). Returns the subscription id.
#[wasm_bindgen]
pub fn watch_game(callback: Function) -> String {
    let subscribed = session::with_session(|game| {
        game.subscribe(move |snapshot| {
            let json = match serde_json::to_string(snapshot) {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize game snapshot");
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                tracing::warn!(error = ?e, "game watcher threw");
            }
        })
    });
    match subscribed {
        Ok(id) => id.to_string(),
        Err(e) => format!("error: {}", e),
    }
}

/// Stop a watcher registered by [`watch_game`]. Returns `"ok"`, or an
/// error string for an unknown or malformed id.
#[wasm_bindgen]
pub fn unwatch_game(id: &str) -> String {
    let id: SubscriptionId = match id.parse() {
        Ok(id) => id,
        Err(e) => return format!("error: invalid subscription id: {}", e),
    };
    match session::with_session(|game| game.unsubscribe(id)) {
        Ok(true) => "ok".to_string(),
        Ok(false) => format!("error: no watcher {}", id),
        Err(e) => format!("error: {}", e),
    }
}
