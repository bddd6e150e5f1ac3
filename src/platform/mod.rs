//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger setup
//! - Storage (JSON file natively, LocalStorage on web)
//! - Audio output (log sink natively, Web Audio on web)

use crate::audio::{AudioSink, LogSink};
use crate::persistence::{MemoryStore, Store};

/// Install the logger for this target. Fails if one is already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()
}

/// Install the logger for this target. Fails if one is already installed.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info)
}

/// Where settings and progress live on this target.
/// Falls back to an in-memory store if the real one can't be opened.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store(path: &std::path::Path) -> Box<dyn Store> {
    match crate::persistence::JsonFileStore::open(path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Cannot open {}: {}; progress will not persist", path.display(), e);
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn default_store(_path: &std::path::Path) -> Box<dyn Store> {
    let store = crate::persistence::LocalStorageStore::new();
    if let Err(e) = store.load(crate::persistence::keys::MUTED) {
        log::warn!("LocalStorage unusable ({}); progress will not persist", e);
        return Box::new(MemoryStore::new());
    }
    Box::new(store)
}

/// Best available audio output for this target
#[cfg(not(target_arch = "wasm32"))]
pub fn default_audio() -> Box<dyn AudioSink> {
    Box::new(LogSink)
}

#[cfg(target_arch = "wasm32")]
pub fn default_audio() -> Box<dyn AudioSink> {
    match crate::audio::WebAudioSink::new() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            log::warn!("{} - audio disabled", e);
            Box::new(LogSink)
        }
    }
}
