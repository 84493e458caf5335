//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Storage (LocalStorage on web, in-memory on native)

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStore;

/// Storage backend for the current platform
#[cfg(target_arch = "wasm32")]
pub type DefaultStore = storage::BrowserStore;
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStore = crate::persistence::MemoryStore;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
