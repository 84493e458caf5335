//! LocalStorage-backed key-value store (WASM only)

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::persistence::{KeyValueStore, StorageError};

    /// `window.localStorage`
    #[derive(Debug, Clone, Copy, Default)]
    pub struct BrowserStore;

    impl BrowserStore {
        fn storage() -> Result<web_sys::Storage, StorageError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)
        }
    }

    impl KeyValueStore for BrowserStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Self::storage()?
                .get_item(key)
                .map_err(|e| StorageError::Backend(format!("{:?}", e)))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            Self::storage()?
                .set_item(key, value)
                .map_err(|e| StorageError::Backend(format!("{:?}", e)))
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            Self::storage()?
                .remove_item(key)
                .map_err(|e| StorageError::Backend(format!("{:?}", e)))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::BrowserStore;
