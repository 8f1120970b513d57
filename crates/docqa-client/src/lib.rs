//! Transport layer: the HTTP backend and an offline mock, both behind
//! [`docqa_core::Backend`].

pub mod http;
pub mod mock;

use std::sync::Arc;

use docqa_core::config::ClientSettings;
use docqa_core::{ApiError, Backend};

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Pick the backend named by the configuration.
pub fn backend_from_settings(settings: &ClientSettings) -> Result<Arc<dyn Backend>, ApiError> {
    if settings.backend.mock {
        tracing::info!("using mock backend");
        Ok(Arc::new(MockBackend::new()))
    } else {
        tracing::info!(base_url = %settings.api.base_url, "using HTTP backend");
        Ok(Arc::new(HttpBackend::new(&settings.api)?))
    }
}
