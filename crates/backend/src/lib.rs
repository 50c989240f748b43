//! Concrete providers behind the session core's traits.

pub mod config;
pub mod memory;
pub mod supabase;

pub use config::{backend_mode, load_config, BackendMode};
pub use memory::MemoryBackend;
pub use supabase::SupabaseClient;

use session::{AuthProvider, ProfileStore, SessionDriver, SessionStore};
use std::sync::Arc;

/// The two capabilities the session store needs, usually one object behind both.
#[derive(Clone)]
pub struct BackendHandles {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl BackendHandles {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + ProfileStore + 'static,
    {
        Self {
            auth: backend.clone(),
            profiles: backend,
        }
    }

    pub fn start_session(&self) -> (SessionStore, SessionDriver) {
        SessionStore::start(self.auth.clone(), self.profiles.clone())
    }
}

/// Build the backend selected by `mode`.
pub fn connect(mode: &BackendMode) -> BackendHandles {
    match mode {
        BackendMode::Hosted {
            url,
            anon_key,
            session_file,
        } => {
            tracing::info!(url = %url, session_file = %session_file.display(), "Using hosted backend");
            let client = SupabaseClient::new(url, anon_key).with_session_file(session_file);
            BackendHandles::from_backend(Arc::new(client))
        }
        BackendMode::Development => {
            tracing::info!("Using in-memory development backend");
            BackendHandles::from_backend(Arc::new(MemoryBackend::development()))
        }
    }
}
