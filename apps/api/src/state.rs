use std::sync::Arc;

use crate::api_keys::store::ApiKeyStore;
use crate::vault::VaultCodec;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable key store. Default: PgApiKeyStore.
    pub api_keys: Arc<dyn ApiKeyStore>,
    /// Credential vault built from VAULT_SECRET at startup.
    pub vault: VaultCodec,
}
