// Per-user LLM API keys, stored as vault envelopes.
// Handlers -> service (encrypt/decrypt on blocking workers) -> ApiKeyStore.

pub mod handlers;
pub mod service;
pub mod store;
