// Credential Vault: encryption-at-rest for per-user API keys.
// Envelope layout: salt || iv || tag || ciphertext, base64 (standard, padded).
// Keys are derived per call from VAULT_SECRET + salt via PBKDF2-HMAC-SHA512.

pub mod codec;
pub mod suite;

pub use codec::{VaultCodec, VaultError};
pub use suite::CipherSuite;
