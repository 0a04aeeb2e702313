use anyhow::Context;
use secrecy::SecretString;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api_keys::store::ApiKeyStore;
use crate::errors::AppError;
use crate::models::api_key::KeyType;
use crate::vault::VaultCodec;

/// What the settings page is allowed to see about a stored key.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiKeySummary {
    pub has_key: bool,
    pub key_type: Option<KeyType>,
    pub masked_key: Option<String>,
}

impl ApiKeySummary {
    fn empty() -> Self {
        Self {
            has_key: false,
            key_type: None,
            masked_key: None,
        }
    }
}

/// Encrypts and stores a user's API key, replacing any previous one.
/// Blank input is rejected; otherwise the key is stored exactly as submitted.
pub async fn save_api_key(
    store: &dyn ApiKeyStore,
    codec: &VaultCodec,
    user_id: Uuid,
    api_key: &str,
    key_type: KeyType,
) -> Result<(), AppError> {
    if api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key must not be empty".to_string()));
    }

    let envelope = encrypt_blocking(codec, api_key.to_string()).await?;
    store.save(user_id, &envelope, key_type).await?;

    info!("Stored {key_type} API key for user {user_id}");
    Ok(())
}

/// Returns the masked form of the stored key. The plaintext never leaves this function.
pub async fn get_api_key_summary(
    store: &dyn ApiKeyStore,
    codec: &VaultCodec,
    user_id: Uuid,
) -> Result<ApiKeySummary, AppError> {
    let Some(row) = store.get(user_id).await? else {
        return Ok(ApiKeySummary::empty());
    };

    let plaintext = decrypt_blocking(codec, row.encrypted_key, user_id).await?;
    let key_type = match row.key_type.parse::<KeyType>() {
        Ok(kt) => Some(kt),
        Err(e) => {
            warn!("User {user_id} has unrecognised key type: {e}");
            None
        }
    };

    Ok(ApiKeySummary {
        has_key: true,
        key_type,
        masked_key: Some(mask_api_key(&plaintext)),
    })
}

/// Full plaintext key for in-process LLM callers. Not exposed over HTTP.
#[allow(dead_code)]
pub async fn resolve_api_key(
    store: &dyn ApiKeyStore,
    codec: &VaultCodec,
    user_id: Uuid,
) -> Result<Option<(KeyType, SecretString)>, AppError> {
    let Some(row) = store.get(user_id).await? else {
        return Ok(None);
    };

    let key_type = row
        .key_type
        .parse::<KeyType>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("user {user_id}: {e}")))?;
    let plaintext = decrypt_blocking(codec, row.encrypted_key, user_id).await?;
    Ok(Some((key_type, SecretString::from(plaintext))))
}

pub async fn delete_api_key(store: &dyn ApiKeyStore, user_id: Uuid) -> Result<bool, AppError> {
    let deleted = store.delete(user_id).await?;
    if deleted {
        info!("Deleted API key for user {user_id}");
    }
    Ok(deleted)
}

/// `sk-test1234567890` → `sk-t...7890`. Keys under 10 characters show only `****`.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

// PBKDF2 runs ~100k rounds per call; keep it off the async executor.
async fn encrypt_blocking(codec: &VaultCodec, plaintext: String) -> Result<String, AppError> {
    let codec = codec.clone();
    let envelope = tokio::task::spawn_blocking(move || codec.encrypt(&plaintext))
        .await
        .context("vault encrypt worker failed")??;
    Ok(envelope)
}

async fn decrypt_blocking(
    codec: &VaultCodec,
    envelope: String,
    user_id: Uuid,
) -> Result<String, AppError> {
    let codec = codec.clone();
    let result = tokio::task::spawn_blocking(move || codec.decrypt(&envelope))
        .await
        .context("vault decrypt worker failed")?;
    result.map_err(|e| {
        warn!("Stored API key for user {user_id} could not be opened: {e}");
        AppError::from(e)
    })
}
