#![allow(dead_code)]

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which LLM provider a stored key belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    Openai,
    Anthropic,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Openai => "openai",
            KeyType::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(KeyType::Openai),
            "anthropic" => Ok(KeyType::Anthropic),
            other => Err(format!("unknown key type '{other}'")),
        }
    }
}

/// One row of `user_api_keys`. `encrypted_key` is a vault envelope, never plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct ApiKeyRow {
    pub user_id: Uuid,
    pub encrypted_key: String,
    pub key_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_round_trips_through_text() {
        for kt in [KeyType::Openai, KeyType::Anthropic] {
            assert_eq!(kt.as_str().parse::<KeyType>().unwrap(), kt);
        }
    }

    #[test]
    fn test_key_type_rejects_unknown() {
        assert!("gemini".parse::<KeyType>().is_err());
    }

    #[test]
    fn test_key_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&KeyType::Openai).unwrap(), "\"openai\"");
        let kt: KeyType = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(kt, KeyType::Anthropic);
    }
}
