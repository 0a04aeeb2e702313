//! Cipher suite record — the algorithm choice and every length the envelope
//! parser depends on, kept in one place so the suite can be upgraded.

use serde::Serialize;

use crate::vault::codec::VaultError;

/// Lower bound on PBKDF2 rounds. Configuration cannot go below this.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Shortest salt accepted by [`CipherSuite::validate`].
pub const MIN_SALT_LEN: usize = 16;

/// Authenticated ciphers the vault can seal envelopes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CipherAlgorithm {
    /// AES-256-GCM with a 128-bit IV and a 128-bit tag.
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl CipherAlgorithm {
    pub fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Gcm => 32,
        }
    }

    pub fn iv_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Gcm => 16,
        }
    }

    pub fn tag_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes256Gcm => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes256Gcm => "aes-256-gcm",
        }
    }
}

/// Everything needed to seal or open an envelope, apart from the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CipherSuite {
    pub kdf_iterations: u32,
    pub cipher: CipherAlgorithm,
    pub key_len: usize,
    pub iv_len: usize,
    pub salt_len: usize,
    pub tag_len: usize,
}

impl Default for CipherSuite {
    /// The suite every stored envelope so far was written with.
    fn default() -> Self {
        Self {
            kdf_iterations: MIN_KDF_ITERATIONS,
            cipher: CipherAlgorithm::Aes256Gcm,
            key_len: 32,
            iv_len: 16,
            salt_len: 64,
            tag_len: 16,
        }
    }
}

impl CipherSuite {
    /// Default suite with a different PBKDF2 cost factor.
    pub fn with_iterations(kdf_iterations: u32) -> Self {
        Self {
            kdf_iterations,
            ..Self::default()
        }
    }

    /// Bytes in front of the ciphertext: salt + iv + tag.
    pub fn header_len(&self) -> usize {
        self.salt_len + self.iv_len + self.tag_len
    }

    /// Total decoded envelope size for a plaintext of `plaintext_len` bytes.
    pub fn envelope_len(&self, plaintext_len: usize) -> usize {
        self.header_len() + plaintext_len
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        if self.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(VaultError::InvalidSuite(format!(
                "kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                self.kdf_iterations
            )));
        }
        self.validate_lengths()
    }

    /// Length checks only. The iteration floor is skipped so tests can run
    /// with a cheap KDF.
    pub(crate) fn validate_lengths(&self) -> Result<(), VaultError> {
        let cipher = self.cipher;
        let mismatch = |field: &str, got: usize, want: usize| {
            VaultError::InvalidSuite(format!(
                "{} requires {field} = {want}, got {got}",
                cipher.as_str()
            ))
        };
        if self.key_len != cipher.key_len() {
            return Err(mismatch("key_len", self.key_len, cipher.key_len()));
        }
        if self.iv_len != cipher.iv_len() {
            return Err(mismatch("iv_len", self.iv_len, cipher.iv_len()));
        }
        if self.tag_len != cipher.tag_len() {
            return Err(mismatch("tag_len", self.tag_len, cipher.tag_len()));
        }
        if self.salt_len < MIN_SALT_LEN {
            return Err(VaultError::InvalidSuite(format!(
                "salt_len must be at least {MIN_SALT_LEN}, got {}",
                self.salt_len
            )));
        }
        Ok(())
    }
}
