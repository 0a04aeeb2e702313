//! Vault codec — seals a plaintext secret into a base64 envelope and opens it again.
//!
//! Each call draws a fresh salt and IV from the OS CSPRNG and derives a fresh
//! key with PBKDF2-HMAC-SHA512, so identical plaintexts never share an envelope.
//! Derivation is deliberately slow (see [`CipherSuite::kdf_iterations`]); async
//! callers should run these methods on a blocking worker.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::vault::suite::{CipherAlgorithm, CipherSuite};

/// AES-256-GCM with a 128-bit nonce, the IV size stored envelopes use.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Not base64, or too short to hold salt, iv and tag.
    #[error("malformed envelope")]
    MalformedEnvelope,

    /// Tag did not verify: tampered envelope, wrong secret, or corruption.
    #[error("envelope authentication failed")]
    AuthenticationFailed,

    #[error("invalid cipher suite: {0}")]
    InvalidSuite(String),

    #[error("vault secret must not be empty")]
    EmptySecret,

    #[error("encryption failed")]
    EncryptionFailed,
}

impl VaultError {
    /// True for the two decrypt-time failures. Retrying can never succeed and
    /// callers must report both the same way.
    pub fn is_unreadable_value(&self) -> bool {
        matches!(
            self,
            VaultError::MalformedEnvelope | VaultError::AuthenticationFailed
        )
    }
}

/// Borrowed view over a decoded envelope.
#[derive(Debug)]
struct Envelope<'a> {
    salt: &'a [u8],
    iv: &'a [u8],
    tag: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> Envelope<'a> {
    fn parse(bytes: &'a [u8], suite: &CipherSuite) -> Result<Self, VaultError> {
        if bytes.len() < suite.header_len() {
            return Err(VaultError::MalformedEnvelope);
        }
        let (salt, rest) = bytes.split_at(suite.salt_len);
        let (iv, rest) = rest.split_at(suite.iv_len);
        let (tag, ciphertext) = rest.split_at(suite.tag_len);
        Ok(Self {
            salt,
            iv,
            tag,
            ciphertext,
        })
    }
}

/// Stateless encrypt/decrypt for stored credentials.
///
/// Cloning is cheap; the secret is shared behind an `Arc` and is never
/// printed by `Debug`.
#[derive(Debug, Clone)]
pub struct VaultCodec {
    secret: Arc<SecretString>,
    suite: CipherSuite,
}

impl VaultCodec {
    pub fn new(secret: SecretString, suite: CipherSuite) -> Result<Self, VaultError> {
        suite.validate()?;
        Self::build(secret, suite)
    }

    /// Skips the iteration floor. Tests only.
    #[cfg(test)]
    pub(crate) fn with_cheap_kdf(secret: &str) -> Self {
        let suite = CipherSuite {
            kdf_iterations: 1_000,
            ..CipherSuite::default()
        };
        Self::build(SecretString::from(secret.to_string()), suite).expect("valid test suite")
    }

    fn build(secret: SecretString, suite: CipherSuite) -> Result<Self, VaultError> {
        suite.validate_lengths()?;
        if secret.expose_secret().is_empty() {
            return Err(VaultError::EmptySecret);
        }
        Ok(Self {
            secret: Arc::new(secret),
            suite,
        })
    }

    pub fn suite(&self) -> &CipherSuite {
        &self.suite
    }

    /// Seals `plaintext` into a base64 envelope. Empty input is allowed.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let suite = &self.suite;
        let mut salt = vec![0u8; suite.salt_len];
        let mut iv = vec![0u8; suite.iv_len];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut iv);

        let key = self.derive_key(&salt);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = match suite.cipher {
            CipherAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_slice()));
                cipher
                    .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
                    .map_err(|_| VaultError::EncryptionFailed)?
            }
        };

        let mut out = Vec::with_capacity(suite.envelope_len(buffer.len()));
        out.extend_from_slice(&salt);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&tag);
        out.extend_from_slice(&buffer);
        Ok(STANDARD.encode(out))
    }

    /// Opens an envelope produced by [`VaultCodec::encrypt`].
    ///
    /// The tag is verified before any plaintext is produced; on failure no
    /// partial output escapes.
    pub fn decrypt(&self, envelope: &str) -> Result<String, VaultError> {
        let bytes = STANDARD
            .decode(envelope)
            .map_err(|_| VaultError::MalformedEnvelope)?;
        let parts = Envelope::parse(&bytes, &self.suite)?;

        let key = self.derive_key(parts.salt);

        let mut buffer = Zeroizing::new(parts.ciphertext.to_vec());
        match self.suite.cipher {
            CipherAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm16::new(GenericArray::from_slice(key.as_slice()));
                cipher
                    .decrypt_in_place_detached(
                        GenericArray::from_slice(parts.iv),
                        b"",
                        buffer.as_mut_slice(),
                        GenericArray::from_slice(parts.tag),
                    )
                    .map_err(|_| VaultError::AuthenticationFailed)?;
            }
        }

        String::from_utf8(buffer.to_vec()).map_err(|_| VaultError::MalformedEnvelope)
    }

    fn derive_key(&self, salt: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; self.suite.key_len]);
        pbkdf2::pbkdf2_hmac::<Sha512>(
            self.secret.expose_secret().as_bytes(),
            salt,
            self.suite.kdf_iterations,
            key.as_mut_slice(),
        );
        key
    }
}
