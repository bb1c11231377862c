// ABOUTME: Field-level at-rest encryption seam and the default AES-256-GCM implementation
// ABOUTME: Keys are derived per (tenant, entity) so ciphertext cannot migrate across scopes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Nonce length for AES-GCM (96-bit standard nonce)
const NONCE_LEN: usize = 12;

/// Opaque encryption dependency for PII-like columns (bank account numbers,
/// IBAN, payment identifiers).
///
/// The repository encrypts configured columns before write and decrypts them
/// after read. A decrypt failure during reads substitutes `null` in the row
/// rather than failing the request; a failure during writes is an error.
pub trait FieldCipher: Send + Sync {
    /// Encrypt a plaintext field bound to a tenant/entity scope.
    fn encrypt_field(&self, tenant_id: i64, entity_id: i64, plaintext: &str) -> Result<String>;

    /// Decrypt a field previously encrypted under the same scope.
    fn decrypt_field(&self, tenant_id: i64, entity_id: i64, ciphertext: &str) -> Result<String>;
}

/// AES-256-GCM field cipher with per-scope key derivation.
///
/// Wire format: base64(nonce || ciphertext), random 96-bit nonce per value.
pub struct AesGcmFieldCipher {
    master_key: [u8; 32],
}

impl AesGcmFieldCipher {
    /// Create a cipher from master key material of any length; the working
    /// key is the SHA-256 digest of the input.
    #[must_use]
    pub fn new(master_key: &[u8]) -> Self {
        let digest = Sha256::digest(master_key);
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { master_key: key }
    }

    /// Derive the working key for one (tenant, entity) scope.
    fn scope_key(&self, tenant_id: i64, entity_id: i64) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.master_key);
        hasher.update(tenant_id.to_be_bytes());
        hasher.update(entity_id.to_be_bytes());
        let digest = hasher.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        key
    }
}

impl FieldCipher for AesGcmFieldCipher {
    fn encrypt_field(&self, tenant_id: i64, entity_id: i64, plaintext: &str) -> Result<String> {
        let key = self.scope_key(tenant_id, entity_id);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("field encryption failed: {e}"))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(payload))
    }

    fn decrypt_field(&self, tenant_id: i64, entity_id: i64, ciphertext: &str) -> Result<String> {
        let payload = general_purpose::STANDARD
            .decode(ciphertext)
            .context("ciphertext is not valid base64")?;
        if payload.len() <= NONCE_LEN {
            return Err(anyhow!("ciphertext too short"));
        }

        let key = self.scope_key(tenant_id, entity_id);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let nonce = Nonce::from_slice(&payload[..NONCE_LEN]);

        let plaintext = cipher
            .decrypt(nonce, &payload[NONCE_LEN..])
            .map_err(|e| anyhow!("field decryption failed: {e}"))?;
        String::from_utf8(plaintext).context("decrypted field is not valid UTF-8")
    }
}
