//! Password-protected operation key custody.
//!
//! The venue stores the trading (operation) key encrypted with the user's
//! passcode. The blob is a JSON object of base64 fields:
//!
//! ```text
//! {"iv": "...", "salt": "...", "ciphertext": "..."}
//! ```
//!
//! The key is PBKDF2-HMAC-SHA256(passcode, salt, 100 000 rounds, 32 bytes) and
//! the cipher AES-256-GCM with `iv` as nonce; `ciphertext` carries the tag.
//! Blobs written by older producers have no `salt`: those were encrypted with
//! an all-zero salt as long as the IV, and must keep decrypting.

use aes_gcm::{
    Aes256Gcm, AesGcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, consts::U16},
    aes::Aes256,
};
use base64::{Engine as _, engine::general_purpose};
use rand_core::RngCore;
use secrecy::{ExposeSecret, Secret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::password::SecurePassword;

/// AES-256-GCM with a 128-bit nonce, as emitted by the venue's web producer.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

const IV_LEN_96: usize = 12;
const IV_LEN_128: usize = 16;
const SALT_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("malformed encrypted operation key: {0}")]
    Decode(String),
    /// Wrong passcode and corrupted data are deliberately indistinguishable.
    #[error("incorrect passcode or corrupted data")]
    Decryption,
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(Debug, Serialize, Deserialize)]
struct EncodedBlob {
    iv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    salt: Option<String>,
    ciphertext: String,
}

/// Decoded form of an encrypted operation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub iv: Vec<u8>,
    /// `None` marks the legacy format.
    pub salt: Option<Vec<u8>>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Parse the serialized JSON form.
    pub fn parse(encoded: &str) -> Result<Self> {
        let raw: EncodedBlob = serde_json::from_str(encoded)
            .map_err(|e| VaultError::Decode(format!("invalid blob json: {}", e)))?;
        let decode = |field: &str, value: &str| {
            general_purpose::STANDARD
                .decode(value.trim())
                .map_err(|e| VaultError::Decode(format!("invalid base64 in {}: {}", field, e)))
        };

        let blob = Self {
            iv: decode("iv", &raw.iv)?,
            salt: raw.salt.as_deref().map(|s| decode("salt", s)).transpose()?,
            ciphertext: decode("ciphertext", &raw.ciphertext)?,
        };
        if blob.iv.len() != IV_LEN_96 && blob.iv.len() != IV_LEN_128 {
            return Err(VaultError::Decode(format!(
                "unsupported iv length {}",
                blob.iv.len()
            )));
        }
        Ok(blob)
    }

    pub fn to_json(&self) -> String {
        let encoded = EncodedBlob {
            iv: general_purpose::STANDARD.encode(&self.iv),
            salt: self
                .salt
                .as_ref()
                .map(|s| general_purpose::STANDARD.encode(s)),
            ciphertext: general_purpose::STANDARD.encode(&self.ciphertext),
        };
        // A struct of plain strings always serializes.
        serde_json::to_string(&encoded).unwrap_or_default()
    }

    pub fn is_legacy(&self) -> bool {
        self.salt.is_none()
    }

    /// Salt fed to the KDF: the stored one, or zeros the length of the IV.
    pub fn effective_salt(&self) -> Vec<u8> {
        match &self.salt {
            Some(salt) => salt.clone(),
            None => vec![0u8; self.iv.len()],
        }
    }
}

/// Decrypted operation key bytes. Zeroized on drop, redacted in `Debug`.
pub struct OperationKey {
    material: Secret<Vec<u8>>,
}

impl std::fmt::Debug for OperationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationKey")
            .field("material", &"[REDACTED]")
            .finish()
    }
}

impl OperationKey {
    pub fn new(material: Vec<u8>) -> Self {
        Self {
            material: Secret::new(material),
        }
    }

    /// Raw key bytes (use with caution)
    pub fn expose_material(&self) -> &[u8] {
        self.material.expose_secret()
    }
}

fn aead_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let plaintext = match iv.len() {
        IV_LEN_96 => {
            Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)).decrypt(Nonce::from_slice(iv), ciphertext)
        }
        IV_LEN_128 => Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key))
            .decrypt(Nonce::<U16>::from_slice(iv), ciphertext),
        n => return Err(VaultError::Decode(format!("unsupported iv length {}", n))),
    };
    plaintext.map_err(|_| VaultError::Decryption)
}

fn aead_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = match iv.len() {
        IV_LEN_96 => {
            Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)).encrypt(Nonce::from_slice(iv), plaintext)
        }
        IV_LEN_128 => Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key))
            .encrypt(Nonce::<U16>::from_slice(iv), plaintext),
        n => return Err(VaultError::Decode(format!("unsupported iv length {}", n))),
    };
    ciphertext.map_err(|e| VaultError::Decode(format!("encryption failed: {}", e)))
}

/// Decrypt an already parsed blob.
pub fn decrypt_blob(blob: &EncryptedBlob, passcode: &SecretString) -> Result<OperationKey> {
    let salt = blob.effective_salt();
    let key = SecurePassword::derive_key_from_passcode(passcode, &salt);
    let plaintext = aead_decrypt(&key[..], &blob.iv, &blob.ciphertext)?;
    Ok(OperationKey::new(plaintext))
}

/// Parse and decrypt a serialized operation key blob.
pub fn decrypt_operation_key(encoded: &str, passcode: &SecretString) -> Result<OperationKey> {
    let blob = EncryptedBlob::parse(encoded)?;
    decrypt_blob(&blob, passcode)
}

/// Encrypt with an explicit IV and salt. `salt: None` writes a legacy blob.
pub fn encrypt_with_params(
    plaintext: &[u8],
    passcode: &SecretString,
    iv: &[u8],
    salt: Option<&[u8]>,
) -> Result<EncryptedBlob> {
    let mut blob = EncryptedBlob {
        iv: iv.to_vec(),
        salt: salt.map(<[u8]>::to_vec),
        ciphertext: Vec::new(),
    };
    let key = SecurePassword::derive_key_from_passcode(passcode, &blob.effective_salt());
    blob.ciphertext = aead_encrypt(&key[..], iv, plaintext)?;
    Ok(blob)
}

/// Encrypt operation key bytes with a fresh random IV and salt.
pub fn encrypt_operation_key(plaintext: &[u8], passcode: &SecretString) -> Result<EncryptedBlob> {
    let mut iv = [0u8; IV_LEN_128];
    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    OsRng.fill_bytes(&mut iv);
    OsRng.fill_bytes(salt.as_mut_slice());
    encrypt_with_params(plaintext, passcode, &iv, Some(salt.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IV1: [u8; 16] = [
        0x1f, 0x3a, 0x52, 0x07, 0x9c, 0x44, 0xe1, 0x0b, 0x6d, 0x2e, 0x88, 0x71, 0x05, 0xaa, 0x90,
        0x3c,
    ];

    fn pass(p: &str) -> SecretString {
        SecretString::new(p.to_string())
    }

    #[test]
    fn test_round_trip_with_random_params() {
        let blob = encrypt_operation_key(b"operation-key-bytes", &pass("Passcode#1")).unwrap();
        assert!(!blob.is_legacy());
        assert_eq!(blob.iv.len(), IV_LEN_128);

        let key = decrypt_operation_key(&blob.to_json(), &pass("Passcode#1")).unwrap();
        assert_eq!(key.expose_material(), b"operation-key-bytes");
    }

    #[test]
    fn test_legacy_blob_decrypts_with_zero_salt() {
        // CT1 is produced with an explicit zero salt of len(IV1), then the salt
        // field is dropped to obtain the legacy serialized form.
        let zero_salt = vec![0u8; IV1.len()];
        let explicit =
            encrypt_with_params(b"masterkey123", &pass("pass1"), &IV1, Some(zero_salt.as_slice())).unwrap();
        let legacy = EncryptedBlob {
            iv: IV1.to_vec(),
            salt: None,
            ciphertext: explicit.ciphertext.clone(),
        };
        let legacy_json = legacy.to_json();
        assert!(!legacy_json.contains("salt"));

        let key = decrypt_operation_key(&legacy_json, &pass("pass1")).unwrap();
        assert_eq!(key.expose_material(), b"masterkey123");

        let from_explicit = decrypt_operation_key(&explicit.to_json(), &pass("pass1")).unwrap();
        assert_eq!(from_explicit.expose_material(), key.expose_material());
    }

    #[test]
    fn test_legacy_and_explicit_zero_salt_derive_same_key() {
        let legacy = encrypt_with_params(b"k", &pass("pass1"), &IV1, None).unwrap();
        let explicit =
            encrypt_with_params(b"k", &pass("pass1"), &IV1, Some(&[0u8; 16][..])).unwrap();
        assert_eq!(legacy.effective_salt(), vec![0u8; 16]);
        assert_eq!(legacy.ciphertext, explicit.ciphertext);
    }

    #[test]
    fn test_null_salt_is_legacy() {
        let legacy = encrypt_with_params(b"k", &pass("pass1"), &IV1, None).unwrap();
        let json = format!(
            r#"{{"iv":"{}","salt":null,"ciphertext":"{}"}}"#,
            general_purpose::STANDARD.encode(&legacy.iv),
            general_purpose::STANDARD.encode(&legacy.ciphertext)
        );
        let parsed = EncryptedBlob::parse(&json).unwrap();
        assert!(parsed.is_legacy());
        let key = decrypt_blob(&parsed, &pass("pass1")).unwrap();
        assert_eq!(key.expose_material(), b"k");
    }

    #[test]
    fn test_twelve_byte_iv_supported() {
        let iv = [7u8; IV_LEN_96];
        let blob = encrypt_with_params(b"short-nonce", &pass("pw"), &iv, Some(&b"salty"[..])).unwrap();
        let key = decrypt_operation_key(&blob.to_json(), &pass("pw")).unwrap();
        assert_eq!(key.expose_material(), b"short-nonce");
    }

    #[test]
    fn test_wrong_passcode_fails_with_opaque_error() {
        let blob = encrypt_operation_key(b"secret", &pass("right-pass1")).unwrap();
        let err = decrypt_operation_key(&blob.to_json(), &pass("wrong-pass1")).unwrap_err();
        assert!(matches!(err, VaultError::Decryption));
        assert_eq!(err.to_string(), "incorrect passcode or corrupted data");
    }

    #[test]
    fn test_corrupted_ciphertext_fails_with_same_error() {
        let mut blob = encrypt_operation_key(b"secret", &pass("right-pass1")).unwrap();
        let last = blob.ciphertext.len() - 1;
        blob.ciphertext[last] ^= 0x01;
        let err = decrypt_blob(&blob, &pass("right-pass1")).unwrap_err();
        assert_eq!(err.to_string(), "incorrect passcode or corrupted data");
    }

    #[test]
    fn test_malformed_blobs_fail_to_decode() {
        let cases = [
            "not json",
            r#"{"iv":"AAAA"}"#,
            r#"{"iv":"%%%","ciphertext":"AAAA"}"#,
            r#"{"iv":"AAAAAAAAAAAAAAAAAAAAAA==","salt":"***","ciphertext":"AAAA"}"#,
            // 3-byte iv
            r#"{"iv":"AAAA","ciphertext":"AAAA"}"#,
        ];
        for case in cases {
            let err = decrypt_operation_key(case, &pass("pw")).unwrap_err();
            assert!(matches!(err, VaultError::Decode(_)), "case {case}: {err:?}");
        }
    }

    #[test]
    fn test_operation_key_debug_is_redacted() {
        let key = OperationKey::new(b"masterkey123".to_vec());
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("masterkey123"));
        assert!(!dbg.contains("109"));
        assert!(dbg.contains("REDACTED"));
    }
}
