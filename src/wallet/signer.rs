use hmac::{Hmac, Mac};
use k256::ecdsa::{Signature, SigningKey, signature::Signer};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::security::OperationKey;

/// Domain tag for stretching operation key material that is not a raw scalar.
const KEY_DERIVATION_TAG: &[u8] = b"deltadefi/operation-key/v1";

pub const PUBLIC_KEY_LEN: usize = 33;
pub const SIGNATURE_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("operation key cannot be used for signing: {0}")]
    InvalidKey(String),
    #[error("malformed transaction payload: {0}")]
    MalformedPayload(String),
    #[error("signature failed: {0}")]
    Signature(String),
}

/// Signs unsigned transaction payloads returned by the venue build step.
///
/// Implementations are stateless beyond their key, so the same signer can sign
/// any number of payloads.
pub trait TxSigner: Send + Sync {
    /// Sign a hex-encoded unsigned transaction, returning the hex-encoded
    /// signed transaction.
    fn sign_tx(&self, tx_hex: &str) -> Result<String, SigningError>;

    /// Hex of the compressed public key bound to this signer.
    fn public_key_hex(&self) -> String;
}

/// secp256k1 signer derived from a decrypted operation key.
///
/// The signed form of a payload is `payload || pubkey (33) || signature (64)`,
/// where the signature is ECDSA over SHA-256 of the payload bytes.
pub struct OperationKeySigner {
    signing_key: SigningKey,
}

impl std::fmt::Debug for OperationKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationKeySigner")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

impl OperationKeySigner {
    pub fn from_operation_key(key: &OperationKey) -> Result<Self, SigningError> {
        let scalar = derive_scalar(key.expose_material())?;
        let signing_key = SigningKey::from_slice(scalar.as_slice())
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }
}

/// Map operation key material onto 32 scalar bytes.
///
/// 32 raw bytes or 64 hex characters are taken as-is; anything else is run
/// through HMAC-SHA256 keyed with [`KEY_DERIVATION_TAG`].
fn derive_scalar(material: &[u8]) -> Result<Zeroizing<[u8; 32]>, SigningError> {
    if material.is_empty() {
        return Err(SigningError::InvalidKey("empty key material".to_string()));
    }
    let mut scalar = Zeroizing::new([0u8; 32]);

    let trimmed = material.trim_ascii();
    if trimmed.len() == 64 && trimmed.iter().all(u8::is_ascii_hexdigit) {
        hex::decode_to_slice(trimmed, scalar.as_mut_slice())
            .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
        return Ok(scalar);
    }
    if material.len() == 32 {
        scalar.copy_from_slice(material);
        return Ok(scalar);
    }

    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(KEY_DERIVATION_TAG)
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(material);
    scalar.copy_from_slice(&mac.finalize().into_bytes());
    Ok(scalar)
}

impl TxSigner for OperationKeySigner {
    fn sign_tx(&self, tx_hex: &str) -> Result<String, SigningError> {
        let payload = hex::decode(tx_hex.trim())
            .map_err(|e| SigningError::MalformedPayload(e.to_string()))?;
        if payload.is_empty() {
            return Err(SigningError::MalformedPayload("empty payload".to_string()));
        }

        let signature: Signature = self
            .signing_key
            .try_sign(&payload)
            .map_err(|e| SigningError::Signature(e.to_string()))?;

        let mut signed = payload;
        signed.extend_from_slice(&self.public_key_bytes());
        signed.extend_from_slice(&signature.to_bytes());
        Ok(hex::encode(signed))
    }

    fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }
}
