// src/trust.rs
// Ed25519 signature verification for release artifacts, using the signify
// wire format for keys and detached signatures.

use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, VerifyingKey};
use std::fmt;
use thiserror::Error;

// Signify binary public key format (42 bytes):
// 2 byte algorithm tag
// 8 byte key id
// 32 byte Ed25519 key
//
// Signify binary signature format (74 bytes):
// 2 byte algorithm tag
// 8 byte key id
// 64 byte Ed25519 signature

pub const ALGORITHM: &[u8] = b"Ed";

pub const ALGORITHM_LEN: usize = 2;
pub const KEY_ID_LEN: usize = 8;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

pub const PUBLIC_KEY_BLOB_LEN: usize = ALGORITHM_LEN + KEY_ID_LEN + PUBLIC_KEY_LEN;
pub const SIGNATURE_BLOB_LEN: usize = ALGORITHM_LEN + KEY_ID_LEN + SIGNATURE_LEN;

// Slice boundaries shared by both blob layouts.
const ALGORITHM_END: usize = ALGORITHM_LEN;
const KEY_ID_END: usize = ALGORITHM_LEN + KEY_ID_LEN;

/// Why a public key could not be loaded or a signature did not verify.
///
/// None of these are retryable at this layer: a malformed or mismatched
/// signature stays invalid on retry. The caller decides whether to
/// re-download the artifact and verify again. Every variant carries only
/// public data (lengths, tags, key ids), so the messages are safe to log.
#[derive(Debug, Error)]
pub enum TrustError {
    /// The public key string is not valid base64.
    #[error("public key is not valid base64: {0}")]
    KeyDecode(base64::DecodeError),

    /// The decoded public key blob is not exactly 42 bytes.
    #[error("invalid public key size: expected 42 bytes, found {found}")]
    MalformedKey { found: usize },

    /// The signature string is not valid base64.
    #[error("signature is not valid base64: {0}")]
    SignatureDecode(base64::DecodeError),

    /// The decoded signature blob is not exactly 74 bytes.
    #[error("invalid signature size: expected 74 bytes, found {found}")]
    MalformedSignature { found: usize },

    /// The algorithm tag is not the Ed25519 marker "Ed".
    #[error("unsupported algorithm: expected \"Ed\", found {found:?}")]
    UnsupportedAlgorithm { found: String },

    /// The signature was made with a different key than the trusted one.
    #[error(
        "key id mismatch: signature was made with key {found}, expected {expected}. \
         Was the artifact signed with the same key the verifier was loaded with?"
    )]
    KeyIdMismatch { found: KeyId, expected: KeyId },

    /// Structurally valid input, but the signature does not authenticate the
    /// message under the trusted key.
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Eight-byte identifier embedded in both public keys and signatures.
///
/// Lets the verifier reject a signature made with an unrelated key before
/// running the cryptographic check. Public data; rendered as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyId([u8; KEY_ID_LEN]);

impl KeyId {
    pub fn as_bytes(&self) -> &[u8; KEY_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A pinned signify public key.
///
/// Loaded once from a trusted base64 string (compiled in, or shipped over an
/// already-verified channel) and shared for the process lifetime. Immutable,
/// so concurrent verification calls need no coordination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedKey {
    key_id: KeyId,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl TrustedKey {
    /// Parses a base64-encoded signify public key blob.
    ///
    /// The decoded blob must be exactly 42 bytes and carry the "Ed" algorithm
    /// tag; length and tag are checked before any slicing.
    pub fn from_base64(base64_public_key: &str) -> Result<Self, TrustError> {
        let decoded = general_purpose::STANDARD
            .decode(base64_public_key.trim())
            .map_err(TrustError::KeyDecode)?;
        if decoded.len() != PUBLIC_KEY_BLOB_LEN {
            return Err(TrustError::MalformedKey {
                found: decoded.len(),
            });
        }
        check_algorithm(&decoded[..ALGORITHM_END])?;

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&decoded[ALGORITHM_END..KEY_ID_END]);
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&decoded[KEY_ID_END..PUBLIC_KEY_BLOB_LEN]);

        Ok(TrustedKey {
            key_id: KeyId(key_id),
            public_key,
        })
    }

    /// Identifier of this key, as embedded in the key blob.
    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Raw 32-byte Ed25519 public key.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Verifies a base64-encoded signify signature over `message`.
    ///
    /// The signature blob must decode to exactly 74 bytes, carry the "Ed"
    /// tag, and embed the same key id as this key; only then does the
    /// Ed25519 check run. A structurally valid signature made with a
    /// different key fails with [`TrustError::KeyIdMismatch`] regardless of
    /// whether the cryptographic math would succeed against that other key.
    ///
    /// `message` is verified exactly as given, byte for byte.
    pub fn verify_signature(
        &self,
        message: &[u8],
        base64_signature: &str,
    ) -> Result<(), TrustError> {
        let parsed = ParsedSignature::from_base64(base64_signature)?;

        if parsed.key_id != self.key_id {
            return Err(TrustError::KeyIdMismatch {
                found: parsed.key_id,
                expected: self.key_id,
            });
        }

        let verifying_key = VerifyingKey::from_bytes(&self.public_key)
            .map_err(|_| TrustError::VerificationFailed)?;
        let signature = Signature::from_bytes(&parsed.signature);
        verifying_key
            .verify_strict(message, &signature)
            .map_err(|_| TrustError::VerificationFailed)
    }
}

/// A signature blob split into its fields. Only meaningful together with the
/// message it was supplied alongside; lives for a single verification call.
struct ParsedSignature {
    key_id: KeyId,
    signature: [u8; SIGNATURE_LEN],
}

impl ParsedSignature {
    fn from_base64(base64_signature: &str) -> Result<Self, TrustError> {
        let decoded = general_purpose::STANDARD
            .decode(base64_signature.trim())
            .map_err(TrustError::SignatureDecode)?;
        if decoded.len() != SIGNATURE_BLOB_LEN {
            return Err(TrustError::MalformedSignature {
                found: decoded.len(),
            });
        }
        check_algorithm(&decoded[..ALGORITHM_END])?;

        let mut key_id = [0u8; KEY_ID_LEN];
        key_id.copy_from_slice(&decoded[ALGORITHM_END..KEY_ID_END]);
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&decoded[KEY_ID_END..SIGNATURE_BLOB_LEN]);

        Ok(ParsedSignature {
            key_id: KeyId(key_id),
            signature,
        })
    }
}

fn check_algorithm(tag: &[u8]) -> Result<(), TrustError> {
    if tag != ALGORITHM {
        return Err(TrustError::UnsupportedAlgorithm {
            found: String::from_utf8_lossy(tag).into_owned(),
        });
    }
    Ok(())
}
