//! # Ed25519 Server Signatures
//!
//! Servers sign messages with Ed25519. A signed message carries a
//! `FullSignature`: the signer's public key followed by the signature, so a
//! verifier can both check the signature and compare the key against the one
//! registered for the identity the message claims.
//!
//! ## Wire form
//!
//! ```text
//! [ public key (32) ][ signature (64) ]   = 96 bytes
//! ```

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{ByteReader, ByteWriter, DecodeError, PublicKey, Signature};
use zeroize::Zeroize;

/// Signature bytes together with the key that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FullSignature {
    /// Signer's public key.
    pub public_key: PublicKey,
    /// Detached Ed25519 signature.
    pub signature: Signature,
}

impl FullSignature {
    /// Number of bytes on the wire.
    pub const LEN: usize = 96;

    /// Serialize to the 96-byte wire form.
    pub fn to_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(&self.public_key);
        out[32..].copy_from_slice(&self.signature);
        out
    }

    /// Append the wire form to a writer.
    pub fn write(&self, w: &mut ByteWriter) {
        w.push_raw(&self.public_key).push_raw(&self.signature);
    }

    /// Read the wire form from a reader.
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let public_key = r.pop_array::<32>()?;
        let signature = r.pop_array::<64>()?;
        Ok(Self {
            public_key,
            signature,
        })
    }

    /// Check the signature over `message` against the embedded key.
    pub fn verify(&self, message: &[u8]) -> Result<(), CryptoError> {
        verify_signature(&self.public_key, message, &self.signature)
    }

    /// Check the signature and require that it was made by `expected`.
    pub fn verify_with_key(&self, expected: &PublicKey, message: &[u8]) -> Result<(), CryptoError> {
        if &self.public_key != expected {
            return Err(CryptoError::SignerMismatch);
        }
        self.verify(message)
    }
}

/// Verify a detached signature with a raw public key.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}

/// Signing key of a federated or audit server.
pub struct ServerKeyPair {
    signing_key: SigningKey,
}

impl ServerKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Public half of the key.
    pub fn public_key(&self) -> PublicKey {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Detached signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message).to_bytes()
    }

    /// Signature over `message` bundled with this key's public half.
    pub fn sign_full(&self, message: &[u8]) -> FullSignature {
        FullSignature {
            public_key: self.public_key(),
            signature: self.sign(message),
        }
    }
}

impl Drop for ServerKeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for ServerKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeyPair")
            .field("public_key", &hex_prefix(&self.public_key()))
            .finish()
    }
}

fn hex_prefix(key: &PublicKey) -> String {
    key[..4].iter().map(|b| format!("{b:02x}")).collect()
}
