//! The signing capability shared by attributable messages.

use crate::domain::MessageError;
use fc_01_identity_registry::IdentityRegistry;
use shared_crypto::{FullSignature, ServerKeyPair};

/// A message that a server signs and peers attribute to it.
pub trait Signable {
    /// Canonical bytes excluding the signature block.
    ///
    /// Fails when a field that identifies the signer is unset.
    fn marshal_for_signature(&self) -> Result<Vec<u8>, MessageError>;

    /// Sign the canonical bytes and attach the signature.
    ///
    /// Replacing the signature clears every cached value on the instance.
    fn sign(&mut self, key: &ServerKeyPair) -> Result<(), MessageError>;

    /// Check the attached signature against the key the registry holds for
    /// the claimed identity.
    ///
    /// `Ok(false)` means no signature or a bad one. The outcome is cached
    /// until the signature is replaced.
    fn verify_signature(&self, registry: &IdentityRegistry) -> Result<bool, MessageError>;

    fn signature(&self) -> Option<&FullSignature>;
}
