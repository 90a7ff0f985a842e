//! # Identity-Management Structures
//!
//! Signed on-chain events that mutate the registry. Each structure signs a
//! canonical byte form of its fields:
//!
//! ```text
//! [ version (1) = 0 ][ label ][ fields in declaration order ]
//! ```
//!
//! The embedded [`FullSignature`] names the signer's public key, which the
//! registry compares against the key it expects before checking the
//! signature itself.

use shared_crypto::{CryptoError, FullSignature, ServerKeyPair};
use shared_types::{ByteWriter, ChainId, Hash, PublicKey, Timestamp};

const STRUCTURE_VERSION: u8 = 0;

/// Common shape of a signed identity-management structure.
pub trait SignedStructure {
    /// Canonical bytes covered by the signature.
    fn marshal_for_signature(&self) -> Vec<u8>;

    fn signature(&self) -> &FullSignature;

    /// Verify the signature and require that `key` produced it.
    fn verify_with_key(&self, key: &PublicKey) -> Result<(), CryptoError> {
        self.signature()
            .verify_with_key(key, &self.marshal_for_signature())
    }
}

fn header(label: &[u8]) -> ByteWriter {
    let mut w = ByteWriter::with_capacity(128);
    w.push_u8(STRUCTURE_VERSION).push_raw(label);
    w
}

fn placeholder(keypair: &ServerKeyPair) -> FullSignature {
    FullSignature {
        public_key: keypair.public_key(),
        signature: [0u8; 64],
    }
}

/// Installs a new block-signing key for an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlockSigningKeyStruct {
    pub root_identity_chain_id: ChainId,
    pub new_public_key: PublicKey,
    pub timestamp: Timestamp,
    pub signature: FullSignature,
}

impl NewBlockSigningKeyStruct {
    /// Build and sign with the identity's current authorizing key.
    pub fn new_signed(
        root_identity_chain_id: ChainId,
        new_public_key: PublicKey,
        timestamp: Timestamp,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            root_identity_chain_id,
            new_public_key,
            timestamp,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for NewBlockSigningKeyStruct {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"New Block Signing Key");
        w.push_chain_id(&self.root_identity_chain_id)
            .push_raw(&self.new_public_key)
            .push_timestamp(self.timestamp);
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// Publishes a new outermost matryoshka hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatryoshkaHashStructure {
    pub root_identity_chain_id: ChainId,
    pub outermost_m_hash: Hash,
    pub timestamp: Timestamp,
    pub signature: FullSignature,
}

impl NewMatryoshkaHashStructure {
    pub fn new_signed(
        root_identity_chain_id: ChainId,
        outermost_m_hash: Hash,
        timestamp: Timestamp,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            root_identity_chain_id,
            outermost_m_hash,
            timestamp,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for NewMatryoshkaHashStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"New Matryoshka Hash");
        w.push_chain_id(&self.root_identity_chain_id)
            .push_hash(&self.outermost_m_hash)
            .push_timestamp(self.timestamp);
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// First registration of an identity. Self-signed by the registration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterIdentityStructure {
    pub identity_chain_id: ChainId,
    pub management_chain_id: Option<ChainId>,
    pub signature: FullSignature,
}

impl RegisterIdentityStructure {
    pub fn new_signed(
        identity_chain_id: ChainId,
        management_chain_id: Option<ChainId>,
        identity_key: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            identity_chain_id,
            management_chain_id,
            signature: placeholder(identity_key),
        };
        s.signature = identity_key.sign_full(&s.marshal_for_signature());
        s
    }

    pub fn identity_key(&self) -> PublicKey {
        self.signature.public_key
    }
}

impl SignedStructure for RegisterIdentityStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"Register Identity");
        w.push_chain_id(&self.identity_chain_id);
        match &self.management_chain_id {
            Some(chain_id) => w.push_u8(1).push_chain_id(chain_id),
            None => w.push_u8(0),
        };
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// Identity chain creation record. Carries no registry side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChainStructure {
    pub identity_chain_id: ChainId,
    pub key_hashes: Vec<Hash>,
    pub signature: FullSignature,
}

impl IdentityChainStructure {
    pub fn new_signed(
        identity_chain_id: ChainId,
        key_hashes: Vec<Hash>,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            identity_chain_id,
            key_hashes,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for IdentityChainStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"Identity Chain");
        w.push_chain_id(&self.identity_chain_id)
            .push_u32(self.key_hashes.len() as u32);
        for key_hash in &self.key_hashes {
            w.push_hash(key_hash);
        }
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// Anchors a Bitcoin key to an identity. Carries no registry side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBitcoinKeyStructure {
    pub root_identity_chain_id: ChainId,
    pub bitcoin_key_level: u8,
    pub bitcoin_key_type: u8,
    pub new_key: [u8; 20],
    pub timestamp: Timestamp,
    pub signature: FullSignature,
}

impl NewBitcoinKeyStructure {
    pub fn new_signed(
        root_identity_chain_id: ChainId,
        bitcoin_key_level: u8,
        bitcoin_key_type: u8,
        new_key: [u8; 20],
        timestamp: Timestamp,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            root_identity_chain_id,
            bitcoin_key_level,
            bitcoin_key_type,
            new_key,
            timestamp,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for NewBitcoinKeyStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"New Bitcoin Key");
        w.push_chain_id(&self.root_identity_chain_id)
            .push_u8(self.bitcoin_key_level)
            .push_u8(self.bitcoin_key_type)
            .push_raw(&self.new_key)
            .push_timestamp(self.timestamp);
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// Links an identity to its server-management subchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterServerManagementStructure {
    pub identity_chain_id: ChainId,
    pub subchain_id: ChainId,
    pub signature: FullSignature,
}

impl RegisterServerManagementStructure {
    pub fn new_signed(
        identity_chain_id: ChainId,
        subchain_id: ChainId,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            identity_chain_id,
            subchain_id,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for RegisterServerManagementStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"Register Server Management");
        w.push_chain_id(&self.identity_chain_id)
            .push_chain_id(&self.subchain_id);
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}

/// Server-management subchain creation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerManagementStructure {
    pub root_identity_chain_id: ChainId,
    pub timestamp: Timestamp,
    pub signature: FullSignature,
}

impl ServerManagementStructure {
    pub fn new_signed(
        root_identity_chain_id: ChainId,
        timestamp: Timestamp,
        signer: &ServerKeyPair,
    ) -> Self {
        let mut s = Self {
            root_identity_chain_id,
            timestamp,
            signature: placeholder(signer),
        };
        s.signature = signer.sign_full(&s.marshal_for_signature());
        s
    }
}

impl SignedStructure for ServerManagementStructure {
    fn marshal_for_signature(&self) -> Vec<u8> {
        let mut w = header(b"Server Management");
        w.push_chain_id(&self.root_identity_chain_id)
            .push_timestamp(self.timestamp);
        w.into_bytes()
    }

    fn signature(&self) -> &FullSignature {
        &self.signature
    }
}
