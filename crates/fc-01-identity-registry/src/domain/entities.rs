//! Registry records.

use crate::domain::RegistryError;
use serde::{Deserialize, Serialize};
use shared_types::{ChainId, Hash, PublicKey};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Cryptographic identity of a server.
///
/// Records are immutable once stored. A verified key rotation replaces the
/// whole record, so a caller holding an older `Arc<Identity>` keeps seeing
/// the key that was valid when it looked it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub identity_chain_id: ChainId,
    /// Key that signed the identity registration.
    pub identity_key: PublicKey,
    /// Current block-signing key, installed by a rotation structure.
    pub signing_key: Option<PublicKey>,
    /// Outermost matryoshka hash commitment.
    pub matryoshka_hash: Option<Hash>,
    pub management_chain_id: Option<ChainId>,
}

impl Identity {
    pub fn new(identity_chain_id: ChainId, identity_key: PublicKey) -> Self {
        Self {
            identity_chain_id,
            identity_key,
            signing_key: None,
            matryoshka_hash: None,
            management_chain_id: None,
        }
    }

    pub fn with_signing_key(mut self, key: PublicKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    pub fn with_management_chain(mut self, chain_id: ChainId) -> Self {
        self.management_chain_id = Some(chain_id);
        self
    }

    /// Key that must sign the next rotation structure.
    pub fn authorizing_key(&self) -> PublicKey {
        self.signing_key.unwrap_or(self.identity_key)
    }
}

/// Server status, numbered as on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AuthorityStatus {
    #[default]
    Unassigned = 0,
    Federated = 1,
    Audit = 2,
    Full = 3,
    PendingFederated = 4,
    PendingAudit = 5,
    PendingFull = 6,
    Skeleton = 7,
}

impl AuthorityStatus {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Federated and audit servers count toward the authority set.
    pub fn is_server(self) -> bool {
        matches!(self, Self::Federated | Self::Audit)
    }
}

impl TryFrom<u8> for AuthorityStatus {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unassigned),
            1 => Ok(Self::Federated),
            2 => Ok(Self::Audit),
            3 => Ok(Self::Full),
            4 => Ok(Self::PendingFederated),
            5 => Ok(Self::PendingAudit),
            6 => Ok(Self::PendingFull),
            7 => Ok(Self::Skeleton),
            other => Err(RegistryError::InvalidStatus(other)),
        }
    }
}

impl fmt::Display for AuthorityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unassigned => "unassigned",
            Self::Federated => "federated",
            Self::Audit => "audit",
            Self::Full => "full",
            Self::PendingFederated => "pending-federated",
            Self::PendingAudit => "pending-audit",
            Self::PendingFull => "pending-full",
            Self::Skeleton => "skeleton",
        };
        f.write_str(name)
    }
}

/// Eligibility and liveness record of one server.
///
/// Status and online flag are updated in place through the shared lock,
/// so heartbeats from many lanes never contend on the registry writer.
#[derive(Debug)]
pub struct Authority {
    authority_chain_id: ChainId,
    management_chain_id: Option<ChainId>,
    status: AtomicU8,
    online: AtomicBool,
}

impl Authority {
    pub fn new(
        authority_chain_id: ChainId,
        management_chain_id: Option<ChainId>,
        status: AuthorityStatus,
    ) -> Self {
        Self {
            authority_chain_id,
            management_chain_id,
            status: AtomicU8::new(status.as_u8()),
            online: AtomicBool::new(false),
        }
    }

    pub fn authority_chain_id(&self) -> ChainId {
        self.authority_chain_id
    }

    pub fn management_chain_id(&self) -> Option<ChainId> {
        self.management_chain_id
    }

    pub fn status(&self) -> AuthorityStatus {
        // Only valid discriminants are ever stored.
        AuthorityStatus::try_from(self.status.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn set_status(&self, status: AuthorityStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}
