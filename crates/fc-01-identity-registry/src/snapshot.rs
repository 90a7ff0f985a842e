//! Registry snapshots.
//!
//! A snapshot is a plain, serde-serializable copy of both registry maps.
//! Records are sorted by chain ID so equal registries produce equal bytes.

use crate::domain::{Authority, AuthorityStatus, Identity, RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use shared_types::ChainId;

/// Serializable form of an [`Authority`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityRecord {
    pub authority_chain_id: ChainId,
    pub management_chain_id: Option<ChainId>,
    pub status: AuthorityStatus,
    pub online: bool,
}

impl AuthorityRecord {
    pub fn into_authority(self) -> Authority {
        let authority = Authority::new(
            self.authority_chain_id,
            self.management_chain_id,
            self.status,
        );
        authority.set_online(self.online);
        authority
    }
}

impl From<&Authority> for AuthorityRecord {
    fn from(authority: &Authority) -> Self {
        Self {
            authority_chain_id: authority.authority_chain_id(),
            management_chain_id: authority.management_chain_id(),
            status: authority.status(),
            online: authority.is_online(),
        }
    }
}

/// Point-in-time copy of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub identities: Vec<Identity>,
    pub authorities: Vec<AuthorityRecord>,
}

impl RegistrySnapshot {
    pub fn to_bytes(&self) -> RegistryResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RegistryError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> RegistryResult<Self> {
        bincode::deserialize(bytes).map_err(|e| RegistryError::Snapshot(e.to_string()))
    }
}
