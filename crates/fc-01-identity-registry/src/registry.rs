//! The identity/authority registry service.

use crate::domain::{
    Authority, AuthorityStatus, Identity, IdentityChainStructure, NewBitcoinKeyStructure,
    NewBlockSigningKeyStruct, NewMatryoshkaHashStructure, RegisterIdentityStructure,
    RegisterServerManagementStructure, RegistryError, RegistryResult, ServerManagementStructure,
    SignedStructure,
};
use crate::snapshot::{AuthorityRecord, RegistrySnapshot};
use parking_lot::RwLock;
use shared_types::{ChainId, PublicKey};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryMaps {
    identities: HashMap<ChainId, Arc<Identity>>,
    authorities: HashMap<ChainId, Arc<Authority>>,
}

/// Registry of identities and authorities keyed by chain ID.
///
/// One reader/writer lock guards both maps. Construct once at startup and
/// share through an `Arc`.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    maps: RwLock<RegistryMaps>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Identities
    // =========================================================================

    /// Insert or replace an identity.
    pub fn set_identity(&self, identity: impl Into<Arc<Identity>>) {
        let identity = identity.into();
        self.maps
            .write()
            .identities
            .insert(identity.identity_chain_id, identity);
    }

    pub fn remove_identity(&self, chain_id: &ChainId) -> RegistryResult<Arc<Identity>> {
        self.maps
            .write()
            .identities
            .remove(chain_id)
            .ok_or(RegistryError::IdentityNotFound(*chain_id))
    }

    pub fn get_identity(&self, chain_id: &ChainId) -> Option<Arc<Identity>> {
        self.maps.read().identities.get(chain_id).cloned()
    }

    /// Current block-signing key of an identity.
    pub fn signing_key(&self, chain_id: &ChainId) -> RegistryResult<PublicKey> {
        let maps = self.maps.read();
        let identity = maps
            .identities
            .get(chain_id)
            .ok_or(RegistryError::IdentityNotFound(*chain_id))?;
        identity
            .signing_key
            .ok_or(RegistryError::MissingSigningKey(*chain_id))
    }

    pub fn identity_count(&self) -> usize {
        self.maps.read().identities.len()
    }

    // =========================================================================
    // Authorities
    // =========================================================================

    /// Insert or replace an authority.
    pub fn set_authority(&self, authority: impl Into<Arc<Authority>>) {
        let authority = authority.into();
        self.maps
            .write()
            .authorities
            .insert(authority.authority_chain_id(), authority);
    }

    pub fn remove_authority(&self, chain_id: &ChainId) -> RegistryResult<Arc<Authority>> {
        self.maps
            .write()
            .authorities
            .remove(chain_id)
            .ok_or(RegistryError::AuthorityNotFound(*chain_id))
    }

    pub fn get_authority(&self, chain_id: &ChainId) -> Option<Arc<Authority>> {
        self.maps.read().authorities.get(chain_id).cloned()
    }

    /// Create a pending-full authority for `chain_id`.
    ///
    /// The management chain is copied from the identity registered under the
    /// same chain ID, if there is one. An existing authority is replaced.
    pub fn create_authority(&self, chain_id: ChainId) -> Arc<Authority> {
        let mut maps = self.maps.write();
        let management_chain_id = maps
            .identities
            .get(&chain_id)
            .and_then(|identity| identity.management_chain_id);
        let authority = Arc::new(Authority::new(
            chain_id,
            management_chain_id,
            AuthorityStatus::PendingFull,
        ));
        maps.authorities.insert(chain_id, Arc::clone(&authority));
        info!(chain_id = %chain_id, "Created pending-full authority");
        authority
    }

    /// Update an authority's online flag under the shared lock.
    pub fn set_authority_online(&self, chain_id: &ChainId, online: bool) -> RegistryResult<()> {
        let maps = self.maps.read();
        let authority = maps
            .authorities
            .get(chain_id)
            .ok_or(RegistryError::AuthorityNotFound(*chain_id))?;
        authority.set_online(online);
        Ok(())
    }

    pub fn set_authority_status(
        &self,
        chain_id: &ChainId,
        status: AuthorityStatus,
    ) -> RegistryResult<()> {
        let maps = self.maps.read();
        let authority = maps
            .authorities
            .get(chain_id)
            .ok_or(RegistryError::AuthorityNotFound(*chain_id))?;
        let previous = authority.status();
        authority.set_status(status);
        debug!(chain_id = %chain_id, %previous, %status, "Authority status changed");
        Ok(())
    }

    /// Authorities with `status`, ordered by chain ID.
    pub fn authorities_with_status(&self, status: AuthorityStatus) -> Vec<Arc<Authority>> {
        let maps = self.maps.read();
        let mut matching: Vec<_> = maps
            .authorities
            .values()
            .filter(|authority| authority.status() == status)
            .cloned()
            .collect();
        matching.sort_by_key(|authority| authority.authority_chain_id());
        matching
    }

    /// Number of federated plus audit servers.
    pub fn authority_server_count(&self) -> usize {
        self.maps
            .read()
            .authorities
            .values()
            .filter(|authority| authority.status().is_server())
            .count()
    }

    // =========================================================================
    // Identity-management structures
    // =========================================================================

    /// Install a new block-signing key.
    ///
    /// The structure must be signed by the identity's current authorizing
    /// key. The stored identity is replaced, never merged.
    pub fn apply_new_block_signing_key(&self, s: &NewBlockSigningKeyStruct) -> RegistryResult<()> {
        let chain_id = s.root_identity_chain_id;
        let mut maps = self.maps.write();
        let current = maps
            .identities
            .get(&chain_id)
            .ok_or(RegistryError::ChainDoesNotExist(chain_id))?;
        s.verify_with_key(&current.authorizing_key())?;

        let mut updated = Identity::clone(current);
        updated.signing_key = Some(s.new_public_key);
        maps.identities.insert(chain_id, Arc::new(updated));
        info!(chain_id = %chain_id, "Installed new block signing key");
        Ok(())
    }

    /// Replace the identity's matryoshka hash commitment.
    pub fn apply_new_matryoshka_hash(&self, s: &NewMatryoshkaHashStructure) -> RegistryResult<()> {
        let chain_id = s.root_identity_chain_id;
        let mut maps = self.maps.write();
        let current = maps
            .identities
            .get(&chain_id)
            .ok_or(RegistryError::ChainDoesNotExist(chain_id))?;
        s.verify_with_key(&current.authorizing_key())?;

        let mut updated = Identity::clone(current);
        updated.matryoshka_hash = Some(s.outermost_m_hash);
        maps.identities.insert(chain_id, Arc::new(updated));
        info!(chain_id = %chain_id, "Installed new matryoshka hash");
        Ok(())
    }

    /// Register a new identity. Duplicate registration is rejected.
    pub fn apply_register_identity(&self, s: &RegisterIdentityStructure) -> RegistryResult<()> {
        let chain_id = s.identity_chain_id;
        let mut maps = self.maps.write();
        if maps.identities.contains_key(&chain_id) {
            return Err(RegistryError::ChainAlreadyExists(chain_id));
        }
        s.verify_with_key(&s.identity_key())?;

        let mut identity = Identity::new(chain_id, s.identity_key());
        identity.management_chain_id = s.management_chain_id;
        maps.identities.insert(chain_id, Arc::new(identity));
        info!(chain_id = %chain_id, "Registered identity");
        Ok(())
    }

    pub fn apply_identity_chain(&self, s: &IdentityChainStructure) -> RegistryResult<()> {
        debug!(chain_id = %s.identity_chain_id, "Identity chain structure has no registry effect");
        Ok(())
    }

    pub fn apply_new_bitcoin_key(&self, s: &NewBitcoinKeyStructure) -> RegistryResult<()> {
        debug!(chain_id = %s.root_identity_chain_id, "Bitcoin key structure has no registry effect");
        Ok(())
    }

    pub fn apply_register_server_management(
        &self,
        s: &RegisterServerManagementStructure,
    ) -> RegistryResult<()> {
        debug!(chain_id = %s.identity_chain_id, "Server management registration has no registry effect");
        Ok(())
    }

    pub fn apply_server_management(&self, s: &ServerManagementStructure) -> RegistryResult<()> {
        debug!(chain_id = %s.root_identity_chain_id, "Server management structure has no registry effect");
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Consistent copy of both maps, ordered by chain ID.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let maps = self.maps.read();
        let mut identities: Vec<Identity> = maps
            .identities
            .values()
            .map(|identity| Identity::clone(identity))
            .collect();
        identities.sort_by_key(|identity| identity.identity_chain_id);

        let mut authorities: Vec<AuthorityRecord> = maps
            .authorities
            .values()
            .map(|authority| AuthorityRecord::from(authority.as_ref()))
            .collect();
        authorities.sort_by_key(|record| record.authority_chain_id);

        RegistrySnapshot {
            identities,
            authorities,
        }
    }

    /// Replace the registry contents with a snapshot.
    pub fn restore(&self, snapshot: RegistrySnapshot) {
        let identities = snapshot
            .identities
            .into_iter()
            .map(|identity| (identity.identity_chain_id, Arc::new(identity)))
            .collect();
        let authorities = snapshot
            .authorities
            .into_iter()
            .map(|record| (record.authority_chain_id, Arc::new(record.into_authority())))
            .collect();

        *self.maps.write() = RegistryMaps {
            identities,
            authorities,
        };
    }
}
