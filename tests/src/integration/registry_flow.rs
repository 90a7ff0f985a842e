//! # Registry Flow
//!
//! Identity lifecycle as seen by message validation:
//!
//! 1. An identity registers itself with a self-signed structure
//! 2. Until a block-signing key is installed its messages cannot verify
//! 3. A rotation signed by the registration key installs the signing key
//! 4. A snapshot carries the rotated key to a freshly started node

#[cfg(test)]
mod tests {
    use super::super::fixtures::{chain, key, node, registry, HEIGHT, NOW_SECS};
    use crate::init_tracing;
    use fc_01_identity_registry::{
        AuthorityStatus, IdentityRegistry, NewBlockSigningKeyStruct, RegisterIdentityStructure,
        RegistryError, RegistrySnapshot,
    };
    use fc_02_messages::{Heartbeat, Message, Signable, StateView, Validity};
    use shared_types::Timestamp;
    use std::sync::Arc;

    const CANDIDATE: u8 = 20;
    const BLOCK_KEY: u8 = 21;

    fn heartbeat_signed_by(signer: u8) -> Message {
        let mut hb = Heartbeat::new(
            Timestamp::from_secs(NOW_SECS),
            3,
            HEIGHT,
            [0; 32],
            chain(CANDIDATE),
        );
        hb.sign(&key(signer)).unwrap();
        hb.into()
    }

    /// Federated server 1 plus a self-registered audit candidate.
    fn registry_with_candidate() -> Arc<IdentityRegistry> {
        let registry = registry(&[1], &[]);
        let registration = RegisterIdentityStructure::new_signed(chain(CANDIDATE), None, &key(CANDIDATE));
        registry.apply_register_identity(&registration).unwrap();
        registry.create_authority(chain(CANDIDATE));
        registry
            .set_authority_status(&chain(CANDIDATE), AuthorityStatus::Audit)
            .unwrap();
        registry
    }

    fn rotate(registry: &IdentityRegistry) {
        let rotation = NewBlockSigningKeyStruct::new_signed(
            chain(CANDIDATE),
            key(BLOCK_KEY).public_key(),
            Timestamp::from_secs(NOW_SECS),
            &key(CANDIDATE),
        );
        registry.apply_new_block_signing_key(&rotation).unwrap();
    }

    #[test]
    fn test_messages_verify_only_after_rotation() {
        init_tracing();
        let registry = registry_with_candidate();
        let leader = node(1, registry.clone());

        // Registered, but no block-signing key yet.
        assert_eq!(
            leader.processor.validate(&heartbeat_signed_by(CANDIDATE)),
            Validity::Invalid
        );

        rotate(&registry);

        assert_eq!(
            leader.processor.validate(&heartbeat_signed_by(BLOCK_KEY)),
            Validity::Valid
        );
        assert_eq!(
            leader.processor.validate(&heartbeat_signed_by(CANDIDATE)),
            Validity::Invalid
        );

        let report = leader.processor.submit(heartbeat_signed_by(BLOCK_KEY)).unwrap();
        assert_eq!(report.executed, 1);
        assert!(registry.get_authority(&chain(CANDIDATE)).unwrap().is_online());
    }

    #[test]
    fn test_rotation_for_unknown_chain_leaves_registry_unchanged() {
        let registry = registry_with_candidate();
        let before = registry.snapshot();

        let rotation = NewBlockSigningKeyStruct::new_signed(
            chain(99),
            key(BLOCK_KEY).public_key(),
            Timestamp::from_secs(NOW_SECS),
            &key(99),
        );
        assert_eq!(
            registry.apply_new_block_signing_key(&rotation),
            Err(RegistryError::ChainDoesNotExist(chain(99)))
        );
        assert_eq!(registry.snapshot(), before);
    }

    #[test]
    fn test_snapshot_carries_rotated_key_to_new_node() {
        init_tracing();
        let original = registry_with_candidate();
        rotate(&original);
        original.set_authority_online(&chain(CANDIDATE), true).unwrap();

        let bytes = original.snapshot().to_bytes().unwrap();
        let restored = Arc::new(IdentityRegistry::new());
        restored.restore(RegistrySnapshot::from_bytes(&bytes).unwrap());

        assert_eq!(
            restored.signing_key(&chain(CANDIDATE)),
            Ok(key(BLOCK_KEY).public_key())
        );
        assert!(restored.get_authority(&chain(CANDIDATE)).unwrap().is_online());

        let leader = node(1, restored);
        assert_eq!(leader.processor.state().audit_servers(HEIGHT), vec![chain(CANDIDATE)]);
        assert_eq!(
            leader.processor.validate(&heartbeat_signed_by(BLOCK_KEY)),
            Validity::Valid
        );
    }
}
