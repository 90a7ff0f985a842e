//! # Heartbeat Flow
//!
//! A heartbeat travels as bytes from one node to another:
//!
//! 1. The audit server signs a heartbeat for the height being built
//! 2. The bytes are decoded by the receiving node's processor
//! 3. Validation checks drift, staleness and the registered signing key
//! 4. Execution marks the audit server online in the receiver's registry

#[cfg(test)]
mod tests {
    use super::super::fixtures::{chain, key, node, registry, HEIGHT, NOW_SECS};
    use crate::init_tracing;
    use fc_02_messages::{Heartbeat, Message, Signable, StateView, Validity};
    use fc_04_execution::ProcessorError;
    use shared_types::{NodeState, Timestamp};

    // =========================================================================
    // END-TO-END
    // =========================================================================

    #[test]
    fn test_heartbeat_over_the_wire_marks_sender_online() {
        init_tracing();
        let audit = node(7, registry(&[1, 2], &[7]));
        let leader = node(1, registry(&[1, 2], &[7]));

        let hb = audit.processor.sign_heartbeat([0xDB; 32]).unwrap();
        assert_eq!(hb.db_height, leader.processor.state().highest_saved_block() + 1);
        let bytes = Message::from(hb).marshal_binary();

        let received = leader.processor.decode(&bytes).unwrap();
        assert_eq!(leader.processor.validate(&received), Validity::Valid);

        let report = leader.processor.submit(received).unwrap();
        assert_eq!(report.executed, 1);
        assert!(leader
            .processor
            .registry()
            .get_authority(&chain(7))
            .unwrap()
            .is_online());
        assert_eq!(leader.processor.node_state(), NodeState::Running);
    }

    #[test]
    fn test_unknown_sender_is_rejected() {
        init_tracing();
        let leader = node(1, registry(&[1], &[7]));
        let mut hb = Heartbeat::new(Timestamp::from_secs(NOW_SECS), 1, HEIGHT, [0; 32], chain(9));
        hb.sign(&key(9)).unwrap();

        let report = leader.processor.submit(hb.into()).unwrap();
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn test_heartbeat_signed_by_wrong_key_is_rejected() {
        let leader = node(1, registry(&[1], &[7]));
        let mut hb = Heartbeat::new(Timestamp::from_secs(NOW_SECS), 1, HEIGHT, [0; 32], chain(7));
        hb.sign(&key(8)).unwrap();

        assert_eq!(leader.processor.validate(&hb.into()), Validity::Invalid);
    }

    #[test]
    fn test_truncated_wire_bytes_fail_to_decode() {
        let audit = node(7, registry(&[1], &[7]));
        let bytes = Message::from(audit.processor.sign_heartbeat([0; 32]).unwrap()).marshal_binary();

        let leader = node(1, registry(&[1], &[7]));
        for cut in [1, 10, bytes.len() - 1] {
            assert!(leader.processor.decode(&bytes[..cut]).is_err());
        }
    }

    // =========================================================================
    // INTEGRITY
    // =========================================================================

    #[test]
    fn test_replayed_local_identity_from_another_host_halts() {
        init_tracing();
        // A second host running with the same identity and key; its salt
        // cannot match ours.
        let original = node(7, registry(&[1], &[7]));
        let ts = Timestamp::from_secs(NOW_SECS);

        let mut twin = Heartbeat::new(
            ts,
            original.processor.state().salt(ts).wrapping_add(1),
            HEIGHT,
            [0; 32],
            chain(7),
        );
        twin.sign(&key(7)).unwrap();

        let err = original.processor.submit(twin.into()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            original.processor.node_state(),
            NodeState::HaltedAwaitingIntervention
        );
        assert_eq!(
            original.processor.retry_pending(),
            Err(ProcessorError::Halted)
        );

        original.processor.resume_after_intervention();
        let own = original.processor.sign_heartbeat([0; 32]).unwrap();
        assert_eq!(original.processor.submit(own.into()).unwrap().executed, 1);
    }
}
