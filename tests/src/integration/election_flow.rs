//! # Election Flow
//!
//! Three federated nodes, each with its own registry, replace a silent
//! lane leader with the only audit server:
//!
//! 1. The two live leaders signal DBSig and EOM for minute 0
//! 2. A timeout opens an election for the silent lane
//! 3. Each node derives its own follow-ups; those are delivered to the
//!    other nodes until nothing new is emitted
//! 4. Every node ends with the same leader in the faulted lane
//!
//! A fourth scenario holds one node back and hands it the gossip newest
//! first; it must still land on the same roster.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{chain, node, registry, Node, HEIGHT, NOW_SECS};
    use crate::init_tracing;
    use fc_01_identity_registry::AuthorityStatus;
    use fc_02_messages::Message;
    use fc_03_elections::{ElectionPhase, ElectionsFactory};
    use shared_types::Timestamp;
    use std::collections::VecDeque;

    const FEDERATED: [u8; 3] = [1, 2, 3];
    const AUDIT: u8 = 7;

    fn factory() -> ElectionsFactory {
        ElectionsFactory::with_clock(|| Timestamp::from_secs(NOW_SECS))
    }

    fn network() -> Vec<Node> {
        network_of(&FEDERATED)
    }

    fn network_of(federated: &[u8]) -> Vec<Node> {
        federated
            .iter()
            .map(|id| {
                let registry = registry(federated, &[AUDIT]);
                registry.set_authority_online(&chain(AUDIT), true).unwrap();
                node(*id, registry)
            })
            .collect()
    }

    /// Deliver `opening` to every node, then gossip follow-ups until quiet.
    /// Returns every emitted message in emission order.
    fn run(nodes: &[Node], opening: Vec<Message>) -> Vec<Message> {
        let mut inbox: VecDeque<(usize, Vec<Message>)> =
            (0..nodes.len()).map(|i| (i, opening.clone())).collect();
        let mut emitted = Vec::new();
        let mut rounds = 0;
        while let Some((target, msgs)) = inbox.pop_front() {
            rounds += 1;
            assert!(rounds < 100, "election did not settle");
            let report = nodes[target].processor.process_batch(msgs).unwrap();
            if report.emitted.is_empty() {
                continue;
            }
            for other in (0..nodes.len()).filter(|i| *i != target) {
                inbox.push_back((other, report.emitted.clone()));
            }
            emitted.extend(report.emitted);
        }
        emitted
    }

    fn opening(silent: u8) -> Vec<Message> {
        opening_for(&FEDERATED, silent)
    }

    fn opening_for(federated: &[u8], silent: u8) -> Vec<Message> {
        let f = factory();
        let mut msgs = Vec::new();
        for id in federated.iter().filter(|id| **id != silent) {
            msgs.push(f.new_dbsig_sig_internal("boot", HEIGHT, 0, 0, chain(*id)));
            msgs.push(f.new_eom_sig_internal("boot", HEIGHT, 0, 0, chain(*id)));
        }
        msgs.push(f.new_timeout_internal("boot", HEIGHT, 0));
        msgs
    }

    #[test]
    fn test_independent_nodes_elect_same_leader() {
        init_tracing();
        let nodes = network();
        run(&nodes, opening(1));

        for n in &nodes {
            assert_eq!(n.processor.election_phase(), ElectionPhase::Stable);
            assert_eq!(n.processor.leader_of(0), Some(chain(AUDIT)));
            assert_eq!(n.processor.leader_of(1), Some(chain(2)));
            assert_eq!(n.processor.leader_of(2), Some(chain(3)));

            let registry = n.processor.registry();
            assert_eq!(
                registry.get_authority(&chain(AUDIT)).unwrap().status(),
                AuthorityStatus::Federated
            );
            assert_eq!(
                registry.get_authority(&chain(1)).unwrap().status(),
                AuthorityStatus::Full
            );
        }
    }

    #[test]
    fn test_new_leader_closes_the_block() {
        init_tracing();
        let nodes = network();
        run(&nodes, opening(1));

        let f = factory();
        let mut closing = Vec::new();
        for minute in 0..nodes[0].processor.config().election.minutes_per_block {
            for id in [AUDIT, 2, 3] {
                closing.push(f.new_eom_sig_internal("boot", HEIGHT, minute, 0, chain(id)));
            }
        }
        run(&nodes, closing);

        for n in &nodes {
            assert_eq!(n.processor.leader_height(), HEIGHT + 1);
            assert_eq!(n.processor.minute(), 0);
            assert_eq!(n.processor.process_list(0).unwrap().db_height(), HEIGHT + 1);
        }
    }

    #[test]
    fn test_replaying_the_same_sequence_is_deterministic() {
        let first = network();
        let second = network();
        run(&first, opening(2));
        run(&second, opening(2));

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.processor.leader_of(1), b.processor.leader_of(1));
            assert_eq!(a.processor.leader_of(1), Some(chain(AUDIT)));
        }
    }

    #[test]
    fn test_late_node_reaches_same_roster_from_reversed_gossip() {
        init_tracing();
        const FOUR: [u8; 4] = [1, 2, 3, 4];
        let mut nodes = network_of(&FOUR);
        let late = nodes.pop().unwrap();

        let opening = opening_for(&FOUR, 1);
        let gossip = run(&nodes, opening.clone());
        assert!(nodes
            .iter()
            .all(|n| n.processor.leader_of(0) == Some(chain(AUDIT))));

        late.processor.process_batch(opening).unwrap();
        for msg in gossip.into_iter().rev() {
            late.processor.process_batch(vec![msg]).unwrap();
        }

        assert_eq!(late.processor.election_phase(), ElectionPhase::Stable);
        for vm in 0..FOUR.len() {
            assert_eq!(late.processor.leader_of(vm), nodes[0].processor.leader_of(vm));
        }
        assert_eq!(late.processor.leader_of(0), Some(chain(AUDIT)));
        assert_eq!(
            late.processor
                .registry()
                .get_authority(&chain(AUDIT))
                .unwrap()
                .status(),
            AuthorityStatus::Federated
        );
    }
}
