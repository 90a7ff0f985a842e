//! Shared builders for the integration scenarios.

use fc_01_identity_registry::{AuthorityStatus, Identity, IdentityRegistry};
use fc_04_execution::adapters::{ManualClock, RecordingReplayHandler};
use fc_04_execution::{CoreConfig, MessageProcessor, ProcessorDependencies};
use shared_crypto::ServerKeyPair;
use shared_types::{ChainId, Timestamp};
use std::sync::Arc;

pub const NOW_SECS: u64 = 1_700_000_000;
pub const HEIGHT: u32 = 10;

pub fn chain(n: u8) -> ChainId {
    ChainId::new([n; 32])
}

pub fn key(n: u8) -> ServerKeyPair {
    ServerKeyPair::from_seed([n; 32])
}

/// Registry where every listed server has an identity keyed by its seed.
pub fn registry(federated: &[u8], audits: &[u8]) -> Arc<IdentityRegistry> {
    let registry = Arc::new(IdentityRegistry::new());
    let roster = federated
        .iter()
        .map(|n| (*n, AuthorityStatus::Federated))
        .chain(audits.iter().map(|n| (*n, AuthorityStatus::Audit)));
    for (n, status) in roster {
        let public_key = key(n).public_key();
        registry.set_identity(Identity::new(chain(n), public_key).with_signing_key(public_key));
        registry.create_authority(chain(n));
        registry
            .set_authority_status(&chain(n), status)
            .expect("authority just created");
    }
    registry
}

pub struct Node {
    pub processor: MessageProcessor,
    pub clock: Arc<ManualClock>,
    pub replay: Arc<RecordingReplayHandler>,
}

pub fn node(local: u8, registry: Arc<IdentityRegistry>) -> Node {
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(NOW_SECS)));
    let replay = Arc::new(RecordingReplayHandler::new());
    let mut config = CoreConfig::default();
    config.election.node_name = format!("fnode{local}");
    config.validation.validation_workers = 2;

    let processor = MessageProcessor::new(ProcessorDependencies {
        registry,
        identity_chain_id: chain(local),
        signing_key: key(local),
        salt_secret: [local; 32],
        replay: replay.clone(),
        config,
        leader_height: HEIGHT,
    })
    .expect("valid test configuration")
    .with_time_source(clock.clone());

    Node {
        processor,
        clock,
        replay,
    }
}
