//! Message Processor - drives validation and execution
//!
//! # Architecture
//! - Validation fans out over a rayon worker pool; it only reads the
//!   registry and node state.
//! - Execution is serial per lane. Each lane owns a `ProcessList` behind its
//!   own mutex, so distinct lanes execute in parallel.
//! - Election messages bypass the lanes and go through the single election
//!   adapter in arrival order.
//! - An integrity violation halts the node until an operator resumes it.

use crate::config::CoreConfig;
use crate::error::{ProcessorError, ProcessorResult};
use crate::metrics;
use crate::ports::{MissingMessageHandler, TimeSource};
use crate::state::LocalState;
use fc_01_identity_registry::IdentityRegistry;
use fc_02_messages::{ExecutionError, Heartbeat, Message, ProcessList, Signable, StateView, Validity};
use fc_03_elections::{ElectionAdapter, ElectionPhase};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use shared_crypto::ServerKeyPair;
use shared_types::{ChainId, DecodeError, Hash, NodeState};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Dependencies for MessageProcessor
pub struct ProcessorDependencies {
    pub registry: Arc<IdentityRegistry>,
    pub identity_chain_id: ChainId,
    pub signing_key: ServerKeyPair,
    /// Secret the local salt is derived from.
    pub salt_secret: [u8; 32],
    pub replay: Arc<dyn MissingMessageHandler>,
    pub config: CoreConfig,
    /// Height being built at startup.
    pub leader_height: u32,
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub executed: usize,
    pub rejected: usize,
    /// Queued for another validation attempt.
    pub pending: usize,
    /// Dropped after exhausting validation attempts.
    pub dropped: usize,
    pub duplicates: usize,
    /// Non-fatal execution failures.
    pub failed: usize,
    pub elections_applied: usize,
    /// Election follow-ups derived locally while processing the batch.
    pub emitted: Vec<Message>,
}

impl BatchReport {
    fn absorb(&mut self, lane: LaneOutcome) {
        self.executed += lane.executed;
        self.duplicates += lane.duplicates;
        self.failed += lane.failed;
    }
}

#[derive(Debug, Default)]
struct LaneOutcome {
    executed: usize,
    duplicates: usize,
    failed: usize,
}

struct PendingMessage {
    message: Message,
    attempts: u32,
}

/// Election adapter together with the hashes it has already applied.
struct ElectionSlot {
    adapter: ElectionAdapter,
    applied: HashSet<Hash>,
}

/// One node's message pipeline.
pub struct MessageProcessor {
    config: CoreConfig,
    state: LocalState,
    signing_key: ServerKeyPair,
    elections: Mutex<ElectionSlot>,
    lanes: RwLock<Vec<Arc<Mutex<ProcessList>>>>,
    pending: Mutex<VecDeque<PendingMessage>>,
    node_state: RwLock<NodeState>,
    pool: rayon::ThreadPool,
}

impl MessageProcessor {
    /// Create a processor; the roster is seeded from registry statuses.
    pub fn new(deps: ProcessorDependencies) -> ProcessorResult<Self> {
        deps.config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(deps.config.validation.validation_workers)
            .thread_name(|i| format!("core-validate-{i}"))
            .build()
            .map_err(|e| ProcessorError::WorkerPool(e.to_string()))?;

        let adapter = ElectionAdapter::from_registry(
            deps.config.election.node_name.clone(),
            deps.identity_chain_id,
            Arc::clone(&deps.registry),
            deps.leader_height,
            deps.config.election.minutes_per_block,
        )?;

        let state = LocalState::new(
            deps.registry,
            deps.identity_chain_id,
            deps.salt_secret,
            deps.replay,
            deps.config.validation.max_message_age_secs,
        );
        state.set_leader_height(deps.leader_height);
        state.raise_highest_saved(deps.leader_height.saturating_sub(1));

        let processor = Self {
            config: deps.config,
            state,
            signing_key: deps.signing_key,
            elections: Mutex::new(ElectionSlot {
                adapter,
                applied: HashSet::new(),
            }),
            lanes: RwLock::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            node_state: RwLock::new(NodeState::Running),
            pool,
        };
        processor.sync_roster(&processor.elections.lock().adapter);

        info!(
            chain_id = %processor.state.identity_chain_id(),
            height = deps.leader_height,
            lanes = processor.state.lane_count(),
            "Message processor started"
        );
        Ok(processor)
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.state = self.state.with_time_source(time_source);
        self
    }

    // === INGRESS ===

    /// Decode exactly one message.
    pub fn decode(&self, bytes: &[u8]) -> Result<Message, DecodeError> {
        Message::unmarshal_binary(bytes)
    }

    pub fn validate(&self, msg: &Message) -> Validity {
        let validity = msg.validate(&self.state);
        metrics::record_validation(validity);
        validity
    }

    /// Validate messages in parallel; results are in input order.
    pub fn validate_batch(&self, msgs: &[Message]) -> Vec<Validity> {
        self.pool
            .install(|| msgs.par_iter().map(|msg| self.validate(msg)).collect())
    }

    pub fn submit(&self, msg: Message) -> ProcessorResult<BatchReport> {
        self.process_batch(vec![msg])
    }

    /// Validate in parallel, then execute everything that became valid.
    ///
    /// Pending messages join the retry queue. An integrity violation halts
    /// the node and is returned as the error.
    pub fn process_batch(&self, msgs: Vec<Message>) -> ProcessorResult<BatchReport> {
        self.ensure_running()?;
        let batch = msgs
            .into_iter()
            .map(|message| PendingMessage {
                message,
                attempts: 0,
            })
            .collect();
        self.run(batch)
    }

    /// Revalidate the retry queue.
    pub fn retry_pending(&self) -> ProcessorResult<BatchReport> {
        self.ensure_running()?;
        let queued: Vec<PendingMessage> = self.pending.lock().drain(..).collect();
        self.run(queued)
    }

    fn run(&self, batch: Vec<PendingMessage>) -> ProcessorResult<BatchReport> {
        let validities = self.pool.install(|| {
            batch
                .par_iter()
                .map(|item| self.validate(&item.message))
                .collect::<Vec<_>>()
        });

        let mut report = BatchReport::default();
        let mut ready = Vec::new();
        let mut requeue = Vec::new();
        for (mut item, validity) in batch.into_iter().zip(validities) {
            match validity {
                Validity::Valid => ready.push(item.message),
                Validity::Invalid => report.rejected += 1,
                Validity::Pending => {
                    item.attempts += 1;
                    if item.attempts >= self.config.validation.max_validation_attempts {
                        warn!(
                            msg = %item.message,
                            attempts = item.attempts,
                            "Dropping message that never became valid"
                        );
                        report.dropped += 1;
                    } else {
                        report.pending += 1;
                        requeue.push(item);
                    }
                }
            }
        }
        self.pending.lock().extend(requeue);

        self.execute_ready(ready, &mut report)?;
        Ok(report)
    }

    // === EXECUTION ===

    fn execute_ready(&self, ready: Vec<Message>, report: &mut BatchReport) -> ProcessorResult<()> {
        let lane_count = self.state.lane_count();
        let mut by_lane: BTreeMap<usize, Vec<Message>> = BTreeMap::new();
        let mut elections = Vec::new();
        for msg in ready {
            if msg.as_election().is_some() {
                elections.push(msg);
                continue;
            }
            let vm = msg.compute_vm_index(&self.state) % lane_count;
            by_lane.entry(vm).or_default().push(msg);
        }

        let outcomes: Vec<Result<LaneOutcome, ExecutionError>> = self.pool.install(|| {
            by_lane
                .into_par_iter()
                .map(|(vm, msgs)| self.execute_lane(vm, msgs))
                .collect()
        });
        for outcome in outcomes {
            match outcome {
                Ok(lane) => report.absorb(lane),
                Err(err) => return Err(self.halt(err)),
            }
        }

        if !elections.is_empty() {
            self.execute_elections(elections, report)?;
        }
        Ok(())
    }

    fn execute_lane(&self, vm: usize, msgs: Vec<Message>) -> Result<LaneOutcome, ExecutionError> {
        let lane = self.lane(vm);
        let mut list = lane.lock();
        let as_leader = self.state.leads(vm);
        let mut outcome = LaneOutcome::default();

        for msg in msgs {
            if list.has_seen(&msg.repeat_hash()) {
                debug!(vm, msg = %msg, "Duplicate delivery skipped");
                metrics::record_duplicate();
                outcome.duplicates += 1;
                continue;
            }
            let result = if as_leader {
                msg.leader_execute(&self.state, &mut list)
            } else {
                msg.follower_execute(&self.state, &mut list)
            };
            match result {
                Ok(()) => {
                    metrics::record_executed(as_leader);
                    outcome.executed += 1;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(vm, msg = %msg, %err, "Execution failed");
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }

    /// Apply election messages in order, feeding local follow-ups back in.
    fn execute_elections(&self, msgs: Vec<Message>, report: &mut BatchReport) -> ProcessorResult<()> {
        let mut slot = self.elections.lock();
        let mut queue: VecDeque<Message> = msgs.into();

        while let Some(msg) = queue.pop_front() {
            // `applied` holds one block's election traffic; it is cleared
            // when the height advances below.
            if !slot.applied.insert(msg.msg_hash()) {
                debug!(msg = %msg, "Election message already applied");
                metrics::record_duplicate();
                report.duplicates += 1;
                continue;
            }

            let before = slot.adapter.phase();
            let follow_up = slot.adapter.execute(&msg)?;
            report.elections_applied += 1;

            if let (ElectionPhase::Decided { vm_index, winner }, ElectionPhase::Stable) =
                (before, slot.adapter.phase())
            {
                info!(vm = vm_index, winner = %winner, "Election completed");
                metrics::record_election_completed();
            }
            if let Some(next) = follow_up {
                report.emitted.push(next.clone());
                queue.push_back(next);
            }
        }

        self.sync_roster(&slot.adapter);
        let height = slot.adapter.db_height();
        if height > self.state.leader_height() {
            slot.applied.clear();
            drop(slot);
            self.start_height(height);
        }
        Ok(())
    }

    /// Copy roster-derived values into node state and grow the lanes.
    fn sync_roster(&self, adapter: &ElectionAdapter) {
        let lane_count = self.config.lane_count(adapter.lane_count());
        let leaders = (0..lane_count).map(|vm| adapter.leader_of(vm)).collect();
        self.state.set_roster(adapter.audit_servers(), leaders);
        self.state.set_lane_count(lane_count);

        let height = self.state.leader_height();
        let mut lanes = self.lanes.write();
        while lanes.len() < lane_count {
            let vm = lanes.len();
            lanes.push(Arc::new(Mutex::new(ProcessList::new(vm, height))));
        }
    }

    fn start_height(&self, height: u32) {
        self.state.set_leader_height(height);
        for lane in self.lanes.read().iter() {
            lane.lock().reset(height);
        }
        info!(height, "Started new block height");
    }

    fn lane(&self, vm: usize) -> Arc<Mutex<ProcessList>> {
        let lanes = self.lanes.read();
        Arc::clone(&lanes[vm % lanes.len()])
    }

    // === NODE STATE ===

    fn ensure_running(&self) -> ProcessorResult<()> {
        match *self.node_state.read() {
            NodeState::Running => Ok(()),
            NodeState::HaltedAwaitingIntervention => Err(ProcessorError::Halted),
        }
    }

    fn halt(&self, err: ExecutionError) -> ProcessorError {
        *self.node_state.write() = NodeState::HaltedAwaitingIntervention;
        metrics::record_integrity_violation();
        error!(%err, "Integrity violation, halting until operator intervention");
        ProcessorError::Execution(err)
    }

    pub fn node_state(&self) -> NodeState {
        *self.node_state.read()
    }

    /// Clear a halt after an operator has dealt with the cause.
    pub fn resume_after_intervention(&self) {
        let mut node_state = self.node_state.write();
        if *node_state == NodeState::HaltedAwaitingIntervention {
            info!("Resuming after operator intervention");
        }
        *node_state = NodeState::Running;
    }

    // === LOCAL MESSAGES ===

    /// Heartbeat for the local identity at the height being built.
    pub fn sign_heartbeat(&self, dblock_hash: Hash) -> ProcessorResult<Heartbeat> {
        let timestamp = self.state.timestamp();
        let mut heartbeat = Heartbeat::new(
            timestamp,
            self.state.salt(timestamp),
            self.state.leader_height(),
            dblock_hash,
            self.state.identity_chain_id(),
        );
        heartbeat.sign(&self.signing_key)?;
        Ok(heartbeat)
    }

    /// Record that the directory block at `height` is saved.
    pub fn mark_block_saved(&self, height: u32) {
        self.state.raise_highest_saved(height);
        debug!(height, "Block saved");
    }

    // === ACCESSORS ===

    pub fn state(&self) -> &LocalState {
        &self.state
    }

    pub fn registry(&self) -> Arc<IdentityRegistry> {
        self.state.registry_handle()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn lane_count(&self) -> usize {
        self.state.lane_count()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Copy of one lane's process list.
    pub fn process_list(&self, vm: usize) -> Option<ProcessList> {
        self.lanes.read().get(vm).map(|lane| lane.lock().clone())
    }

    pub fn leader_height(&self) -> u32 {
        self.state.leader_height()
    }

    pub fn minute(&self) -> u32 {
        self.elections.lock().adapter.minute()
    }

    pub fn election_phase(&self) -> ElectionPhase {
        self.elections.lock().adapter.phase()
    }

    pub fn leader_of(&self, vm: usize) -> Option<ChainId> {
        self.state.leader_of(vm)
    }
}
