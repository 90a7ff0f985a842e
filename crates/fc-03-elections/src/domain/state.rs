//! # Election State Machine
//!
//! Roster and per-minute progress for one node's view of the federation.
//!
//! ```text
//! Stable ──Timeout(h, m)──→ Electing{vm, round 0} ──Timeout──→ round + 1
//!                                │ majority of non-faulted federated votes
//!                                ↓
//!                 Decided{vm, winner} ──RemoveLeader(faulted)
//!                                     ──AddLeader(winner)
//!                                     ──RemoveAudit(winner)──→ Stable
//! ```
//!
//! Every decision depends only on the roster and message content, and ties
//! are broken by chain-ID order, so nodes that apply the same messages reach
//! the same roster regardless of arrival timing.
//!
//! A peer that decided first may have its roster messages arrive before the
//! votes that would decide the election locally. While the election is
//! open, `RemoveLeader(faulted)` only vacates the lane and `AddLeader` of an
//! audit server settles the election with that server as winner; a new lane
//! is never opened.

use crate::domain::{Election, ElectionError, ElectionPhase, ElectionResult};
use fc_01_identity_registry::AuthorityStatus;
use fc_02_messages::{ElectionMessage, ElectionPayload};
use shared_types::ChainId;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Effects of applying one election message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Message the local node should emit next.
    pub follow_up: Option<ElectionPayload>,
    /// Registry status updates implied by roster changes.
    pub status_changes: Vec<(ChainId, AuthorityStatus)>,
    pub minute_closed: bool,
    pub block_closed: bool,
}

impl Transition {
    fn emit(payload: ElectionPayload) -> Self {
        Self {
            follow_up: Some(payload),
            ..Self::default()
        }
    }
}

/// Roster, minute barrier and the running election, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elections {
    db_height: u32,
    minute: u32,
    minutes_per_block: u32,
    /// Lane `i` is led by `lanes[i]`; `None` while a replacement is pending.
    lanes: Vec<Option<ChainId>>,
    audits: BTreeSet<ChainId>,
    eom_signed: BTreeSet<ChainId>,
    dbsig_signed: BTreeSet<ChainId>,
    election: Option<Election>,
}

impl Elections {
    /// Lanes are assigned to federated servers in chain-ID order.
    pub fn new(
        db_height: u32,
        minutes_per_block: u32,
        federated: impl IntoIterator<Item = ChainId>,
        audits: impl IntoIterator<Item = ChainId>,
    ) -> ElectionResult<Self> {
        if minutes_per_block == 0 {
            return Err(ElectionError::ZeroMinutesPerBlock);
        }
        let federated: BTreeSet<ChainId> = federated.into_iter().collect();
        if federated.is_empty() {
            return Err(ElectionError::NoFederatedServers);
        }
        Ok(Self {
            db_height,
            minute: 0,
            minutes_per_block,
            lanes: federated.into_iter().map(Some).collect(),
            audits: audits.into_iter().collect(),
            eom_signed: BTreeSet::new(),
            dbsig_signed: BTreeSet::new(),
            election: None,
        })
    }

    pub fn db_height(&self) -> u32 {
        self.db_height
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_per_block(&self) -> u32 {
        self.minutes_per_block
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn leader_of(&self, vm_index: usize) -> Option<ChainId> {
        self.lanes.get(vm_index).copied().flatten()
    }

    pub fn lane_of(&self, server: &ChainId) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.as_ref() == Some(server))
    }

    pub fn is_federated(&self, server: &ChainId) -> bool {
        self.lane_of(server).is_some()
    }

    /// Current leaders in lane order.
    pub fn federated_servers(&self) -> Vec<ChainId> {
        self.lanes.iter().flatten().copied().collect()
    }

    /// Audit servers in chain-ID order.
    pub fn audit_servers(&self) -> Vec<ChainId> {
        self.audits.iter().copied().collect()
    }

    pub fn election(&self) -> Option<&Election> {
        self.election.as_ref()
    }

    pub fn phase(&self) -> ElectionPhase {
        self.election
            .as_ref()
            .map_or(ElectionPhase::Stable, Election::phase)
    }

    /// Lane currently being elected.
    pub fn electing(&self) -> Option<usize> {
        self.election.as_ref().map(|e| e.vm_index)
    }

    /// Apply one election message.
    ///
    /// `local` is the identity this node votes as; `is_online` reports
    /// registry liveness for candidate selection.
    pub fn apply(
        &mut self,
        msg: &ElectionMessage,
        local: ChainId,
        is_online: &dyn Fn(&ChainId) -> bool,
    ) -> Transition {
        match msg.payload {
            ElectionPayload::EomSig {
                minute, server_id, ..
            } => self.on_eom_sig(msg.db_height, minute, server_id),
            ElectionPayload::DbSigSig { server_id, .. } => {
                self.on_dbsig_sig(msg.db_height, server_id)
            }
            ElectionPayload::Timeout { minute } => self.on_timeout(msg.db_height, minute, is_online),
            ElectionPayload::Volunteer {
                minute,
                vm_index,
                round,
                server_id,
            } => self.on_volunteer(msg.db_height, minute, vm_index, round, server_id, local),
            ElectionPayload::Vote {
                minute,
                vm_index,
                round,
                server_id,
                voter,
            } => self.on_vote(msg.db_height, minute, vm_index, round, server_id, voter),
            ElectionPayload::RemoveLeader { server_id } => self.on_remove_leader(server_id),
            ElectionPayload::AddLeader { server_id } => self.on_add_leader(server_id),
            ElectionPayload::AddAudit { server_id } => self.on_add_audit(server_id),
            ElectionPayload::RemoveAudit { server_id } => self.on_remove_audit(server_id),
        }
    }

    fn is_current(&self, db_height: u32, minute: u32) -> bool {
        db_height == self.db_height && minute == self.minute
    }

    fn on_eom_sig(&mut self, db_height: u32, minute: u32, server: ChainId) -> Transition {
        if !self.is_current(db_height, minute) || !self.is_federated(&server) {
            debug!(db_height, minute, server = %server, "Ignoring EOM signal");
            return Transition::default();
        }
        self.eom_signed.insert(server);

        let all_signed = self
            .lanes
            .iter()
            .all(|lane| matches!(lane, Some(leader) if self.eom_signed.contains(leader)));
        if !all_signed {
            return Transition::default();
        }
        self.close_minute()
    }

    fn close_minute(&mut self) -> Transition {
        if let Some(election) = self.election.take() {
            warn!(vm = election.vm_index, round = election.round, "Minute closed during election");
        }
        self.eom_signed.clear();
        self.minute += 1;

        let mut transition = Transition {
            minute_closed: true,
            ..Transition::default()
        };
        if self.minute >= self.minutes_per_block {
            self.minute = 0;
            self.db_height += 1;
            self.dbsig_signed.clear();
            transition.block_closed = true;
            info!(db_height = self.db_height, "Block closed, next height");
        } else {
            debug!(db_height = self.db_height, minute = self.minute, "Minute closed");
        }
        transition
    }

    fn on_dbsig_sig(&mut self, db_height: u32, server: ChainId) -> Transition {
        if db_height == self.db_height && self.is_federated(&server) {
            self.dbsig_signed.insert(server);
        }
        Transition::default()
    }

    fn eligible_candidates(&self, is_online: &dyn Fn(&ChainId) -> bool) -> Vec<ChainId> {
        self.audits.iter().filter(|id| is_online(id)).copied().collect()
    }

    fn on_timeout(
        &mut self,
        db_height: u32,
        minute: u32,
        is_online: &dyn Fn(&ChainId) -> bool,
    ) -> Transition {
        if !self.is_current(db_height, minute) {
            debug!(db_height, minute, "Ignoring stale timeout");
            return Transition::default();
        }

        let starting = match self.election.as_mut() {
            Some(election) if election.is_decided() => return Transition::default(),
            Some(election) => {
                election.advance_round();
                false
            }
            None => true,
        };
        if starting {
            let faulted = self.lanes.iter().enumerate().find_map(|(vm, lane)| {
                lane.filter(|leader| {
                    !(self.dbsig_signed.contains(leader) && self.eom_signed.contains(leader))
                })
                .map(|leader| (vm, leader))
            });
            let Some((vm_index, leader)) = faulted else {
                debug!(db_height, minute, "Timeout with every leader responsive");
                return Transition::default();
            };
            info!(vm = vm_index, leader = %leader, db_height, minute, "Leader timed out, electing");
            self.election = Some(Election::new(vm_index, leader, minute));
        }

        let candidates = self.eligible_candidates(is_online);
        let Some(election) = self.election.as_ref() else {
            return Transition::default();
        };
        if candidates.is_empty() {
            warn!(vm = election.vm_index, round = election.round, "No online audit server to volunteer");
            return Transition::default();
        }
        let candidate = candidates[election.round as usize % candidates.len()];
        Transition::emit(ElectionPayload::Volunteer {
            minute,
            vm_index: election.vm_index as u32,
            round: election.round,
            server_id: candidate,
        })
    }

    fn on_volunteer(
        &mut self,
        db_height: u32,
        minute: u32,
        vm_index: u32,
        round: u32,
        candidate: ChainId,
        local: ChainId,
    ) -> Transition {
        if !self.is_current(db_height, minute) || !self.audits.contains(&candidate) {
            return Transition::default();
        }
        let local_votes = self.is_federated(&local);
        let Some(election) = self.election.as_mut() else {
            return Transition::default();
        };
        if election.is_decided()
            || election.vm_index != vm_index as usize
            || election.round != round
        {
            return Transition::default();
        }
        election.add_volunteer(candidate);

        if !local_votes || local == election.faulted || !election.take_local_vote() {
            return Transition::default();
        }
        Transition::emit(ElectionPayload::Vote {
            minute,
            vm_index,
            round,
            server_id: candidate,
            voter: local,
        })
    }

    fn on_vote(
        &mut self,
        db_height: u32,
        minute: u32,
        vm_index: u32,
        round: u32,
        candidate: ChainId,
        voter: ChainId,
    ) -> Transition {
        if !self.is_current(db_height, minute)
            || !self.is_federated(&voter)
            || self.is_federated(&candidate)
        {
            return Transition::default();
        }
        // A vacated faulted lane still counts, so the threshold does not
        // depend on whether its removal has arrived yet.
        let voting = self.lanes.len();
        let Some(election) = self.election.as_mut() else {
            return Transition::default();
        };
        if election.is_decided()
            || election.vm_index != vm_index as usize
            || election.round != round
            || voter == election.faulted
        {
            return Transition::default();
        }
        if !self.audits.contains(&candidate) && !election.is_retired(&candidate) {
            debug!(candidate = %candidate, voter = %voter, "Vote for a non-audit server ignored");
            return Transition::default();
        }
        // A vote can overtake its volunteer message.
        election.add_volunteer(candidate);
        if !election.record_vote(candidate, voter) {
            debug!(voter = %voter, round, "Repeated vote ignored");
            return Transition::default();
        }

        let majority = voting.saturating_sub(1) / 2 + 1;
        match election.leading() {
            Some((winner, count)) if count >= majority => {
                election.decide(winner);
                info!(vm = election.vm_index, winner = %winner, votes = count, "Election decided");
                if self.lanes[election.vm_index].is_none() {
                    Transition::emit(ElectionPayload::AddLeader { server_id: winner })
                } else {
                    Transition::emit(ElectionPayload::RemoveLeader {
                        server_id: election.faulted,
                    })
                }
            }
            _ => Transition::default(),
        }
    }

    fn on_remove_leader(&mut self, server: ChainId) -> Transition {
        let Some(lane) = self.lane_of(&server) else {
            return Transition::default();
        };
        let mut transition = Transition {
            status_changes: vec![(server, AuthorityStatus::Full)],
            ..Transition::default()
        };
        self.eom_signed.remove(&server);
        self.dbsig_signed.remove(&server);

        let replacing = self
            .election
            .as_ref()
            .filter(|election| election.faulted == server && election.vm_index == lane)
            .map(Election::winner);
        match replacing {
            Some(winner) => {
                self.lanes[lane] = None;
                transition.follow_up =
                    winner.map(|winner| ElectionPayload::AddLeader { server_id: winner });
            }
            None => {
                if self.lanes.len() > 1 {
                    self.lanes.remove(lane);
                    // Lane numbers shifted; a running election no longer
                    // refers to the right lane.
                    self.election = None;
                } else {
                    self.lanes[lane] = None;
                }
            }
        }
        info!(server = %server, lane, "Federated server removed");
        transition
    }

    fn on_add_leader(&mut self, server: ChainId) -> Transition {
        if self.is_federated(&server) {
            return Transition::default();
        }
        if self.election.is_none() {
            match self.lanes.iter().position(Option::is_none) {
                Some(vacant) => self.lanes[vacant] = Some(server),
                None => self.lanes.push(Some(server)),
            }
            return Transition {
                status_changes: vec![(server, AuthorityStatus::Federated)],
                ..Transition::default()
            };
        }

        let Some(election) = self.election.as_mut() else {
            return Transition::default();
        };
        let adoptable = match election.winner() {
            Some(winner) => winner == server,
            None => self.audits.contains(&server) || election.is_retired(&server),
        };
        if !adoptable {
            debug!(server = %server, vm = election.vm_index, "Leader addition ignored during election");
            return Transition::default();
        }
        if !election.is_decided() {
            info!(vm = election.vm_index, winner = %server, "Election decided by roster change");
            election.decide(server);
        }

        let lane = election.vm_index;
        if self.lanes[lane].is_some() {
            // The faulted leader still holds the lane; its removal hands over.
            return Transition::default();
        }
        self.lanes[lane] = Some(server);
        info!(server = %server, lane, "Winner took over lane");
        Transition {
            follow_up: Some(ElectionPayload::RemoveAudit { server_id: server }),
            status_changes: vec![(server, AuthorityStatus::Federated)],
            ..Transition::default()
        }
    }

    fn on_add_audit(&mut self, server: ChainId) -> Transition {
        if !self.audits.insert(server) {
            return Transition::default();
        }
        Transition {
            status_changes: vec![(server, AuthorityStatus::Audit)],
            ..Transition::default()
        }
    }

    fn on_remove_audit(&mut self, server: ChainId) -> Transition {
        let completes = self.election.as_ref().is_some_and(|election| {
            election.winner() == Some(server) && self.lanes[election.vm_index] == Some(server)
        });
        if completes {
            self.audits.remove(&server);
            if let Some(election) = self.election.take() {
                info!(vm = election.vm_index, leader = %server, "Election complete");
            }
            return Transition::default();
        }

        if !self.audits.remove(&server) {
            return Transition::default();
        }
        if let Some(election) = self.election.as_mut() {
            election.retire(server);
            if election.winner() == Some(server) {
                return Transition::default();
            }
        }
        if self.is_federated(&server) {
            return Transition::default();
        }
        Transition {
            status_changes: vec![(server, AuthorityStatus::Full)],
            ..Transition::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Timestamp;

    fn chain(byte: u8) -> ChainId {
        ChainId::new([byte; 32])
    }

    fn msg(db_height: u32, payload: ElectionPayload) -> ElectionMessage {
        ElectionMessage::new("test", Timestamp::from_secs(1), db_height, payload)
    }

    fn all_online(_: &ChainId) -> bool {
        true
    }

    fn eom(state: &mut Elections, server: ChainId) -> Transition {
        let m = msg(
            state.db_height(),
            ElectionPayload::EomSig {
                minute: state.minute(),
                height: 0,
                server_id: server,
            },
        );
        state.apply(&m, chain(0), &all_online)
    }

    fn roster() -> Elections {
        Elections::new(5, 2, [chain(3), chain(1), chain(2)], [chain(8), chain(7)]).unwrap()
    }

    fn step(state: &mut Elections, payload: ElectionPayload, local: ChainId) -> Transition {
        state.apply(&msg(5, payload), local, &all_online)
    }

    fn vote_for(candidate: u8, voter: u8) -> ElectionPayload {
        ElectionPayload::Vote {
            minute: 0,
            vm_index: 0,
            round: 0,
            server_id: chain(candidate),
            voter: chain(voter),
        }
    }

    const TIMEOUT: ElectionPayload = ElectionPayload::Timeout { minute: 0 };
    const VOLUNTEER_7: ElectionPayload = ElectionPayload::Volunteer {
        minute: 0,
        vm_index: 0,
        round: 0,
        server_id: ChainId::new([7; 32]),
    };

    #[test]
    fn test_construction_orders_lanes() {
        let state = roster();
        assert_eq!(state.federated_servers(), vec![chain(1), chain(2), chain(3)]);
        assert_eq!(state.audit_servers(), vec![chain(7), chain(8)]);
        assert_eq!(state.leader_of(1), Some(chain(2)));
        assert_eq!(state.phase(), ElectionPhase::Stable);

        assert_eq!(
            Elections::new(0, 10, [], [chain(1)]),
            Err(ElectionError::NoFederatedServers)
        );
        assert_eq!(
            Elections::new(0, 0, [chain(1)], []),
            Err(ElectionError::ZeroMinutesPerBlock)
        );
    }

    #[test]
    fn test_minute_barrier_and_block_wrap() {
        let mut state = roster();
        assert!(!eom(&mut state, chain(1)).minute_closed);
        assert!(!eom(&mut state, chain(1)).minute_closed);
        assert!(!eom(&mut state, chain(9)).minute_closed);
        assert!(!eom(&mut state, chain(2)).minute_closed);
        let closed = eom(&mut state, chain(3));
        assert!(closed.minute_closed && !closed.block_closed);
        assert_eq!((state.db_height(), state.minute()), (5, 1));

        for id in [1, 2] {
            eom(&mut state, chain(id));
        }
        let wrapped = eom(&mut state, chain(3));
        assert!(wrapped.block_closed);
        assert_eq!((state.db_height(), state.minute()), (6, 0));
    }

    #[test]
    fn test_stale_eom_ignored() {
        let mut state = roster();
        let stale = msg(
            4,
            ElectionPayload::EomSig {
                minute: 0,
                height: 0,
                server_id: chain(1),
            },
        );
        state.apply(&stale, chain(0), &all_online);
        for id in [2, 3] {
            eom(&mut state, chain(id));
        }
        assert_eq!(state.minute(), 0);
    }

    #[test]
    fn test_timeout_picks_lowest_unresponsive_lane() {
        let mut state = roster();
        for id in [1, 2, 3] {
            state.apply(
                &msg(5, ElectionPayload::DbSigSig { minute: 0, height: 0, server_id: chain(id) }),
                chain(0),
                &all_online,
            );
        }
        eom(&mut state, chain(1));

        let t = state.apply(&msg(5, ElectionPayload::Timeout { minute: 0 }), chain(0), &all_online);
        assert_eq!(state.electing(), Some(1));
        assert_eq!(
            t.follow_up,
            Some(ElectionPayload::Volunteer {
                minute: 0,
                vm_index: 1,
                round: 0,
                server_id: chain(7)
            })
        );

        // Next timeout rotates to the next candidate.
        let t = state.apply(&msg(5, ElectionPayload::Timeout { minute: 0 }), chain(0), &all_online);
        assert_eq!(
            t.follow_up,
            Some(ElectionPayload::Volunteer {
                minute: 0,
                vm_index: 1,
                round: 1,
                server_id: chain(8)
            })
        );
    }

    #[test]
    fn test_offline_audits_are_skipped() {
        let mut state = roster();
        let only_eight = |id: &ChainId| *id == chain(8);
        let t = state.apply(&msg(5, ElectionPayload::Timeout { minute: 0 }), chain(0), &only_eight);
        assert!(matches!(
            t.follow_up,
            Some(ElectionPayload::Volunteer { server_id, .. }) if server_id == chain(8)
        ));

        let mut stalled = roster();
        let t = stalled.apply(&msg(5, ElectionPayload::Timeout { minute: 0 }), chain(0), &|_| false);
        assert_eq!(t.follow_up, None);
        assert_eq!(stalled.electing(), Some(0));
    }

    #[test]
    fn test_full_replacement_cycle() {
        let mut state = roster();
        let local = chain(2);
        state.apply(&msg(5, ElectionPayload::Timeout { minute: 0 }), local, &all_online);
        assert_eq!(state.electing(), Some(0));

        let volunteer = ElectionPayload::Volunteer {
            minute: 0,
            vm_index: 0,
            round: 0,
            server_id: chain(7),
        };
        let t = state.apply(&msg(5, volunteer), local, &all_online);
        assert_eq!(
            t.follow_up,
            Some(ElectionPayload::Vote {
                minute: 0,
                vm_index: 0,
                round: 0,
                server_id: chain(7),
                voter: local
            })
        );
        // Only one local vote per round.
        assert_eq!(state.apply(&msg(5, volunteer), local, &all_online).follow_up, None);

        let vote = |voter: u8| ElectionPayload::Vote {
            minute: 0,
            vm_index: 0,
            round: 0,
            server_id: chain(7),
            voter: chain(voter),
        };
        // The faulted leader's vote does not count.
        assert_eq!(state.apply(&msg(5, vote(1)), local, &all_online).follow_up, None);
        assert_eq!(state.apply(&msg(5, vote(2)), local, &all_online).follow_up, None);
        let decided = state.apply(&msg(5, vote(3)), local, &all_online);
        assert_eq!(
            decided.follow_up,
            Some(ElectionPayload::RemoveLeader { server_id: chain(1) })
        );
        assert_eq!(
            state.phase(),
            ElectionPhase::Decided {
                vm_index: 0,
                winner: chain(7)
            }
        );

        let removed = state.apply(
            &msg(5, ElectionPayload::RemoveLeader { server_id: chain(1) }),
            local,
            &all_online,
        );
        assert_eq!(removed.status_changes, vec![(chain(1), AuthorityStatus::Full)]);
        assert_eq!(
            removed.follow_up,
            Some(ElectionPayload::AddLeader { server_id: chain(7) })
        );
        assert_eq!(state.leader_of(0), None);

        let added = state.apply(
            &msg(5, ElectionPayload::AddLeader { server_id: chain(7) }),
            local,
            &all_online,
        );
        assert_eq!(added.status_changes, vec![(chain(7), AuthorityStatus::Federated)]);
        assert_eq!(
            added.follow_up,
            Some(ElectionPayload::RemoveAudit { server_id: chain(7) })
        );
        assert_eq!(state.leader_of(0), Some(chain(7)));

        let done = state.apply(
            &msg(5, ElectionPayload::RemoveAudit { server_id: chain(7) }),
            local,
            &all_online,
        );
        assert_eq!(done, Transition::default());
        assert_eq!(state.phase(), ElectionPhase::Stable);
        assert_eq!(state.audit_servers(), vec![chain(8)]);
        assert_eq!(state.federated_servers(), vec![chain(7), chain(2), chain(3)]);
    }

    #[test]
    fn test_roster_changes_outside_election() {
        let mut state = roster();
        let t = state.apply(
            &msg(5, ElectionPayload::AddAudit { server_id: chain(9) }),
            chain(0),
            &all_online,
        );
        assert_eq!(t.status_changes, vec![(chain(9), AuthorityStatus::Audit)]);
        assert_eq!(
            state.apply(&msg(5, ElectionPayload::AddAudit { server_id: chain(9) }), chain(0), &all_online),
            Transition::default()
        );

        state.apply(&msg(5, ElectionPayload::AddLeader { server_id: chain(4) }), chain(0), &all_online);
        assert_eq!(state.lane_count(), 4);
        assert_eq!(state.leader_of(3), Some(chain(4)));

        state.apply(&msg(5, ElectionPayload::RemoveLeader { server_id: chain(2) }), chain(0), &all_online);
        assert_eq!(state.federated_servers(), vec![chain(1), chain(3), chain(4)]);
    }

    #[test]
    fn test_roster_changes_overtaking_votes() {
        let local = chain(3);
        let remove_1 = ElectionPayload::RemoveLeader { server_id: chain(1) };
        let add_7 = ElectionPayload::AddLeader { server_id: chain(7) };
        let remove_audit_7 = ElectionPayload::RemoveAudit { server_id: chain(7) };

        let mut in_order = roster();
        for payload in [TIMEOUT, VOLUNTEER_7, vote_for(7, 3), vote_for(7, 2), remove_1, add_7, remove_audit_7] {
            step(&mut in_order, payload, local);
        }

        // A peer decided first; its roster changes arrive before vote 2.
        let mut lagging = roster();
        step(&mut lagging, TIMEOUT, local);
        step(&mut lagging, VOLUNTEER_7, local);
        step(&mut lagging, vote_for(7, 3), local);

        let removed = step(&mut lagging, remove_1, local);
        assert_eq!(removed.follow_up, None);
        assert_eq!(lagging.leader_of(0), None);
        assert_eq!(lagging.phase(), ElectionPhase::Electing { vm_index: 0, round: 0 });

        let added = step(&mut lagging, add_7, local);
        assert_eq!(added.follow_up, Some(remove_audit_7));
        assert_eq!(lagging.lane_count(), 3);
        assert_eq!(lagging.leader_of(0), Some(chain(7)));

        step(&mut lagging, remove_audit_7, local);
        assert_eq!(step(&mut lagging, vote_for(7, 2), local), Transition::default());

        assert_eq!(lagging.phase(), ElectionPhase::Stable);
        assert_eq!(lagging, in_order);
        assert_eq!(lagging.federated_servers(), vec![chain(7), chain(2), chain(3)]);

        for id in [7, 2, 3] {
            eom(&mut lagging, chain(id));
        }
        assert_eq!(lagging.minute(), 1);
    }

    #[test]
    fn test_votes_decide_after_lane_vacated() {
        let local = chain(2);
        let mut state = roster();
        step(&mut state, TIMEOUT, local);
        step(&mut state, ElectionPayload::RemoveLeader { server_id: chain(1) }, local);
        assert_eq!(state.leader_of(0), None);

        assert_eq!(step(&mut state, vote_for(7, 2), local).follow_up, None);
        let decided = step(&mut state, vote_for(7, 3), local);
        assert_eq!(
            decided.follow_up,
            Some(ElectionPayload::AddLeader { server_id: chain(7) })
        );

        let added = step(&mut state, ElectionPayload::AddLeader { server_id: chain(7) }, local);
        assert_eq!(
            added.follow_up,
            Some(ElectionPayload::RemoveAudit { server_id: chain(7) })
        );
        step(&mut state, ElectionPayload::RemoveAudit { server_id: chain(7) }, local);
        assert_eq!(state.phase(), ElectionPhase::Stable);
        assert_eq!(state.federated_servers(), vec![chain(7), chain(2), chain(3)]);
    }

    #[test]
    fn test_add_leader_before_remove_leader() {
        let local = chain(2);
        let mut state = roster();
        step(&mut state, TIMEOUT, local);

        // Not an audit server: no new lane while the election is open.
        let stray = step(&mut state, ElectionPayload::AddLeader { server_id: chain(9) }, local);
        assert_eq!(stray, Transition::default());
        assert_eq!(state.lane_count(), 3);

        let early = step(&mut state, ElectionPayload::AddLeader { server_id: chain(7) }, local);
        assert_eq!(early, Transition::default());
        assert_eq!(
            state.phase(),
            ElectionPhase::Decided {
                vm_index: 0,
                winner: chain(7)
            }
        );
        assert_eq!(state.leader_of(0), Some(chain(1)));
        assert_eq!(state.lane_count(), 3);

        let removed = step(&mut state, ElectionPayload::RemoveLeader { server_id: chain(1) }, local);
        assert_eq!(removed.status_changes, vec![(chain(1), AuthorityStatus::Full)]);
        assert_eq!(
            removed.follow_up,
            Some(ElectionPayload::AddLeader { server_id: chain(7) })
        );
        let added = step(&mut state, ElectionPayload::AddLeader { server_id: chain(7) }, local);
        assert_eq!(added.status_changes, vec![(chain(7), AuthorityStatus::Federated)]);
        step(&mut state, ElectionPayload::RemoveAudit { server_id: chain(7) }, local);

        assert_eq!(state.phase(), ElectionPhase::Stable);
        assert_eq!(state.federated_servers(), vec![chain(7), chain(2), chain(3)]);
        assert_eq!(state.audit_servers(), vec![chain(8)]);
    }

    #[test]
    fn test_retired_audit_can_still_win() {
        let local = chain(0);
        let mut state = roster();
        step(&mut state, TIMEOUT, local);

        let retired = step(&mut state, ElectionPayload::RemoveAudit { server_id: chain(7) }, local);
        assert_eq!(retired.status_changes, vec![(chain(7), AuthorityStatus::Full)]);
        assert_eq!(state.audit_servers(), vec![chain(8)]);

        step(&mut state, ElectionPayload::AddLeader { server_id: chain(7) }, local);
        let removed = step(&mut state, ElectionPayload::RemoveLeader { server_id: chain(1) }, local);
        assert_eq!(
            removed.follow_up,
            Some(ElectionPayload::AddLeader { server_id: chain(7) })
        );
        let added = step(&mut state, ElectionPayload::AddLeader { server_id: chain(7) }, local);
        assert_eq!(
            added.follow_up,
            Some(ElectionPayload::RemoveAudit { server_id: chain(7) })
        );
        step(&mut state, ElectionPayload::RemoveAudit { server_id: chain(7) }, local);

        assert_eq!(state.phase(), ElectionPhase::Stable);
        assert_eq!(state.leader_of(0), Some(chain(7)));
    }

    #[test]
    fn test_votes_for_ineligible_candidates_ignored() {
        let local = chain(0);
        let mut state = roster();
        step(&mut state, TIMEOUT, local);

        // Server 2 already leads a lane.
        step(&mut state, vote_for(2, 2), local);
        step(&mut state, vote_for(2, 3), local);
        // Server 9 is not an audit server.
        step(&mut state, vote_for(9, 3), local);
        // Right candidate, wrong minute.
        for voter in [2, 3] {
            let stale = ElectionPayload::Vote {
                minute: 1,
                vm_index: 0,
                round: 0,
                server_id: chain(7),
                voter: chain(voter),
            };
            step(&mut state, stale, local);
        }
        assert_eq!(state.phase(), ElectionPhase::Electing { vm_index: 0, round: 0 });
        assert_eq!(state.leader_of(0), Some(chain(1)));

        // None of the ignored votes used up a voter's ballot.
        step(&mut state, vote_for(7, 2), local);
        let decided = step(&mut state, vote_for(7, 3), local);
        assert_eq!(
            decided.follow_up,
            Some(ElectionPayload::RemoveLeader { server_id: chain(1) })
        );
    }
}
