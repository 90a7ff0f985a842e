//! One leader election for one lane.

use shared_types::ChainId;
use std::collections::{BTreeMap, BTreeSet};

/// Where a lane's leadership stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionPhase {
    Stable,
    Electing { vm_index: usize, round: u32 },
    /// Winner fixed; roster messages are replacing the faulted leader.
    Decided { vm_index: usize, winner: ChainId },
}

/// Election state for the lane whose leader missed its deadline.
///
/// Discarded when the election completes or the minute closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Election {
    pub vm_index: usize,
    pub faulted: ChainId,
    pub minute: u32,
    pub round: u32,
    volunteers: BTreeSet<ChainId>,
    votes: BTreeMap<ChainId, BTreeSet<ChainId>>,
    voters: BTreeSet<ChainId>,
    local_voted: bool,
    winner: Option<ChainId>,
    /// Audit servers that left the audit set while this election was open.
    /// They stay eligible so a late `AddLeader` for them is still honored.
    retired: BTreeSet<ChainId>,
}

impl Election {
    pub fn new(vm_index: usize, faulted: ChainId, minute: u32) -> Self {
        Self {
            vm_index,
            faulted,
            minute,
            round: 0,
            volunteers: BTreeSet::new(),
            votes: BTreeMap::new(),
            voters: BTreeSet::new(),
            local_voted: false,
            winner: None,
            retired: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> ElectionPhase {
        match self.winner {
            Some(winner) => ElectionPhase::Decided {
                vm_index: self.vm_index,
                winner,
            },
            None => ElectionPhase::Electing {
                vm_index: self.vm_index,
                round: self.round,
            },
        }
    }

    pub fn winner(&self) -> Option<ChainId> {
        self.winner
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Start the next round with a clean tally.
    pub fn advance_round(&mut self) {
        self.round += 1;
        self.volunteers.clear();
        self.votes.clear();
        self.voters.clear();
        self.local_voted = false;
    }

    pub fn add_volunteer(&mut self, candidate: ChainId) -> bool {
        self.volunteers.insert(candidate)
    }

    pub fn has_volunteer(&self, candidate: &ChainId) -> bool {
        self.volunteers.contains(candidate)
    }

    /// Claim the local node's single vote for this round.
    pub fn take_local_vote(&mut self) -> bool {
        !std::mem::replace(&mut self.local_voted, true)
    }

    /// Count `voter` for `candidate`. Each voter counts once per round.
    pub fn record_vote(&mut self, candidate: ChainId, voter: ChainId) -> bool {
        if !self.voters.insert(voter) {
            return false;
        }
        self.votes.entry(candidate).or_default().insert(voter);
        true
    }

    pub fn votes_for(&self, candidate: &ChainId) -> usize {
        self.votes.get(candidate).map_or(0, BTreeSet::len)
    }

    /// Candidate with the most votes; ties go to the lowest chain ID.
    pub fn leading(&self) -> Option<(ChainId, usize)> {
        // BTreeMap iterates in chain-ID order, so the first maximum wins.
        self.votes
            .iter()
            .map(|(candidate, voters)| (*candidate, voters.len()))
            .fold(None, |best, (candidate, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((candidate, count)),
            })
    }

    pub fn decide(&mut self, winner: ChainId) {
        self.winner = Some(winner);
    }

    pub fn retire(&mut self, server: ChainId) {
        self.retired.insert(server);
    }

    pub fn is_retired(&self, server: &ChainId) -> bool {
        self.retired.contains(server)
    }
}
