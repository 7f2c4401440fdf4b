//! Shared match history.

use serde::{Deserialize, Serialize};

use crate::payoff;
use crate::rule::Action;

/// Play-order position assigned to a rule for the lifetime of one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// The other slot.
    pub const fn opponent(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

/// Per-slot record of every action taken so far.
///
/// Append-only: only the match engine commits rounds, and only after both
/// rules have moved. Both slots hold exactly one action per committed
/// round, so their lengths always agree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    slots: [Vec<Action>; 2],
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed rounds.
    pub fn rounds(&self) -> usize {
        self.slots[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_empty()
    }

    /// Every action taken by the rule in `slot`, oldest first.
    pub fn slot(&self, slot: Slot) -> &[Action] {
        &self.slots[slot.index()]
    }

    /// The action pair committed in `round`, if that round was played.
    pub fn round(&self, round: usize) -> Option<(Action, Action)> {
        Some((*self.slots[0].get(round)?, *self.slots[1].get(round)?))
    }

    /// Committed rounds as `(first, second)` action pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (Action, Action)> + '_ {
        self.slots[0]
            .iter()
            .copied()
            .zip(self.slots[1].iter().copied())
    }

    /// Total points per slot under the payoff table.
    pub fn score(&self) -> (u32, u32) {
        let mut totals = (0u32, 0u32);
        for (first, second) in self.iter() {
            let (p_first, p_second) = payoff(first, second);
            totals.0 += u32::from(p_first);
            totals.1 += u32::from(p_second);
        }
        totals
    }

    /// Commit one round. Engine-only: called after both actions validate.
    pub(crate) fn push(&mut self, first: Action, second: Action) {
        self.slots[0].push(first);
        self.slots[1].push(second);
    }
}
