//! The rule interface and the reference rules.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::history::{History, Slot};

/// One round's choice.
///
/// The numeric codes are the raw contract for [`Rule::step`] output:
/// 0 defects, 1 cooperates. Everything else is outside the game and gets
/// rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    Defect = 0,
    Cooperate = 1,
}

impl Action {
    /// The raw code a rule returns from [`Rule::step`] to pick this action.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw step code. `None` for anything outside {0, 1}.
    pub const fn from_code(code: u8) -> Option<Action> {
        match code {
            0 => Some(Action::Defect),
            1 => Some(Action::Cooperate),
            _ => None,
        }
    }

    /// The logical complement.
    pub const fn flip(self) -> Action {
        match self {
            Action::Defect => Action::Cooperate,
            Action::Cooperate => Action::Defect,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Defect => write!(f, "D"),
            Action::Cooperate => write!(f, "C"),
        }
    }
}

/// A strategy that can play the iterated prisoner's dilemma.
///
/// Each round the engine calls [`step`](Rule::step) exactly once per rule
/// with the shared history, the rule's assigned play-order slot, and the
/// zero-based index of the round about to be played. The history holds
/// exactly the rounds `0..round` for both slots; a rule reads its own past
/// via `history.slot(slot)` and the opponent's via
/// `history.slot(slot.opponent())`.
///
/// `step` returns a raw action code: 0 to defect, 1 to cooperate. Any
/// other value fails the match with
/// [`MatchError::InvalidAction`](crate::MatchError).
///
/// Implementations may keep private mutable state (see [`Flipper`]); the
/// shared history and the round counter are not reachable mutably from a
/// rule.
pub trait Rule: Send {
    /// Display name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Pick the action for `round` given everything played so far.
    fn step(&mut self, history: &History, slot: Slot, round: usize) -> u8;
}

/// Always cooperates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cooperate;

impl Rule for Cooperate {
    fn name(&self) -> &'static str {
        "Cooperate"
    }

    fn step(&mut self, _history: &History, _slot: Slot, _round: usize) -> u8 {
        Action::Cooperate.code()
    }
}

/// Always defects.
#[derive(Clone, Copy, Debug, Default)]
pub struct Defect;

impl Rule for Defect {
    fn name(&self) -> &'static str {
        "Defect"
    }

    fn step(&mut self, _history: &History, _slot: Slot, _round: usize) -> u8 {
        Action::Defect.code()
    }
}

/// Replays the opponent's previous action. Starts by cooperating.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTat;

impl Rule for TitForTat {
    fn name(&self) -> &'static str {
        "TitForTat"
    }

    fn step(&mut self, history: &History, slot: Slot, _round: usize) -> u8 {
        match history.slot(slot.opponent()).last() {
            None => Action::Cooperate.code(),
            Some(last) => last.code(),
        }
    }
}

/// Alternates defection and cooperation, drawing the first move at random.
///
/// Tracks its own previous output, not the opponent's. The generator is
/// owned by the instance, so independent matches never share random state.
#[derive(Clone, Debug)]
pub struct Flipper {
    rng: SmallRng,
    last: Option<Action>,
}

impl Flipper {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            last: None,
        }
    }

    /// Deterministic first draw, for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            last: None,
        }
    }
}

impl Default for Flipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for Flipper {
    fn name(&self) -> &'static str {
        "Flipper"
    }

    fn step(&mut self, _history: &History, _slot: Slot, round: usize) -> u8 {
        let next = match self.last {
            Some(prev) if round > 0 => prev.flip(),
            _ => {
                if self.rng.gen::<bool>() {
                    Action::Cooperate
                } else {
                    Action::Defect
                }
            }
        };
        self.last = Some(next);
        next.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> History {
        History::new()
    }

    #[test]
    fn test_action_codes_round_trip() {
        assert_eq!(Action::from_code(0), Some(Action::Defect));
        assert_eq!(Action::from_code(1), Some(Action::Cooperate));
        assert_eq!(Action::Defect.code(), 0);
        assert_eq!(Action::Cooperate.code(), 1);
    }

    #[test]
    fn test_action_rejects_out_of_domain_codes() {
        assert_eq!(Action::from_code(2), None);
        assert_eq!(Action::from_code(7), None);
        assert_eq!(Action::from_code(255), None);
    }

    #[test]
    fn test_action_flip_is_an_involution() {
        assert_eq!(Action::Defect.flip(), Action::Cooperate);
        assert_eq!(Action::Cooperate.flip(), Action::Defect);
        assert_eq!(Action::Defect.flip().flip(), Action::Defect);
    }

    #[test]
    fn test_cooperate_always_cooperates() {
        let mut rule = Cooperate;
        for round in 0..10 {
            assert_eq!(rule.step(&empty(), Slot::First, round), 1);
        }
    }

    #[test]
    fn test_defect_always_defects() {
        let mut rule = Defect;
        for round in 0..10 {
            assert_eq!(rule.step(&empty(), Slot::Second, round), 0);
        }
    }

    #[test]
    fn test_tit_for_tat_opens_with_cooperation() {
        let mut rule = TitForTat;
        assert_eq!(rule.step(&empty(), Slot::First, 0), 1);
    }

    #[test]
    fn test_tit_for_tat_copies_the_opponent() {
        let mut rule = TitForTat;

        // Playing as First, opponent history is the Second slot.
        let mut history = History::new();
        history.push(Action::Cooperate, Action::Defect);
        assert_eq!(rule.step(&history, Slot::First, 1), 0);

        history.push(Action::Defect, Action::Cooperate);
        assert_eq!(rule.step(&history, Slot::First, 2), 1);

        // Playing as Second it copies the First slot instead.
        assert_eq!(rule.step(&history, Slot::Second, 2), 0);
    }

    #[test]
    fn test_flipper_alternates_after_the_first_draw() {
        let mut rule = Flipper::seeded(42);
        let first = Action::from_code(rule.step(&empty(), Slot::First, 0)).unwrap();
        let mut expected = first;
        for round in 1..20 {
            expected = expected.flip();
            assert_eq!(rule.step(&empty(), Slot::First, round), expected.code());
        }
    }

    #[test]
    fn test_flipper_same_seed_same_sequence() {
        let mut a = Flipper::seeded(7);
        let mut b = Flipper::seeded(7);
        for round in 0..20 {
            assert_eq!(
                a.step(&empty(), Slot::First, round),
                b.step(&empty(), Slot::Second, round),
            );
        }
    }

    #[test]
    fn test_flipper_first_draw_takes_both_values() {
        let mut saw_defect = false;
        let mut saw_cooperate = false;
        for seed in 0..64 {
            let mut rule = Flipper::seeded(seed);
            match rule.step(&empty(), Slot::First, 0) {
                0 => saw_defect = true,
                1 => saw_cooperate = true,
                other => panic!("flipper produced code {}", other),
            }
        }
        assert!(saw_defect && saw_cooperate);
    }
}
