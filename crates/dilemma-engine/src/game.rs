//! Match execution engine.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, warn};

use crate::history::{History, Slot};
use crate::rule::{Action, Rule};

/// The single failure mode of a match: a rule stepped outside the action
/// domain. Fail-fast: the offending round is not committed and the match
/// is not resumed by the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// A rule returned a step code outside {0, 1}.
    #[error("{rule} did not provide a valid action (code {code})")]
    InvalidAction {
        /// Display name of the offending rule.
        rule: &'static str,
        /// The rejected code.
        code: u8,
    },
}

/// One complete contest between two rules.
///
/// Construction assigns the rules to play-order slots with a single
/// uniform draw; [`step_round`](Match::step_round) and [`run`](Match::run)
/// drive the loop, and [`score`](Match::score) projects the history
/// through the payoff table at any point.
pub struct Match {
    rules: [Box<dyn Rule>; 2],
    round: usize,
    length: usize,
    history: History,
}

impl Match {
    /// Create a match over `length` rounds, order seeded from entropy.
    pub fn new(rule_a: Box<dyn Rule>, rule_b: Box<dyn Rule>, length: usize) -> Self {
        Self::with_rng(rule_a, rule_b, length, &mut SmallRng::from_entropy())
    }

    /// Create a match drawing the order assignment from `rng`.
    ///
    /// Both orderings are equally likely. The draw happens exactly once;
    /// the assignment is fixed for the match's lifetime.
    pub fn with_rng<R: Rng + ?Sized>(
        rule_a: Box<dyn Rule>,
        rule_b: Box<dyn Rule>,
        length: usize,
        rng: &mut R,
    ) -> Self {
        let rules = if rng.gen::<bool>() {
            [rule_b, rule_a]
        } else {
            [rule_a, rule_b]
        };
        debug!(
            first = rules[0].name(),
            second = rules[1].name(),
            length,
            "match set up"
        );
        Self {
            rules,
            round: 0,
            length,
            history: History::new(),
        }
    }

    /// Zero-based index of the next round to play.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Target number of rounds.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Whether the round counter has reached the target length.
    pub fn is_complete(&self) -> bool {
        self.round >= self.length
    }

    /// The shared history: one action per slot per committed round.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Display name of the rule assigned to `slot`.
    pub fn rule_name(&self, slot: Slot) -> &'static str {
        self.rules[slot.index()].name()
    }

    /// Play one round.
    ///
    /// Steps the first slot, then the second, both against the unmodified
    /// pre-round history, so the second rule never observes the first's
    /// action for the round being played. Both returned codes are
    /// validated (first slot checked first); on a violation nothing is
    /// committed and the error names the offending rule. Otherwise both
    /// actions are appended and the round counter advances by one.
    ///
    /// There is no upper-bound check here: stopping at the target length
    /// is the caller's job (see [`run`](Match::run)), and extra calls keep
    /// appending rounds.
    pub fn step_round(&mut self) -> Result<(), MatchError> {
        let round = self.round;
        let code_first = self.rules[0].step(&self.history, Slot::First, round);
        let code_second = self.rules[1].step(&self.history, Slot::Second, round);

        let first = decode(self.rules[0].name(), code_first)?;
        let second = decode(self.rules[1].name(), code_second)?;

        self.history.push(first, second);
        self.round += 1;
        debug!(round, %first, %second, "round committed");
        Ok(())
    }

    /// Drive [`step_round`](Match::step_round) until the round counter
    /// reaches the target length, propagating the first error. A no-op on
    /// an already-complete match.
    pub fn run(&mut self) -> Result<(), MatchError> {
        while self.round < self.length {
            self.step_round()?;
        }
        Ok(())
    }

    /// Total points per slot over every committed round.
    ///
    /// Pure read of the history; valid between rounds as well as at the
    /// end, and never mutates the match.
    pub fn score(&self) -> (u32, u32) {
        self.history.score()
    }
}

fn decode(rule: &'static str, code: u8) -> Result<Action, MatchError> {
    Action::from_code(code).ok_or_else(|| {
        warn!(rule, code, "rejecting out-of-domain action");
        MatchError::InvalidAction { rule, code }
    })
}
