//! Console runner: play one match and report the outcome.
//!
//! `--halt` reproduces the diagnostic loop: after every round the current
//! history and running score are printed and the runner waits for Enter
//! before continuing.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use dilemma_engine::{Cooperate, Defect, Flipper, Match, Rule, Slot, TitForTat};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RuleKind {
    Cooperate,
    Defect,
    TitForTat,
    Flipper,
}

impl RuleKind {
    fn build(self, seed: Option<u64>) -> Box<dyn Rule> {
        match self {
            RuleKind::Cooperate => Box::new(Cooperate),
            RuleKind::Defect => Box::new(Defect),
            RuleKind::TitForTat => Box::new(TitForTat),
            RuleKind::Flipper => match seed {
                Some(seed) => Box::new(Flipper::seeded(seed)),
                None => Box::new(Flipper::new()),
            },
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Play one iterated prisoner's dilemma match")]
struct Args {
    /// Rule for the first contestant.
    #[arg(long, value_enum, default_value = "tit-for-tat")]
    rule_a: RuleKind,

    /// Rule for the second contestant.
    #[arg(long, value_enum, default_value = "flipper")]
    rule_b: RuleKind,

    /// Number of rounds to play.
    #[arg(long, default_value_t = 100)]
    rounds: usize,

    /// Seed for order assignment and the Flipper draw; omit for entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause after every round, showing history and running score.
    #[arg(long)]
    halt: bool,

    /// Print the final history as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Contestants get distinct derived seeds so two Flippers never share
    // a draw sequence.
    let rule_a = args.rule_a.build(args.seed);
    let rule_b = args.rule_b.build(args.seed.map(|s| s.wrapping_add(1)));

    let mut game = match args.seed {
        Some(seed) => Match::with_rng(
            rule_a,
            rule_b,
            args.rounds,
            &mut SmallRng::seed_from_u64(seed),
        ),
        None => Match::new(rule_a, rule_b, args.rounds),
    };

    println!(
        "{} (slot 0) vs {} (slot 1), {} rounds",
        game.rule_name(Slot::First),
        game.rule_name(Slot::Second),
        game.length(),
    );

    if args.halt {
        halted_run(&mut game)?;
    } else {
        game.run()?;
    }

    render(&game);
    let (first, second) = game.score();
    println!(
        "final: {} {} - {} {}",
        game.rule_name(Slot::First),
        first,
        second,
        game.rule_name(Slot::Second),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(game.history())?);
    }

    Ok(())
}

/// Step the match one round at a time, showing the state between rounds.
fn halted_run(game: &mut Match) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut pausing = true;
    while !game.is_complete() {
        game.step_round()?;
        if game.is_complete() || !pausing {
            continue;
        }
        render(game);
        print!("-- Enter for next round --");
        io::stdout().flush()?;
        if lines.next().transpose()?.is_none() {
            // stdin closed; finish the remaining rounds without pausing
            pausing = false;
            println!();
        }
    }
    Ok(())
}

fn render(game: &Match) {
    let (first, second) = game.score();
    for (slot, points) in [(Slot::First, first), (Slot::Second, second)] {
        let moves: String = game
            .history()
            .slot(slot)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{:>10}  {}  ({} pts)", game.rule_name(slot), moves, points);
    }
}
