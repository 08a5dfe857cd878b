//! Color-matching mini-game engine.
//!
//! Flow:
//! 1) A session is created for a difficulty tier and input mode.
//! 2) Rounds are pre-generated: one target color per round plus a shuffled
//!    option set that contains the target exactly once.
//! 3) The session runs a countdown, accepts answers while playing, and
//!    settles feedback pauses before advancing.
//!
//! The engine is synchronous and clock-free. `timer()` reports the delay
//! until the next automatic transition and `on_timer()` applies it; the
//! caller (the WS session loop) owns the actual timers and drops them on
//! reset so nothing fires against stale state.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const COUNTDOWN_START: u8 = 3;
pub const COUNTDOWN_TICK_MS: u64 = 800;
pub const AUTO_NEXT_MS: u64 = 650;
pub const SHAKE_MS: u64 = 320;
pub const FINISH_MS: u64 = 900;

/// Fixed palette. Ten entries so the hard tier can draw ten distinct targets.
pub const COLOR_BANK: [ColorDef; 10] = [
  ColorDef { key: "red", label: "Red", hex: "#ef4444" },
  ColorDef { key: "blue", label: "Blue", hex: "#3b82f6" },
  ColorDef { key: "green", label: "Green", hex: "#22c55e" },
  ColorDef { key: "yellow", label: "Yellow", hex: "#eab308" },
  ColorDef { key: "orange", label: "Orange", hex: "#f97316" },
  ColorDef { key: "purple", label: "Purple", hex: "#a855f7" },
  ColorDef { key: "pink", label: "Pink", hex: "#ec4899" },
  ColorDef { key: "brown", label: "Brown", hex: "#8b5e34" },
  ColorDef { key: "teal", label: "Teal", hex: "#14b8a6" },
  ColorDef { key: "gray", label: "Gray", hex: "#6b7280" },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorDef {
  pub key: &'static str,
  pub label: &'static str,
  pub hex: &'static str,
}

/// Difficulty tier, fixing (round count, options per round).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[serde(alias = "med")]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn rounds(self) -> usize {
    match self {
      Difficulty::Easy => 6,
      Difficulty::Medium => 8,
      Difficulty::Hard => 10,
    }
  }

  pub fn options(self) -> usize {
    match self {
      Difficulty::Easy => 3,
      Difficulty::Medium => 4,
      Difficulty::Hard => 5,
    }
  }
}

/// How the player submits an answer. A pure input concern: judging and
/// scoring never branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
  Tap,
  Drag,
}

/// One target-identification challenge.
#[derive(Clone, Debug)]
pub struct Round {
  pub id: String,
  pub target: ColorDef,
  pub options: Vec<ColorDef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgement {
  Good,
  Bad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
  Countdown(u8),
  Playing,
  Feedback(Judgement),
  Finishing,
  Complete,
}

/// What an elapsed timer did to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerEvent {
  /// Countdown ticked down to this value.
  Countdown(u8),
  /// Countdown finished; play begins on the first round.
  Go,
  /// Good-feedback pause over; advanced to the next round.
  NextRound,
  /// Bad-feedback shake over; same round, try again.
  Retry,
  /// Last round answered; short celebration delay before completion.
  Finishing,
  /// Session done; summary handed to the caller.
  Complete(Summary),
}

/// Final score summary handed to the next screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub score: i32,
  pub correct: u32,
  pub wrong: u32,
  pub accuracy: u32,
  pub seconds: u64,
  pub difficulty: Difficulty,
  pub mode: InputMode,
}

/// Generate the round sequence for (level count, option count).
///
/// A random permutation of the palette supplies a working set of
/// max(levels, options) colors; each of `levels` shuffled targets gets
/// `options - 1` other working-set colors, with the target mixed in by a
/// final shuffle. The target appears exactly once and options never repeat
/// within a round.
pub fn make_rounds<R: Rng>(levels: usize, options: usize, rng: &mut R) -> Vec<Round> {
  let mut bank: Vec<ColorDef> = COLOR_BANK.to_vec();
  bank.shuffle(rng);
  let working: Vec<ColorDef> = bank.into_iter().take(levels.max(options)).collect();

  let mut targets = working.clone();
  targets.shuffle(rng);
  targets.truncate(levels);

  targets
    .into_iter()
    .enumerate()
    .map(|(idx, target)| {
      let mut others: Vec<ColorDef> =
        working.iter().copied().filter(|c| c.key != target.key).collect();
      others.shuffle(rng);
      others.truncate(options.saturating_sub(1));

      let mut opts = others;
      opts.push(target);
      opts.shuffle(rng);

      Round { id: format!("round_{}_{}", idx, target.key), target, options: opts }
    })
    .collect()
}

/// One game of color matching, from countdown to summary.
pub struct GameSession {
  difficulty: Difficulty,
  mode: InputMode,
  rounds: Vec<Round>,
  idx: usize,
  correct: u32,
  wrong: u32,
  streak: u32,
  phase: Phase,
  started_at: Option<Instant>,
  summary: Option<Summary>,
}

impl GameSession {
  pub fn new(difficulty: Difficulty, mode: InputMode) -> Self {
    let mut rng = rand::thread_rng();
    Self::with_rng(difficulty, mode, &mut rng)
  }

  pub fn with_rng<R: Rng>(difficulty: Difficulty, mode: InputMode, rng: &mut R) -> Self {
    GameSession {
      difficulty,
      mode,
      rounds: make_rounds(difficulty.rounds(), difficulty.options(), rng),
      idx: 0,
      correct: 0,
      wrong: 0,
      streak: 0,
      phase: Phase::Countdown(COUNTDOWN_START),
      started_at: None,
      summary: None,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }
  pub fn difficulty(&self) -> Difficulty { self.difficulty }
  pub fn mode(&self) -> InputMode { self.mode }
  pub fn round_index(&self) -> usize { self.idx }
  pub fn total_rounds(&self) -> usize { self.rounds.len() }
  pub fn correct(&self) -> u32 { self.correct }
  pub fn wrong(&self) -> u32 { self.wrong }
  pub fn streak(&self) -> u32 { self.streak }

  pub fn current_round(&self) -> Option<&Round> {
    self.rounds.get(self.idx)
  }

  pub fn score(&self) -> i32 {
    self.correct as i32 * 10 - self.wrong as i32 * 2
  }

  fn is_last(&self) -> bool {
    self.idx + 1 >= self.rounds.len()
  }

  /// Delay until the next automatic transition, if one is pending.
  pub fn timer(&self) -> Option<std::time::Duration> {
    let ms = match self.phase {
      Phase::Countdown(_) => COUNTDOWN_TICK_MS,
      Phase::Feedback(Judgement::Good) => AUTO_NEXT_MS,
      Phase::Feedback(Judgement::Bad) => SHAKE_MS,
      Phase::Finishing => FINISH_MS,
      Phase::Playing | Phase::Complete => return None,
    };
    Some(std::time::Duration::from_millis(ms))
  }

  /// Apply the pending automatic transition. Returns None when no timer
  /// was due (Playing/Complete).
  pub fn on_timer(&mut self) -> Option<TimerEvent> {
    match self.phase {
      Phase::Countdown(n) if n > 1 => {
        self.phase = Phase::Countdown(n - 1);
        Some(TimerEvent::Countdown(n - 1))
      }
      Phase::Countdown(_) => {
        self.phase = Phase::Playing;
        self.started_at = Some(Instant::now());
        Some(TimerEvent::Go)
      }
      Phase::Feedback(Judgement::Good) => {
        if self.is_last() {
          self.summary = Some(self.build_summary());
          self.phase = Phase::Finishing;
          Some(TimerEvent::Finishing)
        } else {
          self.idx += 1;
          self.phase = Phase::Playing;
          Some(TimerEvent::NextRound)
        }
      }
      Phase::Feedback(Judgement::Bad) => {
        self.phase = Phase::Playing;
        Some(TimerEvent::Retry)
      }
      Phase::Finishing => {
        self.phase = Phase::Complete;
        // summary is always set before entering Finishing
        self.summary.clone().map(TimerEvent::Complete)
      }
      Phase::Playing | Phase::Complete => None,
    }
  }

  /// Judge a submitted color against the current round's target. Both input
  /// modes resolve here; only the triggering event differs. Ignored outside
  /// the Playing phase.
  pub fn submit(&mut self, key: &str) -> Option<Judgement> {
    if self.phase != Phase::Playing {
      return None;
    }
    let target_key = self.current_round()?.target.key;
    let judgement = if key == target_key {
      self.correct += 1;
      self.streak += 1;
      Judgement::Good
    } else {
      self.wrong += 1;
      self.streak = 0;
      Judgement::Bad
    };
    self.phase = Phase::Feedback(judgement);
    Some(judgement)
  }

  /// Full reset: fresh rounds, zeroed counters, countdown restarted.
  pub fn restart(&mut self) {
    *self = GameSession::new(self.difficulty, self.mode);
  }

  /// Changing difficulty mid-game discards all progress.
  pub fn set_difficulty(&mut self, difficulty: Difficulty) {
    if difficulty != self.difficulty {
      *self = GameSession::new(difficulty, self.mode);
    }
  }

  /// Changing input mode mid-game also discards progress.
  pub fn set_mode(&mut self, mode: InputMode) {
    if mode != self.mode {
      *self = GameSession::new(self.difficulty, mode);
    }
  }

  pub fn summary(&self) -> Option<&Summary> {
    self.summary.as_ref()
  }

  fn build_summary(&self) -> Summary {
    let seconds = self
      .started_at
      .map(|t| t.elapsed().as_secs_f64().round() as u64)
      .unwrap_or(0)
      .max(1);
    Summary {
      score: self.score(),
      correct: self.correct,
      wrong: self.wrong,
      accuracy: accuracy(self.correct, self.wrong),
      seconds,
      difficulty: self.difficulty,
      mode: self.mode,
    }
  }
}

/// round(correct / attempts * 100); 0 when nothing was attempted.
pub fn accuracy(correct: u32, wrong: u32) -> u32 {
  let attempts = correct + wrong;
  if attempts == 0 {
    return 0;
  }
  (correct as f64 / attempts as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn skip_countdown(g: &mut GameSession) {
    loop {
      match g.on_timer() {
        Some(TimerEvent::Go) => break,
        Some(TimerEvent::Countdown(_)) => {}
        other => panic!("unexpected countdown event: {:?}", other),
      }
    }
  }

  fn wrong_key(round: &Round) -> &'static str {
    round
      .options
      .iter()
      .find(|c| c.key != round.target.key)
      .expect("round has a non-target option")
      .key
  }

  #[test]
  fn rounds_have_tier_shape_and_unique_options() {
    let mut rng = rand::thread_rng();
    for tier in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
      for _ in 0..50 {
        let rounds = make_rounds(tier.rounds(), tier.options(), &mut rng);
        assert_eq!(rounds.len(), tier.rounds());
        for r in &rounds {
          assert_eq!(r.options.len(), tier.options());
          let keys: HashSet<&str> = r.options.iter().map(|c| c.key).collect();
          assert_eq!(keys.len(), r.options.len(), "duplicate option in round");
          let hits = r.options.iter().filter(|c| c.key == r.target.key).count();
          assert_eq!(hits, 1, "target must appear exactly once");
        }
      }
    }
  }

  #[test]
  fn countdown_ticks_three_two_one_go() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    assert_eq!(g.phase(), Phase::Countdown(3));
    assert_eq!(g.on_timer(), Some(TimerEvent::Countdown(2)));
    assert_eq!(g.on_timer(), Some(TimerEvent::Countdown(1)));
    assert_eq!(g.on_timer(), Some(TimerEvent::Go));
    assert_eq!(g.phase(), Phase::Playing);
  }

  #[test]
  fn submissions_before_go_are_ignored() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    assert_eq!(g.submit("red"), None);
    assert_eq!(g.correct(), 0);
    assert_eq!(g.wrong(), 0);
  }

  #[test]
  fn wrong_answer_never_advances_and_resets_streak() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    skip_countdown(&mut g);

    let target = g.current_round().unwrap().target.key;
    assert_eq!(g.submit(target), Some(Judgement::Good));
    assert_eq!(g.on_timer(), Some(TimerEvent::NextRound));
    assert_eq!(g.round_index(), 1);
    assert_eq!(g.streak(), 1);

    let bad = wrong_key(g.current_round().unwrap());
    assert_eq!(g.submit(bad), Some(Judgement::Bad));
    assert_eq!(g.on_timer(), Some(TimerEvent::Retry));
    assert_eq!(g.round_index(), 1, "wrong answer must not advance");
    assert_eq!(g.streak(), 0);
    assert_eq!(g.wrong(), 1);

    // same round is retried and a correct answer now advances
    let target = g.current_round().unwrap().target.key;
    assert_eq!(g.submit(target), Some(Judgement::Good));
    assert_eq!(g.on_timer(), Some(TimerEvent::NextRound));
    assert_eq!(g.round_index(), 2);
  }

  #[test]
  fn feedback_pause_blocks_further_submissions() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    skip_countdown(&mut g);
    let target = g.current_round().unwrap().target.key;
    g.submit(target);
    assert_eq!(g.submit(target), None, "no judging during feedback");
    assert_eq!(g.correct(), 1);
  }

  #[test]
  fn perfect_medium_game_scores_eighty() {
    let mut g = GameSession::new(Difficulty::Medium, InputMode::Tap);
    skip_countdown(&mut g);

    let summary = loop {
      let target = g.current_round().unwrap().target.key;
      assert_eq!(g.submit(target), Some(Judgement::Good));
      match g.on_timer() {
        Some(TimerEvent::NextRound) => {}
        Some(TimerEvent::Finishing) => match g.on_timer() {
          Some(TimerEvent::Complete(s)) => break s,
          other => panic!("expected completion, got {:?}", other),
        },
        other => panic!("unexpected event: {:?}", other),
      }
    };

    assert_eq!(g.phase(), Phase::Complete);
    assert_eq!(g.summary(), Some(&summary));
    assert_eq!(summary.score, 80);
    assert_eq!(summary.correct, 8);
    assert_eq!(summary.wrong, 0);
    assert_eq!(summary.accuracy, 100);
    assert!(summary.seconds >= 1);
    assert_eq!(summary.difficulty, Difficulty::Medium);
    assert_eq!(summary.mode, InputMode::Tap);
  }

  #[test]
  fn score_is_ten_per_correct_minus_two_per_wrong() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Drag);
    skip_countdown(&mut g);

    // two correct with one wrong in between
    let t = g.current_round().unwrap().target.key;
    g.submit(t);
    g.on_timer();
    let bad = wrong_key(g.current_round().unwrap());
    g.submit(bad);
    g.on_timer();
    let t = g.current_round().unwrap().target.key;
    g.submit(t);

    assert_eq!(g.score(), 2 * 10 - 2);
    assert_eq!(accuracy(g.correct(), g.wrong()), 67); // round(2/3*100)
  }

  #[test]
  fn accuracy_is_zero_without_attempts_and_bounded() {
    assert_eq!(accuracy(0, 0), 0);
    assert_eq!(accuracy(5, 0), 100);
    assert_eq!(accuracy(0, 5), 0);
    for c in 0..20u32 {
      for w in 0..20u32 {
        assert!(accuracy(c, w) <= 100);
      }
    }
  }

  #[test]
  fn settings_change_resets_everything() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    skip_countdown(&mut g);
    let t = g.current_round().unwrap().target.key;
    g.submit(t);
    g.on_timer();
    assert_eq!(g.round_index(), 1);

    g.set_difficulty(Difficulty::Hard);
    assert_eq!(g.round_index(), 0);
    assert_eq!(g.correct(), 0);
    assert_eq!(g.wrong(), 0);
    assert_eq!(g.streak(), 0);
    assert_eq!(g.phase(), Phase::Countdown(COUNTDOWN_START));
    assert_eq!(g.total_rounds(), Difficulty::Hard.rounds());

    skip_countdown(&mut g);
    let t = g.current_round().unwrap().target.key;
    g.submit(t);
    g.set_mode(InputMode::Drag);
    assert_eq!(g.correct(), 0);
    assert_eq!(g.phase(), Phase::Countdown(COUNTDOWN_START));
  }

  #[test]
  fn timer_delays_match_phase() {
    let mut g = GameSession::new(Difficulty::Easy, InputMode::Tap);
    assert_eq!(g.timer().unwrap().as_millis() as u64, COUNTDOWN_TICK_MS);
    skip_countdown(&mut g);
    assert!(g.timer().is_none(), "no automatic transition while playing");
    let bad = wrong_key(g.current_round().unwrap());
    g.submit(bad);
    assert_eq!(g.timer().unwrap().as_millis() as u64, SHAKE_MS);
    g.on_timer();
    let t = g.current_round().unwrap().target.key;
    g.submit(t);
    assert_eq!(g.timer().unwrap().as_millis() as u64, AUTO_NEXT_MS);
  }
}
