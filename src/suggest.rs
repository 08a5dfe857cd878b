//! Static activity suggestion bank for therapy planning.
//!
//! No inference involved: suggestions are a lookup keyed by therapy goal,
//! trimmed by difficulty and annotated by age band. The rationale line is
//! a fixed per-language string.

use crate::domain::Language;

const SPEECH_BANK: [&str; 4] = [
  "Picture Naming (AAC): show image → child says word",
  "Repeat-after-me: 5 short words → 3 rounds",
  "Syllable tapping: clap for each syllable",
  "Mirror practice: mouth shapes for 5 phonemes",
];

const ATTENTION_BANK: [&str; 4] = [
  "Match the Pair: 8 cards → find pairs",
  "Visual schedule: 4-step routine ordering",
  "Color/shape sorting: 10 objects",
  "Spot the difference: 5 differences",
];

const SOCIAL_BANK: [&str; 4] = [
  "Emotion cards: identify happy/sad/angry",
  "Turn-taking game: roll & move",
  "Greeting practice: hello/please/thank you",
  "Role play: simple daily scenarios",
];

/// Unknown goals fall back to the attention bank.
fn bank(goal: &str) -> &'static [&'static str; 4] {
  match goal.trim().to_lowercase().as_str() {
    "speech" => &SPEECH_BANK,
    "social" => &SOCIAL_BANK,
    _ => &ATTENTION_BANK,
  }
}

/// Pick activities for (goal, difficulty, age): harder sessions get more
/// activities, younger children get shorter time hints.
pub fn suggest(goal: &str, difficulty: &str, child_age: u32) -> Vec<String> {
  let take = match difficulty.trim().to_lowercase().as_str() {
    "easy" => 2,
    "medium" | "med" => 3,
    _ => 4,
  };
  let span = if child_age <= 6 {
    "(short 5–7 min)"
  } else if child_age <= 10 {
    "(10 min)"
  } else {
    "(12–15 min)"
  };
  bank(goal)
    .iter()
    .take(take)
    .map(|s| format!("{} {}", s, span))
    .collect()
}

pub fn rationale(language: &str) -> &'static str {
  match Language::parse_loose(language) {
    Language::English => "Suggestions based on goal, difficulty and age.",
    Language::Hindi => "लक्ष्य, कठिनाई और उम्र के आधार पर सुझाव।",
    Language::Tamil => "இலக்கு, கடினம் மற்றும் வயதை வைத்து பரிந்துரைகள்.",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_controls_how_many_activities() {
    assert_eq!(suggest("speech", "easy", 5).len(), 2);
    assert_eq!(suggest("speech", "medium", 5).len(), 3);
    assert_eq!(suggest("speech", "hard", 5).len(), 4);
  }

  #[test]
  fn age_band_annotates_session_length() {
    assert!(suggest("social", "hard", 5).iter().all(|s| s.ends_with("(short 5–7 min)")));
    assert!(suggest("social", "hard", 8).iter().all(|s| s.ends_with("(10 min)")));
    assert!(suggest("social", "hard", 12).iter().all(|s| s.ends_with("(12–15 min)")));
  }

  #[test]
  fn unknown_goal_falls_back_to_attention() {
    let got = suggest("juggling", "hard", 8);
    assert!(got[0].starts_with("Match the Pair"));
  }

  #[test]
  fn rationale_follows_the_language() {
    assert!(rationale("en").contains("Suggestions"));
    assert!(rationale("hi-IN").contains("सुझाव"));
    assert!(rationale("tamil").contains("பரிந்துரைகள்"));
  }
}
