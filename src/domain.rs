//! Domain models: languages, learners, activities (tagged content), assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Languages the app speaks. Fixed set; unknown inputs fall back to English
/// at the parsing boundary rather than flowing through as free strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  English,
  Hindi,
  Tamil,
}

impl Default for Language {
  fn default() -> Self { Language::English }
}

impl Language {
  /// Loose parsing for values seen on the wire: "hindi", "hi", "hi-IN", ...
  pub fn parse_loose(s: &str) -> Language {
    let l = s.trim().to_lowercase();
    if l.starts_with("hi") { Language::Hindi }
    else if l.starts_with("ta") { Language::Tamil }
    else { Language::English }
  }

  /// BCP-47 locale used for speech synthesis.
  pub fn locale(self) -> &'static str {
    match self {
      Language::English => "en-IN",
      Language::Hindi => "hi-IN",
      Language::Tamil => "ta-IN",
    }
  }

  /// Two-letter code used by the translation provider.
  pub fn short(self) -> &'static str {
    match self {
      Language::English => "en",
      Language::Hindi => "hi",
      Language::Tamil => "ta",
    }
  }
}

/// Fixed-key translation record: one field per supported language.
/// Replaces the dynamic language-keyed map so unknown keys cannot appear.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Translations {
  #[serde(default)] pub english: String,
  #[serde(default)] pub hindi: String,
  #[serde(default)] pub tamil: String,
}

impl Translations {
  pub fn get(&self, lang: Language) -> &str {
    match lang {
      Language::English => &self.english,
      Language::Hindi => &self.hindi,
      Language::Tamil => &self.tamil,
    }
  }

  /// English-only record; other languages fall back at read time.
  pub fn english_only(text: &str) -> Self {
    Translations { english: text.to_string(), ..Default::default() }
  }

  /// Resolve for a language, falling back to English when the slot is empty.
  pub fn resolve(&self, lang: Language) -> &str {
    let t = self.get(lang);
    if t.is_empty() { &self.english } else { t }
  }
}

/// A child the therapist works with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Learner {
  pub id: String,
  pub name: String,
  pub age: u32,
  pub preferred_language: Language,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AacItem {
  pub id: String,
  pub label: String,
  pub label_translations: Translations,
  #[serde(default)] pub image_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchingOption {
  pub id: String,
  pub text: String,
  pub text_translations: Translations,
  pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualStep {
  pub id: String,
  pub label: String,
  pub label_translations: Translations,
  #[serde(default)] pub image_url: Option<String>,
  pub order: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechPrompt {
  pub prompt_text: String,
  pub prompt_translations: Translations,
  #[serde(default)] pub image_url: Option<String>,
}

/// Type-specific activity content as a tagged union. The declared type and
/// the populated content cannot disagree by construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActivityContent {
  Aac { items: Vec<AacItem> },
  Matching { options: Vec<MatchingOption> },
  VisualSchedule { steps: Vec<VisualStep> },
  Speech { prompt: SpeechPrompt },
}

impl ActivityContent {
  pub fn kind(&self) -> &'static str {
    match self {
      ActivityContent::Aac { .. } => "aac",
      ActivityContent::Matching { .. } => "matching",
      ActivityContent::VisualSchedule { .. } => "visual-schedule",
      ActivityContent::Speech { .. } => "speech",
    }
  }

  /// Content checks performed by callers before handing an activity to the
  /// store. The store itself stays permissive.
  pub fn validate(&self) -> Result<(), String> {
    match self {
      ActivityContent::Aac { items } => {
        if items.is_empty() {
          return Err("AAC board needs at least one item".into());
        }
      }
      ActivityContent::Matching { options } => {
        let correct = options.iter().filter(|o| o.is_correct).count();
        if options.len() < 2 {
          return Err("Matching needs at least two options".into());
        }
        if correct != 1 {
          return Err(format!("Matching needs exactly one correct option, found {}", correct));
        }
      }
      ActivityContent::VisualSchedule { steps } => {
        if steps.is_empty() {
          return Err("Visual schedule needs at least one step".into());
        }
      }
      ActivityContent::Speech { prompt } => {
        if prompt.prompt_text.trim().is_empty() {
          return Err("Speech prompt text must not be empty".into());
        }
      }
    }
    Ok(())
  }
}

/// An activity the therapist authored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Activity {
  pub id: String,
  pub name: String,
  pub target_language: Language,
  pub instruction: String,
  pub instruction_translations: Translations,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub content: ActivityContent,
}

/// Assignment lifecycle. Monotonic in normal use, but the model does not
/// forbid arbitrary transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
  Assigned,
  InProgress,
  Completed,
}

/// The record tracking that an activity was given to a learner.
/// Assignments are never deleted; they survive learner/activity deletion
/// and readers filter dangling references defensively.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assignment {
  pub id: String,
  pub activity_id: String,
  pub learner_id: String,
  pub status: AssignmentStatus,
  pub last_update: String,
  #[serde(default)] pub therapist_notes: Option<String>,
  #[serde(default)] pub audio_submission: Option<String>,
  pub assigned_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Therapist,
  Child,
}

/// Joined dashboard row. Names resolve to "Unknown" when the referenced
/// learner or activity no longer exists.
#[derive(Clone, Debug, Serialize)]
pub struct ProgressEntry {
  pub assignment_id: String,
  pub learner_id: String,
  pub activity_id: String,
  pub child_name: String,
  pub activity_name: String,
  pub status: AssignmentStatus,
  pub last_update: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn language_parses_loose_forms() {
    assert_eq!(Language::parse_loose("hi-IN"), Language::Hindi);
    assert_eq!(Language::parse_loose("tamil"), Language::Tamil);
    assert_eq!(Language::parse_loose("TA"), Language::Tamil);
    assert_eq!(Language::parse_loose("en"), Language::English);
    assert_eq!(Language::parse_loose("klingon"), Language::English);
  }

  #[test]
  fn translations_resolve_falls_back_to_english() {
    let t = Translations::english_only("Water");
    assert_eq!(t.resolve(Language::Tamil), "Water");
    let full = Translations {
      english: "Water".into(),
      hindi: "पानी".into(),
      tamil: "தண்ணீர்".into(),
    };
    assert_eq!(full.resolve(Language::Hindi), "पानी");
  }

  #[test]
  fn matching_content_requires_exactly_one_correct() {
    let mk = |flags: &[bool]| ActivityContent::Matching {
      options: flags
        .iter()
        .enumerate()
        .map(|(i, correct)| MatchingOption {
          id: format!("{}", i + 1),
          text: format!("opt{}", i + 1),
          text_translations: Translations::default(),
          is_correct: *correct,
        })
        .collect(),
    };
    assert!(mk(&[true, false, false]).validate().is_ok());
    assert!(mk(&[false, false]).validate().is_err());
    assert!(mk(&[true, true, false]).validate().is_err());
  }

  #[test]
  fn content_tag_round_trips_as_kebab_case() {
    let c = ActivityContent::VisualSchedule { steps: vec![VisualStep {
      id: "1".into(),
      label: "Brush teeth".into(),
      label_translations: Translations::english_only("Brush teeth"),
      image_url: None,
      order: 1,
    }] };
    let v = serde_json::to_value(&c).unwrap();
    assert_eq!(v["type"], "visual-schedule");
    let back: ActivityContent = serde_json::from_value(v).unwrap();
    assert_eq!(back.kind(), "visual-schedule");
  }
}
