//! Seed data: demo learners/activities/assignments, the default AAC concept
//! pool, and the built-in translation dictionary used when no provider is
//! configured.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::{BoardCategory, DatasetCfg};
use crate::domain::{
  AacItem, Activity, ActivityContent, Assignment, AssignmentStatus, Language, Learner,
  MatchingOption, Translations,
};

fn ts(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s)
    .map(|d| d.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}

fn tr(en: &str, hi: &str, ta: &str) -> Translations {
  Translations { english: en.into(), hindi: hi.into(), tamil: ta.into() }
}

/// Demo learners shipped with a fresh store.
pub fn seed_learners() -> Vec<Learner> {
  vec![
    Learner {
      id: "learner-1".into(),
      name: "Aarav Sharma".into(),
      age: 6,
      preferred_language: Language::Hindi,
      created_at: ts("2024-01-15T00:00:00Z"),
    },
    Learner {
      id: "learner-2".into(),
      name: "Priya Patel".into(),
      age: 5,
      preferred_language: Language::English,
      created_at: ts("2024-02-20T00:00:00Z"),
    },
    Learner {
      id: "learner-3".into(),
      name: "Karthik Rajan".into(),
      age: 7,
      preferred_language: Language::Tamil,
      created_at: ts("2024-03-10T00:00:00Z"),
    },
  ]
}

/// Demo activities: one AAC board, one matching game.
pub fn seed_activities() -> Vec<Activity> {
  vec![
    Activity {
      id: "activity-1".into(),
      name: "Daily Needs AAC Board".into(),
      target_language: Language::Hindi,
      instruction: "Tap on the pictures to communicate your needs".into(),
      instruction_translations: tr(
        "Tap on the pictures to communicate your needs",
        "अपनी जरूरतों को बताने के लिए चित्रों पर टैप करें",
        "உங்கள் தேவைகளை தெரிவிக்க படங்களை தட்டவும்",
      ),
      created_at: ts("2024-03-01T00:00:00Z"),
      updated_at: ts("2024-03-01T00:00:00Z"),
      content: ActivityContent::Aac {
        items: vec![
          AacItem {
            id: "1".into(),
            label: "Water".into(),
            label_translations: tr("Water", "पानी", "தண்ணீர்"),
            image_url: None,
          },
          AacItem {
            id: "2".into(),
            label: "Food".into(),
            label_translations: tr("Food", "खाना", "உணவு"),
            image_url: None,
          },
          AacItem {
            id: "3".into(),
            label: "Help".into(),
            label_translations: tr("Help", "मदद", "உதவி"),
            image_url: None,
          },
          AacItem {
            id: "4".into(),
            label: "Bathroom".into(),
            label_translations: tr("Bathroom", "शौचालय", "கழிவறை"),
            image_url: None,
          },
        ],
      },
    },
    Activity {
      id: "activity-2".into(),
      name: "Color Matching".into(),
      target_language: Language::English,
      instruction: "Match the color with its name".into(),
      instruction_translations: tr(
        "Match the color with its name",
        "रंग को उसके नाम से मिलाएं",
        "நிறத்தை அதன் பெயருடன் பொருத்தவும்",
      ),
      created_at: ts("2024-03-05T00:00:00Z"),
      updated_at: ts("2024-03-05T00:00:00Z"),
      content: ActivityContent::Matching {
        options: vec![
          MatchingOption {
            id: "1".into(),
            text: "Red".into(),
            text_translations: tr("Red", "लाल", "சிவப்பு"),
            is_correct: true,
          },
          MatchingOption {
            id: "2".into(),
            text: "Blue".into(),
            text_translations: tr("Blue", "नीला", "நீலம்"),
            is_correct: false,
          },
          MatchingOption {
            id: "3".into(),
            text: "Green".into(),
            text_translations: tr("Green", "हरा", "பச்சை"),
            is_correct: false,
          },
        ],
      },
    },
  ]
}

/// Demo assignments wiring the seed activities to the seed learners.
pub fn seed_assignments() -> Vec<Assignment> {
  vec![
    Assignment {
      id: "assign-1".into(),
      activity_id: "activity-1".into(),
      learner_id: "learner-1".into(),
      status: AssignmentStatus::InProgress,
      last_update: "Opened activity".into(),
      therapist_notes: None,
      audio_submission: None,
      assigned_at: ts("2024-03-15T00:00:00Z"),
      updated_at: ts("2024-03-16T00:00:00Z"),
    },
    Assignment {
      id: "assign-2".into(),
      activity_id: "activity-2".into(),
      learner_id: "learner-2".into(),
      status: AssignmentStatus::Completed,
      last_update: "Completed".into(),
      therapist_notes: None,
      audio_submission: None,
      assigned_at: ts("2024-03-14T00:00:00Z"),
      updated_at: ts("2024-03-15T00:00:00Z"),
    },
  ]
}

/// Default AAC board pool, grouped by category chip.
pub fn default_board_pool() -> Vec<BoardCategory> {
  let cat = |name: &str, concepts: &[&str]| BoardCategory {
    name: name.into(),
    concepts: concepts.iter().map(|c| (*c).to_string()).collect(),
  };
  vec![
    cat("core", &["I", "You", "Want", "More", "Stop", "Go", "Yes", "No", "Help"]),
    cat("food", &["Water", "Food", "Eat", "Drink", "Fruit", "Milk"]),
    cat("feelings", &["Happy", "Sad", "Angry", "Tired", "Scared"]),
    cat("people", &["Mother", "Father", "Teacher", "Friend"]),
    cat("school", &["School", "Book", "Pencil", "Chair"]),
    cat("play", &["Play", "Ball", "Toy", "Music"]),
  ]
}

/// Default dataset inventory: the two builtin demo sets.
pub fn default_datasets() -> Vec<DatasetCfg> {
  vec![
    DatasetCfg { name: "aac-symbols".into(), source_url: None },
    DatasetCfg { name: "speech-prompts".into(), source_url: None },
  ]
}

/// Demo sample rows for the builtin datasets. Rows are sorted so counts
/// and samples are stable across refreshes.
pub fn demo_dataset_rows(name: &str) -> Option<Vec<serde_json::Value>> {
  match name {
    "aac-symbols" => {
      let mut entries: Vec<(String, Translations)> = builtin_dictionary().into_iter().collect();
      entries.sort_by(|a, b| a.0.cmp(&b.0));
      Some(
        entries
          .into_iter()
          .map(|(_, t)| {
            serde_json::json!({
              "concept": t.english,
              "hindi": t.hindi,
              "tamil": t.tamil,
            })
          })
          .collect(),
      )
    }
    "speech-prompts" => Some(
      default_board_pool()
        .into_iter()
        .flat_map(|cat| {
          let category = cat.name;
          cat.concepts.into_iter().map(move |concept| {
            serde_json::json!({
              "prompt": format!("Say '{}'", concept),
              "category": category.clone(),
            })
          })
        })
        .collect(),
    ),
    _ => None,
  }
}

/// Hand-curated concept dictionary. Keys are lowercased English concepts;
/// looked up before (and as a fallback after) the remote provider.
pub fn builtin_dictionary() -> HashMap<String, Translations> {
  let entries: &[(&str, &str, &str)] = &[
    ("water", "पानी", "தண்ணீர்"),
    ("food", "खाना", "உணவு"),
    ("help", "मदद", "உதவி"),
    ("bathroom", "शौचालय", "கழிவறை"),
    ("i", "मैं", "நான்"),
    ("you", "तुम", "நீ"),
    ("want", "चाहिए", "வேண்டும்"),
    ("more", "और", "மேலும்"),
    ("stop", "रुको", "நிறுத்து"),
    ("go", "जाओ", "போ"),
    ("yes", "हाँ", "ஆம்"),
    ("no", "नहीं", "இல்லை"),
    ("play", "खेलो", "விளையாடு"),
    ("eat", "खाओ", "சாப்பிடு"),
    ("drink", "पियो", "குடி"),
    ("fruit", "फल", "பழம்"),
    ("milk", "दूध", "பால்"),
    ("happy", "खुश", "மகிழ்ச்சி"),
    ("sad", "उदास", "சோகம்"),
    ("angry", "गुस्सा", "கோபம்"),
    ("tired", "थका", "சோர்வு"),
    ("scared", "डरा", "பயம்"),
    ("mother", "माँ", "அம்மா"),
    ("father", "पिता", "அப்பா"),
    ("teacher", "शिक्षक", "ஆசிரியர்"),
    ("friend", "दोस्त", "நண்பன்"),
    ("school", "स्कूल", "பள்ளி"),
    ("book", "किताब", "புத்தகம்"),
    ("pencil", "पेंसिल", "பென்சில்"),
    ("chair", "कुर्सी", "நாற்காலி"),
    ("ball", "गेंद", "பந்து"),
    ("toy", "खिलौना", "பொம்மை"),
    ("music", "संगीत", "இசை"),
    ("red", "लाल", "சிவப்பு"),
    ("blue", "नीला", "நீலம்"),
    ("green", "हरा", "பச்சை"),
  ];
  entries
    .iter()
    .map(|(en, hi, ta)| {
      let key = en.to_string();
      let mut en_cap = key.clone();
      if let Some(first) = en_cap.get_mut(0..1) {
        first.make_ascii_uppercase();
      }
      (key, tr(&en_cap, hi, ta))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_content_matches_declared_types() {
    for a in seed_activities() {
      assert!(a.content.validate().is_ok(), "seed activity {} invalid", a.id);
    }
  }

  #[test]
  fn every_default_dataset_has_demo_rows() {
    for cfg in default_datasets() {
      let rows = demo_dataset_rows(&cfg.name).unwrap_or_default();
      assert!(!rows.is_empty(), "no demo rows for {}", cfg.name);
    }
    assert!(demo_dataset_rows("no-such-set").is_none());
  }

  #[test]
  fn pool_concepts_are_covered_by_dictionary() {
    let dict = builtin_dictionary();
    for cat in default_board_pool() {
      for concept in &cat.concepts {
        assert!(
          dict.contains_key(&concept.to_lowercase()),
          "no dictionary entry for {concept}"
        );
      }
    }
  }
}
