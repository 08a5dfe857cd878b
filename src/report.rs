//! Activity report composition.
//!
//! Produces the data behind the clinician-facing report: KPI numbers,
//! a per-skill breakdown, and a session trend line. Rendering and PDF
//! export stay in the front end; this module only shapes the numbers.

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SkillScore {
  pub skill: String,
  pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct TrendPoint {
  pub label: String,
  pub value: u32,
}

#[derive(Debug, Serialize)]
pub struct ActivityReport {
  pub child_name: String,
  pub activity_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub activity_id: Option<String>,
  pub completed_at: String,
  /// 0..=100
  pub score: u32,
  /// 0..=100
  pub accuracy: u32,
  pub time_seconds: u64,
  pub attempts: u32,
  pub correct: u32,
  pub wrong: u32,
  pub skill_breakdown: Vec<SkillScore>,
  pub trend: Vec<TrendPoint>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub clinician_notes: Option<String>,
}

/// Raw numbers out of a finished session.
#[derive(Debug, Clone, Copy)]
pub struct SessionMetrics {
  pub score: i32,
  pub accuracy: u32,
  pub seconds: u64,
  pub correct: u32,
  pub wrong: u32,
}

/// Pull the score out of a completion note like
/// "Completed color matching — score 80".
pub fn score_from_note(note: &str) -> Option<u32> {
  let idx = note.rfind("score ")?;
  let tail = &note[idx + "score ".len()..];
  let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
  digits.parse().ok()
}

fn skill(name: &str, score: u32) -> SkillScore {
  SkillScore { skill: name.to_string(), score: score.min(100) }
}

/// Compose a report from the session metrics plus the learner's earlier
/// completion scores (oldest first); the current session becomes the last
/// trend point.
pub fn compose(
  child_name: &str,
  activity_name: &str,
  activity_id: Option<String>,
  metrics: SessionMetrics,
  history: &[u32],
  clinician_notes: Option<String>,
) -> ActivityReport {
  let score = metrics.score.clamp(0, 100) as u32;
  let accuracy = metrics.accuracy.min(100);
  let attempts = metrics.correct + metrics.wrong;

  let skill_breakdown = vec![
    skill("Attention", accuracy + 5),
    skill("Matching", score),
    skill("Speed", (100u64.saturating_sub(metrics.seconds)).max(10) as u32),
    skill("Consistency", 60 + metrics.correct * 4),
    skill("Control", 65 + accuracy / 5),
  ];

  let mut trend: Vec<TrendPoint> = history
    .iter()
    .enumerate()
    .map(|(i, v)| TrendPoint { label: format!("S{}", i + 1), value: (*v).min(100) })
    .collect();
  trend.push(TrendPoint { label: format!("S{}", trend.len() + 1), value: score });

  ActivityReport {
    child_name: child_name.to_string(),
    activity_name: activity_name.to_string(),
    activity_id,
    completed_at: Utc::now().to_rfc3339(),
    score,
    accuracy,
    time_seconds: metrics.seconds.max(1),
    attempts,
    correct: metrics.correct,
    wrong: metrics.wrong,
    skill_breakdown,
    trend,
    clinician_notes: clinician_notes.filter(|n| !n.trim().is_empty()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn metrics() -> SessionMetrics {
    SessionMetrics { score: 80, accuracy: 100, seconds: 42, correct: 8, wrong: 0 }
  }

  #[test]
  fn kpis_are_clamped_and_counted() {
    let r = compose("Aarav", "Match the Color", Some("activity-2".into()), metrics(), &[], None);
    assert_eq!(r.score, 80);
    assert_eq!(r.accuracy, 100);
    assert_eq!(r.attempts, 8);
    assert_eq!(r.time_seconds, 42);
    assert!(r.skill_breakdown.iter().all(|s| s.score <= 100));
  }

  #[test]
  fn negative_score_floors_at_zero() {
    let m = SessionMetrics { score: -6, accuracy: 0, seconds: 0, correct: 0, wrong: 3 };
    let r = compose("Aarav", "Match the Color", None, m, &[], None);
    assert_eq!(r.score, 0);
    assert_eq!(r.attempts, 3);
    assert_eq!(r.time_seconds, 1);
  }

  #[test]
  fn trend_ends_with_the_current_session() {
    let r = compose("Priya", "Match the Color", None, metrics(), &[52, 60, 66], None);
    let labels: Vec<&str> = r.trend.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["S1", "S2", "S3", "S4"]);
    assert_eq!(r.trend.last().map(|p| p.value), Some(80));
  }

  #[test]
  fn score_parses_out_of_completion_notes() {
    assert_eq!(score_from_note("Completed color matching — score 80"), Some(80));
    assert_eq!(score_from_note("Not started"), None);
  }

  #[test]
  fn empty_notes_are_dropped() {
    let r = compose("Priya", "Match the Color", None, metrics(), &[], Some("   ".into()));
    assert!(r.clinician_notes.is_none());
  }
}
