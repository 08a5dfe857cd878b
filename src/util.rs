//! Small utility helpers used across modules.

use rand::Rng;

/// Resolve a board seed string to a numeric RNG seed.
///
///   seed=today  -> stable board per UTC day
///   seed=random -> changes every request
///   seed=any    -> stable by that string
pub fn stable_seed(seed: &str) -> u64 {
  if seed == "random" {
    return rand::thread_rng().gen();
  }

  let owned;
  let effective = if seed == "today" {
    owned = chrono::Utc::now().format("%Y-%m-%d").to_string();
    owned.as_str()
  } else {
    seed
  };

  // FNV-1a: cheap, stable across runs (unlike the std hasher).
  let mut hash: u64 = 0xcbf29ce484222325;
  for byte in effective.as_bytes() {
    hash ^= u64::from(*byte);
    hash = hash.wrapping_mul(0x100000001b3);
  }
  hash
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut end = max;
    while !s.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}… ({} bytes total)", &s[..end], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literal_seeds_are_stable() {
    assert_eq!(stable_seed("board-a"), stable_seed("board-a"));
    assert_ne!(stable_seed("board-a"), stable_seed("board-b"));
  }

  #[test]
  fn today_is_stable_within_a_day() {
    assert_eq!(stable_seed("today"), stable_seed("today"));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "पानी पानी पानी";
    let t = trunc_for_log(s, 5);
    assert!(t.contains("bytes total"));
    let _ = trunc_for_log("short", 100);
  }
}
