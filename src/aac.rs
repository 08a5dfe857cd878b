//! AAC board pool and concept selection.
//!
//! The pool groups speakable concepts by category chip. A board request
//! names the categories it wants, a tile count, and a seed string; the
//! selection is a seeded shuffle so `seed=today` gives every child the same
//! board for the whole day while `seed=random` reshuffles per request.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::BoardCategory;
use crate::seeds;
use crate::util::stable_seed;

pub const DEFAULT_BOARD_SIZE: usize = 12;
pub const MAX_BOARD_SIZE: usize = 40;

#[derive(Clone)]
pub struct BoardPool {
  categories: Vec<BoardCategory>,
  pub image_base_url: String,
}

impl BoardPool {
  /// Built-in pool, optionally overridden by TOML config.
  pub fn from_config(cfg: Option<&crate::config::BoardConfig>) -> Self {
    let categories = cfg
      .map(|c| c.categories.clone())
      .filter(|c| !c.is_empty())
      .unwrap_or_else(seeds::default_board_pool);
    let image_base_url = cfg
      .and_then(|c| c.image_base_url.clone())
      .unwrap_or_else(|| "/assets/aac".to_string());
    BoardPool { categories, image_base_url }
  }

  pub fn category_names(&self) -> Vec<String> {
    self.categories.iter().map(|c| c.name.clone()).collect()
  }

  pub fn concept_count(&self) -> usize {
    self.categories.iter().map(|c| c.concepts.len()).sum()
  }

  /// Pick up to `size` concepts from the named categories (all categories
  /// when `cats` is empty or "all"), shuffled by the resolved seed.
  /// Duplicates across categories are dropped, first occurrence wins.
  pub fn select_concepts(&self, cats: &[String], size: usize, seed: &str) -> Vec<String> {
    let wanted: Vec<&BoardCategory> = if cats.is_empty() || cats.iter().any(|c| c == "all") {
      self.categories.iter().collect()
    } else {
      self
        .categories
        .iter()
        .filter(|c| cats.iter().any(|w| w.eq_ignore_ascii_case(&c.name)))
        .collect()
    };

    let mut pool: Vec<String> = Vec::new();
    for cat in wanted {
      for concept in &cat.concepts {
        let key = concept.to_lowercase();
        if !pool.iter().any(|p: &String| p.to_lowercase() == key) {
          pool.push(concept.clone());
        }
      }
    }

    let mut rng = StdRng::seed_from_u64(stable_seed(seed));
    pool.shuffle(&mut rng);
    pool.truncate(size.clamp(1, MAX_BOARD_SIZE));
    pool
  }

  pub fn image_url_for(&self, concept: &str) -> String {
    let slug: String = concept
      .to_lowercase()
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
      .collect();
    format!("{}/{}.png", self.image_base_url.trim_end_matches('/'), slug)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn pool() -> BoardPool {
    BoardPool::from_config(None)
  }

  #[test]
  fn same_seed_gives_same_board() {
    let p = pool();
    let a = p.select_concepts(&[], 12, "2024-06-01");
    let b = p.select_concepts(&[], 12, "2024-06-01");
    assert_eq!(a, b);
  }

  #[test]
  fn different_seeds_usually_differ() {
    let p = pool();
    let a = p.select_concepts(&[], 12, "seed-a");
    let b = p.select_concepts(&[], 12, "seed-b");
    assert_ne!(a, b);
  }

  #[test]
  fn selection_respects_size_and_uniqueness() {
    let p = pool();
    let picked = p.select_concepts(&[], 8, "today");
    assert_eq!(picked.len(), 8);
    let keys: HashSet<String> = picked.iter().map(|c| c.to_lowercase()).collect();
    assert_eq!(keys.len(), picked.len());
  }

  #[test]
  fn category_filter_limits_the_pool() {
    let p = pool();
    let picked = p.select_concepts(&["food".into()], 20, "x");
    assert!(picked.len() <= 6);
    for concept in &picked {
      assert!(
        ["Water", "Food", "Eat", "Drink", "Fruit", "Milk"].contains(&concept.as_str()),
        "{concept} not a food concept"
      );
    }
  }

  #[test]
  fn image_urls_are_slugged() {
    let p = pool();
    assert_eq!(p.image_url_for("Water"), "/assets/aac/water.png");
  }
}
