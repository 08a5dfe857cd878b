//! Core behaviors shared by HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Translation with cache and per-item fallback (provider -> builtin
//!     dictionary -> source text; a failed translation is never an error)
//!   - Cancellable concurrent batch translation
//!   - Speech synthesis / recognition via the optional provider
//!   - AAC board assembly

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, instrument};

use crate::aac::DEFAULT_BOARD_SIZE;
use crate::domain::Language;
use crate::protocol::{BoardOut, BoardQuery, TileOut};
use crate::state::AppState;

/// Translate into the learner's language, degrading instead of failing:
/// provider first, then the builtin dictionary, then the source text.
/// Successful lookups are cached per (text, language).
#[instrument(level = "debug", skip(state, text), fields(text_len = text.len(), lang = lang.short()))]
pub async fn translate_text(state: &AppState, text: &str, lang: Language) -> String {
  let trimmed = text.trim();
  if trimmed.is_empty() || lang == Language::English {
    return trimmed.to_string();
  }

  let key = (trimmed.to_lowercase(), lang.short().to_string());
  if let Some(hit) = state.translation_cache.read().await.get(&key) {
    return hit.clone();
  }

  if let Some(provider) = &state.provider {
    match provider.translate(trimmed, lang.short()).await {
      Ok(t) if !t.trim().is_empty() => {
        let t = t.trim().to_string();
        state.translation_cache.write().await.insert(key, t.clone());
        return t;
      }
      Ok(_) => {
        error!(target: "saarthi_backend", text = %crate::util::trunc_for_log(trimmed, 40),
               "Provider returned empty translation; using local fallback");
      }
      Err(e) => {
        error!(target: "saarthi_backend", error = %e, "Provider translate failed; using local fallback");
      }
    }
  }

  if let Some(entry) = state.dictionary.get(&key.0) {
    let local = entry.get(lang);
    if !local.is_empty() {
      let local = local.to_string();
      state.translation_cache.write().await.insert(key, local.clone());
      return local;
    }
  }

  debug!(target: "saarthi_backend", "No translation available; falling back to source text");
  trimmed.to_string()
}

/// Translate a batch concurrently, preserving order. Each item falls back
/// independently, so one failed request never blocks the rest. The whole
/// batch is scoped to the returned future: dropping it aborts every request
/// still in flight, which is how callers cancel a stale batch.
pub async fn translate_batch(state: &Arc<AppState>, texts: &[String], lang: Language) -> Vec<String> {
  let mut set = JoinSet::new();
  for (i, text) in texts.iter().enumerate() {
    let state = state.clone();
    let text = text.clone();
    set.spawn(async move { (i, translate_text(&state, &text, lang).await) });
  }

  // Pre-fill with source text so an aborted/panicked task degrades cleanly.
  let mut out: Vec<String> = texts.to_vec();
  while let Some(joined) = set.join_next().await {
    if let Ok((i, translated)) = joined {
      out[i] = translated;
    }
  }
  out
}

/// Synthesize speech; loose language forms ("hindi", "hi", "hi-IN") resolve
/// to the provider locale.
pub async fn synthesize(state: &AppState, text: &str, lang: &str) -> Result<Vec<u8>, String> {
  if text.trim().is_empty() {
    return Err("Nothing to speak".into());
  }
  let locale = Language::parse_loose(lang).locale();
  match &state.provider {
    Some(provider) => provider.synthesize(text.trim(), locale).await,
    None => Err("Speech synthesis unavailable: no language provider configured".into()),
  }
}

/// Transcribe a recorded utterance. Without a provider the capability is
/// absent and callers disable the control with this message.
pub async fn transcribe(state: &AppState, audio_base64: &str, mime: &str) -> Result<String, String> {
  match &state.provider {
    Some(provider) => provider.transcribe(audio_base64, mime).await,
    None => Err("Speech recognition unavailable: no language provider configured".into()),
  }
}

/// Assemble an AAC board: seeded concept selection plus per-tile labels in
/// the requested language.
#[instrument(level = "info", skip(state, q))]
pub async fn build_board(state: &Arc<AppState>, q: BoardQuery) -> BoardOut {
  let lang = Language::parse_loose(q.lang.as_deref().unwrap_or("en"));
  let size = q.size.unwrap_or(DEFAULT_BOARD_SIZE);
  let seed = q.seed.unwrap_or_else(|| "today".to_string());
  let cats: Vec<String> = q
    .cats
    .as_deref()
    .unwrap_or("")
    .split(',')
    .map(|c| c.trim().to_string())
    .filter(|c| !c.is_empty())
    .collect();

  let concepts = state.board.select_concepts(&cats, size, &seed);
  let labels = translate_batch(state, &concepts, lang).await;

  let tiles: Vec<TileOut> = concepts
    .iter()
    .zip(labels)
    .enumerate()
    .map(|(i, (concept, label))| TileOut {
      id: format!("tile_{}_{}", i, concept.to_lowercase()),
      concept: concept.clone(),
      label,
      image_url: state.board.image_url_for(concept),
      tts_lang: lang.locale().to_string(),
    })
    .collect();

  BoardOut {
    lang: lang.short().to_string(),
    size: tiles.len(),
    cats,
    seed,
    tiles,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aac::BoardPool;
  use crate::datasets::DatasetRegistry;
  use crate::provider::LanguageProvider;
  use crate::store::{TherapyData, TherapyStore};
  use chrono::Utc;
  use std::collections::HashMap;
  use tokio::sync::RwLock;
  use uuid::Uuid;

  fn test_state(provider: Option<LanguageProvider>) -> Arc<AppState> {
    let path = std::env::temp_dir().join(format!("saarthi-ops-{}.json", Uuid::new_v4()));
    Arc::new(AppState {
      store: TherapyStore::with_path(TherapyData::seeded(), path),
      provider,
      board: BoardPool::from_config(None),
      dictionary: crate::seeds::builtin_dictionary(),
      datasets: DatasetRegistry::new(vec![]),
      translation_cache: RwLock::new(HashMap::new()),
      started_at: Utc::now(),
    })
  }

  #[tokio::test]
  async fn dictionary_translates_without_provider() {
    let state = test_state(None);
    let t = translate_text(&state, "Water", Language::Tamil).await;
    assert_eq!(t, "தண்ணீர்");
  }

  #[tokio::test]
  async fn unknown_word_falls_back_to_source_text() {
    let state = test_state(None);
    let t = translate_text(&state, "Xylophone", Language::Tamil).await;
    assert_eq!(t, "Xylophone");
  }

  #[tokio::test]
  async fn failing_provider_degrades_not_errors() {
    // nothing listens on port 9; the request fails fast
    let provider = LanguageProvider::new("http://127.0.0.1:9".into(), None)
      .expect("client builds");
    let state = test_state(Some(provider));

    assert_eq!(translate_text(&state, "Water", Language::Tamil).await, "தண்ணீர்");
    assert_eq!(translate_text(&state, "Xylophone", Language::Tamil).await, "Xylophone");
  }

  #[tokio::test]
  async fn english_passes_through_untouched() {
    let state = test_state(None);
    assert_eq!(translate_text(&state, " Water ", Language::English).await, "Water");
  }

  #[tokio::test]
  async fn batch_preserves_order_with_per_item_fallback() {
    let state = test_state(None);
    let texts = vec!["Water".to_string(), "Xylophone".to_string(), "Help".to_string()];
    let out = translate_batch(&state, &texts, Language::Hindi).await;
    assert_eq!(out, vec!["पानी", "Xylophone", "मदद"]);
  }

  #[tokio::test]
  async fn synthesis_without_provider_is_reported_unavailable() {
    let state = test_state(None);
    let err = synthesize(&state, "Water", "hi").await.unwrap_err();
    assert!(err.contains("unavailable"));
    let err = transcribe(&state, "abcd", "audio/webm").await.unwrap_err();
    assert!(err.contains("unavailable"));
  }

  #[tokio::test]
  async fn board_tiles_are_labelled_and_localized() {
    let state = test_state(None);
    let q = BoardQuery {
      lang: Some("hi".into()),
      size: Some(6),
      cats: Some("food".into()),
      seed: Some("fixed".into()),
    };
    let board = build_board(&state, q).await;
    assert_eq!(board.lang, "hi");
    assert_eq!(board.tiles.len(), 6);
    for tile in &board.tiles {
      assert_eq!(tile.tts_lang, "hi-IN");
      assert!(!tile.label.is_empty());
      assert!(tile.image_url.ends_with(".png"));
    }
    let water = board.tiles.iter().find(|t| t.concept == "Water").unwrap();
    assert_eq!(water.label, "पानी");
  }
}
