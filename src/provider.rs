//! Minimal client for the upstream language provider (translation, speech
//! synthesis, speech recognition).
//!
//! The provider is optional: without SAARTHI_PROVIDER_URL the service runs
//! on the built-in dictionary and reports synthesis/recognition as
//! unavailable. Calls are instrumented and log latencies and sizes, never
//! payload contents or the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct LanguageProvider {
  client: reqwest::Client,
  pub base_url: String,
  api_key: Option<String>,
}

#[derive(Serialize)]
struct TranslateReq<'a> {
  text: &'a str,
  target: &'a str,
  source: &'a str,
}

/// Providers answer with either `translated` or `text`; accept both.
#[derive(Deserialize)]
struct TranslateResp {
  #[serde(default)] translated: Option<String>,
  #[serde(default)] text: Option<String>,
}

#[derive(Serialize)]
struct TtsReq<'a> {
  text: &'a str,
  lang: &'a str,
}

#[derive(Serialize)]
struct SttReq<'a> {
  audio_base64: &'a str,
  mime: &'a str,
}

#[derive(Deserialize)]
struct SttResp {
  text: String,
}

impl LanguageProvider {
  /// Construct the client if SAARTHI_PROVIDER_URL is set; otherwise None.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("SAARTHI_PROVIDER_URL").ok()?;
    let api_key = std::env::var("SAARTHI_PROVIDER_KEY").ok();
    Self::new(base_url, api_key)
  }

  pub fn new(base_url: String, api_key: Option<String>) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), api_key })
  }

  fn post(&self, path: &str) -> reqwest::RequestBuilder {
    let mut req = self
      .client
      .post(format!("{}{}", self.base_url, path))
      .header(USER_AGENT, "saarthi-backend/0.1")
      .header(CONTENT_TYPE, "application/json");
    if let Some(key) = &self.api_key {
      req = req.header(AUTHORIZATION, format!("Bearer {}", key));
    }
    req
  }

  /// Translate `text` into the two-letter target language.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), %target))]
  pub async fn translate(&self, text: &str, target: &str) -> Result<String, String> {
    let start = std::time::Instant::now();
    let res = self
      .post("/translate")
      .json(&TranslateReq { text, target, source: "en" })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("Provider HTTP {}: {}", status, body));
    }

    let body: TranslateResp = res.json().await.map_err(|e| e.to_string())?;
    let out = body
      .translated
      .or(body.text)
      .ok_or_else(|| "Provider returned neither 'translated' nor 'text'".to_string())?;
    info!(elapsed = ?start.elapsed(), out_len = out.len(), "Translation received");
    Ok(out)
  }

  /// Synthesize speech for a locale; returns mpeg audio bytes.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), %locale))]
  pub async fn synthesize(&self, text: &str, locale: &str) -> Result<Vec<u8>, String> {
    let start = std::time::Instant::now();
    let res = self
      .post("/tts")
      .json(&TtsReq { text, lang: locale })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("TTS HTTP {}: {}", status, body));
    }

    let bytes = res.bytes().await.map_err(|e| e.to_string())?;
    info!(elapsed = ?start.elapsed(), audio_bytes = bytes.len(), "Synthesis received");
    Ok(bytes.to_vec())
  }

  /// Transcribe a base64-encoded utterance.
  #[instrument(level = "info", skip(self, audio_base64), fields(audio_len = audio_base64.len(), %mime))]
  pub async fn transcribe(&self, audio_base64: &str, mime: &str) -> Result<String, String> {
    let res = self
      .post("/stt")
      .json(&SttReq { audio_base64, mime })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("STT HTTP {}: {}", status, body));
    }

    let body: SttResp = res.json().await.map_err(|e| e.to_string())?;
    Ok(body.text)
  }
}
