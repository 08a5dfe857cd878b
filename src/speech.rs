//! Single-flight speech synthesis slot.
//!
//! Speech playback is a shared resource: only one utterance may be in
//! flight at a time. The slot owns the task handle of the current
//! synthesis; starting a new one aborts the previous task first
//! (stop-before-start), and dropping the slot aborts whatever is left so a
//! disconnected client never receives stale audio.

use tokio::task::JoinHandle;

#[derive(Default)]
pub struct UtteranceSlot {
  current: Option<JoinHandle<()>>,
}

impl UtteranceSlot {
  pub fn new() -> Self {
    Self::default()
  }

  /// Claim the slot for a new utterance, cancelling any in progress.
  pub fn begin(&mut self, task: JoinHandle<()>) {
    if let Some(prev) = self.current.replace(task) {
      prev.abort();
    }
  }

  /// Stop whatever is playing without starting anything new.
  pub fn stop(&mut self) {
    if let Some(prev) = self.current.take() {
      prev.abort();
    }
  }
}

impl Drop for UtteranceSlot {
  fn drop(&mut self) {
    self.stop();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn new_utterance_aborts_the_previous_one() {
    let finished = Arc::new(AtomicUsize::new(0));

    let f1 = finished.clone();
    let slow = tokio::spawn(async move {
      tokio::time::sleep(Duration::from_secs(30)).await;
      f1.fetch_add(1, Ordering::SeqCst);
    });

    let mut slot = UtteranceSlot::new();
    slot.begin(slow);

    let f2 = finished.clone();
    let fast = tokio::spawn(async move {
      f2.fetch_add(1, Ordering::SeqCst);
    });
    slot.begin(fast);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1, "only the second task may complete");
  }

  #[tokio::test]
  async fn stop_clears_the_slot() {
    let mut slot = UtteranceSlot::new();
    let task = tokio::spawn(async {
      tokio::time::sleep(Duration::from_secs(30)).await;
    });
    slot.begin(task);
    slot.stop();
    slot.stop(); // idempotent
  }
}
