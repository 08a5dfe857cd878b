//! WebSocket game + speech session.
//!
//! One socket carries one game session. The engine itself is clock-free;
//! this loop owns the timers. When the engine phase changes, the pending
//! transition is armed as an absolute deadline (`Instant`), and the loop
//! sleeps until it. Re-creating the sleep future on an unrelated socket
//! event is harmless because the deadline itself does not move; only a
//! phase change re-arms it. Replacing the session (new game, settings
//! change) replaces the deadline too, so no timer ever fires against
//! discarded state.
//!
//! Speech runs beside the game: synthesis results arrive on an mpsc channel
//! so a slow provider never stalls gameplay, and the utterance slot keeps
//! playback single-flight.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::domain::AssignmentStatus;
use crate::game::{GameSession, InputMode, Phase, TimerEvent};
use crate::ops;
use crate::protocol::{round_out, ClientWsMessage, ServerWsMessage};
use crate::speech::UtteranceSlot;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "saarthi_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// A running game plus the armed deadline for its next automatic
/// transition. The deadline is set when the engine phase changes and left
/// alone otherwise, so pings and speech traffic cannot postpone it.
struct ActiveGame {
  session: GameSession,
  deadline: Option<Instant>,
}

impl ActiveGame {
  fn new(session: GameSession) -> Self {
    let mut game = ActiveGame { session, deadline: None };
    game.arm();
    game
  }

  /// Re-arm from the engine's pending delay. Call after any operation
  /// that may have changed the phase.
  fn arm(&mut self) {
    self.deadline = self.session.timer().map(|d| Instant::now() + d);
  }
}

async fn send_all(socket: &mut WebSocket, msgs: Vec<ServerWsMessage>) -> Result<(), ()> {
  for msg in msgs {
    let out = serde_json::to_string(&msg).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) })
        .to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "saarthi_backend", error = %e, "WS send error");
      return Err(());
    }
  }
  Ok(())
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "saarthi_backend", "WebSocket connected");

  let mut game: Option<ActiveGame> = None;
  let mut assignment_id: Option<String> = None;
  let mut slot = UtteranceSlot::new();
  // speech/transcription results come back through here
  let (tx, mut rx) = mpsc::channel::<ServerWsMessage>(8);

  loop {
    let deadline = game.as_ref().and_then(|g| g.deadline);

    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                debug!(target: "saarthi_backend", "WS received: {:?}", &incoming);
                handle_client_ws(incoming, &state, &mut game, &mut assignment_id, &mut slot, &tx)
                  .await
              }
              Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
            };
            if send_all(&mut socket, replies).await.is_err() {
              break;
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }

      Some(out) = rx.recv() => {
        if send_all(&mut socket, vec![out]).await.is_err() {
          break;
        }
      }

      _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
        let replies = match game.as_mut() {
          Some(g) => {
            let replies = apply_timer(&mut g.session, &state, &assignment_id).await;
            g.arm();
            replies
          }
          None => vec![],
        };
        if send_all(&mut socket, replies).await.is_err() {
          break;
        }
      }
    }
  }

  info!(target: "saarthi_backend", "WebSocket disconnected");
}

/// Messages for the current round, if there is one to play.
fn round_message(g: &GameSession) -> Vec<ServerWsMessage> {
  match g.current_round() {
    Some(r) => vec![ServerWsMessage::Round {
      index: g.round_index(),
      total: g.total_rounds(),
      round: round_out(r),
    }],
    None => vec![],
  }
}

/// Apply the due engine transition and translate it into wire messages.
async fn apply_timer(
  g: &mut GameSession,
  state: &Arc<AppState>,
  assignment_id: &Option<String>,
) -> Vec<ServerWsMessage> {
  match g.on_timer() {
    Some(TimerEvent::Countdown(value)) => vec![ServerWsMessage::Countdown { value }],
    Some(TimerEvent::Go) => {
      let mut msgs = vec![ServerWsMessage::Go];
      msgs.extend(round_message(g));
      msgs
    }
    Some(TimerEvent::NextRound) | Some(TimerEvent::Retry) => round_message(g),
    Some(TimerEvent::Finishing) => vec![],
    Some(TimerEvent::Complete(summary)) => {
      info!(target: "game", score = summary.score, accuracy = summary.accuracy,
            seconds = summary.seconds, "Game complete");
      if let Some(id) = assignment_id {
        let note = format!("Completed color matching — score {}", summary.score);
        state
          .store
          .mutate(|d| d.update_assignment_status(id, AssignmentStatus::Completed, note))
          .await;
        info!(target: "therapy_store", assignment = %id, "Assignment completed from game");
      }
      vec![ServerWsMessage::Summary { summary }]
    }
    None => vec![],
  }
}

async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &Arc<AppState>,
  game: &mut Option<ActiveGame>,
  assignment_id: &mut Option<String>,
  slot: &mut UtteranceSlot,
  tx: &mpsc::Sender<ServerWsMessage>,
) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::Start { difficulty, mode, assignment_id: aid } => {
      info!(target: "game", ?difficulty, ?mode, assignment = ?aid, "Game started");
      if let Some(id) = &aid {
        state
          .store
          .mutate(|d| {
            d.update_assignment_status(id, AssignmentStatus::InProgress, "Opened activity".into())
          })
          .await;
      }
      *assignment_id = aid;
      let g = ActiveGame::new(GameSession::new(difficulty, mode));
      let first = countdown_message(&g.session);
      *game = Some(g);
      first
    }

    ClientWsMessage::Restart => match game.as_mut() {
      Some(g) => {
        g.session.restart();
        g.arm();
        countdown_message(&g.session)
      }
      None => vec![ServerWsMessage::Error { message: "No game in progress".into() }],
    },

    ClientWsMessage::SetDifficulty { difficulty } => match game.as_mut() {
      Some(g) => {
        g.session.set_difficulty(difficulty);
        g.arm();
        countdown_message(&g.session)
      }
      None => vec![ServerWsMessage::Error { message: "No game in progress".into() }],
    },

    ClientWsMessage::SetMode { mode } => match game.as_mut() {
      Some(g) => {
        g.session.set_mode(mode);
        g.arm();
        countdown_message(&g.session)
      }
      None => vec![ServerWsMessage::Error { message: "No game in progress".into() }],
    },

    ClientWsMessage::Tap { key } => submit(game, InputMode::Tap, &key),
    ClientWsMessage::Drop { key } => submit(game, InputMode::Drag, &key),

    ClientWsMessage::Speak { text, lang } => {
      let state = state.clone();
      let tx = tx.clone();
      let task = tokio::spawn(async move {
        let out = match ops::synthesize(&state, &text, &lang).await {
          Ok(audio) => ServerWsMessage::Speech {
            audio_base64: BASE64.encode(audio),
            mime: "audio/mpeg".into(),
          },
          Err(message) => ServerWsMessage::SpeechError { message },
        };
        let _ = tx.send(out).await;
      });
      slot.begin(task);
      vec![]
    }

    ClientWsMessage::StopSpeaking => {
      slot.stop();
      vec![]
    }

    ClientWsMessage::Transcribe { audio_base64, mime } => {
      let state = state.clone();
      let tx = tx.clone();
      tokio::spawn(async move {
        let out = match ops::transcribe(&state, &audio_base64, &mime).await {
          Ok(text) => ServerWsMessage::Transcript { text },
          Err(message) => ServerWsMessage::TranscriptError { message },
        };
        let _ = tx.send(out).await;
      });
      vec![]
    }
  }
}

fn countdown_message(g: &GameSession) -> Vec<ServerWsMessage> {
  match g.phase() {
    Phase::Countdown(value) => vec![ServerWsMessage::Countdown { value }],
    _ => vec![],
  }
}

/// Judge a submission arriving through either input mode. The triggering
/// gesture must match the session's configured mode. A drag that releases
/// a key not on the board is ignored, like dropping a chip outside the
/// slots.
fn submit(game: &mut Option<ActiveGame>, via: InputMode, key: &str) -> Vec<ServerWsMessage> {
  let Some(g) = game.as_mut() else {
    return vec![ServerWsMessage::Error { message: "No game in progress".into() }];
  };
  if g.session.mode() != via {
    let message = match via {
      InputMode::Tap => "Tap input is disabled in drag mode".to_string(),
      InputMode::Drag => "Drag input is disabled in tap mode".to_string(),
    };
    return vec![ServerWsMessage::Error { message }];
  }
  if via == InputMode::Drag {
    let on_board = g
      .session
      .current_round()
      .map(|r| r.options.iter().any(|c| c.key == key))
      .unwrap_or(false);
    if !on_board {
      return vec![];
    }
  }
  match g.session.submit(key) {
    Some(judgement) => {
      g.arm();
      vec![ServerWsMessage::Feedback {
        judgement,
        correct: g.session.correct(),
        wrong: g.session.wrong(),
        streak: g.session.streak(),
        score: g.session.score(),
      }]
    }
    // outside the playing phase submissions are ignored
    None => vec![],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::{Difficulty, COUNTDOWN_TICK_MS, SHAKE_MS};
  use std::time::Duration;

  fn playing(mode: InputMode) -> ActiveGame {
    let mut g = ActiveGame::new(GameSession::new(Difficulty::Easy, mode));
    while g.session.on_timer() != Some(TimerEvent::Go) {}
    g.arm();
    g
  }

  #[tokio::test(start_paused = true)]
  async fn armed_deadline_is_not_postponed_by_elapsed_time() {
    let g = ActiveGame::new(GameSession::new(Difficulty::Easy, InputMode::Tap));
    let armed = g.deadline.expect("countdown has a pending transition");

    // the session loop re-reads the deadline on every iteration (pings,
    // speech results); time passing must not move it
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(g.deadline, Some(armed));
    assert_eq!(
      armed.duration_since(Instant::now()),
      Duration::from_millis(COUNTDOWN_TICK_MS - 500)
    );
  }

  #[tokio::test(start_paused = true)]
  async fn submissions_rearm_for_the_feedback_pause() {
    let mut game = Some(playing(InputMode::Drag));
    assert!(
      game.as_ref().and_then(|g| g.deadline).is_none(),
      "no automatic transition while playing"
    );

    let bad = {
      let g = game.as_ref().expect("game active");
      let r = g.session.current_round().expect("round available");
      r.options
        .iter()
        .find(|c| c.key != r.target.key)
        .expect("round has a non-target option")
        .key
    };
    let msgs = submit(&mut game, InputMode::Drag, bad);
    assert!(matches!(msgs.as_slice(), [ServerWsMessage::Feedback { .. }]));

    let deadline = game.as_ref().and_then(|g| g.deadline).expect("shake pause armed");
    assert_eq!(deadline.duration_since(Instant::now()), Duration::from_millis(SHAKE_MS));
  }

  #[tokio::test(start_paused = true)]
  async fn off_board_drop_is_ignored() {
    let mut game = Some(playing(InputMode::Drag));
    let msgs = submit(&mut game, InputMode::Drag, "not-a-color");
    assert!(msgs.is_empty());

    let g = game.as_ref().expect("game active");
    assert_eq!(g.session.correct(), 0);
    assert_eq!(g.session.wrong(), 0);
    assert!(g.deadline.is_none(), "ignored drop must not arm a timer");
  }

  #[tokio::test(start_paused = true)]
  async fn gesture_must_match_the_configured_mode() {
    let mut game = Some(playing(InputMode::Drag));
    let msgs = submit(&mut game, InputMode::Tap, "red");
    assert!(matches!(msgs.as_slice(), [ServerWsMessage::Error { .. }]));
    assert_eq!(game.as_ref().expect("game active").session.correct(), 0);
  }
}
