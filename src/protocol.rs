//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::datasets::DatasetMeta;
use crate::domain::{ActivityContent, Language, Role, Translations};
use crate::game::{ColorDef, Difficulty, InputMode, Judgement, Round, Summary};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Start a game; optionally tied to an assignment so completion updates
    /// its status.
    Start {
        difficulty: Difficulty,
        mode: InputMode,
        #[serde(default)]
        assignment_id: Option<String>,
    },
    Restart,
    SetDifficulty {
        difficulty: Difficulty,
    },
    SetMode {
        mode: InputMode,
    },
    /// Tap-to-select submission (tap mode).
    Tap {
        key: String,
    },
    /// Drag-and-drop submission (drag mode).
    Drop {
        key: String,
    },
    Speak {
        text: String,
        lang: String,
    },
    StopSpeaking,
    Transcribe {
        audio_base64: String,
        mime: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Countdown {
        value: u8,
    },
    Go,
    Round {
        index: usize,
        total: usize,
        round: RoundOut,
    },
    Feedback {
        judgement: Judgement,
        correct: u32,
        wrong: u32,
        streak: u32,
        score: i32,
    },
    Summary {
        summary: Summary,
    },
    Speech {
        audio_base64: String,
        mime: String,
    },
    SpeechError {
        message: String,
    },
    Transcript {
        text: String,
    },
    TranscriptError {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorOut {
    pub key: String,
    pub label: String,
    pub hex: String,
}

/// DTO for one game round. The target color is shown to the player, so
/// sending it over the wire is fine.
#[derive(Debug, Clone, Serialize)]
pub struct RoundOut {
    pub id: String,
    pub target: ColorOut,
    pub options: Vec<ColorOut>,
}

fn color_out(c: &ColorDef) -> ColorOut {
    ColorOut { key: c.key.into(), label: c.label.into(), hex: c.hex.into() }
}

pub fn round_out(r: &Round) -> RoundOut {
    RoundOut {
        id: r.id.clone(),
        target: color_out(&r.target),
        options: r.options.iter().map(color_out).collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub uptime_seconds: u64,
}

#[derive(Serialize)]
pub struct CategoriesOut {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub lang: Option<String>,
    pub size: Option<usize>,
    pub cats: Option<String>,
    pub seed: Option<String>,
}

#[derive(Serialize)]
pub struct TileOut {
    pub id: String,
    pub concept: String,
    pub label: String,
    pub image_url: String,
    pub tts_lang: String,
}

#[derive(Serialize)]
pub struct BoardOut {
    pub lang: String,
    pub size: usize,
    pub cats: Vec<String>,
    pub seed: String,
    pub tiles: Vec<TileOut>,
}

#[derive(Deserialize)]
pub struct TranslateIn {
    pub text: String,
    pub lang: String,
}
#[derive(Serialize)]
pub struct TranslateOut {
    pub translated: String,
}

#[derive(Deserialize)]
pub struct TtsIn {
    pub text: String,
    pub lang: String,
}

#[derive(Serialize)]
pub struct DatasetsOut {
    pub datasets: Vec<DatasetMeta>,
}

#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub limit: Option<usize>,
}
#[derive(Serialize)]
pub struct SamplesOut {
    pub dataset: String,
    pub rows: Vec<serde_json::Value>,
}
#[derive(Serialize)]
pub struct RefreshOut {
    pub dataset: DatasetMeta,
}

#[derive(Debug, Deserialize)]
pub struct PlanIn {
    pub child_age: u32,
    pub difficulty: String,
    pub goal: String,
    pub language: String,
}
#[derive(Serialize)]
pub struct PlanOut {
    pub suggestions: Vec<String>,
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub topic: Option<String>,
    pub lang: Option<String>,
}
#[derive(Serialize)]
pub struct SuggestOut {
    pub suggestions: Vec<String>,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub role: Role,
    #[serde(default)]
    pub learner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct NewLearnerIn {
    pub name: String,
    pub age: u32,
    pub preferred_language: Language,
}

#[derive(Deserialize)]
pub struct NewActivityIn {
    pub name: String,
    pub target_language: Language,
    pub instruction: String,
    #[serde(default)]
    pub instruction_translations: Option<Translations>,
    pub content: ActivityContent,
}

#[derive(Deserialize)]
pub struct AssignIn {
    pub activity_id: String,
    pub learner_id: String,
}

#[derive(Deserialize)]
pub struct StatusIn {
    pub status: crate::domain::AssignmentStatus,
    pub note: String,
}

#[derive(Deserialize)]
pub struct ReportIn {
    pub learner_id: String,
    pub activity_id: String,
    pub score: i32,
    pub accuracy: u32,
    pub seconds: u64,
    pub correct: u32,
    pub wrong: u32,
    #[serde(default)]
    pub clinician_notes: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
