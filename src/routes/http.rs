//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, instrument, warn};

use crate::domain::{Language, Translations};
use crate::ops;
use crate::protocol::*;
use crate::report;
use crate::state::AppState;
use crate::store::{ActivityPatch, AssignmentPatch, LearnerPatch};
use crate::{i18n, suggest, util};

fn not_found(what: &str, id: &str) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { message: format!("{} '{}' not found", what, id) }))
    .into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, uptime_seconds: state.uptime_seconds() })
}

// ---- AAC ----

#[instrument(level = "info", skip(state))]
pub async fn http_aac_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(CategoriesOut { categories: state.board.category_names() })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_aac_board(
  State(state): State<Arc<AppState>>,
  Query(q): Query<BoardQuery>,
) -> impl IntoResponse {
  let board = ops::build_board(&state, q).await;
  info!(target: "saarthi_backend", lang = %board.lang, tiles = board.tiles.len(), seed = %board.seed,
        "HTTP board served");
  Json(board)
}

// ---- i18n ----

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), lang = %body.lang))]
pub async fn http_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> impl IntoResponse {
  let lang = Language::parse_loose(&body.lang);
  let translated = ops::translate_text(&state, &body.text, lang).await;
  Json(TranslateOut { translated })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), lang = %body.lang))]
pub async fn http_tts(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TtsIn>,
) -> Response {
  match ops::synthesize(&state, &body.text, &body.lang).await {
    Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
    Err(e) => {
      warn!(target: "saarthi_backend", error = %e, text = %util::trunc_for_log(&body.text, 40),
            "TTS failed");
      (StatusCode::BAD_GATEWAY, Json(ErrorOut { message: e })).into_response()
    }
  }
}

#[instrument(level = "info", skip(q))]
pub async fn http_suggestions(Query(q): Query<SuggestQuery>) -> impl IntoResponse {
  let topic = i18n::normalize_topic(q.topic.as_deref().unwrap_or(""));
  let lang = Language::parse_loose(q.lang.as_deref().unwrap_or("en"));
  let suggestions = i18n::suggestions(topic, lang)
    .into_iter()
    .map(str::to_string)
    .collect();
  Json(SuggestOut { suggestions })
}

// ---- Datasets ----

#[instrument(level = "info", skip(state))]
pub async fn http_datasets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(DatasetsOut { datasets: state.datasets.list().await })
}

#[instrument(level = "info", skip(state, q), fields(%name))]
pub async fn http_dataset_samples(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
  Query(q): Query<SampleQuery>,
) -> Response {
  let limit = q.limit.unwrap_or(crate::datasets::DEFAULT_SAMPLE_LIMIT);
  match state.datasets.samples(&name, limit).await {
    Some(rows) => Json(SamplesOut { dataset: name, rows }).into_response(),
    None => not_found("dataset", &name),
  }
}

#[instrument(level = "info", skip(state), fields(%name))]
pub async fn http_dataset_refresh(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
) -> Response {
  match state.datasets.refresh_one(&name).await {
    Some(meta) => Json(RefreshOut { dataset: meta }).into_response(),
    None => not_found("dataset", &name),
  }
}

// ---- Activity planning ----

#[instrument(level = "info", skip(body), fields(goal = %body.goal, difficulty = %body.difficulty))]
pub async fn http_suggest_plan(Json(body): Json<PlanIn>) -> impl IntoResponse {
  let suggestions = suggest::suggest(&body.goal, &body.difficulty, body.child_age);
  let rationale = suggest::rationale(&body.language).to_string();
  Json(PlanOut { suggestions, rationale })
}

// ---- Auth ----

#[instrument(level = "info", skip(state, body), fields(role = ?body.role))]
pub async fn http_login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LoginIn>,
) -> impl IntoResponse {
  let session = state
    .store
    .mutate(|d| {
      d.login(body.role, body.learner_id.clone());
      d.session.clone()
    })
    .await;
  info!(target: "therapy_store", role = ?session.role, "Login");
  Json(session)
}

#[instrument(level = "info", skip(state))]
pub async fn http_logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = state
    .store
    .mutate(|d| {
      d.logout();
      d.session.clone()
    })
    .await;
  Json(session)
}

#[instrument(level = "info", skip(state))]
pub async fn http_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.store.read().await.session.clone())
}

// ---- Learners ----

#[instrument(level = "info", skip(state))]
pub async fn http_list_learners(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.store.read().await.learners.clone())
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name))]
pub async fn http_create_learner(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NewLearnerIn>,
) -> impl IntoResponse {
  let learner = state
    .store
    .mutate(|d| d.add_learner(body.name.clone(), body.age, body.preferred_language))
    .await;
  info!(target: "therapy_store", id = %learner.id, "Learner created");
  (StatusCode::CREATED, Json(learner))
}

#[instrument(level = "info", skip(state, patch), fields(%id))]
pub async fn http_update_learner(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<LearnerPatch>,
) -> Response {
  let updated = state
    .store
    .mutate(|d| {
      d.update_learner(&id, patch);
      d.learner(&id).cloned()
    })
    .await;
  match updated {
    Some(l) => Json(l).into_response(),
    None => not_found("learner", &id),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_learner(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  state.store.mutate(|d| d.delete_learner(&id)).await;
  StatusCode::NO_CONTENT
}

// ---- Activities ----

#[instrument(level = "info", skip(state))]
pub async fn http_list_activities(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.store.read().await.activities.clone())
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.store.read().await.activity(&id) {
    Some(a) => Json(a.clone()).into_response(),
    None => not_found("activity", &id),
  }
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name, kind = body.content.kind()))]
pub async fn http_create_activity(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NewActivityIn>,
) -> Response {
  if let Err(e) = body.content.validate() {
    return (StatusCode::BAD_REQUEST, Json(ErrorOut { message: e })).into_response();
  }
  let translations = body
    .instruction_translations
    .unwrap_or_else(|| Translations::english_only(&body.instruction));
  let activity = state
    .store
    .mutate(|d| {
      d.add_activity(
        body.name.clone(),
        body.target_language,
        body.instruction.clone(),
        translations,
        body.content.clone(),
      )
    })
    .await;
  info!(target: "therapy_store", id = %activity.id, kind = activity.content.kind(), "Activity created");
  (StatusCode::CREATED, Json(activity)).into_response()
}

#[instrument(level = "info", skip(state, patch), fields(%id))]
pub async fn http_update_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<ActivityPatch>,
) -> Response {
  if let Some(content) = &patch.content {
    if let Err(e) = content.validate() {
      return (StatusCode::BAD_REQUEST, Json(ErrorOut { message: e })).into_response();
    }
  }
  let updated = state
    .store
    .mutate(|d| {
      d.update_activity(&id, patch);
      d.activity(&id).cloned()
    })
    .await;
  match updated {
    Some(a) => Json(a).into_response(),
    None => not_found("activity", &id),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  state.store.mutate(|d| d.delete_activity(&id)).await;
  StatusCode::NO_CONTENT
}

/// Learners who can still receive this activity (no existing assignment).
#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_assignable_learners(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  let data = state.store.read().await;
  if data.activity(&id).is_none() {
    return not_found("activity", &id);
  }
  let learners: Vec<_> = data.assignable_learners(&id).into_iter().cloned().collect();
  Json(learners).into_response()
}

// ---- Assignments ----

#[instrument(level = "info", skip(state))]
pub async fn http_list_assignments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.store.read().await.assignments.clone())
}

#[instrument(level = "info", skip(state, body), fields(activity = %body.activity_id, learner = %body.learner_id))]
pub async fn http_create_assignment(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AssignIn>,
) -> Response {
  {
    let data = state.store.read().await;
    if data.activity(&body.activity_id).is_none() {
      return not_found("activity", &body.activity_id);
    }
    if data.learner(&body.learner_id).is_none() {
      return not_found("learner", &body.learner_id);
    }
  }
  let assignment = state
    .store
    .mutate(|d| d.assign_activity(body.activity_id.clone(), body.learner_id.clone()))
    .await;
  info!(target: "therapy_store", id = %assignment.id, "Assignment created");
  (StatusCode::CREATED, Json(assignment)).into_response()
}

#[instrument(level = "info", skip(state, body), fields(%id, status = ?body.status))]
pub async fn http_update_assignment_status(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<StatusIn>,
) -> Response {
  let updated = state
    .store
    .mutate(|d| {
      d.update_assignment_status(&id, body.status, body.note.clone());
      d.assignment(&id).cloned()
    })
    .await;
  match updated {
    Some(a) => Json(a).into_response(),
    None => not_found("assignment", &id),
  }
}

#[instrument(level = "info", skip(state, patch), fields(%id))]
pub async fn http_update_assignment(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<AssignmentPatch>,
) -> Response {
  let updated = state
    .store
    .mutate(|d| {
      d.update_assignment(&id, patch);
      d.assignment(&id).cloned()
    })
    .await;
  match updated {
    Some(a) => Json(a).into_response(),
    None => not_found("assignment", &id),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.store.read().await.progress_entries())
}

// ---- Reports ----

#[instrument(level = "info", skip(state, body), fields(learner = %body.learner_id, activity = %body.activity_id))]
pub async fn http_activity_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ReportIn>,
) -> impl IntoResponse {
  let data = state.store.read().await;
  // Names degrade to "Unknown" the same way progress rows do.
  let child_name = data
    .learner(&body.learner_id)
    .map(|l| l.name.clone())
    .unwrap_or_else(|| "Unknown".into());
  let activity_name = data
    .activity(&body.activity_id)
    .map(|a| a.name.clone())
    .unwrap_or_else(|| "Unknown".into());

  // Trend history: this learner's earlier completions with a parseable
  // score in the note, oldest first.
  let mut completed: Vec<_> = data
    .assignments
    .iter()
    .filter(|a| {
      a.learner_id == body.learner_id && a.status == crate::domain::AssignmentStatus::Completed
    })
    .collect();
  completed.sort_by_key(|a| a.updated_at);
  let history: Vec<u32> = completed
    .iter()
    .filter_map(|a| report::score_from_note(&a.last_update))
    .collect();
  drop(data);

  let metrics = report::SessionMetrics {
    score: body.score,
    accuracy: body.accuracy,
    seconds: body.seconds,
    correct: body.correct,
    wrong: body.wrong,
  };
  let rep = report::compose(
    &child_name,
    &activity_name,
    Some(body.activity_id.clone()),
    metrics,
    &history,
    body.clinician_notes,
  );
  Json(rep)
}
