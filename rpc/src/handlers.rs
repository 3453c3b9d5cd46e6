//! Request handlers and their wire types.
//!
//! Ledger calls block on the store, so each one runs on the blocking pool.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tally_ledger::{ChoiceTotal, LedgerError, PollDraft, PollResults};
use tally_store::LedgerStore;
use tally_types::{AuditEntry, Ballot, Poll};

use crate::pagination::{encode_cursor, PaginationMeta, PaginationParams};
use crate::state::AppState;
use crate::RpcError;

async fn blocking<T, F>(f: F) -> Result<T, RpcError>
where
    F: FnOnce() -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RpcError::Validation(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, RpcError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| RpcError::Validation(rejection.body_text()))
}

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ── Voting ───────────────────────────────────────────────────────────────

/// Body of `POST /api/polls/:questionId/vote`; the question comes from the path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVoteRequest {
    #[serde(default)]
    pub choice: Option<String>,
    #[serde(default, alias = "visitorId")]
    pub voter_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub audit_hash: String,
}

pub async fn submit_vote<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<Ballot>, JsonRejection>,
) -> Result<Json<VoteResponse>, RpcError> {
    let ballot = json_body(body).inspect_err(|_| state.metrics.reject("validation"))?;
    record_vote(state, ballot).await
}

pub async fn submit_poll_vote<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
    body: Result<Json<PollVoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, RpcError> {
    let request = json_body(body).inspect_err(|_| state.metrics.reject("validation"))?;
    let ballot = Ballot {
        question_id: Some(question_id),
        choice: request.choice,
        voter_id: request.voter_id,
    };
    record_vote(state, ballot).await
}

async fn record_vote<S: LedgerStore + 'static>(
    state: AppState<S>,
    ballot: Ballot,
) -> Result<Json<VoteResponse>, RpcError> {
    let ledger = state.ledger.clone();
    match blocking(move || ledger.submit_vote(&ballot)).await {
        Ok(hash) => {
            state.metrics.votes_accepted.inc();
            Ok(Json(VoteResponse {
                success: true,
                audit_hash: hash.to_hex(),
            }))
        }
        Err(e) => {
            state.metrics.reject(match &e {
                RpcError::Validation(_) => "validation",
                RpcError::DuplicateVote(_) => "duplicate",
                _ => "error",
            });
            Err(e)
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    #[serde(default)]
    pub question_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub question_id: String,
    pub results: Vec<ChoiceTotal>,
}

impl From<PollResults> for ResultsResponse {
    fn from(r: PollResults) -> Self {
        Self {
            question_id: r.question_id,
            results: r.results,
        }
    }
}

pub async fn results<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    params: Result<Query<ResultsQuery>, QueryRejection>,
) -> Result<Json<ResultsResponse>, RpcError> {
    let question_id = query(params)?.question_id.unwrap_or_default();
    serve_results(state, question_id).await
}

pub async fn poll_results<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
) -> Result<Json<ResultsResponse>, RpcError> {
    serve_results(state, question_id).await
}

async fn serve_results<S: LedgerStore + 'static>(
    state: AppState<S>,
    question_id: String,
) -> Result<Json<ResultsResponse>, RpcError> {
    let ledger = state.ledger.clone();
    let results = blocking(move || ledger.results(&question_id)).await?;
    state.metrics.results_served.inc();
    Ok(Json(results.into()))
}

// ── Polls ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub active: bool,
}

impl From<Poll> for PollResponse {
    fn from(p: Poll) -> Self {
        Self {
            question_id: p.question_id,
            question: p.question,
            options: p.options,
            active: p.active,
        }
    }
}

pub async fn active_polls<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<PollResponse>>, RpcError> {
    let ledger = state.ledger.clone();
    let polls = blocking(move || ledger.active_polls()).await?;
    Ok(Json(polls.into_iter().map(Into::into).collect()))
}

pub async fn get_poll<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
) -> Result<Json<PollResponse>, RpcError> {
    let ledger = state.ledger.clone();
    let poll = blocking(move || ledger.get_poll(&question_id)).await?;
    Ok(Json(poll.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollResponse {
    pub success: bool,
    pub question_id: String,
}

pub async fn create_poll<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    body: Result<Json<PollDraft>, JsonRejection>,
) -> Result<Json<CreatePollResponse>, RpcError> {
    let draft = json_body(body)?;
    let ledger = state.ledger.clone();
    let poll = blocking(move || ledger.create_poll(&draft)).await?;
    Ok(Json(CreatePollResponse {
        success: true,
        question_id: poll.question_id,
    }))
}

pub async fn activate_poll<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
) -> Result<Json<PollResponse>, RpcError> {
    set_poll_active(state, question_id, true).await
}

pub async fn deactivate_poll<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
) -> Result<Json<PollResponse>, RpcError> {
    set_poll_active(state, question_id, false).await
}

async fn set_poll_active<S: LedgerStore + 'static>(
    state: AppState<S>,
    question_id: String,
    active: bool,
) -> Result<Json<PollResponse>, RpcError> {
    let ledger = state.ledger.clone();
    let poll = blocking(move || ledger.set_poll_active(&question_id, active)).await?;
    Ok(Json(poll.into()))
}

// ── Audit (admin) ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub entries: u64,
    pub head_hash: Option<String>,
}

pub async fn verify_audit<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<VerifyResponse>, RpcError> {
    let ledger = state.ledger.clone();
    let report = blocking(move || ledger.verify_chain()).await?;
    Ok(Json(VerifyResponse {
        valid: true,
        entries: report.entries,
        head_hash: report.head_hash.map(|h| h.to_hex()),
    }))
}

/// An audit entry as listed to operators; hashes in hex.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryView {
    pub sequence: u64,
    pub vote_reference: u64,
    pub payload: String,
    pub previous_hash: Option<String>,
    pub hash: String,
    pub created_at: u64,
}

impl From<AuditEntry> for AuditEntryView {
    fn from(e: AuditEntry) -> Self {
        Self {
            sequence: e.sequence,
            vote_reference: e.vote_reference.as_u64(),
            previous_hash: e.previous_hash.map(|h| h.to_hex()),
            hash: e.hash.to_hex(),
            created_at: e.created_at.as_millis(),
            payload: e.payload,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditPageResponse {
    pub entries: Vec<AuditEntryView>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

pub async fn audit_page<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<AuditPageResponse>, RpcError> {
    let params = query(params)?;
    let offset = params.decode_offset()?;
    let count = params.effective_count() as usize;
    let ledger = state.ledger.clone();
    let page = blocking(move || ledger.audit_page(offset, count)).await?;
    Ok(Json(AuditPageResponse {
        entries: page.entries.into_iter().map(Into::into).collect(),
        pagination: PaginationMeta {
            cursor: page.next_cursor.map(encode_cursor),
        },
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub votes: u64,
    pub audit_entries: u64,
    pub polls: u64,
    pub head_hash: Option<String>,
}

pub async fn summary<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<SummaryResponse>, RpcError> {
    let ledger = state.ledger.clone();
    let summary = blocking(move || ledger.summary()).await?;
    Ok(Json(SummaryResponse {
        votes: summary.votes,
        audit_entries: summary.audit_entries,
        polls: summary.polls,
        head_hash: summary.head_hash.map(|h| h.to_hex()),
    }))
}

pub async fn metrics<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, RpcError> {
    let text = state
        .metrics
        .encode()
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    ))
}
