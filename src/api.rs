use crate::actions::{ActionName, run_action};
use crate::backend::BotMessage;
use crate::intent::{CERTIFICATE_TYPE_SLOT, parse_inform};
use crate::preprocess::preprocess_user_input;
use crate::relay::{Outbox, RelayError, SelectionRelay};
use crate::server::AppState;
use crate::session::{
    SessionError, SessionHandle, expired_session_cookie, session_cookie,
    session_from_cookie_header,
};
use crate::surface::{HtmlSidebarSurface, ItemId, SidebarSurface, canonical_label};
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no session; call POST /api/session first")]
    MissingSession,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("chat backend failed: {0:#}")]
    Backend(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingSession | ApiError::Session(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}

/// What a relay call sent on the session's behalf and what came back.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    pub selected_certificate: Option<String>,
    pub sent: Vec<String>,
    pub replies: Vec<BotMessage>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.html().to_string())
}

pub async fn serve_sdk() -> impl IntoResponse {
    let mut resp = Response::new(crate::sdk::sdk_script());
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/javascript"),
    );
    resp
}

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize, Default)]
pub struct SessionIssueRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

pub async fn issue_session(
    State(state): State<AppState>,
    Json(body): Json<SessionIssueRequest>,
) -> Result<Response, ApiError> {
    let session = state.sessions.issue(body.user_id).await?;
    let registered = {
        let mut relay = session.relay.lock().await;
        relay.register_sidebar(state.page.surface());
        relay.registered_items().len()
    };
    Ok((
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            session_cookie(&session.info.session_id, state.config.session_ttl),
        )],
        Json(json!({
            "session_id": session.info.session_id,
            "user_id": session.info.user_id,
            "issued_at": session.info.issued_at,
            "sidebar_items": registered,
            "sidebar_selector": state.page.surface().selector(),
        })),
    )
        .into_response())
}

pub async fn end_session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = cookie_token(&headers) {
        state.sessions.end(&token).await;
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SidebarEntry {
    pub item: usize,
    pub label: String,
}

pub async fn get_sidebar(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<SidebarEntry>>, ApiError> {
    let session = require_session(&state, &headers).await?;
    let items = session.relay.lock().await.registered_items();
    let surface = state.page.surface();
    let entries = items
        .into_iter()
        .map(|item| SidebarEntry {
            item: item.0,
            label: surface
                .item_text(item)
                .map(|text| canonical_label(&text).to_string())
                .unwrap_or_default(),
        })
        .collect();
    Ok(Json(entries))
}

pub async fn get_relay_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let session = require_session(&state, &headers).await?;
    let selection = session.relay.lock().await.state().clone();
    Ok(Json(selection))
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub item: usize,
}

pub async fn post_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ClickRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    let item = ItemId(body.item);
    relay_call(&state, &headers, move |relay, surface| {
        let fired = relay.activate(surface, item)?;
        if fired == 0 {
            warn!(%item, "click on an item with no registered handler");
        }
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub name: String,
}

pub async fn post_select(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SelectRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_call(&state, &headers, move |relay, _| {
        relay.select_certificate(body.name)
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

pub async fn post_preset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MessageRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_call(&state, &headers, move |relay, _| {
        relay.send_preset(&body.message)
    })
    .await
}

/// Free text typed by the user. It runs under the session lock so it cannot
/// overtake a notification. A typed inform command goes through the relay and
/// becomes the selection.
pub async fn post_chat_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MessageRequest>,
) -> Result<Json<RelayResponse>, ApiError> {
    let text = body.message.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("message is empty".to_string()));
    }
    if let Some(name) = parse_inform(text) {
        let name = name.to_string();
        return relay_call(&state, &headers, move |relay, _| {
            relay.select_certificate(name)
        })
        .await;
    }
    let text = if state.config.normalize_input {
        preprocess_user_input(text)
    } else {
        text.to_string()
    };

    let session = require_session(&state, &headers).await?;
    let relay = session.relay.lock().await;
    let sent = vec![text];
    let replies = state
        .backend
        .forward(session.info.sender_id(), sent.clone())
        .await
        .map_err(ApiError::Backend)?;
    Ok(Json(RelayResponse {
        selected_certificate: relay.selected().map(str::to_string),
        sent,
        replies,
    }))
}

pub async fn list_actions() -> Json<Vec<Value>> {
    Json(
        ActionName::ALL
            .iter()
            .map(|action| json!({ "name": action.as_str() }))
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct ActionCall {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub tracker: TrackerSnapshot,
}

#[derive(Debug, Deserialize, Default)]
pub struct TrackerSnapshot {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub slots: Map<String, Value>,
}

pub async fn run_action_webhook(
    State(state): State<AppState>,
    Json(call): Json<ActionCall>,
) -> Response {
    let Some(action) = ActionName::from_name(&call.next_action) else {
        warn!(action = %call.next_action, "unknown action requested");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No registered action found for name '{}'.", call.next_action),
                "action_name": call.next_action,
            })),
        )
            .into_response();
    };

    let sender = call.sender_id.or(call.tracker.sender_id);
    let cert_type = call
        .tracker
        .slots
        .get(CERTIFICATE_TYPE_SLOT)
        .and_then(Value::as_str);
    info!(%action, sender = ?sender, certificate_type = ?cert_type, "running action");

    let outcome = run_action(action, &state.catalog, cert_type);
    let responses: Vec<Value> = outcome
        .responses
        .into_iter()
        .map(|text| json!({ "text": text }))
        .collect();
    Json(json!({
        "events": outcome.events,
        "responses": responses,
    }))
    .into_response()
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_from_cookie_header)
}

async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<SessionHandle, ApiError> {
    state
        .sessions
        .validate(cookie_token(headers))
        .await?
        .ok_or(ApiError::MissingSession)
}

/// Run `op` against the caller's relay, then forward whatever it queued to
/// the backend while the session lock is still held.
///
/// A backend failure surfaces as 502; the selection change made by `op`
/// stays in place.
async fn relay_call<F>(
    state: &AppState,
    headers: &HeaderMap,
    op: F,
) -> Result<Json<RelayResponse>, ApiError>
where
    F: FnOnce(&mut SelectionRelay<Outbox>, &HtmlSidebarSurface) -> Result<(), RelayError>,
{
    let session = require_session(state, headers).await?;
    let mut relay = session.relay.lock().await;
    let outcome = op(&mut *relay, state.page.surface());
    let sent = relay.transport_mut().drain();
    outcome?;

    let replies = state
        .backend
        .forward(session.info.sender_id(), sent.clone())
        .await
        .map_err(ApiError::Backend)?;
    Ok(Json(RelayResponse {
        selected_certificate: relay.selected().map(str::to_string),
        sent,
        replies,
    }))
}
