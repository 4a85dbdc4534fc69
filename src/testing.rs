//! Test doubles shared by unit and flow tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use image::Rgba;
use parking_lot::Mutex;
use serde_json::Value;

use crate::model::{PendingSelection, SelectionRecord, SelectionSet, WorldPixel};
use crate::naming::Prompt;
use crate::overlay::MarkerSink;
use crate::persistence::{Method, Request, Response, Transport, TransportError};
use crate::viewport::ScreenRect;

/// Marker sink that records what the projector asked for.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub created: usize,
    pub destroyed: usize,
    next: u64,
    placements: HashMap<u64, Option<ScreenRect>>,
}

impl RecordingSink {
    /// Markers created and not yet destroyed.
    pub fn live(&self) -> usize {
        self.created - self.destroyed
    }

    /// Last rect shown for a marker, `None` if hidden or unknown.
    pub fn shown(&self, handle: u64) -> Option<ScreenRect> {
        self.placements.get(&handle).copied().flatten()
    }
}

impl MarkerSink for RecordingSink {
    type Handle = u64;

    fn create(&mut self, _pixel: WorldPixel) -> u64 {
        self.created += 1;
        self.next += 1;
        self.placements.insert(self.next, None);
        self.next
    }

    fn show(&mut self, handle: &u64, rect: ScreenRect) {
        self.placements.insert(*handle, Some(rect));
    }

    fn hide(&mut self, handle: &u64) {
        self.placements.insert(*handle, None);
    }

    fn destroy(&mut self, handle: u64) {
        self.destroyed += 1;
        self.placements.remove(&handle);
    }
}

#[derive(Debug, Default)]
struct BackendState {
    next_id: u64,
    selections: Vec<Value>,
    requests: Vec<Request>,
    offline: bool,
    fail_status: Option<u16>,
}

/// In-memory selection backend speaking the `/selections` protocol.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    pub fn stored(&self) -> usize {
        self.state.lock().selections.len()
    }

    /// Refuse connections until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Answer every request with this status until cleared.
    pub fn fail_with(&self, status: Option<u16>) {
        self.state.lock().fail_status = status;
    }

    fn handle(state: &mut BackendState, request: &Request) -> Response {
        match request.method {
            Method::Post => {
                let Ok(Value::Object(mut body)) = request
                    .body
                    .as_deref()
                    .map(serde_json::from_str::<Value>)
                    .unwrap_or(Ok(Value::Null))
                else {
                    return Response::new(400, "Invalid JSON\n");
                };
                state.next_id += 1;
                let id = format!("selection_{}", state.next_id);
                body.insert("id".into(), Value::String(id.clone()));
                state.selections.push(Value::Object(body));
                Response::new(200, serde_json::json!({ "id": id }).to_string())
            }
            Method::Get => match request.query_param("id") {
                Some(id) => match Self::find(state, id) {
                    Some(index) => Response::new(200, state.selections[index].to_string()),
                    None => Response::new(404, "Selection not found\n"),
                },
                None => Response::new(200, Value::Array(state.selections.clone()).to_string()),
            },
            Method::Delete => {
                if request.query_param("action") == Some("clear") {
                    state.selections.clear();
                    return Response::new(
                        200,
                        serde_json::json!({ "message": "All selections deleted" }).to_string(),
                    );
                }
                let Some(id) = request.query_param("id") else {
                    return Response::new(400, "ID is required\n");
                };
                match Self::find(state, id) {
                    Some(index) => {
                        state.selections.remove(index);
                        Response::new(
                            200,
                            serde_json::json!({ "message": "Selection deleted", "id": id })
                                .to_string(),
                        )
                    }
                    None => Response::new(404, "Selection not found\n"),
                }
            }
        }
    }

    fn find(state: &BackendState, id: &str) -> Option<usize> {
        state
            .selections
            .iter()
            .position(|s| s.get("id").and_then(Value::as_str) == Some(id))
    }
}

#[async_trait]
impl Transport for MemoryBackend {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        if state.offline {
            return Err(TransportError("connection refused".into()));
        }
        if let Some(status) = state.fail_status {
            return Ok(Response::new(status, "Internal error\n"));
        }
        Ok(Self::handle(&mut state, &request))
    }
}

/// Prompt that replays scripted answers and records what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    pub asked: Vec<(String, String)>,
    pub alerts: Vec<String>,
    /// Answer given to every confirmation
    pub confirm_answer: bool,
    pub confirmations: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            ..Self::default()
        }
    }

    /// Answer every confirmation with `answer`.
    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirm_answer = answer;
        self
    }
}

impl Prompt for ScriptedPrompt {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        self.asked.push((message.to_string(), default.to_string()));
        // Running out of answers behaves like pressing cancel
        self.answers.pop_front().flatten()
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.confirm_answer
    }
}

/// Build a named record over the given pixels, all sampled red.
pub fn record(name: &str, pixels: &[(i32, i32)]) -> SelectionRecord {
    let mut set = SelectionSet::new();
    for &p in pixels {
        set.insert(p.into());
    }
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    PendingSelection::capture(&set, timestamp, |_| Rgba([255, 0, 0, 255]))
        .unwrap()
        .into_record(name.to_string(), String::new())
}
