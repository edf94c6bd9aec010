#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use nahw_api::config::ServerConfig;
use nahw_api::router::build_app_router;
use nahw_api::state::AppState;
use nahw_core::types::DbId;
use nahw_db::models::correction::{CorrectionRecord, CreateCorrection};
use nahw_db::store::{CorrectionStore, StorageError};
use nahw_engine::device::DeviceKind;
use nahw_engine::error::CorrectionError;
use nahw_engine::{Corrector, EngineSlot};

pub const ARABIC_INPUT: &str = "كيف حالكي اليوم ؟";
pub const ARABIC_CORRECTED: &str = "كيف حالك اليوم؟";

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    last_id: DbId,
    records: Vec<CorrectionRecord>,
}

/// [`CorrectionStore`] kept in a `Vec`, with call counters and a switch
/// that makes every write fail.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_writes: AtomicBool,
    creates: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_writes() -> Arc<Self> {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    /// Number of `create` calls, successful or not.
    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }
}

#[async_trait]
impl CorrectionStore for MemoryStore {
    async fn create(&self, input: &CreateCorrection) -> Result<CorrectionRecord, StorageError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("store offline".to_string()));
        }

        let mut inner = self.inner.lock().unwrap();
        inner.last_id += 1;
        let now = chrono::Utc::now();
        let created_at = match inner.records.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let record = CorrectionRecord {
            id: inner.last_id,
            original_text: input.original_text.clone(),
            corrected_text: input.corrected_text.clone(),
            created_at,
        };
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<CorrectionRecord>, StorageError> {
        let mut records = self.inner.lock().unwrap().records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<CorrectionRecord>, StorageError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.records.iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: DbId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        if inner.records.len() == before {
            Err(StorageError::NotFound { id })
        } else {
            Ok(())
        }
    }

    async fn is_healthy(&self) -> bool {
        !self.fail_writes.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Scripted corrector
// ---------------------------------------------------------------------------

type Script = Box<dyn Fn(&str) -> Result<String, CorrectionError> + Send + Sync>;

/// [`Corrector`] whose output is a function of its input, with a call counter.
pub struct ScriptedCorrector {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedCorrector {
    pub fn new(script: impl Fn(&str) -> Result<String, CorrectionError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    /// Maps the Arabic fixture to its correction and echoes anything else.
    pub fn arabic() -> Arc<Self> {
        Self::new(|text| {
            if text == ARABIC_INPUT {
                Ok(ARABIC_CORRECTED.to_string())
            } else {
                Ok(text.to_string())
            }
        })
    }

    /// Fails every call as if both devices ran out of memory.
    pub fn exhausted() -> Arc<Self> {
        Self::new(|_| {
            Err(CorrectionError::ResourceExhausted {
                device: DeviceKind::Cpu,
                message: "out of memory".to_string(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Corrector for ScriptedCorrector {
    fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(text)
    }

    fn device(&self) -> DeviceKind {
        DeviceKind::Cuda
    }

    fn model_name(&self) -> &str {
        "scripted-gec"
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8000".to_string()],
        max_text_length: 5000,
        debug: false,
    }
}

pub fn test_state(store: Arc<MemoryStore>, engine: EngineSlot) -> AppState {
    AppState::new(store, engine, test_config()).unwrap()
}

/// Full router over `store` with `corrector` already loaded.
pub fn build_test_app(store: Arc<MemoryStore>, corrector: Arc<ScriptedCorrector>) -> Router {
    build_app_router(test_state(store, EngineSlot::loaded(corrector)), &test_config())
}

/// Full router whose model has not finished loading.
pub fn build_loading_app(store: Arc<MemoryStore>) -> Router {
    build_app_router(test_state(store, EngineSlot::empty()), &test_config())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a single urlencoded `text` field.
pub async fn post_form_text(app: Router, uri: &str, text: &str) -> Response {
    let body = format!("text={}", form_encode(text));
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Percent-encode every byte outside the unreserved set.
fn form_encode(text: &str) -> String {
    text.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
