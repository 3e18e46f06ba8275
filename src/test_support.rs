use crate::model::request::CompletionBody;
use crate::model::{RawResponse, Transport, TransportFailure};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Duration;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Fenced code block with an info string, as a model would emit it.
pub(crate) fn fence(info: &str, body: &str) -> String {
    format!("```{}\n{}\n```\n", info, body)
}

/// Transport that replays a fixed script of results and counts calls.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Rc<RefCell<VecDeque<Result<RawResponse, TransportFailure>>>>,
    calls: Rc<Cell<u32>>,
    bodies: Rc<RefCell<Vec<CompletionBody>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<RawResponse, TransportFailure>>) -> Self {
        Self {
            script: Rc::new(RefCell::new(script.into())),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub(crate) fn bodies(&self) -> Vec<CompletionBody> {
        self.bodies.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        body: &CompletionBody,
        _timeout: Duration,
    ) -> Result<RawResponse, TransportFailure> {
        self.calls.set(self.calls.get() + 1);
        self.bodies.borrow_mut().push(body.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportFailure::Connection("script exhausted".to_string())))
    }
}

/// HTTP 200 response whose first candidate carries `text`.
pub(crate) fn ok_text(text: &str) -> Result<RawResponse, TransportFailure> {
    Ok(RawResponse {
        status: 200,
        body: serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
        })
        .to_string(),
    })
}

/// Structured API error payload.
pub(crate) fn api_error(status: u16, message: &str) -> Result<RawResponse, TransportFailure> {
    Ok(RawResponse {
        status,
        body: serde_json::json!({"error": {"code": status, "message": message}}).to_string(),
    })
}

pub(crate) fn connection_error(message: &str) -> Result<RawResponse, TransportFailure> {
    Err(TransportFailure::Connection(message.to_string()))
}
