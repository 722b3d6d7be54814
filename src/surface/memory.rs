//! In-memory surface.
//!
//! Records every call, mints fresh handles and tracks which stylesheets are
//! live in the "current document". Navigation and reload discard the live
//! set, the way a real viewer drops inserted CSS on a new document.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{SurfaceError, SurfaceOperation, SurfaceResult};

use super::{InjectionHandle, Surface, SurfaceEvent};

const EVENT_CAPACITY: usize = 64;

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    /// A stylesheet was inserted.
    InsertCss {
        /// The inserted CSS.
        css: String,
        /// The handle minted for it.
        handle: InjectionHandle,
    },
    /// An insertion was removed.
    RemoveInsertedCss {
        /// The handle passed in.
        handle: InjectionHandle,
    },
    /// A script was executed.
    ExecuteJavaScript {
        /// The script text.
        js: String,
    },
    /// The document was reloaded.
    Reload,
}

impl SurfaceCall {
    /// The operation this call performed.
    #[must_use]
    pub const fn operation(&self) -> SurfaceOperation {
        match self {
            Self::InsertCss { .. } => SurfaceOperation::InsertCss,
            Self::RemoveInsertedCss { .. } => SurfaceOperation::RemoveInsertedCss,
            Self::ExecuteJavaScript { .. } => SurfaceOperation::ExecuteJavaScript,
            Self::Reload => SurfaceOperation::Reload,
        }
    }
}

#[derive(Debug)]
struct MemoryState {
    url: String,
    calls: Vec<SurfaceCall>,
    // Handle -> CSS of insertions live in the current document.
    live: BTreeMap<String, String>,
    scripts_run: Vec<String>,
    fail_next: HashSet<SurfaceOperation>,
    events: Option<broadcast::Sender<SurfaceEvent>>,
}

/// Recording surface backed by memory.
#[derive(Debug)]
pub struct InMemorySurface {
    state: Mutex<MemoryState>,
}

impl Default for InMemorySurface {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl InMemorySurface {
    /// Create a surface showing `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryState {
                url: url.into(),
                calls: Vec::new(),
                live: BTreeMap::new(),
                scripts_run: Vec::new(),
                fail_next: HashSet::new(),
                events: Some(tx),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All calls made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.lock().calls.clone()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Number of recorded calls of one kind.
    #[must_use]
    pub fn count(&self, operation: SurfaceOperation) -> usize {
        self.lock().calls.iter().filter(|c| c.operation() == operation).count()
    }

    /// CSS of insertions live in the current document.
    #[must_use]
    pub fn live_stylesheets(&self) -> Vec<String> {
        self.lock().live.values().cloned().collect()
    }

    /// Scripts executed since the current document loaded.
    #[must_use]
    pub fn scripts_run(&self) -> Vec<String> {
        self.lock().scripts_run.clone()
    }

    /// The current document URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// Make the next call of `operation` fail.
    pub fn fail_next(&self, operation: SurfaceOperation) {
        self.lock().fail_next.insert(operation);
    }

    /// Load `url` as a new document and emit `DidNavigate`.
    pub fn navigate(&self, url: impl Into<String>) {
        let mut state = self.lock();
        state.url = url.into();
        Self::load_document(&mut state);
    }

    /// Tear the surface down: the event stream closes and further calls fail.
    pub fn close(&self) {
        let mut state = self.lock();
        state.events = None;
        state.live.clear();
    }

    /// True once `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().events.is_none()
    }

    fn load_document(state: &mut MemoryState) {
        state.live.clear();
        state.scripts_run.clear();
        if let Some(tx) = &state.events {
            // No receivers is fine.
            let _ = tx.send(SurfaceEvent::DidNavigate {
                url: state.url.clone(),
                at: Utc::now(),
            });
        }
    }

    fn begin(state: &mut MemoryState, operation: SurfaceOperation) -> SurfaceResult<()> {
        if state.events.is_none() {
            return Err(SurfaceError::Detached);
        }
        if state.fail_next.remove(&operation) {
            return Err(SurfaceError::rejected(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Surface for InMemorySurface {
    async fn insert_css(&self, css: &str) -> SurfaceResult<InjectionHandle> {
        let mut state = self.lock();
        Self::begin(&mut state, SurfaceOperation::InsertCss)?;
        let handle = InjectionHandle::new(Uuid::new_v4().to_string());
        state.live.insert(handle.as_str().to_string(), css.to_string());
        state.calls.push(SurfaceCall::InsertCss {
            css: css.to_string(),
            handle: handle.clone(),
        });
        Ok(handle)
    }

    async fn remove_inserted_css(&self, handle: &InjectionHandle) -> SurfaceResult<()> {
        let mut state = self.lock();
        Self::begin(&mut state, SurfaceOperation::RemoveInsertedCss)?;
        // Unknown handles (e.g. from a previous document) are ignored.
        state.live.remove(handle.as_str());
        state.calls.push(SurfaceCall::RemoveInsertedCss { handle: handle.clone() });
        Ok(())
    }

    async fn execute_javascript(&self, js: &str) -> SurfaceResult<()> {
        let mut state = self.lock();
        Self::begin(&mut state, SurfaceOperation::ExecuteJavaScript)?;
        state.scripts_run.push(js.to_string());
        state.calls.push(SurfaceCall::ExecuteJavaScript { js: js.to_string() });
        Ok(())
    }

    async fn reload(&self) -> SurfaceResult<()> {
        let mut state = self.lock();
        Self::begin(&mut state, SurfaceOperation::Reload)?;
        state.calls.push(SurfaceCall::Reload);
        Self::load_document(&mut state);
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent> {
        match &self.lock().events {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_remove_track_live_set() {
        let surface = InMemorySurface::default();
        let a = surface.insert_css("A").await.unwrap();
        let b = surface.insert_css("B").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(surface.live_stylesheets().len(), 2);

        surface.remove_inserted_css(&a).await.unwrap();
        assert_eq!(surface.live_stylesheets(), vec!["B".to_string()]);
        assert_eq!(surface.count(SurfaceOperation::InsertCss), 2);
        assert_eq!(surface.count(SurfaceOperation::RemoveInsertedCss), 1);
    }

    #[tokio::test]
    async fn test_navigation_drops_document_state_and_emits_event() {
        let surface = InMemorySurface::new("https://example.test/");
        let mut events = surface.subscribe_events();
        surface.insert_css("A").await.unwrap();
        surface.execute_javascript("run()").await.unwrap();

        surface.navigate("https://example.test/next");
        assert!(surface.live_stylesheets().is_empty());
        assert!(surface.scripts_run().is_empty());

        let SurfaceEvent::DidNavigate { url, .. } = events.recv().await.unwrap();
        assert_eq!(url, "https://example.test/next");
    }

    #[tokio::test]
    async fn test_reload_emits_navigation() {
        let surface = InMemorySurface::new("https://example.test/");
        let mut events = surface.subscribe_events();
        surface.reload().await.unwrap();
        let SurfaceEvent::DidNavigate { url, .. } = events.recv().await.unwrap();
        assert_eq!(url, "https://example.test/");
        assert_eq!(surface.calls(), vec![SurfaceCall::Reload]);
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let surface = InMemorySurface::default();
        surface.fail_next(SurfaceOperation::InsertCss);
        let err = surface.insert_css("A").await.unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::Rejected { operation: SurfaceOperation::InsertCss, .. }
        ));
        assert!(surface.calls().is_empty());
        assert!(surface.insert_css("A").await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_surface_rejects_calls_and_closes_stream() {
        let surface = InMemorySurface::default();
        let mut events = surface.subscribe_events();
        surface.close();
        assert!(surface.is_closed());
        assert!(matches!(surface.reload().await, Err(SurfaceError::Detached)));
        assert!(matches!(
            events.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
        let mut late = surface.subscribe_events();
        assert!(matches!(late.recv().await, Err(broadcast::error::RecvError::Closed)));
    }
}
