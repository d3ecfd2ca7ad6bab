use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as FlightLock;

use crate::engine::{EngineFactory, RecognitionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Created { lang: String },
    Recognizing { lang: String },
    Terminated,
}

/// Owns the single OCR worker slot.
///
/// Every recognition creates a fresh engine, runs it once and terminates it,
/// on success and failure alike. Concurrent callers queue on the flight lock so
/// a second capture never replaces a worker that is still recognizing.
pub struct RecognitionLifecycle {
    factory: Arc<dyn EngineFactory>,
    cache_dir: PathBuf,
    flight: FlightLock<()>,
    state: Arc<Mutex<WorkerState>>,
}

impl RecognitionLifecycle {
    pub fn new(factory: Arc<dyn EngineFactory>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            factory,
            cache_dir: cache_dir.into(),
            flight: FlightLock::new(()),
            state: Arc::new(Mutex::new(WorkerState::Idle)),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn engine_name(&self) -> &'static str {
        self.factory.name()
    }

    pub fn state(&self) -> WorkerState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, next: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Create a worker for `lang`, recognize `image` once, terminate the worker.
    pub async fn recognize_once(
        &self,
        lang: &str,
        image: &[u8],
    ) -> Result<String, RecognitionError> {
        let _flight = self.flight.lock().await;
        // Back to Idle however this future ends, including cancellation.
        let _idle = IdleOnDrop(self.state.clone());

        let mut engine = self.factory.create(lang, &self.cache_dir).await?;
        self.set_state(WorkerState::Created {
            lang: lang.to_string(),
        });
        tracing::debug!(lang, engine = self.factory.name(), "OCR worker created");

        self.set_state(WorkerState::Recognizing {
            lang: lang.to_string(),
        });
        let result = engine.recognize(image).await;

        if let Err(e) = engine.terminate().await {
            tracing::warn!("OCR worker teardown failed: {e}");
        }
        self.set_state(WorkerState::Terminated);
        tracing::debug!(lang, ok = result.is_ok(), "OCR worker terminated");

        result
    }

    /// Wait for any in-flight recognition to finish.
    ///
    /// Returns whether a worker was live when called; with nothing in flight this
    /// is a no-op.
    pub async fn release(&self) -> bool {
        let was_live = self.state() != WorkerState::Idle;
        let _flight = self.flight.lock().await;
        self.set_state(WorkerState::Idle);
        if was_live {
            tracing::info!("released live OCR worker");
        }
        was_live
    }
}

struct IdleOnDrop(Arc<Mutex<WorkerState>>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = WorkerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::engine::RecognitionEngine;

    #[derive(Default)]
    struct Journal {
        entries: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.entries.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    struct FakeFactory {
        journal: Arc<Journal>,
        delay: Duration,
    }

    struct FakeEngine {
        lang: String,
        journal: Arc<Journal>,
        delay: Duration,
    }

    #[async_trait]
    impl EngineFactory for FakeFactory {
        async fn create(
            &self,
            lang: &str,
            _cache_dir: &Path,
        ) -> Result<Box<dyn RecognitionEngine>, RecognitionError> {
            if lang == "xxx" {
                return Err(RecognitionError::UnsupportedLanguage(lang.into()));
            }
            let now = self.journal.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.journal.max_active.fetch_max(now, Ordering::SeqCst);
            self.journal.push(format!("create:{lang}"));
            Ok(Box::new(FakeEngine {
                lang: lang.to_string(),
                journal: self.journal.clone(),
                delay: self.delay,
            }))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[async_trait]
    impl RecognitionEngine for FakeEngine {
        async fn recognize(&mut self, image: &[u8]) -> Result<String, RecognitionError> {
            self.journal.push(format!("recognize:{}", self.lang));
            tokio::time::sleep(self.delay).await;
            if image.is_empty() {
                return Err(RecognitionError::MalformedImage("empty".into()));
            }
            Ok(String::from_utf8_lossy(image).into_owned())
        }

        async fn terminate(self: Box<Self>) -> Result<(), RecognitionError> {
            self.journal.active.fetch_sub(1, Ordering::SeqCst);
            self.journal.push(format!("terminate:{}", self.lang));
            Ok(())
        }
    }

    fn lifecycle(delay: Duration) -> (RecognitionLifecycle, Arc<Journal>) {
        let journal = Arc::new(Journal::default());
        let factory = FakeFactory {
            journal: journal.clone(),
            delay,
        };
        (
            RecognitionLifecycle::new(Arc::new(factory), "/tmp/babel-models"),
            journal,
        )
    }

    #[tokio::test]
    async fn creates_recognizes_and_terminates() {
        let (lifecycle, journal) = lifecycle(Duration::ZERO);
        let text = lifecycle.recognize_once("jpn", "テキスト".as_bytes()).await.unwrap();

        assert_eq!(text, "テキスト");
        assert_eq!(
            journal.entries(),
            vec!["create:jpn", "recognize:jpn", "terminate:jpn"]
        );
        assert_eq!(lifecycle.state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn terminates_after_failed_recognition() {
        let (lifecycle, journal) = lifecycle(Duration::ZERO);
        let result = lifecycle.recognize_once("eng", b"").await;

        assert!(matches!(result, Err(RecognitionError::MalformedImage(_))));
        assert_eq!(
            journal.entries(),
            vec!["create:eng", "recognize:eng", "terminate:eng"]
        );
        assert_eq!(journal.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_creation_leaves_slot_idle() {
        let (lifecycle, journal) = lifecycle(Duration::ZERO);
        let result = lifecycle.recognize_once("xxx", b"data").await;

        assert!(matches!(result, Err(RecognitionError::UnsupportedLanguage(_))));
        assert!(journal.entries().is_empty());
        assert_eq!(lifecycle.state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn overlapping_requests_never_share_the_slot() {
        let (lifecycle, journal) = lifecycle(Duration::from_millis(30));
        let lifecycle = Arc::new(lifecycle);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let lifecycle = lifecycle.clone();
                tokio::spawn(async move {
                    lifecycle
                        .recognize_once("jpn", format!("shot{i}").as_bytes())
                        .await
                })
            })
            .collect();

        for handle in handles {
            timeout(Duration::from_secs(2), handle)
                .await
                .unwrap()
                .unwrap()
                .unwrap();
        }

        assert_eq!(journal.max_active.load(Ordering::SeqCst), 1);
        // Each create is immediately followed by its own recognize and terminate
        for chunk in journal.entries().chunks(3) {
            assert!(chunk[0].starts_with("create"));
            assert!(chunk[1].starts_with("recognize"));
            assert!(chunk[2].starts_with("terminate"));
        }
    }

    #[tokio::test]
    async fn release_without_live_worker_is_noop() {
        let (lifecycle, journal) = lifecycle(Duration::ZERO);
        assert!(!lifecycle.release().await);
        assert!(journal.entries().is_empty());
        assert_eq!(lifecycle.state(), WorkerState::Idle);
    }

    #[tokio::test]
    async fn release_waits_for_in_flight_recognition() {
        let (lifecycle, journal) = lifecycle(Duration::from_millis(50));
        let lifecycle = Arc::new(lifecycle);

        let worker = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.recognize_once("jpn", b"late").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(lifecycle.release().await);
        assert!(journal.entries().contains(&"terminate:jpn".to_string()));
        worker.await.unwrap().unwrap();
    }
}
