use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use babel_config::Config;
use babel_core::{CjkWhitespaceNormalizer, TextNormalizer};
use babel_ocr::{EngineFactory, RecognitionLifecycle, ScreenSource, XcapScreen, factory_from_config};
use babel_store::Store;
use babel_translator::{DeepLTranslator, Translator};
use tokio::sync::RwLock;

use crate::flight::ShotQueue;
use crate::overlay::OverlayState;
use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub screen: Arc<dyn ScreenSource>,
    pub ocr: RecognitionLifecycle,
    pub normalizer: Box<dyn TextNormalizer + Send + Sync>,
    pub translator: Arc<dyn Translator>,
    pub store: Store,
    pub shots: ShotQueue,
    pub status: AppStatus,
    overlay: Mutex<OverlayState>,
}

impl AppState {
    /// Wire up the real screen, OCR backend, DeepL and the database.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let screen = Arc::new(XcapScreen::new(config.overlay.work_area));
        let factory = factory_from_config(&config.ocr);
        let translator = Arc::new(DeepLTranslator::from_config(&config.translator));
        if translator.metadata().requires_api_key && config.translator.api_key.is_empty() {
            tracing::warn!("DEEPL_API_KEY not set, translations will fail");
        }
        let store = Store::open(&config.database).context("Failed to open database")?;

        Ok(Self::from_parts(config, screen, factory, translator, store))
    }

    pub fn from_parts(
        config: Config,
        screen: Arc<dyn ScreenSource>,
        factory: Arc<dyn EngineFactory>,
        translator: Arc<dyn Translator>,
        store: Store,
    ) -> Self {
        let ocr = RecognitionLifecycle::new(factory, config.ocr.resolved_cache_dir());
        tracing::info!(
            "OCR engine: {}, model cache: {:?}",
            ocr.engine_name(),
            ocr.cache_dir()
        );
        let provider = translator.metadata();
        tracing::info!(
            "Translator: {} (free tier: {})",
            provider.name,
            provider.free_tier_available
        );

        Self {
            config: Arc::new(RwLock::new(config)),
            screen,
            ocr,
            normalizer: Box::new(CjkWhitespaceNormalizer),
            translator,
            store,
            shots: ShotQueue::new(),
            status: AppStatus::new(),
            overlay: Mutex::new(OverlayState::new()),
        }
    }

    /// Overlay state; never hold the guard across an await.
    pub fn overlay(&self) -> MutexGuard<'_, OverlayState> {
        self.overlay.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
