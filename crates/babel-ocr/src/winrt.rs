//! Windows.Media.Ocr backend. Models ship with the OS language packs, so the
//! cache directory is unused here.

use std::path::Path;

use async_trait::async_trait;
use babel_core::language::ocr_language;
use windows::{
    Globalization::Language,
    Graphics::Imaging::BitmapDecoder,
    Media::Ocr::OcrEngine as WinOcrEngine,
    Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    core::HSTRING,
};

use crate::com::ComGuard;
use crate::engine::{EngineFactory, RecognitionEngine, RecognitionError};

fn engine_fault(context: &str) -> impl Fn(windows::core::Error) -> RecognitionError + '_ {
    move |e| RecognitionError::Engine(format!("{context}: {e}"))
}

pub struct WindowsOcrFactory;

#[async_trait]
impl EngineFactory for WindowsOcrFactory {
    async fn create(
        &self,
        lang: &str,
        _cache_dir: &Path,
    ) -> Result<Box<dyn RecognitionEngine>, RecognitionError> {
        let language = ocr_language(lang)
            .ok_or_else(|| RecognitionError::UnsupportedLanguage(lang.to_string()))?;
        let tag = language.bcp47.to_string();

        let supported = {
            let tag = tag.clone();
            tokio::task::spawn_blocking(move || -> Result<bool, RecognitionError> {
                let _com = ComGuard::initialize()?;
                let language = Language::CreateLanguage(&HSTRING::from(tag.as_str()))
                    .map_err(engine_fault("Failed to create language"))?;
                WinOcrEngine::IsLanguageSupported(&language)
                    .map_err(engine_fault("Failed to query language support"))
            })
            .await
            .map_err(|e| RecognitionError::Engine(e.to_string()))??
        };

        if !supported {
            return Err(RecognitionError::ModelUnavailable {
                lang: lang.to_string(),
                reason: format!("Windows OCR language pack for {tag} is not installed"),
            });
        }

        Ok(Box::new(WindowsOcrWorker { tag }))
    }

    fn name(&self) -> &'static str {
        "windows"
    }
}

pub struct WindowsOcrWorker {
    tag: String,
}

#[async_trait]
impl RecognitionEngine for WindowsOcrWorker {
    async fn recognize(&mut self, image: &[u8]) -> Result<String, RecognitionError> {
        image::guess_format(image).map_err(|e| RecognitionError::MalformedImage(e.to_string()))?;

        let tag = self.tag.clone();
        let bytes = image.to_vec();
        tokio::task::spawn_blocking(move || recognize_blocking(&tag, &bytes))
            .await
            .map_err(|e| RecognitionError::Engine(e.to_string()))?
    }

    async fn terminate(self: Box<Self>) -> Result<(), RecognitionError> {
        Ok(())
    }
}

fn recognize_blocking(tag: &str, image: &[u8]) -> Result<String, RecognitionError> {
    let _com = ComGuard::initialize()?;

    let language = Language::CreateLanguage(&HSTRING::from(tag))
        .map_err(engine_fault("Failed to create language"))?;
    let engine = WinOcrEngine::TryCreateFromLanguage(&language)
        .map_err(engine_fault("Failed to create OCR engine for language"))?;

    let stream = InMemoryRandomAccessStream::new().map_err(engine_fault("Failed to create stream"))?;
    let writer =
        DataWriter::CreateDataWriter(&stream).map_err(engine_fault("Failed to create writer"))?;
    writer
        .WriteBytes(image)
        .map_err(engine_fault("Failed to write image bytes"))?;
    writer
        .StoreAsync()
        .and_then(|op| op.get())
        .map_err(engine_fault("Failed to store data"))?;
    writer
        .FlushAsync()
        .and_then(|op| op.get())
        .map_err(engine_fault("Failed to flush"))?;
    stream.Seek(0).map_err(engine_fault("Failed to seek"))?;

    let decoder = BitmapDecoder::CreateAsync(&stream)
        .and_then(|op| op.get())
        .map_err(|e| RecognitionError::MalformedImage(e.to_string()))?;
    let bitmap = decoder
        .GetSoftwareBitmapAsync()
        .and_then(|op| op.get())
        .map_err(|e| RecognitionError::MalformedImage(e.to_string()))?;

    let result = engine
        .RecognizeAsync(&bitmap)
        .and_then(|op| op.get())
        .map_err(engine_fault("Failed to recognize"))?;

    Ok(result
        .Text()
        .map_err(engine_fault("Failed to get text"))?
        .to_string())
}
