use babel_types::OverlaySession;

use crate::language::{ocr_language, target_language};

/// The overlay currently open, if any.
///
/// Set in one step before the overlay window is shown and cleared when it closes.
/// Take-shot handlers read a clone so a close does not disturb a capture in flight.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<OverlaySession>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced session when an overlay was already open.
    pub fn open(&mut self, session: OverlaySession) -> Option<OverlaySession> {
        self.current.replace(session)
    }

    pub fn close(&mut self) -> Option<OverlaySession> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&OverlaySession> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Human readable summary for `get-info`.
    pub fn summary(&self) -> String {
        let Some(session) = &self.current else {
            return "No overlay open".to_string();
        };

        let source = session
            .source_language
            .clone()
            .or_else(|| ocr_language(&session.source_tag_ocr).map(|l| l.name.to_string()))
            .unwrap_or_else(|| session.source_tag_ocr.clone());
        let target = session
            .target_language
            .clone()
            .or_else(|| target_language(&session.target_tag_translate).map(|l| l.name.to_string()))
            .unwrap_or_else(|| session.target_tag_translate.clone());

        format!(
            "Current folder id: {}\nCurrent source: {} ({} / {})\nCurrent target: {} ({})",
            session.folder_id,
            source,
            session.source_tag_ocr,
            session.source_tag_translate,
            target,
            session.target_tag_translate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(folder_id: i64) -> OverlaySession {
        OverlaySession {
            source_tag_ocr: "jpn".into(),
            source_tag_translate: "JA".into(),
            target_tag_translate: "EN-US".into(),
            folder_id,
            source_language: None,
            target_language: None,
        }
    }

    #[test]
    fn open_close_lifecycle() {
        let mut ctx = SessionContext::new();
        assert!(!ctx.is_open());
        assert!(ctx.open(session(1)).is_none());
        assert_eq!(ctx.current().map(|s| s.folder_id), Some(1));

        let replaced = ctx.open(session(2));
        assert_eq!(replaced.map(|s| s.folder_id), Some(1));

        assert_eq!(ctx.close().map(|s| s.folder_id), Some(2));
        assert!(ctx.close().is_none());
    }

    #[test]
    fn summary_uses_table_names() {
        let mut ctx = SessionContext::new();
        assert_eq!(ctx.summary(), "No overlay open");

        ctx.open(session(5));
        let summary = ctx.summary();
        assert!(summary.contains("Current folder id: 5"));
        assert!(summary.contains("Japanese (jpn / JA)"));
        assert!(summary.contains("English (American) (EN-US)"));
    }
}
