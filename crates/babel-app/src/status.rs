use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Take-shot status information
#[derive(Clone, Debug, Default)]
pub struct PipelineStatus {
    pub capturing: bool,
    pub last_capture_time: Option<SystemTime>,
    pub capture_count: u64,
    pub error_count: u64,
    pub current_message: String,
}

impl PipelineStatus {
    pub fn summary(&self) -> String {
        let message = if self.current_message.is_empty() {
            "Idle"
        } else {
            &self.current_message
        };
        format!(
            "Shots: {} (errors: {})\nLast status: {}",
            self.capture_count, self.error_count, message
        )
    }
}

/// Application status
pub struct AppStatus {
    pub pipeline: Arc<RwLock<PipelineStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            pipeline: Arc::new(RwLock::new(PipelineStatus::default())),
        }
    }

    pub async fn begin_capture(&self) {
        let mut status = self.pipeline.write().await;
        status.capturing = true;
        status.current_message = "Capturing".to_string();
    }

    pub async fn finish_capture(&self, message: impl Into<String>, failed: bool) {
        let mut status = self.pipeline.write().await;
        status.capturing = false;
        status.last_capture_time = Some(SystemTime::now());
        status.capture_count += 1;
        if failed {
            status.error_count += 1;
        }
        status.current_message = message.into();
    }

    pub async fn snapshot(&self) -> PipelineStatus {
        self.pipeline.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
