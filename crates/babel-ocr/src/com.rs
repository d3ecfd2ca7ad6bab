use crate::engine::RecognitionError;

/// RAII guard for COM initialization on the current thread.
///
/// Calls `CoUninitialize` when dropped, including on early return.
pub struct ComGuard;

impl ComGuard {
    pub fn initialize() -> Result<Self, RecognitionError> {
        unsafe {
            windows::Win32::System::Com::CoInitializeEx(
                Some(std::ptr::null()),
                windows::Win32::System::Com::COINIT_MULTITHREADED,
            )
            .ok()
            .map_err(|e| RecognitionError::Engine(format!("Failed to initialize COM: {e}")))?;
        }
        Ok(ComGuard)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            windows::Win32::System::Com::CoUninitialize();
        }
    }
}
