use async_trait::async_trait;

use crate::error::ClipboardError;

/// Where copied image URLs go
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Asynchronous clipboard API
    ///
    /// Returns [`ClipboardError::Unavailable`] when the environment has none, in which
    /// case [`copy_text`] falls back to [`Clipboard::copy_via_selection`].
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Synchronous fallback: select `text` in an offscreen element and copy the selection
    fn copy_via_selection(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Writes `text` through the clipboard API, falling back to a selection copy
///
/// # Errors
///
/// Whatever the API reports when it exists, or the fallback's error otherwise
pub async fn copy_text(clipboard: &dyn Clipboard, text: &str) -> Result<(), ClipboardError> {
    match clipboard.write_text(text).await {
        Err(ClipboardError::Unavailable) => {
            tracing::debug!("Clipboard API unavailable, copying via selection");
            clipboard.copy_via_selection(text)
        }
        result => result,
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Records every copy and where it went
    #[derive(Default)]
    pub struct RecordingClipboard {
        api_available: bool,
        fail_with: Option<String>,
        copies: Mutex<Vec<(CopyPath, String)>>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CopyPath {
        Api,
        Selection,
    }

    impl RecordingClipboard {
        #[must_use]
        pub fn new() -> Self {
            Self {
                api_available: true,
                ..Self::default()
            }
        }

        /// A clipboard without the asynchronous API
        #[must_use]
        pub fn without_api() -> Self {
            Self::default()
        }

        /// A clipboard whose API rejects every write
        #[must_use]
        pub fn denied(message: &str) -> Self {
            Self {
                api_available: true,
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn copies(&self) -> Vec<(CopyPath, String)> {
            self.copies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if !self.api_available {
                return Err(ClipboardError::Unavailable);
            }
            if let Some(message) = &self.fail_with {
                return Err(ClipboardError::Failed(message.clone()));
            }
            self.copies
                .lock()
                .unwrap()
                .push((CopyPath::Api, text.to_string()));
            Ok(())
        }

        fn copy_via_selection(&self, text: &str) -> Result<(), ClipboardError> {
            self.copies
                .lock()
                .unwrap()
                .push((CopyPath::Selection, text.to_string()));
            Ok(())
        }
    }
}
