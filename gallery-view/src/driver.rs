//! Runs reducer commands against the API and the clipboard

use std::{collections::VecDeque, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    api::GalleryApi,
    clipboard::{copy_text, Clipboard},
    state::{reduce, Command, GalleryEvent, GalleryState},
};

/// Owns the view state and feeds command outcomes back into the reducer
///
/// Commands run one after another, so of two overlapping loads the one issued last is
/// also the one applied last. Timers are the exception: they run as spawned tasks and
/// come back through [`GalleryDriver::next_deferred`].
pub struct GalleryDriver {
    api: Arc<dyn GalleryApi>,
    clipboard: Arc<dyn Clipboard>,
    state: GalleryState,
    deferred_tx: mpsc::UnboundedSender<GalleryEvent>,
    deferred_rx: mpsc::UnboundedReceiver<GalleryEvent>,
    picker_resets: u64,
}

impl GalleryDriver {
    #[must_use]
    pub fn new(api: Arc<dyn GalleryApi>, clipboard: Arc<dyn Clipboard>) -> Self {
        let (deferred_tx, deferred_rx) = mpsc::unbounded_channel();
        Self {
            api,
            clipboard,
            state: GalleryState::default(),
            deferred_tx,
            deferred_rx,
            picker_resets: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GalleryState {
        &self.state
    }

    /// How many times the file input was cleared
    #[must_use]
    pub const fn picker_resets(&self) -> u64 {
        self.picker_resets
    }

    /// Applies `event` and every event its commands produce, until none are left
    pub async fn dispatch(&mut self, event: GalleryEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (state, commands) = reduce(std::mem::take(&mut self.state), event);
            self.state = state;

            for command in commands {
                if let Some(follow_up) = self.execute(command).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Waits for the next timer to fire and dispatches its event
    pub async fn next_deferred(&mut self) {
        if let Some(event) = self.deferred_rx.recv().await {
            self.dispatch(event).await;
        }
    }

    /// Dispatches every timer event that has already fired, returning how many there were
    pub async fn process_deferred(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.deferred_rx.try_recv() {
            self.dispatch(event).await;
            processed += 1;
        }
        processed
    }

    async fn execute(&mut self, command: Command) -> Option<GalleryEvent> {
        match command {
            Command::FetchImages => Some(match self.api.fetch_images().await {
                Ok(response) => GalleryEvent::ImagesLoaded(response),
                Err(e) => GalleryEvent::ImagesLoadFailed(e.to_string()),
            }),
            Command::Upload(file) => Some(match self.api.upload(&file).await {
                Ok(response) => GalleryEvent::UploadSucceeded(response),
                Err(e) => {
                    tracing::warn!("Upload of {} failed: {e}", file.name);
                    GalleryEvent::UploadFailed(e.server_message().map(str::to_string))
                }
            }),
            Command::ResetFilePicker => {
                self.picker_resets += 1;
                None
            }
            Command::WriteClipboard { index, url } => {
                Some(match copy_text(self.clipboard.as_ref(), &url).await {
                    Ok(()) => GalleryEvent::CopySucceeded { index },
                    Err(e) => GalleryEvent::CopyFailed(e.to_string()),
                })
            }
            Command::ScheduleCopiedReset { index, after } => {
                let tx = self.deferred_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    // The driver may be gone by now
                    let _ = tx.send(GalleryEvent::CopiedResetElapsed { index });
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use common_types::{ImageRecord, ListImagesResponse, UploadResponse};
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        clipboard::mock::{CopyPath, RecordingClipboard},
        error::ApiError,
        state::{ListPhase, SelectedFile, UploadPhase, COPIED_CONFIRMATION, LOAD_ERROR},
    };

    /// Serves canned listings in order and records uploads
    #[derive(Default)]
    struct ScriptedApi {
        listings: Mutex<VecDeque<Result<Vec<ImageRecord>, String>>>,
        upload_error: Option<String>,
        uploads: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn with_listings(listings: Vec<Result<Vec<ImageRecord>, String>>) -> Self {
            Self {
                listings: Mutex::new(listings.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl GalleryApi for ScriptedApi {
        async fn fetch_images(&self) -> Result<ListImagesResponse, ApiError> {
            match self.listings.lock().unwrap().pop_front() {
                Some(Ok(images)) => Ok(ListImagesResponse::new(images)),
                Some(Err(message)) => Err(ApiError::Rejected {
                    status: StatusCode::BAD_GATEWAY,
                    message: Some(message),
                }),
                None => Ok(ListImagesResponse::empty(None)),
            }
        }

        async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
            if let Some(message) = &self.upload_error {
                return Err(ApiError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message: Some(message.clone()),
                });
            }
            self.uploads.lock().unwrap().push(file.name.clone());
            Ok(UploadResponse {
                success: true,
                file_name: format!("1-{}", file.name),
                file_url: format!("http://minio:9000/gallery/1-{}", file.name),
                size: file.size(),
                content_type: file.content_type.clone(),
            })
        }
    }

    fn image(name: &str) -> ImageRecord {
        ImageRecord {
            name: name.to_string(),
            url: format!("http://minio:9000/gallery/{name}"),
            size: 3,
            last_modified: Utc.timestamp_millis_opt(1).unwrap(),
        }
    }

    fn file() -> SelectedFile {
        SelectedFile {
            name: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn driver(api: ScriptedApi, clipboard: RecordingClipboard) -> GalleryDriver {
        GalleryDriver::new(Arc::new(api), Arc::new(clipboard))
    }

    #[tokio::test]
    async fn test_mount_loads_images() {
        let mut driver = driver(
            ScriptedApi::with_listings(vec![Ok(vec![image("a.png")])]),
            RecordingClipboard::new(),
        );

        driver.dispatch(GalleryEvent::Mounted).await;

        assert_eq!(driver.state().list, ListPhase::Loaded);
        assert_eq!(driver.state().images, [image("a.png")]);
    }

    #[tokio::test]
    async fn test_failed_load_sets_error() {
        let mut driver = driver(
            ScriptedApi::with_listings(vec![Err("down".to_string())]),
            RecordingClipboard::new(),
        );

        driver.dispatch(GalleryEvent::Mounted).await;

        assert_eq!(driver.state().list, ListPhase::LoadError);
        assert_eq!(driver.state().error.as_deref(), Some(LOAD_ERROR));
    }

    #[tokio::test]
    async fn test_upload_reloads_list() {
        let mut driver = driver(
            ScriptedApi::with_listings(vec![Ok(vec![]), Ok(vec![image("1-cat.png")])]),
            RecordingClipboard::new(),
        );
        driver.dispatch(GalleryEvent::Mounted).await;
        driver.dispatch(GalleryEvent::FileSelected(file())).await;

        driver.dispatch(GalleryEvent::UploadRequested).await;

        assert_eq!(driver.state().upload, UploadPhase::NoFileSelected);
        assert_eq!(driver.state().images, [image("1-cat.png")]);
        assert_eq!(driver.picker_resets(), 1);
    }

    #[tokio::test]
    async fn test_upload_error_shows_server_message() {
        let api = ScriptedApi {
            upload_error: Some("Only image files are allowed".to_string()),
            ..ScriptedApi::default()
        };
        let mut driver = driver(api, RecordingClipboard::new());
        driver.dispatch(GalleryEvent::FileSelected(file())).await;

        driver.dispatch(GalleryEvent::UploadRequested).await;

        assert_eq!(driver.state().upload, UploadPhase::FileSelected(file()));
        assert_eq!(
            driver.state().error.as_deref(),
            Some("Only image files are allowed")
        );
        assert_eq!(driver.picker_resets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_confirmation_expires() {
        let mut driver = driver(
            ScriptedApi::with_listings(vec![Ok(vec![image("a.png")])]),
            RecordingClipboard::without_api(),
        );
        driver.dispatch(GalleryEvent::Mounted).await;
        let copied_at = tokio::time::Instant::now();

        driver.dispatch(GalleryEvent::CopyRequested { index: 0 }).await;
        assert_eq!(driver.state().copied_index, Some(0));
        assert!(driver.state().show_toast);
        assert_eq!(driver.process_deferred().await, 0);

        driver.next_deferred().await;

        assert!(copied_at.elapsed() >= COPIED_CONFIRMATION);
        assert_eq!(driver.state().copied_index, None);
        assert!(!driver.state().show_toast);
    }

    #[tokio::test]
    async fn test_copy_failure_is_reported() {
        let clipboard = Arc::new(RecordingClipboard::denied("permission denied"));
        let mut driver = GalleryDriver::new(
            Arc::new(ScriptedApi::with_listings(vec![Ok(vec![image("a.png")])])),
            clipboard.clone(),
        );
        driver.dispatch(GalleryEvent::Mounted).await;

        driver.dispatch(GalleryEvent::CopyRequested { index: 0 }).await;

        assert_eq!(driver.state().copied_index, None);
        assert_eq!(
            driver.state().error.as_deref(),
            Some("Clipboard write failed: permission denied")
        );
        assert!(!clipboard
            .copies()
            .iter()
            .any(|(path, _)| *path == CopyPath::Selection));
    }
}
