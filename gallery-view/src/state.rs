//! Gallery view state and its reducer

use std::time::Duration;

use common_types::{ImageRecord, ListImagesResponse, UploadResponse};

/// How long the "copied" confirmation stays visible
pub const COPIED_CONFIRMATION: Duration = Duration::from_secs(2);

/// Error text shown when the image list cannot be loaded
pub const LOAD_ERROR: &str = "Error loading images";

/// Error text shown when an upload fails without a server-provided message
pub const UPLOAD_ERROR: &str = "Error uploading file";

/// A file picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    NoFileSelected,
    FileSelected(SelectedFile),
    Uploading(SelectedFile),
}

/// Everything the gallery view renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryState {
    pub list: ListPhase,
    pub upload: UploadPhase,
    /// Images of the last successful listing
    pub images: Vec<ImageRecord>,
    /// Error text shown under the upload form
    pub error: Option<String>,
    /// Position in `images` whose URL was just copied
    pub copied_index: Option<usize>,
    pub show_toast: bool,
}

impl GalleryState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.list, ListPhase::Loading)
    }

    #[must_use]
    pub const fn is_uploading(&self) -> bool {
        matches!(self.upload, UploadPhase::Uploading(_))
    }

    #[must_use]
    pub const fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.upload {
            UploadPhase::NoFileSelected => None,
            UploadPhase::FileSelected(file) | UploadPhase::Uploading(file) => Some(file),
        }
    }

    /// Whether the upload button is enabled
    #[must_use]
    pub const fn can_upload(&self) -> bool {
        matches!(self.upload, UploadPhase::FileSelected(_))
    }
}

/// Inputs to the reducer: user interactions and completed side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    /// The view was mounted
    Mounted,
    /// The user pressed the refresh button
    RefreshRequested,
    ImagesLoaded(ListImagesResponse),
    ImagesLoadFailed(String),
    FileSelected(SelectedFile),
    UploadRequested,
    UploadSucceeded(UploadResponse),
    /// Upload failed, with the server's error text when it sent one
    UploadFailed(Option<String>),
    CopyRequested { index: usize },
    CopySucceeded { index: usize },
    CopyFailed(String),
    CopiedResetElapsed { index: usize },
}

/// Side effects requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchImages,
    Upload(SelectedFile),
    /// Clear the native file input
    ResetFilePicker,
    WriteClipboard { index: usize, url: String },
    /// Deliver `CopiedResetElapsed { index }` after `after`
    ScheduleCopiedReset { index: usize, after: Duration },
}

fn start_loading(state: &mut GalleryState) -> Command {
    state.list = ListPhase::Loading;
    Command::FetchImages
}

/// Applies `event` to `state`
///
/// Responses are applied in arrival order with no request tracking, so when two loads or
/// uploads overlap the last one to resolve wins.
#[must_use]
pub fn reduce(mut state: GalleryState, event: GalleryEvent) -> (GalleryState, Vec<Command>) {
    let mut commands = Vec::new();

    match event {
        GalleryEvent::Mounted => commands.push(start_loading(&mut state)),
        GalleryEvent::RefreshRequested => {
            if !state.is_loading() {
                commands.push(start_loading(&mut state));
            }
        }
        GalleryEvent::ImagesLoaded(response) => {
            if response.success {
                state.list = ListPhase::Loaded;
                state.images = response.images;
            } else {
                state.list = ListPhase::LoadError;
                state.error = Some(LOAD_ERROR.to_string());
            }
        }
        GalleryEvent::ImagesLoadFailed(reason) => {
            tracing::warn!("Error loading images: {reason}");
            state.list = ListPhase::LoadError;
            state.error = Some(LOAD_ERROR.to_string());
        }
        GalleryEvent::FileSelected(file) => {
            if !state.is_uploading() {
                state.upload = UploadPhase::FileSelected(file);
                state.error = None;
            }
        }
        GalleryEvent::UploadRequested => {
            if let UploadPhase::FileSelected(file) = &state.upload {
                let file = file.clone();
                state.upload = UploadPhase::Uploading(file.clone());
                state.error = None;
                commands.push(Command::Upload(file));
            }
        }
        GalleryEvent::UploadSucceeded(response) => {
            if state.is_uploading() {
                tracing::debug!("Uploaded {}", response.file_name);
                state.upload = UploadPhase::NoFileSelected;
                commands.push(Command::ResetFilePicker);
                commands.push(start_loading(&mut state));
            }
        }
        GalleryEvent::UploadFailed(message) => {
            if let UploadPhase::Uploading(file) = &state.upload {
                state.upload = UploadPhase::FileSelected(file.clone());
                state.error = Some(message.unwrap_or_else(|| UPLOAD_ERROR.to_string()));
            }
        }
        GalleryEvent::CopyRequested { index } => {
            if let Some(image) = state.images.get(index) {
                commands.push(Command::WriteClipboard {
                    index,
                    url: image.url.clone(),
                });
            }
        }
        GalleryEvent::CopySucceeded { index } => {
            state.copied_index = Some(index);
            state.show_toast = true;
            commands.push(Command::ScheduleCopiedReset {
                index,
                after: COPIED_CONFIRMATION,
            });
        }
        GalleryEvent::CopyFailed(message) => state.error = Some(message),
        GalleryEvent::CopiedResetElapsed { index } => {
            // A newer copy owns the confirmation
            if state.copied_index == Some(index) {
                state.copied_index = None;
                state.show_toast = false;
            }
        }
    }

    (state, commands)
}
