//! Gallery view: the image list, upload form and copy-link actions as a state machine
//!
//! [`state::reduce`] is pure. [`driver::GalleryDriver`] performs the commands it returns
//! through a [`api::GalleryApi`] and a [`clipboard::Clipboard`].

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod api;
pub mod clipboard;
pub mod driver;
pub mod error;
pub mod format;
pub mod state;

pub use api::{GalleryApi, HttpGalleryApi};
pub use driver::GalleryDriver;
pub use format::format_file_size;
pub use state::{reduce, Command, GalleryEvent, GalleryState, SelectedFile};
