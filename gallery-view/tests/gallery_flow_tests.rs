use std::sync::Arc;

use backend::{
    server,
    storage::{mock::InMemoryObjectStore, StorageGateway},
    types::{Environment, StorageConfig, UrlMode},
};
use chrono::{TimeZone, Utc};
use gallery_view::{
    clipboard::mock::{CopyPath, RecordingClipboard},
    state::{ListPhase, UploadPhase, UPLOAD_ERROR},
    GalleryApi, GalleryDriver, GalleryEvent, HttpGalleryApi, SelectedFile,
};
use tokio::net::TcpListener;

const BUCKET: &str = "gallery";

/// Serves the backend on an ephemeral port and returns its origin
async fn spawn_backend(store: Option<Arc<InMemoryObjectStore>>) -> String {
    let storage = store.map(|store| {
        let config = StorageConfig {
            endpoint: "minio.test".to_string(),
            access_key: "test-access".to_string(),
            secret_key: "test-secret".to_string(),
            bucket: BUCKET.to_string(),
            url_mode: UrlMode::Public,
        };
        Arc::new(StorageGateway::new(store, config))
    });
    let router = server::router(Environment::Development, storage);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

fn png(name: &str) -> SelectedFile {
    SelectedFile {
        name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
    }
}

#[tokio::test]
async fn test_fetch_images_over_http() {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert_object(BUCKET, "old.jpg", 10, Utc.timestamp_millis_opt(1_000).unwrap());
    store.insert_object(BUCKET, "new.png", 20, Utc.timestamp_millis_opt(2_000).unwrap());
    store.insert_object(BUCKET, "notes.txt", 5, Utc.timestamp_millis_opt(3_000).unwrap());
    let api = HttpGalleryApi::new(spawn_backend(Some(store)).await);

    let listing = api.fetch_images().await.unwrap();

    assert!(listing.success);
    assert_eq!(listing.count, 2);
    let names: Vec<_> = listing.images.iter().map(|image| image.name.as_str()).collect();
    assert_eq!(names, ["new.png", "old.jpg"]);
    assert_eq!(listing.images[0].url, "http://minio.test:9000/gallery/new.png");
}

#[tokio::test]
async fn test_upload_then_reload() {
    let store = Arc::new(InMemoryObjectStore::new());
    let api = HttpGalleryApi::new(spawn_backend(Some(store.clone())).await);
    let mut driver = GalleryDriver::new(Arc::new(api), Arc::new(RecordingClipboard::new()));

    driver.dispatch(GalleryEvent::Mounted).await;
    assert_eq!(driver.state().list, ListPhase::Loaded);
    assert!(driver.state().images.is_empty());

    driver
        .dispatch(GalleryEvent::FileSelected(png("my cat.png")))
        .await;
    driver.dispatch(GalleryEvent::UploadRequested).await;

    let state = driver.state();
    assert_eq!(state.upload, UploadPhase::NoFileSelected);
    assert_eq!(state.error, None);
    assert_eq!(state.images.len(), 1);
    assert!(state.images[0].name.ends_with("-mycat.png"));
    assert_eq!(state.images[0].size, 7);
    assert_eq!(driver.picker_resets(), 1);
    assert_eq!(store.object_writes(), 1);
}

#[tokio::test]
async fn test_rejected_upload_shows_server_error() {
    let store = Arc::new(InMemoryObjectStore::new());
    let api = HttpGalleryApi::new(spawn_backend(Some(store.clone())).await);
    let mut driver = GalleryDriver::new(Arc::new(api), Arc::new(RecordingClipboard::new()));
    let pdf = SelectedFile {
        name: "doc.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    };

    driver.dispatch(GalleryEvent::FileSelected(pdf.clone())).await;
    driver.dispatch(GalleryEvent::UploadRequested).await;

    assert_eq!(driver.state().upload, UploadPhase::FileSelected(pdf));
    assert_eq!(
        driver.state().error.as_deref(),
        Some("Only image files are allowed")
    );
    assert_eq!(store.object_writes(), 0);
}

#[tokio::test]
async fn test_upload_without_storage_shows_configuration_error() {
    let api = HttpGalleryApi::new(spawn_backend(None).await);
    let mut driver = GalleryDriver::new(Arc::new(api), Arc::new(RecordingClipboard::new()));

    driver.dispatch(GalleryEvent::Mounted).await;
    assert_eq!(driver.state().list, ListPhase::Loaded);

    driver.dispatch(GalleryEvent::FileSelected(png("a.png"))).await;
    driver.dispatch(GalleryEvent::UploadRequested).await;

    assert_eq!(
        driver.state().error.as_deref(),
        Some("MinIO configuration not available")
    );
}

#[tokio::test]
async fn test_unreachable_server_uses_fallback_messages() {
    // Nothing listens on the discard port
    let api = HttpGalleryApi::new("http://127.0.0.1:9");
    let mut driver = GalleryDriver::new(Arc::new(api), Arc::new(RecordingClipboard::new()));

    driver.dispatch(GalleryEvent::Mounted).await;
    assert_eq!(driver.state().list, ListPhase::LoadError);

    driver.dispatch(GalleryEvent::FileSelected(png("a.png"))).await;
    driver.dispatch(GalleryEvent::UploadRequested).await;

    assert_eq!(driver.state().error.as_deref(), Some(UPLOAD_ERROR));
    assert!(driver.state().can_upload());
}

#[tokio::test]
async fn test_copy_link_of_listed_image() {
    let store = Arc::new(InMemoryObjectStore::new());
    store.insert_object(BUCKET, "a.gif", 1, Utc.timestamp_millis_opt(1).unwrap());
    let api = HttpGalleryApi::new(spawn_backend(Some(store)).await);
    let clipboard = Arc::new(RecordingClipboard::new());
    let mut driver = GalleryDriver::new(Arc::new(api), clipboard.clone());

    driver.dispatch(GalleryEvent::Mounted).await;
    driver.dispatch(GalleryEvent::CopyRequested { index: 0 }).await;

    assert_eq!(driver.state().copied_index, Some(0));
    assert_eq!(
        clipboard.copies(),
        [(
            CopyPath::Api,
            "http://minio.test:9000/gallery/a.gif".to_string()
        )]
    );
}
