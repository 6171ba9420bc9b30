//! Client for the gallery HTTP endpoints

use async_trait::async_trait;
use common_types::{ErrorResponse, ListImagesResponse, UploadResponse};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};

use crate::{error::ApiError, state::SelectedFile};

/// The two endpoints the gallery view talks to
#[async_trait]
pub trait GalleryApi: Send + Sync {
    /// `GET /api/images`
    async fn fetch_images(&self) -> Result<ListImagesResponse, ApiError>;

    /// `POST /api/upload` with `file` as the only form field
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError>;
}

pub struct HttpGalleryApi {
    base_url: String,
    client: Client,
}

impl HttpGalleryApi {
    /// `base_url` is the server origin, e.g. `http://localhost:3000`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn rejection(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .map(|body| body.error);
    ApiError::Rejected { status, message }
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn fetch_images(&self) -> Result<ListImagesResponse, ApiError> {
        let response = self.client.get(self.url("/api/images")).send().await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json().await?)
    }

    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        Ok(response.json().await?)
    }
}
