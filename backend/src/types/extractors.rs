//! Custom extractors for request parsing

use std::convert::Infallible;

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};

use super::{upload::is_image_type, AppError, FileUpload, UploadRejection};

/// Name of the form field carrying the file
pub const FILE_FIELD: &str = "file";

/// Multipart upload form, read lazily
///
/// Extraction never fails: a body that is not multipart is reported by
/// [`FileForm::into_file`], so handlers can run their own checks before touching the body.
pub struct FileForm(Result<Multipart, UploadRejection>);

fn form_error(status: StatusCode) -> UploadRejection {
    // Bodies over the transport limit are reported like any other oversize file
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::TooLarge
    } else {
        UploadRejection::InvalidForm
    }
}

fn field_error(err: &MultipartError) -> UploadRejection {
    tracing::warn!("Failed to read multipart field: {}", err.body_text());
    form_error(err.status())
}

impl FileForm {
    /// Reads the body up to the first `file` field
    ///
    /// Other fields are ignored. A form without a `file` field yields `None`. When the
    /// body overruns the transport limit inside the file, the part's declared type is
    /// still checked first, so a non-image is reported as such rather than as too large.
    ///
    /// # Errors
    ///
    /// `InvalidForm` for an unreadable body, `TooLarge` or `NotAnImage` for a body over
    /// the transport limit
    pub async fn into_file(self) -> Result<Option<FileUpload>, UploadRejection> {
        let mut multipart = self.0?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| field_error(&err))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|err| {
                match field_error(&err) {
                    UploadRejection::TooLarge if !is_image_type(&content_type) => {
                        UploadRejection::NotAnImage
                    }
                    rejection => rejection,
                }
            })?;

            return Ok(Some(FileUpload {
                file_name,
                content_type,
                bytes,
            }));
        }

        Ok(None)
    }
}

impl<S> FromRequest<S> for FileForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await.map_err(|err| {
            tracing::warn!("Rejected multipart request: {}", err.body_text());
            form_error(err.status())
        });

        Ok(Self(multipart))
    }
}

impl OperationInput for FileForm {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Multipart::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        // Document form rejection responses
        AppError::inferred_responses(ctx, operation)
    }
}
