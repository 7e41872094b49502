use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::errors::AppError;

/// `Json` extractor whose rejections become `AppError::Validation`, so malformed
/// or out-of-range request bodies get the same 400 error body as other
/// validation failures.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
