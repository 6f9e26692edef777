//! Request extractors whose rejections use the API error shape.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with its rejection mapped to [`AppError::BadRequest`], so a
/// missing content type or malformed body still answers with
/// `{success: false, error, code}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
