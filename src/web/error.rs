//! Web Error Types
//!
//! Errors raised by page handlers and their conversion to HTTP responses.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    /// Template failed to render
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for page handlers
pub type WebResult<T> = Result<T, WebError>;

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            WebError::Template(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_ERROR"),
            WebError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            WebError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "Request failed"
        );

        // Rendered without templates so a template failure still produces a page
        let body = format!(
            "<!DOCTYPE html><html><head><title>Error · Visit Logger</title></head>\
             <body><h1>Something went wrong</h1><p>{}</p><p><small>Request id: {}</small></p>\
             <p><a href=\"/\">Home</a></p></body></html>",
            status.canonical_reason().unwrap_or("Error"),
            request_id
        );

        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebError::Internal("x".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebError::from(handlebars::RenderError::new("missing partial"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
