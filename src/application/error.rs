use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{
        bulk::BulkError,
        pagination::PaginationError,
        query::UrlUpdate,
        toast::Toast,
        validation::ValidationErrors,
    },
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Error chain flattened for logging.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }

    pub fn chain(&self) -> String {
        self.messages.join(": ")
    }
}

/// Failed admin request, classified the way users are told about it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpFailure {
    #[error("HTTP 400 bad request")]
    BadRequest,
    #[error("HTTP 401 session expired")]
    Unauthorized,
    #[error("HTTP 403 forbidden")]
    Forbidden,
    #[error("HTTP 404 not found")]
    NotFound,
    #[error("HTTP 500 internal server error")]
    Server,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl HttpFailure {
    /// `None` for statuses that are not failures.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            100..=399 => None,
            400 => Some(HttpFailure::BadRequest),
            401 => Some(HttpFailure::Unauthorized),
            403 => Some(HttpFailure::Forbidden),
            404 => Some(HttpFailure::NotFound),
            500 => Some(HttpFailure::Server),
            other => Some(HttpFailure::Status(other)),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            HttpFailure::BadRequest => Some(400),
            HttpFailure::Unauthorized => Some(401),
            HttpFailure::Forbidden => Some(403),
            HttpFailure::NotFound => Some(404),
            HttpFailure::Server => Some(500),
            HttpFailure::Status(status) => Some(*status),
            HttpFailure::Transport(_) | HttpFailure::Decode(_) => None,
        }
    }

    /// Transport failures, throttling and 5xx responses are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpFailure::Transport(_) | HttpFailure::Server => true,
            HttpFailure::Status(status) => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            HttpFailure::BadRequest => "Dữ liệu không hợp lệ".to_string(),
            HttpFailure::Unauthorized => "Phiên đăng nhập đã hết hạn".to_string(),
            HttpFailure::Forbidden => "Không có quyền thực hiện thao tác này".to_string(),
            HttpFailure::NotFound => "Không tìm thấy dữ liệu".to_string(),
            HttpFailure::Server => "Lỗi server nội bộ".to_string(),
            HttpFailure::Status(status) => format!("Lỗi HTTP {status}"),
            HttpFailure::Transport(_) => "Không thể kết nối đến server".to_string(),
            HttpFailure::Decode(_) => "Phản hồi từ server không hợp lệ".to_string(),
        }
    }

    pub fn toast(&self) -> Toast {
        Toast::error(self.user_message())
    }

    /// An expired session sends the user to the login page.
    pub fn redirect(&self, login_path: &str) -> Option<UrlUpdate> {
        matches!(self, HttpFailure::Unauthorized).then(|| UrlUpdate::navigate(login_path))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Http(#[from] HttpFailure),
    #[error(transparent)]
    Bulk(#[from] BulkError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// What the user sees when this error reaches the page.
    pub fn toast(&self) -> Toast {
        match self {
            AppError::Http(failure) => failure.toast(),
            AppError::Bulk(err) => err.toast(),
            AppError::Validation(errors) => Toast::warning(
                errors
                    .errors
                    .first()
                    .map(|error| error.message.clone())
                    .unwrap_or_else(|| "Dữ liệu không hợp lệ".to_string()),
            ),
            AppError::Domain(_)
            | AppError::Infra(_)
            | AppError::Pagination(_)
            | AppError::Unexpected(_) => Toast::error("Đã xảy ra lỗi không mong muốn"),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query::HistoryMode;

    #[test]
    fn classifies_statuses_into_user_messages() {
        let cases = [
            (400, "Dữ liệu không hợp lệ"),
            (401, "Phiên đăng nhập đã hết hạn"),
            (403, "Không có quyền thực hiện thao tác này"),
            (404, "Không tìm thấy dữ liệu"),
            (500, "Lỗi server nội bộ"),
            (502, "Lỗi HTTP 502"),
        ];
        for (status, message) in cases {
            let failure = HttpFailure::from_status(status).expect("failure status");
            assert_eq!(failure.user_message(), message, "status {status}");
            assert_eq!(failure.status(), Some(status));
        }
        assert_eq!(HttpFailure::from_status(204), None);
        assert_eq!(
            HttpFailure::Transport("connection refused".to_string()).user_message(),
            "Không thể kết nối đến server"
        );
    }

    #[test]
    fn only_unauthorized_redirects_to_login() {
        let redirect = HttpFailure::Unauthorized
            .redirect("/login")
            .expect("redirect");
        assert_eq!(redirect.mode, HistoryMode::Push);
        assert_eq!(redirect.href("/admin/documents"), "/login");
        assert!(HttpFailure::Forbidden.redirect("/login").is_none());
    }

    #[test]
    fn retries_transient_failures_only() {
        assert!(HttpFailure::Server.is_retryable());
        assert!(HttpFailure::Status(503).is_retryable());
        assert!(HttpFailure::Transport("reset".to_string()).is_retryable());
        assert!(!HttpFailure::Forbidden.is_retryable());
        assert!(!HttpFailure::Decode("eof".to_string()).is_retryable());
    }

    #[test]
    fn report_flattens_error_chain() {
        let io = std::io::Error::other("disk gone");
        let error = AppError::from(InfraError::from(io));
        let report = error.report();
        assert_eq!(report.messages[0], "io error: disk gone");
    }
}
