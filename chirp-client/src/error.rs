use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `chirp-client`.
pub enum ChirpClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (нет токена, токен истёк или некорректен).
    #[error("unauthorized")]
    Unauthorized,

    /// Операция над чужим ресурсом.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Запрошенный ресурс не найден.
    #[error("not found: {0}")]
    NotFound(String),

    /// Превышен лимит запросов; `retry_after_secs` берётся из заголовка `Retry-After`.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Сообщение сервера.
        message: String,
        /// Через сколько секунд можно повторить запрос.
        retry_after_secs: Option<u64>,
    },

    /// Некорректный запрос (ошибка валидации).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Сообщение сервера.
        message: String,
        /// Поле, не прошедшее валидацию, если сервер его указал.
        field: Option<String>,
    },

    /// Внутренняя ошибка сервера.
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `chirp-client`.
pub type ChirpClientResult<T> = Result<T, ChirpClientError>;

/// Тело ошибки, которое возвращает сервер.
#[derive(Debug, Default)]
pub(crate) struct ErrorPayload {
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) field: Option<String>,
    pub(crate) retry_after_secs: Option<u64>,
}

impl ChirpClientError {
    /// Выбирает вариант ошибки по полю `code`; если его нет, то по HTTP-статусу.
    pub(crate) fn from_http_status(status: reqwest::StatusCode, payload: ErrorPayload) -> Self {
        let message = payload
            .message
            .unwrap_or_else(|| format!("http status {status}"));

        let code = payload.code.as_deref().unwrap_or(match status {
            reqwest::StatusCode::BAD_REQUEST => "VALIDATION",
            reqwest::StatusCode::UNAUTHORIZED => "UNAUTHENTICATED",
            reqwest::StatusCode::FORBIDDEN => "UNAUTHORIZED",
            reqwest::StatusCode::NOT_FOUND => "NOT_FOUND",
            reqwest::StatusCode::TOO_MANY_REQUESTS => "RATE_LIMITED",
            _ => "INTERNAL",
        });

        match code {
            "VALIDATION" => Self::InvalidRequest {
                message,
                field: payload.field,
            },
            "UNAUTHENTICATED" => Self::Unauthorized,
            "UNAUTHORIZED" => Self::Forbidden(message),
            "NOT_FOUND" => Self::NotFound(message),
            "RATE_LIMITED" => Self::RateLimited {
                message,
                retry_after_secs: payload.retry_after_secs,
            },
            _ => Self::Server(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, ErrorPayload::default());
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    fn payload(code: &str, message: &str) -> ErrorPayload {
        ErrorPayload {
            code: Some(code.to_string()),
            message: Some(message.to_string()),
            ..ErrorPayload::default()
        }
    }

    #[test]
    fn code_wins_over_status() {
        let err = ChirpClientError::from_http_status(
            StatusCode::FORBIDDEN,
            payload("UNAUTHORIZED", "not your post"),
        );
        assert!(matches!(err, ChirpClientError::Forbidden(message) if message == "not your post"));
    }

    #[test]
    fn validation_keeps_field() {
        let mut body = payload("VALIDATION", "content too long");
        body.field = Some("content".to_string());

        let err = ChirpClientError::from_http_status(StatusCode::BAD_REQUEST, body);
        match err {
            ChirpClientError::InvalidRequest { field, .. } => {
                assert_eq!(field.as_deref(), Some("content"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_body_falls_back_to_status() {
        let err = ChirpClientError::from_http_status(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorPayload {
                retry_after_secs: Some(7),
                ..ErrorPayload::default()
            },
        );
        match err {
            ChirpClientError::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, Some(7)),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ChirpClientError::from_http_status(
            StatusCode::UNAUTHORIZED,
            ErrorPayload::default(),
        );
        assert!(matches!(err, ChirpClientError::Unauthorized));

        let err = ChirpClientError::from_http_status(
            StatusCode::BAD_GATEWAY,
            ErrorPayload::default(),
        );
        assert!(matches!(err, ChirpClientError::Server(_)));
    }
}
