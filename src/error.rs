//! Error types for API calls and form validation
//!
//! Errors are classified by recoverability:
//! - Retryable: Network issues, timeouts, server errors, rate limits
//! - NonRetryable: Validation errors, missing resources, bad responses
//! - RequiresUserAction: Expired or missing credentials, permission errors

use thiserror::Error;

/// Error type returned by every API wrapper.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session expired or missing credentials")]
    Unauthorized,

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl ApiError {
    /// Map a non-success HTTP status and its body to an error.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = server_message(&body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            400 | 422 => ApiError::Validation(message),
            code => ApiError::Server {
                status: code,
                message,
            },
        }
    }

    /// Returns true if a manual retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Server { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized | ApiError::Forbidden(_) | ApiError::Config(_)
        )
    }

    pub fn kind(&self) -> ErrorKind {
        if self.requires_user_action() {
            ErrorKind::RequiresUserAction
        } else if self.is_retryable() {
            ErrorKind::Retryable
        } else {
            ErrorKind::NonRetryable
        }
    }

    /// User-facing message shown in place of a toast or alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(_) => "No se pudo contactar con el servidor.".to_string(),
            ApiError::Unauthorized => "La sesión ha caducado. Inicia sesión de nuevo.".to_string(),
            ApiError::Forbidden(_) => "No tienes permisos para esta operación.".to_string(),
            ApiError::NotFound(_) => "El recurso solicitado no existe.".to_string(),
            ApiError::Validation(msg) if !msg.is_empty() => msg.clone(),
            ApiError::Validation(_) => "Los datos enviados no son válidos.".to_string(),
            ApiError::Server { .. } => "Error del servidor. Inténtalo más tarde.".to_string(),
            ApiError::Decode(_) => "Respuesta inesperada del servidor.".to_string(),
            ApiError::Io(_) => "No se pudo leer o escribir el archivo.".to_string(),
            ApiError::InvalidUrl(_) | ApiError::Config(_) => {
                "Revisa la configuración en ~/.adminpanel/config.json".to_string()
            }
            ApiError::Invalid(e) => e.to_string(),
        }
    }
}

/// Pull a human message out of a JSON error body (`message` or `error`),
/// falling back to the raw text.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Client-side required-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            reason: "campo obligatorio".to_string(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject empty or whitespace-only required strings.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

/// Serializable error representation for UI shells
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub error_type: ErrorKind,
    pub can_retry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&ApiError> for ErrorPayload {
    fn from(err: &ApiError) -> Self {
        ErrorPayload {
            message: err.user_message(),
            error_type: err.kind(),
            can_retry: err.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_mapping_table() {
        let cases: [(u16, &str, ErrorKind, bool); 9] = [
            (400, "Validation", ErrorKind::NonRetryable, false),
            (401, "Unauthorized", ErrorKind::RequiresUserAction, false),
            (403, "Forbidden", ErrorKind::RequiresUserAction, false),
            (404, "NotFound", ErrorKind::NonRetryable, false),
            (408, "Server", ErrorKind::Retryable, true),
            (409, "Server", ErrorKind::NonRetryable, false),
            (422, "Validation", ErrorKind::NonRetryable, false),
            (429, "Server", ErrorKind::Retryable, true),
            (503, "Server", ErrorKind::Retryable, true),
        ];
        for (code, variant, kind, retryable) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            let err = ApiError::from_status(status, String::new());
            let actual = match &err {
                ApiError::Validation(_) => "Validation",
                ApiError::Unauthorized => "Unauthorized",
                ApiError::Forbidden(_) => "Forbidden",
                ApiError::NotFound(_) => "NotFound",
                ApiError::Server { status, .. } => {
                    assert_eq!(*status, code);
                    "Server"
                }
                other => panic!("{} mapped to {:?}", code, other),
            };
            assert_eq!(actual, variant, "status {}", code);
            assert_eq!(err.kind(), kind, "status {}", code);
            assert_eq!(err.is_retryable(), retryable, "status {}", code);
        }
    }

    #[test]
    fn test_server_message_prefers_json_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"El CIF ya existe"}"#.to_string(),
        );
        assert_eq!(err.user_message(), "El CIF ya existe");
    }

    #[test]
    fn test_server_message_sources() {
        assert_eq!(server_message(r#"{"message": "sin permiso"}"#), "sin permiso");
        assert_eq!(server_message(r#"{"error": "token caducado"}"#), "token caducado");
        assert_eq!(server_message("  Bad Gateway\n"), "Bad Gateway");
        // JSON without a string message falls back to the raw body
        assert_eq!(server_message(r#"{"code": 7}"#), r#"{"code": 7}"#);
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "Acceso denegado".into()),
            ApiError::Forbidden(m) if m == "Acceso denegado"
        ));
    }

    #[test]
    fn test_kind_classification() {
        let server = ApiError::Server {
            status: 503,
            message: String::new(),
        };
        assert_eq!(server.kind(), ErrorKind::Retryable);
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::RequiresUserAction);
        assert_eq!(
            ApiError::NotFound(String::new()).kind(),
            ErrorKind::NonRetryable
        );
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = ErrorPayload::from(&ApiError::Unauthorized);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["errorType"], "requiresUserAction");
        assert_eq!(json["canRetry"], false);
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("cif", "  ").is_err());
        assert!(require("cif", "B12345678").is_ok());
    }
}
