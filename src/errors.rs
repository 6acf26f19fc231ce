//! Domain error taxonomy shared with the service layer

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::GraphQLError;

/// Error categories a service call can fail with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Caller supplied malformed or contradictory input
    InvalidInput,
    /// Optimistic-concurrency or uniqueness conflict
    Conflict,
    /// Requested resource does not exist
    NotFound,
    /// Caller is authenticated but lacks permission
    Forbidden,
    /// Caller is not authenticated
    Unauthorized,
    /// A downstream dependency is unavailable
    ServiceUnavailable,
    /// Contract mismatch or other bug
    Internal,
}

impl ErrorCode {
    /// Value placed in the `code` extension of a GraphQL error
    pub fn as_extension(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "BAD_REQUEST",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Error returned by service collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    /// Input field the error is about, when the resolver knows it
    pub field: Option<String>,
}

/// Result type for service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl From<GraphQLError> for ServiceError {
    fn from(err: GraphQLError) -> Self {
        match err {
            GraphQLError::InvalidCursor(_)
            | GraphQLError::PaginationError(_)
            | GraphQLError::InvalidGlobalId(_) => Self::invalid_input(err.to_string()),
            GraphQLError::UnsupportedCombination { .. } | GraphQLError::Decode { .. } => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl ErrorExtensions for ServiceError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code.as_extension();
        async_graphql::Error::new(self.message.clone()).extend_with(|_, e| e.set("code", code))
    }
}

/// Conversions used at the resolver boundary
pub trait ServiceResultExt<T> {
    /// Convert into a GraphQL result carrying the `code` extension
    fn into_gql(self) -> async_graphql::Result<T>;

    /// Swallow not-found into `None` for nullable fields
    fn optional(self) -> ServiceResult<Option<T>>;
}

impl<T> ServiceResultExt<T> for ServiceResult<T> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }

    fn optional(self) -> ServiceResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_code() {
        let error = ServiceError::unauthorized("token expired").extend();
        assert_eq!(error.message, "token expired");
        let code = error
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("UNAUTHORIZED")));
    }

    #[test]
    fn test_optional_swallows_not_found_only() {
        let missing: ServiceResult<u8> = Err(ServiceError::not_found("user not found"));
        assert_eq!(missing.optional(), Ok(None));

        let denied: ServiceResult<u8> = Err(ServiceError::forbidden("nope"));
        assert_eq!(
            denied.optional().map_err(|e| e.code),
            Err(ErrorCode::Forbidden)
        );

        let present: ServiceResult<u8> = Ok(7);
        assert_eq!(present.optional(), Ok(Some(7)));
    }

    #[test]
    fn test_graphql_error_categories() {
        let cursor: ServiceError = GraphQLError::InvalidCursor("bad".to_string()).into();
        assert_eq!(cursor.code, ErrorCode::InvalidInput);

        let decode: ServiceError = GraphQLError::Decode {
            shape: "payload",
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(decode.code, ErrorCode::Internal);
    }
}
