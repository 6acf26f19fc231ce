//! User-facing problems returned in mutation payloads
//!
//! Only a closed set of error categories is shown to the caller as a
//! problem. Everything else (notably `Unauthorized` and `Internal`) is
//! propagated so it surfaces as a top-level GraphQL error instead of being
//! mistaken for a validation failure.

use async_graphql::{Enum, ErrorExtensions, SimpleObject};

use crate::errors::{ErrorCode, ServiceError};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProblemType {
    BadRequest,
    Conflict,
    NotFound,
    Forbidden,
    ServiceUnavailable,
}

#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct Problem {
    pub message: String,
    /// Path of the input field that caused the problem, if known
    pub field: Option<Vec<String>>,
    #[graphql(name = "type")]
    pub problem_type: ProblemType,
}

fn problem_type(code: ErrorCode) -> Option<ProblemType> {
    match code {
        ErrorCode::InvalidInput => Some(ProblemType::BadRequest),
        ErrorCode::Conflict => Some(ProblemType::Conflict),
        ErrorCode::NotFound => Some(ProblemType::NotFound),
        ErrorCode::Forbidden => Some(ProblemType::Forbidden),
        ErrorCode::ServiceUnavailable => Some(ProblemType::ServiceUnavailable),
        ErrorCode::Unauthorized | ErrorCode::Internal => None,
    }
}

/// Convert a service error into a problem, or hand it back for propagation
pub fn build_problem(err: ServiceError) -> Result<Problem, ServiceError> {
    match problem_type(err.code) {
        Some(problem_type) => Ok(Problem {
            message: err.message,
            field: err.field.map(|field| vec![field]),
            problem_type,
        }),
        None => Err(err),
    }
}

/// Payload of a mutation that can carry problems
pub trait MutationPayload: Sized {
    fn from_problems(client_mutation_id: Option<String>, problems: Vec<Problem>) -> Self;
}

/// Resolve a failed mutation into its payload
///
/// Errors outside the problem categories become a GraphQL error with their
/// `code` extension intact.
pub fn problem_payload<P: MutationPayload>(
    err: ServiceError,
    client_mutation_id: Option<String>,
) -> async_graphql::Result<P> {
    match err.code {
        ErrorCode::InvalidInput => {
            tracing::debug!(error = %err.message, "mutation rejected as invalid input")
        }
        ErrorCode::Internal => {
            tracing::error!(error = %err.message, "mutation failed with an internal error")
        }
        _ => {}
    }

    let problem = build_problem(err).map_err(|e| e.extend())?;
    Ok(P::from_problems(client_mutation_id, vec![problem]))
}
