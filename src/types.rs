//! Common GraphQL types

use async_graphql::{Scalar, ScalarType, SimpleObject, Value};
use chrono::{DateTime as ChronoDateTime, Utc};

use crate::models;

/// DateTime scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(pub ChronoDateTime<Utc>);

#[Scalar]
impl ScalarType for DateTime {
    fn parse(value: Value) -> async_graphql::InputValueResult<Self> {
        if let Value::String(s) = value {
            Ok(DateTime(
                ChronoDateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("Invalid DateTime: {}", e))?
                    .with_timezone(&Utc),
            ))
        } else {
            Err("Expected string for DateTime".into())
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

/// Bookkeeping fields shared by every resource
#[derive(SimpleObject, Debug, Clone)]
pub struct ResourceMetadata {
    pub created_at: DateTime,
    pub updated_at: DateTime,
    /// Optimistic-concurrency version expected by mutations
    pub version: i32,
}

impl From<&models::ResourceMetadata> for ResourceMetadata {
    fn from(metadata: &models::ResourceMetadata) -> Self {
        Self {
            created_at: DateTime(metadata.created_at),
            updated_at: DateTime(metadata.updated_at),
            version: metadata.version,
        }
    }
}
