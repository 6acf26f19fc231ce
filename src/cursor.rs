//! Opaque, sort-aware pagination cursors
//!
//! A cursor records where an entity sits in one particular sort order: the
//! sort field, its direction, the entity's value for that field and the
//! entity ID as tie-breaker. Cursors are base64 encoded JSON carrying a
//! version tag so new sort fields can be introduced without invalidating
//! cursors already held by clients.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{GraphQLError, Result};

/// Current cursor format version
pub const CURSOR_VERSION: u8 = 1;

/// Ordering direction of a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort order offered by a connection
pub trait SortKey: Copy + Send + Sync + 'static {
    /// Stable name of the sorted field, stored in cursors
    fn field_name(&self) -> &'static str;

    fn direction(&self) -> SortDirection;
}

/// An entity that can be positioned under sort order `S`
pub trait Paginated<S: SortKey> {
    /// Unique tie-breaker for entities sharing a sort value
    fn cursor_id(&self) -> &str;

    /// The entity's value for the sort field
    fn sort_value(&self, sort: S) -> String;
}

/// Decoded cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "v")]
    pub version: u8,
    #[serde(rename = "f")]
    pub field: String,
    #[serde(rename = "d")]
    pub direction: SortDirection,
    #[serde(rename = "k")]
    pub value: String,
    pub id: String,
}

impl Cursor {
    /// Cursor for `entity` under `sort`
    pub fn for_entity<S, E>(entity: &E, sort: S) -> Self
    where
        S: SortKey,
        E: Paginated<S> + ?Sized,
    {
        Self {
            version: CURSOR_VERSION,
            field: sort.field_name().to_string(),
            direction: sort.direction(),
            value: entity.sort_value(sort),
            id: entity.cursor_id().to_string(),
        }
    }

    pub fn encode(&self) -> Result<String> {
        CursorCodec::encode_structured(self)
    }

    pub fn decode(cursor: &str) -> Result<Self> {
        let decoded: Cursor = CursorCodec::decode_structured(cursor)?;
        if decoded.version != CURSOR_VERSION {
            return Err(GraphQLError::InvalidCursor(format!(
                "unsupported cursor version {}",
                decoded.version
            )));
        }
        Ok(decoded)
    }

    /// Reject cursors issued under a different sort order
    pub fn check_sort<S: SortKey>(&self, sort: S) -> Result<()> {
        if self.field != sort.field_name() || self.direction != sort.direction() {
            return Err(GraphQLError::InvalidCursor(format!(
                "cursor was issued for sort {} {:?}, not {} {:?}",
                self.field,
                self.direction,
                sort.field_name(),
                sort.direction()
            )));
        }
        Ok(())
    }
}

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode structured cursor (e.g., timestamp + ID)
    pub fn encode_structured<T: Serialize>(value: &T) -> Result<String> {
        let json = serde_json::to_string(value)
            .map_err(|e| GraphQLError::InvalidCursor(e.to_string()))?;
        Ok(BASE64.encode(json.as_bytes()))
    }

    /// Decode structured cursor
    pub fn decode_structured<T: for<'de> Deserialize<'de>>(cursor: &str) -> Result<T> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|e| GraphQLError::InvalidCursor(e.to_string()))?;
        let json =
            String::from_utf8(bytes).map_err(|e| GraphQLError::InvalidCursor(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| GraphQLError::InvalidCursor(e.to_string()))
    }
}
