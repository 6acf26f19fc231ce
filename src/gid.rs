//! Opaque global IDs
//!
//! Every node exposes an ID of the form `base64url("<code>_<uuid>")` so a
//! client can hand any ID back to `node(id:)` without knowing its type.

use async_graphql::ID;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::fmt;
use uuid::Uuid;

use crate::{GraphQLError, Result};

/// Entity kinds known to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    User,
    ServiceAccount,
    Group,
    Workspace,
    NamespaceMembership,
    Team,
    Role,
    Run,
    TerraformModule,
    TerraformModuleVersion,
    TerraformProvider,
    VcsProvider,
    ActivityEvent,
}

impl ModelType {
    const ALL: [ModelType; 13] = [
        ModelType::User,
        ModelType::ServiceAccount,
        ModelType::Group,
        ModelType::Workspace,
        ModelType::NamespaceMembership,
        ModelType::Team,
        ModelType::Role,
        ModelType::Run,
        ModelType::TerraformModule,
        ModelType::TerraformModuleVersion,
        ModelType::TerraformProvider,
        ModelType::VcsProvider,
        ModelType::ActivityEvent,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ModelType::User => "U",
            ModelType::ServiceAccount => "SA",
            ModelType::Group => "G",
            ModelType::Workspace => "W",
            ModelType::NamespaceMembership => "NM",
            ModelType::Team => "T",
            ModelType::Role => "R",
            ModelType::Run => "RN",
            ModelType::TerraformModule => "TM",
            ModelType::TerraformModuleVersion => "TMV",
            ModelType::TerraformProvider => "TP",
            ModelType::VcsProvider => "VP",
            ModelType::ActivityEvent => "AE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decoded global ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub kind: ModelType,
    pub id: String,
}

impl GlobalId {
    pub fn new(kind: ModelType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}_{}", self.kind.code(), self.id))
    }

    pub fn decode(value: &str) -> Result<Self> {
        let invalid = |reason: &str| GraphQLError::InvalidGlobalId(format!("{}: {}", value, reason));

        let bytes = URL_SAFE_NO_PAD
            .decode(value.as_bytes())
            .map_err(|_| invalid("not base64"))?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid("not utf-8"))?;
        let (code, id) = raw.split_once('_').ok_or_else(|| invalid("missing type"))?;
        let kind = ModelType::from_code(code).ok_or_else(|| invalid("unknown type"))?;
        Uuid::parse_str(id).map_err(|_| invalid("malformed identifier"))?;

        Ok(Self::new(kind, id))
    }

    /// Decode and require a particular kind, returning the local ID
    pub fn decode_as(value: &str, kind: ModelType) -> Result<String> {
        let gid = Self::decode(value)?;
        if gid.kind != kind {
            return Err(GraphQLError::InvalidGlobalId(format!(
                "expected a {} ID but got a {} ID",
                kind, gid.kind
            )));
        }
        Ok(gid.id)
    }
}

impl From<GlobalId> for ID {
    fn from(gid: GlobalId) -> Self {
        ID(gid.encode())
    }
}

/// Global ID for a local entity ID
pub fn to_gid(kind: ModelType, id: &str) -> ID {
    GlobalId::new(kind, id).into()
}
