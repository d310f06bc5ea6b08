use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque identity assigned to every stored entity: exactly 24 lowercase
/// hex characters.
///
/// Tokens arriving from outside the crate go through [`EntityId::parse_str`],
/// which enforces the shape before any storage lookup happens — a malformed
/// token never reaches a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

/// Token failed the 24-hex shape check.
#[derive(Error, Debug)]
#[error("malformed entity id")]
pub struct InvalidId;

impl EntityId {
    /// Generate a fresh identity from v4 UUID entropy.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..24].to_owned())
    }

    /// Parse an identity token. Hex digits of either case are accepted and
    /// normalized to lowercase; anything else is rejected.
    pub fn parse_str(token: &str) -> Result<Self, InvalidId> {
        if token.len() == 24 && token.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(token.to_ascii_lowercase()))
        } else {
            Err(InvalidId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
