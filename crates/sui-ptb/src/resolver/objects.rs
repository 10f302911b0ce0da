//! Object reference lookups.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use sui_ptb_types::{ObjectID, ObjectOwner, SuiObjectRef};

/// Current reference and ownership of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectInfo {
    #[serde(flatten)]
    pub reference: SuiObjectRef,
    pub owner: ObjectOwner,
}

/// Source of object references, usually a fullnode.
#[async_trait::async_trait]
pub trait ObjectProvider: Send + Sync {
    async fn object_ref(&self, id: &ObjectID) -> Result<ObjectInfo>;
}

/// Fixed set of objects, for tests and offline encoding.
#[derive(Debug, Clone, Default)]
pub struct StaticObjectProvider {
    objects: HashMap<ObjectID, ObjectInfo>,
}

impl StaticObjectProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: ObjectInfo) {
        self.objects.insert(info.reference.object_id, info);
    }

    /// Load a JSON array of `{ "objectId", "version", "digest", "owner" }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let infos: Vec<ObjectInfo> =
            serde_json::from_str(json).context("Failed to parse object file")?;
        let mut provider = Self::new();
        for info in infos {
            provider.insert(info);
        }
        Ok(provider)
    }
}

#[async_trait::async_trait]
impl ObjectProvider for StaticObjectProvider {
    async fn object_ref(&self, id: &ObjectID) -> Result<ObjectInfo> {
        self.objects
            .get(id)
            .copied()
            .ok_or_else(|| anyhow!("object {} not found", id.to_short_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_ptb_types::SuiAddress;

    #[tokio::test]
    async fn test_load_objects_json() {
        let json = r#"[
            {
                "objectId": "0x6",
                "version": 1,
                "digest": "11111111111111111111111111111111",
                "owner": { "kind": "shared", "initialSharedVersion": 1 }
            },
            {
                "objectId": "0xc0",
                "version": 42,
                "digest": "11111111111111111111111111111111",
                "owner": { "kind": "addressOwner", "address": "0xa11ce" }
            }
        ]"#;
        let provider = StaticObjectProvider::from_json(json).unwrap();

        let clock = provider.object_ref(&SuiAddress::from_u16(6)).await.unwrap();
        assert_eq!(
            clock.owner,
            ObjectOwner::Shared {
                initial_shared_version: 1
            }
        );

        let coin = provider.object_ref(&SuiAddress::from_u16(0xc0)).await.unwrap();
        assert_eq!(coin.reference.version, 42);

        let missing = provider.object_ref(&SuiAddress::from_u16(7)).await;
        assert_eq!(missing.unwrap_err().to_string(), "object 0x7 not found");
    }
}
