use serde::{Deserialize, Serialize};
use serde_json::Value;
use spire_crd_core::{
    BatchCreateResult, BatchDeleteResult, FederationError, FederationRelationship, Result,
};

/// Items are kept as raw JSON so that one undecodable item fails on its own
/// instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchCreateRequest {
    pub federation_relationships: Vec<Value>,
}

impl BatchCreateRequest {
    pub fn new(relationships: impl IntoIterator<Item = FederationRelationship>) -> Result<Self> {
        let federation_relationships = relationships
            .into_iter()
            .map(|r| {
                serde_json::to_value(&r).map_err(|e| {
                    FederationError::Validation(format!(
                        "encoding federation relationship {}: {}",
                        r.trust_domain, e
                    ))
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            federation_relationships,
        })
    }

    /// Fails only when the envelope itself cannot be read.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            FederationError::Validation(format!("malformed batch create request: {}", e))
        })
    }

    pub fn raw_item(mut self, item: Value) -> Self {
        self.federation_relationships.push(item);
        self
    }

    pub fn len(&self) -> usize {
        self.federation_relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.federation_relationships.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchCreateResponse {
    pub results: Vec<BatchCreateResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchDeleteResponse {
    pub results: Vec<BatchDeleteResult>,
}
