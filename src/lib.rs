pub mod api;
pub mod crd;
pub mod manager;
pub mod translate;

pub use api::{BatchCreateRequest, BatchCreateResponse, BatchDeleteResponse};
pub use crd::{ClusterFederatedTrustDomain, ClusterFederatedTrustDomainSpec};
pub use manager::FederationManager;
pub use translate::{resource_name, Translator};

pub use spire_crd_core::{
    BatchCreateResult, BatchDeleteResult, BundleEndpointProfile, ErrorKind, FederationError,
    FederationRelationship, ManagerConfig, Result, SpiffeId, Status, TrustDomain, Url,
};
pub use spire_crd_storage::{KubeStore, MemoryStore, ResourceStore, StoreError, StoreResult};

pub mod prelude {
    pub use crate::api::{BatchCreateRequest, BatchCreateResponse, BatchDeleteResponse};
    pub use crate::manager::FederationManager;
    pub use crate::translate::Translator;

    pub use spire_crd_core::{
        BundleEndpointProfile, ErrorKind, FederationError, FederationRelationship, ManagerConfig,
        Result, SpiffeId, Status, TrustDomain, Url,
    };
    pub use spire_crd_storage::{KubeStore, MemoryStore, ResourceStore};

    pub use std::sync::Arc;
    pub use std::time::Duration;
}
