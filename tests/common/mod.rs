#![allow(dead_code)]

use std::sync::Arc;

use spire_crd::prelude::*;

pub fn trust_domain(name: &str) -> TrustDomain {
    TrustDomain::new(name).unwrap()
}

pub fn https_web(td: &str) -> FederationRelationship {
    FederationRelationship::new(
        trust_domain(td),
        Url::parse(&format!("https://{}/bundle", td)).unwrap(),
        BundleEndpointProfile::HttpsWeb,
    )
}

pub fn https_spiffe(td: &str) -> FederationRelationship {
    let id = SpiffeId::new(&format!("spiffe://{}/spire/server", td)).unwrap();
    FederationRelationship::new(
        trust_domain(td),
        Url::parse(&format!("https://{}:8443", td)).unwrap(),
        BundleEndpointProfile::https_spiffe(id),
    )
}

pub fn memory_manager(
    config: ManagerConfig,
) -> (Arc<MemoryStore>, FederationManager<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::new());
    let manager = FederationManager::new(Arc::clone(&store), config).unwrap();
    (store, manager)
}
