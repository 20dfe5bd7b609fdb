mod common;

use async_trait::async_trait;
use common::{https_spiffe, https_web, memory_manager, trust_domain};
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde_json::json;
use spire_crd::crd;
use spire_crd::prelude::*;
use spire_crd::{StoreError, StoreResult};

#[tokio::test]
async fn create_conflict_delete_list_scenario() {
    let (store, manager) = memory_manager(ManagerConfig::default());
    let relationship = https_web("example.org");

    let created = manager
        .create_federation_relationship(&relationship)
        .await
        .unwrap();
    assert_eq!(created, relationship);

    let err = manager
        .create_federation_relationship(&https_spiffe("example.org"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(store.len(), 1);
    assert_eq!(
        manager
            .get_federation_relationship(&trust_domain("example.org"))
            .await
            .unwrap(),
        relationship
    );

    manager
        .delete_federation_relationship(&trust_domain("example.org"))
        .await
        .unwrap();

    let listed = manager.list_federation_relationships().await.unwrap();
    assert!(listed.iter().all(|r| r.trust_domain.as_str() != "example.org"));

    let err = manager
        .get_federation_relationship(&trust_domain("example.org"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn create_rejects_invalid_input_before_store() {
    let (store, manager) = memory_manager(ManagerConfig::default());

    let err = manager
        .create_federation_relationship(&https_web("bad_name.org"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(store.is_empty());
}

#[tokio::test]
async fn create_reports_unavailable_store() {
    let (store, manager) = memory_manager(ManagerConfig::default());
    store.set_available(false);

    let err = manager
        .create_federation_relationship(&https_web("example.org"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[tokio::test]
async fn update_replaces_the_whole_spec() {
    let (_store, manager) = memory_manager(ManagerConfig::default());
    manager
        .create_federation_relationship(&https_spiffe("example.org").trust_domain_bundle("{}"))
        .await
        .unwrap();

    let replacement = https_web("example.org");
    let updated = manager
        .update_federation_relationship(&replacement)
        .await
        .unwrap();

    assert_eq!(updated, replacement);
    assert_eq!(updated.trust_domain_bundle, None);
    assert_eq!(
        manager
            .get_federation_relationship(&trust_domain("example.org"))
            .await
            .unwrap(),
        replacement
    );
}

#[tokio::test]
async fn update_of_absent_relationship_is_not_found() {
    let (store, manager) = memory_manager(ManagerConfig::default());

    let err = manager
        .update_federation_relationship(&https_web("example.org"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(store.is_empty());
}

#[tokio::test]
async fn delete_of_absent_relationship_is_not_found() {
    let (_store, manager) = memory_manager(ManagerConfig::default());

    let err = manager
        .delete_federation_relationship(&trust_domain("example.org"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.detail(), "example.org");
}

#[tokio::test]
async fn list_returns_every_relationship() {
    let (_store, manager) = memory_manager(ManagerConfig::default());
    for td in ["a.example", "b.example", "c.example"] {
        manager
            .create_federation_relationship(&https_web(td))
            .await
            .unwrap();
    }

    let listed = manager.list_federation_relationships().await.unwrap();

    let names: Vec<_> = listed.iter().map(|r| r.trust_domain.as_str()).collect();
    assert_eq!(names, ["a.example", "b.example", "c.example"]);
}

#[tokio::test]
async fn list_fails_whole_on_one_bad_item() {
    let (store, manager) = memory_manager(ManagerConfig::default());
    manager
        .create_federation_relationship(&https_web("a.example"))
        .await
        .unwrap();
    manager
        .create_federation_relationship(&https_web("c.example"))
        .await
        .unwrap();

    let kind = crd::api_resource();
    let broken = DynamicObject::new("b.example", &kind)
        .data(json!({ "spec": { "trustDomain": "b.example" } }));
    store.insert_raw(&kind, None, broken);

    let err = manager.list_federation_relationships().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("b.example"));
}

/// Answers every call as an API server without the CRD installed would.
struct MissingKindStore;

#[async_trait]
impl ResourceStore for MissingKindStore {
    async fn create(
        &self,
        kind: &ApiResource,
        _namespace: Option<&str>,
        _resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        Err(StoreError::NotFound(kind.plural.clone()))
    }

    async fn get(
        &self,
        kind: &ApiResource,
        _namespace: Option<&str>,
        _name: &str,
    ) -> StoreResult<DynamicObject> {
        Err(StoreError::NotFound(kind.plural.clone()))
    }

    async fn list(
        &self,
        kind: &ApiResource,
        _namespace: Option<&str>,
    ) -> StoreResult<Vec<DynamicObject>> {
        Err(StoreError::NotFound(kind.plural.clone()))
    }

    async fn update(
        &self,
        kind: &ApiResource,
        _namespace: Option<&str>,
        _name: &str,
        _resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        Err(StoreError::NotFound(kind.plural.clone()))
    }

    async fn delete(
        &self,
        kind: &ApiResource,
        _namespace: Option<&str>,
        _name: &str,
    ) -> StoreResult<()> {
        Err(StoreError::NotFound(kind.plural.clone()))
    }
}

#[tokio::test]
async fn list_without_installed_kind_is_not_found() {
    let manager = FederationManager::new(MissingKindStore, ManagerConfig::default()).unwrap();

    let err = manager.list_federation_relationships().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains(crd::PLURAL));
}

#[tokio::test]
async fn list_reports_unavailable_store() {
    let (store, manager) = memory_manager(ManagerConfig::default());
    store.set_available(false);

    let err = manager.list_federation_relationships().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

#[tokio::test]
async fn namespace_is_rejected_for_cluster_scoped_resources() {
    assert!(!crd::is_namespaced());

    let store = Arc::new(MemoryStore::new());
    let err = FederationManager::new(Arc::clone(&store), ManagerConfig::new().namespace("a"))
        .err()
        .unwrap();

    assert!(matches!(err, FederationError::InvalidConfig(_)));
    assert!(err.to_string().contains("cluster-scoped"));
}

#[tokio::test]
async fn writes_go_to_cluster_scope() {
    let (store, manager) = memory_manager(ManagerConfig::default());

    manager
        .create_federation_relationship(&https_web("example.org"))
        .await
        .unwrap();

    let stored = store
        .get(&crd::api_resource(), None, "example.org")
        .await
        .unwrap();
    assert_eq!(stored.metadata.namespace, None);
}

#[tokio::test]
async fn other_classes_are_invisible() {
    let store = Arc::new(MemoryStore::new());
    let ours =
        FederationManager::new(Arc::clone(&store), ManagerConfig::new().class_name("ours"))
            .unwrap();
    let theirs =
        FederationManager::new(Arc::clone(&store), ManagerConfig::new().class_name("theirs"))
            .unwrap();

    theirs
        .create_federation_relationship(&https_web("theirs.example"))
        .await
        .unwrap();
    ours.create_federation_relationship(&https_web("ours.example"))
        .await
        .unwrap();

    let listed = ours.list_federation_relationships().await.unwrap();
    assert_eq!(listed, vec![https_web("ours.example")]);

    let td = trust_domain("theirs.example");
    assert_eq!(
        ours.get_federation_relationship(&td).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ours.update_federation_relationship(&https_web("theirs.example"))
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ours.delete_federation_relationship(&td).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_manager() {
    let (store, manager) = memory_manager(ManagerConfig::default());
    let manager = Arc::new(manager);

    let mut handles = Vec::new();
    for i in 0..16 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager
                .create_federation_relationship(&https_web(&format!("td{}.example", i)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 16);
    assert_eq!(manager.list_federation_relationships().await.unwrap().len(), 16);
}
