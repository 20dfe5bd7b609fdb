use std::sync::Arc;

use async_trait::async_trait;
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rejected by store: {0}")]
    Invalid(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(e) if e.code == 404 => StoreError::NotFound(e.message),
            kube::Error::Api(e) if e.code == 409 => StoreError::Conflict(e.message),
            kube::Error::Api(e) if e.code == 400 || e.code == 422 => StoreError::Invalid(e.message),
            kube::Error::Api(e) => StoreError::Unavailable(format!("{} ({})", e.message, e.code)),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Create/get/list/update/delete of named resources of one kind.
///
/// `namespace` is `None` for cluster-scoped access. `update` has replace
/// semantics: the stored object becomes `resource`, subject to the store's
/// optimistic concurrency on `metadata.resourceVersion`.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn create(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject>;

    async fn get(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<DynamicObject>;

    async fn list(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<DynamicObject>>;

    async fn update(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject>;

    async fn delete(&self, kind: &ApiResource, namespace: Option<&str>, name: &str)
        -> StoreResult<()>;
}

#[async_trait]
impl<S> ResourceStore for Arc<S>
where
    S: ResourceStore + ?Sized,
{
    async fn create(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        (**self).create(kind, namespace, resource).await
    }

    async fn get(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<DynamicObject> {
        (**self).get(kind, namespace, name).await
    }

    async fn list(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<DynamicObject>> {
        (**self).list(kind, namespace).await
    }

    async fn update(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        (**self).update(kind, namespace, name, resource).await
    }

    async fn delete(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        (**self).delete(kind, namespace, name).await
    }
}
