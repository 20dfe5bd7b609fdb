use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use kube::api::DynamicObject;
use kube::core::TypeMeta;
use kube::discovery::ApiResource;
use parking_lot::RwLock;

use crate::store::{ResourceStore, StoreError, StoreResult};

type Key = (String, String, String);

fn kind_key(kind: &ApiResource) -> String {
    format!("{}/{}", kind.api_version, kind.plural)
}

fn object_key(kind: &ApiResource, namespace: Option<&str>, name: &str) -> Key {
    (
        kind_key(kind),
        namespace.unwrap_or_default().to_string(),
        name.to_string(),
    )
}

#[derive(Default)]
struct Inner {
    objects: BTreeMap<Key, DynamicObject>,
    revision: u64,
    unavailable: bool,
}

impl Inner {
    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn next_revision(&mut self) -> String {
        self.revision += 1;
        self.revision.to_string()
    }
}

/// In-memory `ResourceStore` with the create/update/delete semantics of the
/// Kubernetes API server: name conflicts on create, NotFound on update and
/// delete of absent objects, and resourceVersion checks on update.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `object` as-is, bypassing every check. Used to seed objects
    /// that this crate would never write itself.
    pub fn insert_raw(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        object: DynamicObject,
    ) {
        let name = object.metadata.name.clone().unwrap_or_default();
        let key = object_key(kind, namespace, &name);
        self.inner.write().objects.insert(key, object);
    }

    /// While unavailable, every call fails with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.inner.write().unavailable = !available;
    }

    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn create(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        let mut inner = self.inner.write();
        inner.check_available()?;

        let name = resource
            .metadata
            .name
            .clone()
            .ok_or_else(|| StoreError::Invalid("metadata.name is required".to_string()))?;

        let key = object_key(kind, namespace, &name);
        if inner.objects.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "{} {:?} already exists",
                kind.kind, name
            )));
        }

        let revision = inner.next_revision();
        let mut object = resource.clone();
        object.types.get_or_insert_with(|| TypeMeta {
            api_version: kind.api_version.clone(),
            kind: kind.kind.clone(),
        });
        object.metadata.namespace = namespace.map(str::to_string);
        object.metadata.uid = Some(format!("memory-{:08}", revision));
        object.metadata.creation_timestamp = Some(Time(Utc::now()));
        object.metadata.resource_version = Some(revision);

        inner.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn get(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<DynamicObject> {
        let inner = self.inner.read();
        inner.check_available()?;

        inner
            .objects
            .get(&object_key(kind, namespace, name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} {:?} not found", kind.kind, name)))
    }

    async fn list(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<DynamicObject>> {
        let inner = self.inner.read();
        inner.check_available()?;

        let kind = kind_key(kind);
        Ok(inner
            .objects
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && namespace.map_or(true, |n| ns.as_str() == n))
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn update(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        let mut inner = self.inner.write();
        inner.check_available()?;

        if let Some(resource_name) = resource.metadata.name.as_deref() {
            if resource_name != name {
                return Err(StoreError::Invalid(format!(
                    "metadata.name {:?} does not match {:?}",
                    resource_name, name
                )));
            }
        }

        let key = object_key(kind, namespace, name);
        let current = inner
            .objects
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(format!("{} {:?} not found", kind.kind, name)))?;

        if let Some(expected) = resource.metadata.resource_version.as_deref() {
            if current.metadata.resource_version.as_deref() != Some(expected) {
                return Err(StoreError::Conflict(format!(
                    "{} {:?} was modified, resourceVersion {} is stale",
                    kind.kind, name, expected
                )));
            }
        }

        let uid = current.metadata.uid.clone();
        let creation_timestamp = current.metadata.creation_timestamp.clone();

        let revision = inner.next_revision();
        let mut object = resource.clone();
        object.types.get_or_insert_with(|| TypeMeta {
            api_version: kind.api_version.clone(),
            kind: kind.kind.clone(),
        });
        object.metadata.name = Some(name.to_string());
        object.metadata.namespace = namespace.map(str::to_string);
        object.metadata.uid = uid;
        object.metadata.creation_timestamp = creation_timestamp;
        object.metadata.resource_version = Some(revision);

        inner.objects.insert(key, object.clone());
        Ok(object)
    }

    async fn delete(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.check_available()?;

        inner
            .objects
            .remove(&object_key(kind, namespace, name))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{} {:?} not found", kind.kind, name)))
    }
}
