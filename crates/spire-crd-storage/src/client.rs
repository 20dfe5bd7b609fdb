use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::discovery::ApiResource;
use kube::Client;
use tracing::debug;

use crate::store::{ResourceStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn try_default() -> StoreResult<Self> {
        let client = Client::try_default().await.map_err(StoreError::from)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn api(&self, kind: &ApiResource, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, kind),
            None => Api::all_with(self.client.clone(), kind),
        }
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn create(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        debug!(
            "Creating {} {:?}",
            kind.kind,
            resource.metadata.name.as_deref().unwrap_or_default()
        );

        let api = self.api(kind, namespace);
        Ok(api.create(&PostParams::default(), resource).await?)
    }

    async fn get(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<DynamicObject> {
        let api = self.api(kind, namespace);
        Ok(api.get(name).await?)
    }

    async fn list(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
    ) -> StoreResult<Vec<DynamicObject>> {
        let api = self.api(kind, namespace);
        let list = api.list(&ListParams::default()).await?;
        debug!("Listed {} {} objects", list.items.len(), kind.kind);
        Ok(list.items)
    }

    async fn update(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
        resource: &DynamicObject,
    ) -> StoreResult<DynamicObject> {
        debug!("Replacing {} {:?}", kind.kind, name);

        let api = self.api(kind, namespace);
        Ok(api.replace(name, &PostParams::default(), resource).await?)
    }

    async fn delete(
        &self,
        kind: &ApiResource,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        debug!("Deleting {} {:?}", kind.kind, name);

        let api = self.api(kind, namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}
