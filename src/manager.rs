use std::future::Future;

use futures::{stream, StreamExt};
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use kube::ResourceExt;
use serde_json::Value;
use spire_crd_core::{
    BatchCreateResult, BatchDeleteResult, ErrorKind, FederationError, FederationRelationship,
    ManagerConfig, Result, Status, TrustDomain,
};
use spire_crd_storage::{ResourceStore, StoreError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{BatchCreateRequest, BatchCreateResponse, BatchDeleteResponse};
use crate::crd;
use crate::translate::{resource_name, Translator};

const DEADLINE_EXCEEDED: &str = "deadline exceeded";

fn store_error_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::NotFound(_) => ErrorKind::NotFound,
        StoreError::Conflict(_) => ErrorKind::Conflict,
        StoreError::Invalid(_) => ErrorKind::Validation,
        StoreError::Unavailable(_) => ErrorKind::Unavailable,
    }
}

fn from_store_error(err: StoreError, trust_domain: &TrustDomain) -> FederationError {
    match err {
        StoreError::NotFound(_) => FederationError::NotFound(trust_domain.to_string()),
        StoreError::Conflict(msg) => FederationError::Conflict(msg),
        StoreError::Invalid(msg) => FederationError::Validation(msg),
        StoreError::Unavailable(msg) => FederationError::Unavailable(msg),
    }
}

/// Starts `work` only if `deadline` has not passed. Started work always runs
/// to completion, since the store may already have applied it. `None` means
/// the item was never started.
async fn before_deadline<F>(deadline: Option<Instant>, work: F) -> Option<F::Output>
where
    F: Future,
{
    match deadline {
        Some(deadline) if Instant::now() >= deadline => None,
        _ => Some(work.await),
    }
}

/// CRUD and batch operations on federation relationships backed by a
/// `ResourceStore`. Holds no state besides its configuration; the store is
/// the source of truth, so one manager can serve concurrent callers.
pub struct FederationManager<S> {
    store: S,
    translator: Translator,
    config: ManagerConfig,
}

impl<S> FederationManager<S>
where
    S: ResourceStore,
{
    /// Fails with `InvalidConfig` when a namespace is configured, since
    /// `ClusterFederatedTrustDomain` only exists at cluster scope.
    pub fn new(store: S, config: ManagerConfig) -> Result<Self> {
        if let Some(namespace) = config.namespace.as_deref() {
            if !crd::is_namespaced() {
                return Err(FederationError::InvalidConfig(format!(
                    "{} is cluster-scoped, namespace {:?} cannot be used",
                    crd::KIND,
                    namespace
                )));
            }
        }

        let translator = Translator::new(config.class_name.clone());
        Ok(Self {
            store,
            translator,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn kind(&self) -> &ApiResource {
        self.translator.api_resource()
    }

    fn namespace(&self) -> Option<&str> {
        self.config.namespace.as_deref()
    }

    /// Fetches the stored object for `trust_domain`, hiding objects that
    /// belong to another class.
    async fn fetch(&self, trust_domain: &TrustDomain) -> Result<DynamicObject> {
        let name = resource_name(trust_domain)?;
        let current = self
            .store
            .get(self.kind(), self.namespace(), &name)
            .await
            .map_err(|e| from_store_error(e, trust_domain))?;

        if !self.translator.is_managed(&current) {
            debug!("Ignoring {} owned by another class", current.name_any());
            return Err(FederationError::NotFound(trust_domain.to_string()));
        }

        Ok(current)
    }

    pub async fn create_federation_relationship(
        &self,
        relationship: &FederationRelationship,
    ) -> Result<FederationRelationship> {
        let resource = self.translator.to_stored_resource(relationship)?;

        let created = self
            .store
            .create(self.kind(), self.namespace(), &resource)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    FederationError::AlreadyExists(relationship.trust_domain.to_string())
                }
                other => from_store_error(other, &relationship.trust_domain),
            })?;

        let created = self.translator.from_stored_resource(&created)?;
        info!("Created federation relationship with {}", created.trust_domain);
        Ok(created)
    }

    pub async fn get_federation_relationship(
        &self,
        trust_domain: &TrustDomain,
    ) -> Result<FederationRelationship> {
        let current = self.fetch(trust_domain).await?;
        self.translator.from_stored_resource(&current)
    }

    /// Replaces the stored spec wholesale. The current object's metadata,
    /// including its resourceVersion, is carried over so a concurrent write
    /// in between surfaces as `Conflict`.
    pub async fn update_federation_relationship(
        &self,
        relationship: &FederationRelationship,
    ) -> Result<FederationRelationship> {
        let mut resource = self.translator.to_stored_resource(relationship)?;
        let current = self.fetch(&relationship.trust_domain).await?;

        let name = current.name_any();
        resource.metadata = current.metadata;

        let updated = self
            .store
            .update(self.kind(), self.namespace(), &name, &resource)
            .await
            .map_err(|e| from_store_error(e, &relationship.trust_domain))?;

        let updated = self.translator.from_stored_resource(&updated)?;
        info!("Updated federation relationship with {}", updated.trust_domain);
        Ok(updated)
    }

    /// Deleting an absent relationship is `NotFound`, not a no-op.
    pub async fn delete_federation_relationship(&self, trust_domain: &TrustDomain) -> Result<()> {
        let name = resource_name(trust_domain)?;

        if self.translator.class_name().is_some() {
            self.fetch(trust_domain).await?;
        }

        self.store
            .delete(self.kind(), self.namespace(), &name)
            .await
            .map_err(|e| from_store_error(e, trust_domain))?;

        info!("Deleted federation relationship with {}", trust_domain);
        Ok(())
    }

    /// All-or-nothing: one unparsable stored object fails the whole call.
    pub async fn list_federation_relationships(&self) -> Result<Vec<FederationRelationship>> {
        let items = self
            .store
            .list(self.kind(), self.namespace())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(msg) => FederationError::NotFound(msg),
                StoreError::Conflict(msg) => FederationError::Conflict(msg),
                StoreError::Invalid(msg) => FederationError::Validation(msg),
                StoreError::Unavailable(msg) => FederationError::Unavailable(msg),
            })?;

        let mut relationships = Vec::with_capacity(items.len());
        for item in &items {
            if !self.translator.is_managed(item) {
                debug!("Skipping {} owned by another class", item.name_any());
                continue;
            }
            relationships.push(self.translator.from_stored_resource(item)?);
        }

        debug!("Listed {} federation relationships", relationships.len());
        Ok(relationships)
    }

    /// Creates every item independently. `results[i]` always answers
    /// `request.federation_relationships[i]`; item failures are reported in
    /// place and never fail the call.
    pub async fn batch_create_federation_relationships(
        &self,
        request: BatchCreateRequest,
    ) -> BatchCreateResponse {
        let total = request.len();
        let deadline = self.config.batch_deadline.map(|d| Instant::now() + d);

        let results: Vec<BatchCreateResult> = stream::iter(request.federation_relationships)
            .map(|item| async move {
                before_deadline(deadline, self.batch_create_item(item))
                    .await
                    .unwrap_or_else(|| {
                        BatchCreateResult::failure(ErrorKind::DeadlineExceeded, DEADLINE_EXCEEDED)
                    })
            })
            .buffered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.status.is_ok()).count();
        info!(
            "Batch created {} of {} federation relationships",
            succeeded, total
        );

        BatchCreateResponse { results }
    }

    async fn batch_create_item(&self, item: Value) -> BatchCreateResult {
        let resource = match serde_json::from_value::<FederationRelationship>(item)
            .map_err(|e| e.to_string())
            .and_then(|relationship| {
                self.translator
                    .to_stored_resource(&relationship)
                    .map_err(|e| e.detail().to_string())
            }) {
            Ok(resource) => resource,
            Err(detail) => {
                warn!("Rejected batch item: {}", detail);
                return BatchCreateResult::failure(
                    ErrorKind::Validation,
                    format!("invalid input: {}", detail),
                );
            }
        };

        let created = match self
            .store
            .create(self.kind(), self.namespace(), &resource)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                let kind = match &e {
                    StoreError::Conflict(_) => ErrorKind::AlreadyExists,
                    other => store_error_kind(other),
                };
                warn!("Failed to create {}: {}", resource.name_any(), e);
                return BatchCreateResult::failure(kind, format!("store create error: {}", e));
            }
        };

        match self.translator.from_stored_resource(&created) {
            Ok(relationship) => {
                debug!("Created federation relationship with {}", relationship.trust_domain);
                BatchCreateResult::ok(relationship)
            }
            Err(e) => {
                warn!("Unreadable object returned for {}: {}", created.name_any(), e);
                BatchCreateResult::failure(
                    ErrorKind::Parse,
                    format!("invalid response: {}", e.detail()),
                )
            }
        }
    }

    /// Deletes every trust domain independently, with the ordering, deadline
    /// and partial-failure rules of batch create.
    pub async fn batch_delete_federation_relationships(
        &self,
        trust_domains: Vec<TrustDomain>,
    ) -> BatchDeleteResponse {
        let total = trust_domains.len();
        let deadline = self.config.batch_deadline.map(|d| Instant::now() + d);

        let results: Vec<BatchDeleteResult> = stream::iter(trust_domains)
            .map(|trust_domain| async move {
                let work = self.delete_federation_relationship(&trust_domain);
                let status = match before_deadline(deadline, work).await {
                    Some(Ok(())) => Status::Ok,
                    Some(Err(e)) => {
                        warn!("Failed to delete {}: {}", trust_domain, e);
                        Status::from(&e)
                    }
                    None => Status::failure(ErrorKind::DeadlineExceeded, DEADLINE_EXCEEDED),
                };
                BatchDeleteResult {
                    status,
                    trust_domain,
                }
            })
            .buffered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.status.is_ok()).count();
        info!(
            "Batch deleted {} of {} federation relationships",
            succeeded, total
        );

        BatchDeleteResponse { results }
    }
}
