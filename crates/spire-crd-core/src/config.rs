use std::time::Duration;

use crate::FederationError;

pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// `None` addresses the resources at cluster scope. Cluster-scoped kinds
    /// reject any other value.
    pub namespace: Option<String>,
    pub class_name: Option<String>,
    pub batch_concurrency: usize,
    pub batch_deadline: Option<Duration>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            class_name: None,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            batch_deadline: None,
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SPIRE_FEDERATION_NAMESPACE") {
            config.namespace = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var("SPIRE_FEDERATION_CLASS_NAME") {
            config.class_name = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var("SPIRE_FEDERATION_BATCH_CONCURRENCY") {
            config.batch_concurrency = match val.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(FederationError::InvalidConfig(
                        "Invalid SPIRE_FEDERATION_BATCH_CONCURRENCY".to_string(),
                    ))
                }
            };
        }

        if let Ok(val) = std::env::var("SPIRE_FEDERATION_BATCH_DEADLINE_MS") {
            let millis: u64 = val.parse().map_err(|_| {
                FederationError::InvalidConfig(
                    "Invalid SPIRE_FEDERATION_BATCH_DEADLINE_MS".to_string(),
                )
            })?;
            config.batch_deadline = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }

    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    pub fn cluster_scoped(mut self) -> Self {
        self.namespace = None;
        self
    }

    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    pub fn batch_concurrency(mut self, n: usize) -> Self {
        self.batch_concurrency = n.max(1);
        self
    }

    pub fn batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = Some(deadline);
        self
    }
}
