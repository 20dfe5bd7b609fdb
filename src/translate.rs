use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde_json::json;
use spire_crd_core::{
    BundleEndpointProfile, FederationError, FederationRelationship, Result, SpiffeId, TrustDomain,
    Url,
};

use crate::crd::{self, BundleEndpointProfileSpec, ClusterFederatedTrustDomainSpec};

pub const MAX_RESOURCE_NAME_LENGTH: usize = 253;

fn is_dns_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Object name for a trust domain. The name is the trust domain itself, so it
/// must already be a DNS-1123 subdomain.
pub fn resource_name(trust_domain: &TrustDomain) -> Result<String> {
    let name = trust_domain.as_str();

    if name.len() > MAX_RESOURCE_NAME_LENGTH || !name.split('.').all(is_dns_label) {
        return Err(FederationError::Validation(format!(
            "trust domain {:?} cannot be used as a resource name",
            name
        )));
    }

    Ok(name.to_string())
}

/// Converts between `FederationRelationship` and the stored custom resource.
///
/// Every assumption about the layout of the resource's `spec` mapping lives
/// here. `from_stored_resource` is the inverse of `to_stored_resource` for
/// everything the latter produces.
#[derive(Debug, Clone)]
pub struct Translator {
    api_resource: ApiResource,
    class_name: Option<String>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Translator {
    pub fn new(class_name: Option<String>) -> Self {
        Self {
            api_resource: crd::api_resource(),
            class_name,
        }
    }

    pub fn api_resource(&self) -> &ApiResource {
        &self.api_resource
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn to_stored_resource(&self, relationship: &FederationRelationship) -> Result<DynamicObject> {
        let name = resource_name(&relationship.trust_domain)?;

        if relationship.bundle_endpoint_url.scheme() != "https" {
            return Err(FederationError::Validation(format!(
                "bundle endpoint URL {:?} must use https",
                relationship.bundle_endpoint_url.as_str()
            )));
        }

        let endpoint_spiffe_id = match &relationship.bundle_endpoint_profile {
            BundleEndpointProfile::HttpsWeb => None,
            BundleEndpointProfile::HttpsSpiffe { endpoint_spiffe_id } => {
                Some(endpoint_spiffe_id.to_string())
            }
        };

        let spec = ClusterFederatedTrustDomainSpec {
            trust_domain: relationship.trust_domain.to_string(),
            bundle_endpoint_url: relationship.bundle_endpoint_url.to_string(),
            bundle_endpoint_profile: BundleEndpointProfileSpec {
                type_: relationship.bundle_endpoint_profile.type_name().to_string(),
                endpoint_spiffe_id,
            },
            trust_domain_bundle: relationship.trust_domain_bundle.clone(),
            class_name: self.class_name.clone(),
        };

        let spec = serde_json::to_value(&spec)
            .map_err(|e| FederationError::Validation(format!("encoding spec: {}", e)))?;

        Ok(DynamicObject::new(&name, &self.api_resource).data(json!({ "spec": spec })))
    }

    pub fn from_stored_resource(&self, resource: &DynamicObject) -> Result<FederationRelationship> {
        let name = resource.metadata.name.as_deref().unwrap_or("<unnamed>");
        let parse_err = |detail: String| FederationError::Parse(format!("{}: {}", name, detail));

        if let Some(types) = &resource.types {
            if types.api_version != self.api_resource.api_version
                || types.kind != self.api_resource.kind
            {
                return Err(parse_err(format!(
                    "unsupported resource type {}/{}",
                    types.api_version, types.kind
                )));
            }
        }

        let spec = resource
            .data
            .get("spec")
            .ok_or_else(|| parse_err("missing spec".to_string()))?;

        let spec: ClusterFederatedTrustDomainSpec =
            serde_json::from_value(spec.clone()).map_err(|e| parse_err(e.to_string()))?;

        let trust_domain =
            TrustDomain::new(&spec.trust_domain).map_err(|e| parse_err(e.detail().to_string()))?;

        let bundle_endpoint_url = Url::parse(&spec.bundle_endpoint_url).map_err(|e| {
            parse_err(format!(
                "bundle endpoint URL {:?}: {}",
                spec.bundle_endpoint_url, e
            ))
        })?;

        let profile = spec.bundle_endpoint_profile;
        let bundle_endpoint_profile = match profile.type_.as_str() {
            BundleEndpointProfile::HTTPS_WEB => BundleEndpointProfile::HttpsWeb,
            BundleEndpointProfile::HTTPS_SPIFFE => {
                let id = profile.endpoint_spiffe_id.as_deref().ok_or_else(|| {
                    parse_err("https_spiffe profile without endpointSPIFFEID".to_string())
                })?;
                let endpoint_spiffe_id =
                    SpiffeId::new(id).map_err(|e| parse_err(e.detail().to_string()))?;
                BundleEndpointProfile::HttpsSpiffe { endpoint_spiffe_id }
            }
            other => {
                return Err(parse_err(format!(
                    "unknown bundle endpoint profile {:?}",
                    other
                )))
            }
        };

        Ok(FederationRelationship {
            trust_domain,
            bundle_endpoint_url,
            bundle_endpoint_profile,
            trust_domain_bundle: spec.trust_domain_bundle,
        })
    }

    /// Whether `resource` belongs to this translator's class. Resources
    /// without a `className` belong to every class.
    pub fn is_managed(&self, resource: &DynamicObject) -> bool {
        let Some(class_name) = self.class_name.as_deref() else {
            return true;
        };

        match resource.data.pointer("/spec/className").and_then(|v| v.as_str()) {
            Some(owner) => owner == class_name,
            None => true,
        }
    }
}
