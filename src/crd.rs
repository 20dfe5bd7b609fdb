//! The `ClusterFederatedTrustDomain` custom resource.
//!
//! Only the spec shape is modelled here. Stored objects are read and written
//! as `DynamicObject`s by the translator, which uses these types to give the
//! untyped `spec` mapping a checked layout.

use kube::discovery::ApiResource;
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "spire.spiffe.io";
pub const VERSION: &str = "v1alpha1";
pub const KIND: &str = "ClusterFederatedTrustDomain";
pub const PLURAL: &str = "clusterfederatedtrustdomains";

/// A federation relationship with a remote trust domain.
///
/// ```yaml
/// apiVersion: spire.spiffe.io/v1alpha1
/// kind: ClusterFederatedTrustDomain
/// metadata:
///   name: example.org
/// spec:
///   trustDomain: example.org
///   bundleEndpointURL: https://example.org/bundle
///   bundleEndpointProfile:
///     type: https_spiffe
///     endpointSPIFFEID: spiffe://example.org/spire/server
/// ```
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "spire.spiffe.io",
    version = "v1alpha1",
    kind = "ClusterFederatedTrustDomain",
    plural = "clusterfederatedtrustdomains",
    shortname = "cftd",
    printcolumn = r#"{"name":"Trust Domain", "type":"string", "jsonPath":".spec.trustDomain"}"#,
    printcolumn = r#"{"name":"Endpoint URL", "type":"string", "jsonPath":".spec.bundleEndpointURL"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterFederatedTrustDomainSpec {
    pub trust_domain: String,

    #[serde(rename = "bundleEndpointURL")]
    pub bundle_endpoint_url: String,

    pub bundle_endpoint_profile: BundleEndpointProfileSpec,

    /// SPIFFE bundle document seeding the remote trust domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_domain_bundle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BundleEndpointProfileSpec {
    /// `https_web` or `https_spiffe`.
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(
        rename = "endpointSPIFFEID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub endpoint_spiffe_id: Option<String>,
}

pub fn api_resource() -> ApiResource {
    ApiResource::erase::<ClusterFederatedTrustDomain>(&())
}

/// Whether the resource lives in namespaces, as declared by the derive.
pub fn is_namespaced() -> bool {
    ClusterFederatedTrustDomain::crd().spec.scope == "Namespaced"
}
