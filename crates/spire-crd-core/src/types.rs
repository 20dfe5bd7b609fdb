use serde::{de, Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{FederationError, Result};

pub const SPIFFE_SCHEME: &str = "spiffe://";
pub const MAX_TRUST_DOMAIN_LENGTH: usize = 255;

fn is_trust_domain_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_')
}

fn is_path_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct TrustDomain(String);

impl TrustDomain {
    /// Accepts a bare name (`example.org`) or one prefixed with `spiffe://`.
    pub fn new(name: &str) -> Result<Self> {
        let name = name.strip_prefix(SPIFFE_SCHEME).unwrap_or(name);

        if name.is_empty() {
            return Err(FederationError::Validation("trust domain is empty".to_string()));
        }

        if name.len() > MAX_TRUST_DOMAIN_LENGTH {
            return Err(FederationError::Validation(format!(
                "trust domain exceeds {} bytes",
                MAX_TRUST_DOMAIN_LENGTH
            )));
        }

        if let Some(c) = name.chars().find(|c| !is_trust_domain_char(*c)) {
            return Err(FederationError::Validation(format!(
                "trust domain {:?} contains invalid character {:?}",
                name, c
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn id_string(&self) -> String {
        format!("{}{}", SPIFFE_SCHEME, self.0)
    }
}

impl std::fmt::Display for TrustDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TrustDomain {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TrustDomain {
    type Error = FederationError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<TrustDomain> for String {
    fn from(td: TrustDomain) -> Self {
        td.0
    }
}

impl<'de> Deserialize<'de> for TrustDomain {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::new(&name).map_err(|e| de::Error::custom(e.detail()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct SpiffeId {
    trust_domain: TrustDomain,
    path: String,
}

impl SpiffeId {
    pub fn new(id: &str) -> Result<Self> {
        let rest = id.strip_prefix(SPIFFE_SCHEME).ok_or_else(|| {
            FederationError::Validation(format!(
                "SPIFFE ID {:?} must start with {}",
                id, SPIFFE_SCHEME
            ))
        })?;

        let (trust_domain, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        let trust_domain = TrustDomain::new(trust_domain)?;

        if let Some(segments) = path.strip_prefix('/') {
            for segment in segments.split('/') {
                if segment.is_empty() {
                    return Err(FederationError::Validation(format!(
                        "SPIFFE ID {:?} has an empty path segment",
                        id
                    )));
                }
                if segment == "." || segment == ".." {
                    return Err(FederationError::Validation(format!(
                        "SPIFFE ID {:?} has a dot path segment",
                        id
                    )));
                }
                if let Some(c) = segment.chars().find(|c| !is_path_segment_char(*c)) {
                    return Err(FederationError::Validation(format!(
                        "SPIFFE ID {:?} contains invalid path character {:?}",
                        id, c
                    )));
                }
            }
        }

        Ok(Self {
            trust_domain,
            path: path.to_string(),
        })
    }

    pub fn trust_domain(&self) -> &TrustDomain {
        &self.trust_domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for SpiffeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", SPIFFE_SCHEME, self.trust_domain, self.path)
    }
}

impl std::str::FromStr for SpiffeId {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SpiffeId {
    type Error = FederationError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<SpiffeId> for String {
    fn from(id: SpiffeId) -> Self {
        id.to_string()
    }
}

impl<'de> Deserialize<'de> for SpiffeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        Self::new(&id).map_err(|e| de::Error::custom(e.detail()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleEndpointProfile {
    HttpsWeb,
    HttpsSpiffe { endpoint_spiffe_id: SpiffeId },
}

impl BundleEndpointProfile {
    pub const HTTPS_WEB: &'static str = "https_web";
    pub const HTTPS_SPIFFE: &'static str = "https_spiffe";

    pub fn https_spiffe(endpoint_spiffe_id: SpiffeId) -> Self {
        BundleEndpointProfile::HttpsSpiffe { endpoint_spiffe_id }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            BundleEndpointProfile::HttpsWeb => Self::HTTPS_WEB,
            BundleEndpointProfile::HttpsSpiffe { .. } => Self::HTTPS_SPIFFE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationRelationship {
    pub trust_domain: TrustDomain,
    pub bundle_endpoint_url: Url,
    pub bundle_endpoint_profile: BundleEndpointProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_domain_bundle: Option<String>,
}

impl FederationRelationship {
    pub fn new(
        trust_domain: TrustDomain,
        bundle_endpoint_url: Url,
        bundle_endpoint_profile: BundleEndpointProfile,
    ) -> Self {
        Self {
            trust_domain,
            bundle_endpoint_url,
            bundle_endpoint_profile,
            trust_domain_bundle: None,
        }
    }

    pub fn trust_domain_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.trust_domain_bundle = Some(bundle.into());
        self
    }
}
