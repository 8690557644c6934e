//! Process-wide settings, fixed at startup and shared read-only.
//!
//! Settings::new validates the base URL; `bootstrap` resolves the ambient
//! organization when a token is configured.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::choreo::{ChoreoClient, Organization, check_base_url};

/// Organization identifiers resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgContext {
    pub id: String,
    pub uuid: String,
    pub handle: String,
    pub name: String,
}

impl From<&Organization> for OrgContext {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id.clone(),
            uuid: org.uuid.clone(),
            handle: org.handle.clone(),
            name: org.name.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Settings {
    pub base_url: Url,
    pub timeout: Duration,
    token: Option<SecretString>,
    org_selector: Option<String>,
    organization: Option<OrgContext>,
}

impl Settings {
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        token: Option<String>,
        org_selector: Option<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("Invalid base URL: '{base_url}'"))?;
        check_base_url(&base_url)?;
        if timeout_secs == 0 {
            bail!("timeout must be at least 1 second");
        }
        let token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(SecretString::from);
        let org_selector = org_selector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if org_selector.is_some() && token.is_none() {
            bail!("--org / CHOREO_ORG requires a token (--token or CHOREO_TOKEN)");
        }
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            token,
            org_selector,
            organization: None,
        })
    }

    /// Ambient bearer token, if one was configured.
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    pub fn organization(&self) -> Option<&OrgContext> {
        self.organization.as_ref()
    }

    pub fn with_organization(mut self, org: OrgContext) -> Self {
        self.organization = Some(org);
        self
    }

    /// Resolve the ambient organization with the configured token.
    ///
    /// No-op without a token. With a token, failing to find an organization
    /// is fatal for the process.
    pub async fn bootstrap(self, client: &ChoreoClient) -> Result<Self> {
        let Some(token) = self.token() else {
            tracing::warn!("no ambient token configured; tools will require a 'token' argument");
            return Ok(self);
        };
        let orgs = client
            .fetch_organizations(token)
            .await
            .context("Failed to resolve organization at startup")?;
        let org = select_organization(&orgs, self.org_selector.as_deref())?;
        tracing::info!(
            org.handle = %org.handle,
            org.id = %org.id,
            org.uuid = %org.uuid,
            "resolved ambient organization"
        );
        Ok(self.with_organization(org))
    }
}

/// Pick the organization matching `selector` (handle, case-insensitive; id;
/// or uuid), or the first one when no selector is given.
pub fn select_organization(orgs: &[Organization], selector: Option<&str>) -> Result<OrgContext> {
    if orgs.is_empty() {
        bail!("no organizations are visible to the configured token");
    }
    let Some(sel) = selector else {
        return Ok(OrgContext::from(&orgs[0]));
    };
    orgs.iter()
        .find(|o| o.handle.eq_ignore_ascii_case(sel) || o.id == sel || o.uuid == sel)
        .map(OrgContext::from)
        .with_context(|| {
            let known: Vec<&str> = orgs.iter().map(|o| o.handle.as_str()).collect();
            format!(
                "organization '{sel}' not found (available: {})",
                known.join(", ")
            )
        })
}
