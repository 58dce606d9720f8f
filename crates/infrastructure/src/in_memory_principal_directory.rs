use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use roleward_application::PrincipalDirectory;
use roleward_core::{AppError, AppResult, IdentitySource};
use roleward_domain::{Permission, Principal, RoleId};
use serde::Deserialize;
use tokio::sync::RwLock;

/// In-memory principal records for one identity source.
#[derive(Debug)]
pub struct InMemoryPrincipalDirectory {
    source: IdentitySource,
    principals: RwLock<HashMap<String, Principal>>,
}

impl InMemoryPrincipalDirectory {
    /// Creates an empty directory for an identity source.
    #[must_use]
    pub fn new(source: IdentitySource) -> Self {
        Self {
            source,
            principals: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a directory holding the given records.
    ///
    /// Records owned by another identity source are rejected.
    pub fn with_principals(
        source: IdentitySource,
        principals: impl IntoIterator<Item = Principal>,
    ) -> AppResult<Self> {
        let mut by_id = HashMap::new();
        for principal in principals {
            if principal.identity_source() != source {
                return Err(AppError::Validation(format!(
                    "principal '{}' belongs to the {} source, not {source}",
                    principal.id(),
                    principal.identity_source()
                )));
            }
            by_id.insert(principal.id().to_owned(), principal);
        }

        Ok(Self {
            source,
            principals: RwLock::new(by_id),
        })
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryPrincipalDirectory {
    fn source(&self) -> IdentitySource {
        self.source
    }

    async fn find_by_identity(&self, identity: &str) -> AppResult<Option<Principal>> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|principal| principal.bound_identity() == identity)
            .cloned())
    }

    async fn find_by_id(&self, principal_id: &str) -> AppResult<Option<Principal>> {
        Ok(self.principals.read().await.get(principal_id).cloned())
    }

    async fn list_principals(&self) -> AppResult<Vec<Principal>> {
        let mut values: Vec<Principal> = self.principals.read().await.values().cloned().collect();
        values.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(values)
    }

    async fn save_principal(&self, principal: Principal) -> AppResult<()> {
        if principal.identity_source() != self.source {
            return Err(AppError::Validation(format!(
                "principal '{}' cannot be stored in the {} directory",
                principal.id(),
                self.source
            )));
        }

        self.principals
            .write()
            .await
            .insert(principal.id().to_owned(), principal);
        Ok(())
    }
}

/// Principal records for both identity sources, as read from a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct PrincipalSeed {
    #[serde(default)]
    legacy: Vec<PrincipalSeedEntry>,
    #[serde(default)]
    unified: Vec<PrincipalSeedEntry>,
}

#[derive(Debug, Deserialize)]
struct PrincipalSeedEntry {
    id: String,
    bound_identity: String,
    role: String,
    #[serde(default)]
    explicit_overrides: Vec<String>,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

impl PrincipalSeed {
    /// Parses a seed document.
    pub fn from_json(document: &str) -> AppResult<Self> {
        serde_json::from_str(document)
            .map_err(|error| AppError::Validation(format!("invalid principal seed: {error}")))
    }

    /// Builds the directory for one identity source.
    pub fn directory(&self, source: IdentitySource) -> AppResult<InMemoryPrincipalDirectory> {
        let entries = match source {
            IdentitySource::Legacy => &self.legacy,
            IdentitySource::Unified => &self.unified,
        };

        let principals = entries
            .iter()
            .map(|entry| entry.to_principal(source))
            .collect::<AppResult<Vec<_>>>()?;

        InMemoryPrincipalDirectory::with_principals(source, principals)
    }
}

impl PrincipalSeedEntry {
    fn to_principal(&self, source: IdentitySource) -> AppResult<Principal> {
        let overrides = self
            .explicit_overrides
            .iter()
            .map(|value| value.parse::<Permission>())
            .collect::<AppResult<BTreeSet<_>>>()?;

        Ok(Principal::new(
            self.id.as_str(),
            source,
            self.bound_identity.as_str(),
            RoleId::parse(self.role.as_str())?,
            Utc::now(),
        )?
        .with_overrides(overrides)
        .with_active(self.is_active))
    }
}
