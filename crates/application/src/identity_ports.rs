use async_trait::async_trait;
use roleward_core::{AppResult, IdentitySource};
use roleward_domain::Principal;

/// Principal records kept by one identity source.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Returns the identity source this directory serves.
    fn source(&self) -> IdentitySource;

    /// Finds the record bound to a wallet address or account id.
    async fn find_by_identity(&self, identity: &str) -> AppResult<Option<Principal>>;

    /// Finds a record by id.
    async fn find_by_id(&self, principal_id: &str) -> AppResult<Option<Principal>>;

    /// Lists all records.
    async fn list_principals(&self) -> AppResult<Vec<Principal>>;

    /// Inserts or replaces a record.
    async fn save_principal(&self, principal: Principal) -> AppResult<()>;
}

/// Port for verifying login credentials in production mode.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns whether the secret is valid for the identity.
    async fn verify(&self, identity: &str, secret: &str) -> AppResult<bool>;
}
