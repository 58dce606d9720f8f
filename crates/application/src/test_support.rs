use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use roleward_core::{AppError, AppResult, IdentitySource};
use roleward_domain::{LogicalPrincipal, Principal, Role, RoleId, SystemRole};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, CredentialVerifier, PersistedSession, PrincipalDirectory,
    RoleRepository, SessionStore,
};

pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<BTreeMap<RoleId, Role>>,
    pub(crate) fail_reads: AtomicBool,
    pub(crate) list_reads: AtomicUsize,
}

impl FakeRoleRepository {
    pub(crate) fn seeded() -> Self {
        Self {
            roles: Mutex::new(
                SystemRole::all()
                    .iter()
                    .map(|role| (role.id(), role.definition()))
                    .collect(),
            ),
            fail_reads: AtomicBool::new(false),
            list_reads: AtomicUsize::new(0),
        }
    }

    pub(crate) async fn insert(&self, role: Role) {
        self.roles.lock().await.insert(role.id().clone(), role);
    }

    pub(crate) async fn get(&self, role_id: &str) -> Option<Role> {
        let role_id = RoleId::parse(role_id).ok()?;
        self.roles.lock().await.get(&role_id).cloned()
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.list_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("registry offline".to_owned()));
        }
        Ok(self.roles.lock().await.values().cloned().collect())
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.lock().await.get(role_id).cloned())
    }

    async fn insert_role(&self, role: Role) -> AppResult<Role> {
        let mut roles = self.roles.lock().await;
        if roles.contains_key(role.id()) {
            return Err(AppError::DuplicateRole(role.id().to_string()));
        }
        roles.insert(role.id().clone(), role.clone());
        Ok(role)
    }

    async fn replace_role(&self, role: Role) -> AppResult<Role> {
        self.roles
            .lock()
            .await
            .insert(role.id().clone(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        if let Some(role) = roles.get(role_id) {
            role.ensure_deletable()?;
        }
        roles.remove(role_id);
        Ok(())
    }

    async fn adjust_assigned_count(&self, role_id: &RoleId, delta: i64) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        if let Some(role) = roles.get(role_id).cloned() {
            roles.insert(role_id.clone(), role.with_assignment_delta(delta));
        }
        Ok(())
    }

    async fn set_assigned_count(&self, role_id: &RoleId, assigned_count: u32) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        if let Some(role) = roles.get(role_id).cloned() {
            roles.insert(role_id.clone(), role.with_assigned_count(assigned_count));
        }
        Ok(())
    }
}

pub(crate) struct FakePrincipalDirectory {
    pub(crate) source: IdentitySource,
    pub(crate) principals: Mutex<HashMap<String, Principal>>,
    pub(crate) fail_reads: AtomicBool,
}

impl FakePrincipalDirectory {
    pub(crate) fn new(source: IdentitySource) -> Self {
        Self {
            source,
            principals: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub(crate) async fn put(&self, principal: Principal) {
        self.principals
            .lock()
            .await
            .insert(principal.id().to_owned(), principal);
    }
}

#[async_trait]
impl PrincipalDirectory for FakePrincipalDirectory {
    fn source(&self) -> IdentitySource {
        self.source
    }

    async fn find_by_identity(&self, identity: &str) -> AppResult<Option<Principal>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!("{} directory offline", self.source)));
        }
        Ok(self
            .principals
            .lock()
            .await
            .values()
            .find(|principal| principal.bound_identity() == identity)
            .cloned())
    }

    async fn find_by_id(&self, principal_id: &str) -> AppResult<Option<Principal>> {
        Ok(self.principals.lock().await.get(principal_id).cloned())
    }

    async fn list_principals(&self) -> AppResult<Vec<Principal>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal(format!("{} directory offline", self.source)));
        }
        Ok(self.principals.lock().await.values().cloned().collect())
    }

    async fn save_principal(&self, principal: Principal) -> AppResult<()> {
        self.put(principal).await;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSessionStore {
    pub(crate) records: Mutex<HashMap<String, PersistedSession>>,
    pub(crate) fail_writes: AtomicBool,
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn save(&self, key: &str, record: &PersistedSession) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("session storage quota exceeded".to_owned()));
        }
        self.records
            .lock()
            .await
            .insert(key.to_owned(), record.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> AppResult<Option<PersistedSession>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        self.records.lock().await.remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeCredentialVerifier {
    pub(crate) secrets: HashMap<String, String>,
}

#[async_trait]
impl CredentialVerifier for FakeCredentialVerifier {
    async fn verify(&self, identity: &str, secret: &str) -> AppResult<bool> {
        Ok(self
            .secrets
            .get(identity)
            .is_some_and(|stored| stored == secret))
    }
}

pub(crate) fn principal(
    id: &str,
    source: IdentitySource,
    bound_identity: &str,
    role: SystemRole,
) -> AppResult<Principal> {
    Principal::new(id, source, bound_identity, role.id(), Utc::now())
}

pub(crate) fn actor(role: SystemRole) -> AppResult<LogicalPrincipal> {
    Ok(LogicalPrincipal::single(principal(
        &format!("actor-{}", role.id_str()),
        IdentitySource::Unified,
        &format!("account-{}", role.id_str()),
        role,
    )?))
}
