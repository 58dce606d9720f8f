use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::info;

use roleward_application::RoleRepository;
use roleward_core::{AppError, AppResult};
use roleward_domain::{Permission, Role, RoleId, SystemRole};


/// PostgreSQL-backed role registry.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts missing system roles with their default grants.
    ///
    /// Roles that already exist keep their stored permission sets.
    pub async fn seed_system_roles(&self) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for system_role in SystemRole::all() {
            let role = system_role.definition();
            let inserted = sqlx::query_scalar::<_, String>(
                r#"
                INSERT INTO roleward_roles (id, name, description, is_system)
                VALUES ($1, $2, $3, true)
                ON CONFLICT (id) DO NOTHING
                RETURNING id
                "#,
            )
            .bind(role.id().as_str())
            .bind(role.name())
            .bind(role.description())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to seed system role: {error}")))?;

            if inserted.is_some() {
                insert_grants(&mut transaction, role.id(), role.permissions()).await?;
                info!(role_id = %role.id(), "seeded system role");
            }
        }

        commit(transaction).await
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: String,
    role_name: String,
    description: String,
    is_system: bool,
    assigned_count: i32,
    permission: Option<String>,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.description,
                roles.is_system,
                roles.assigned_count,
                grants.permission
            FROM roleward_roles AS roles
            LEFT JOIN roleward_role_grants AS grants
                ON grants.role_id = roles.id
            ORDER BY roles.id, grants.permission
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        aggregate_roles(rows)
    }

    async fn find_role(&self, role_id: &RoleId) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.description,
                roles.is_system,
                roles.assigned_count,
                grants.permission
            FROM roleward_roles AS roles
            LEFT JOIN roleward_role_grants AS grants
                ON grants.role_id = roles.id
            WHERE roles.id = $1
            ORDER BY grants.permission
            "#,
        )
        .bind(role_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    async fn insert_role(&self, role: Role) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO roleward_roles (id, name, description, is_system, assigned_count)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id().as_str())
        .bind(role.name())
        .bind(role.description())
        .bind(role.is_system())
        .bind(stored_count(role.assigned_count())?)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role.id()))?;

        insert_grants(&mut transaction, role.id(), role.permissions()).await?;
        commit(transaction).await?;

        Ok(role)
    }

    async fn replace_role(&self, role: Role) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE roleward_roles
            SET description = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_str())
        .bind(role.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM roleward_role_grants
            WHERE role_id = $1
            "#,
        )
        .bind(role.id().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear role grants: {error}")))?;

        insert_grants(&mut transaction, role.id(), role.permissions()).await?;
        commit(transaction).await?;

        Ok(role)
    }

    async fn delete_role(&self, role_id: &RoleId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM roleward_roles
            WHERE id = $1
              AND is_system = false
              AND assigned_count = 0
            "#,
        )
        .bind(role_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        if rows_affected > 0 {
            return Ok(());
        }

        let Some(role) = self.find_role(role_id).await? else {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        };
        role.ensure_deletable()?;

        Err(AppError::Internal(format!(
            "role '{role_id}' changed while being deleted"
        )))
    }

    async fn adjust_assigned_count(&self, role_id: &RoleId, delta: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE roleward_roles
            SET assigned_count = GREATEST(assigned_count::BIGINT + $2, 0)::INTEGER,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_str())
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to adjust role assignment count: {error}"))
        })?;

        Ok(())
    }

    async fn set_assigned_count(&self, role_id: &RoleId, assigned_count: u32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE roleward_roles
            SET assigned_count = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_str())
        .bind(stored_count(assigned_count)?)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to set role assignment count: {error}"))
        })?;

        Ok(())
    }
}

async fn insert_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: &RoleId,
    permissions: &BTreeSet<Permission>,
) -> AppResult<()> {
    for permission in permissions {
        sqlx::query(
            r#"
            INSERT INTO roleward_role_grants (role_id, permission)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission) DO NOTHING
            "#,
        )
        .bind(role_id.as_str())
        .bind(permission.as_str())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;
    }

    Ok(())
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    let mut by_id: BTreeMap<String, (RoleRow, BTreeSet<Permission>)> = BTreeMap::new();

    for mut row in rows {
        let permission = row.permission.take();
        let (stored, permissions) = by_id
            .entry(row.role_id.clone())
            .or_insert_with(|| (row, BTreeSet::new()));

        if let Some(permission_value) = permission {
            let permission = Permission::from_str(permission_value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored permission '{permission_value}' for role '{}': {error}",
                    stored.role_id
                ))
            })?;
            permissions.insert(permission);
        }
    }

    by_id
        .into_values()
        .map(|(row, permissions)| {
            let role_id = RoleId::parse(row.role_id.as_str()).map_err(|error| {
                AppError::Internal(format!("invalid stored role id '{}': {error}", row.role_id))
            })?;
            let assigned_count = u32::try_from(row.assigned_count).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored assignment count for role '{role_id}': {error}"
                ))
            })?;

            Ok(Role::from_parts(
                role_id,
                row.role_name,
                row.description,
                permissions,
                row.is_system,
                assigned_count,
            ))
        })
        .collect()
}

fn stored_count(assigned_count: u32) -> AppResult<i32> {
    i32::try_from(assigned_count)
        .map_err(|error| AppError::Validation(format!("assignment count out of range: {error}")))
}

fn map_role_conflict(error: sqlx::Error, role_id: &RoleId) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::DuplicateRole(format!("role '{role_id}' already exists"));
    }

    AppError::Internal(format!("failed to create role: {error}"))
}
