//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod permission;
mod principal;
mod resolver;
mod role;
mod surface;

pub use audit::AuditAction;
pub use permission::{
    AccessLevel, ELEVATED_AUTHORIZATION_PERMISSION, ElevationTier, Permission,
    PermissionCategory, ROLE_ASSIGNMENT_PERMISSION, ROLE_MANAGEMENT_PERMISSION,
    catalog_by_category,
};
pub use principal::{LogicalPrincipal, Principal};
pub use resolver::{PermissionResolver, RoleTable};
pub use role::{Role, RoleId, SystemRole};
pub use surface::{GateDecision, NamedCapability, Surface, SurfaceGuard};
