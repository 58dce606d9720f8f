use roleward_domain::{GateDecision, LogicalPrincipal, PermissionResolver, Surface};

use super::*;

impl AuthorizationService {
    /// Returns the surfaces a principal may reach.
    ///
    /// Each surface's declarative guard is evaluated against one registry
    /// snapshot, so a single call never mixes two registry states.
    pub async fn resolve_accessible_surfaces(
        &self,
        principal: Option<&LogicalPrincipal>,
    ) -> Vec<Surface> {
        let roles = self.role_table_for_check().await;
        PermissionResolver::new(&roles).available_surfaces(principal)
    }

    /// Returns the routing decision for the admin entry screen.
    pub async fn resolve_gate_decision(
        &self,
        principal: Option<&LogicalPrincipal>,
    ) -> GateDecision {
        self.resolve_access(principal).await.1
    }

    /// Returns the reachable surfaces together with the routing decision
    /// derived from them, both read from one registry snapshot.
    pub async fn resolve_access(
        &self,
        principal: Option<&LogicalPrincipal>,
    ) -> (Vec<Surface>, GateDecision) {
        let roles = self.role_table_for_check().await;
        let resolver = PermissionResolver::new(&roles);
        let surfaces = resolver.available_surfaces(principal);

        let decision = GateDecision::route(surfaces.clone(), resolver.is_elevated(principal));
        (surfaces, decision)
    }
}
