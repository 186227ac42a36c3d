use super::*;

impl AuthorizationService {
    /// Resolves the roles that count for a decision.
    ///
    /// Without a service scope every role the user holds counts. With a scope
    /// only roles the service exposes count; scoping never adds roles.
    /// Soft-deleted roles never count, even while join rows still point at them.
    pub(super) async fn resolve_effective_roles(
        &self,
        user_id: UserId,
        service_id: Option<ServiceId>,
    ) -> AppResult<Vec<Role>> {
        let visible_roles = async {
            match service_id {
                Some(service_id) => self
                    .relations
                    .service_roles
                    .list_targets(service_id)
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };
        let (user_roles, visible_roles) = tokio::join!(
            self.relations.user_roles.list_targets(user_id),
            visible_roles
        );

        let user_roles = user_roles?;
        if user_roles.is_empty() {
            return Ok(Vec::new());
        }

        let effective = match visible_roles? {
            Some(visible_roles) => intersect_visible(&user_roles, &visible_roles),
            None => user_roles,
        };
        self.live_roles(&effective).await
    }

    /// Loads the live role records for `role_ids`, keeping their order.
    pub(super) async fn live_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut live: HashMap<RoleId, Role> = self
            .role_service
            .find_by_ids(role_ids)
            .await?
            .into_iter()
            .map(|role| (role.id(), role))
            .collect();
        Ok(role_ids
            .iter()
            .filter_map(|role_id| live.remove(role_id))
            .collect())
    }
}

/// Keeps the user's roles that are visible in the service, in user order.
pub(super) fn intersect_visible(user_roles: &[RoleId], visible_roles: &[RoleId]) -> Vec<RoleId> {
    let visible: HashSet<RoleId> = visible_roles.iter().copied().collect();
    crate::relation_service::dedupe(
        user_roles
            .iter()
            .copied()
            .filter(|role_id| visible.contains(role_id)),
    )
}
