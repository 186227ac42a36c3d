use super::*;

impl AuthorizationService {
    /// Returns whether the user may perform `action`, optionally inside one service.
    pub async fn check_permission(
        &self,
        user_id: UserId,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> bool {
        if let Some(combined_query) = &self.combined_query {
            match combined_query
                .user_has_action(user_id, action, service_id)
                .await
            {
                Ok(granted) => return granted,
                Err(error) => warn!(
                    user_id = %user_id,
                    action,
                    service_id = ?service_id,
                    error = %error,
                    "combined permission query failed, falling back to traversal"
                ),
            }
        }

        match self
            .traverse_permission(user_id, action, service_id)
            .await
        {
            Ok(granted) => granted,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    action,
                    service_id = ?service_id,
                    error = %error,
                    "permission check failed closed"
                );
                false
            }
        }
    }

    /// Lists permission ids granted through the user's effective roles.
    pub async fn list_effective_permissions(
        &self,
        user_id: UserId,
        service_id: Option<ServiceId>,
    ) -> Vec<PermissionId> {
        match self.effective_permission_set(user_id, service_id).await {
            Ok(granted) => {
                let mut permission_ids: Vec<PermissionId> = granted.into_iter().collect();
                permission_ids.sort();
                permission_ids
            }
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    service_id = ?service_id,
                    error = %error,
                    "effective permission listing failed closed"
                );
                Vec::new()
            }
        }
    }

    async fn traverse_permission(
        &self,
        user_id: UserId,
        action: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<bool> {
        let granted = self.effective_permission_set(user_id, service_id).await?;
        if granted.is_empty() {
            return Ok(false);
        }

        let candidates = self
            .permission_service
            .find_by_action(action, service_id)
            .await?;

        Ok(candidates.iter().any(|permission| {
            granted.contains(&permission.id())
                && permission.action().as_str() == action
                && service_id.is_none_or(|service_id| permission.service_id() == service_id)
        }))
    }

    async fn effective_permission_set(
        &self,
        user_id: UserId,
        service_id: Option<ServiceId>,
    ) -> AppResult<HashSet<PermissionId>> {
        let role_ids: Vec<RoleId> = self
            .resolve_effective_roles(user_id, service_id)
            .await?
            .iter()
            .map(Role::id)
            .collect();
        self.granted_permissions(&role_ids).await
    }

    async fn granted_permissions(&self, role_ids: &[RoleId]) -> AppResult<HashSet<PermissionId>> {
        if role_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let by_role: HashMap<RoleId, Vec<PermissionId>> = self
            .relations
            .role_permissions
            .list_targets_for_sources(role_ids)
            .await?;
        Ok(by_role.into_values().flatten().collect())
    }
}
