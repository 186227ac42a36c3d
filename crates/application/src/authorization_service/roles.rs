use super::*;

impl AuthorizationService {
    /// Returns whether the user holds a role with this name, ignoring case.
    pub async fn check_role(
        &self,
        user_id: UserId,
        role_name: &str,
        service_id: Option<ServiceId>,
    ) -> bool {
        self.holds_role(user_id, role_name, service_id)
            .await
            .unwrap_or_else(|error| {
                warn!(
                    user_id = %user_id,
                    role_name,
                    service_id = ?service_id,
                    error = %error,
                    "role check failed closed"
                );
                false
            })
    }

    /// Lists the user's effective role ids.
    pub async fn list_effective_roles(
        &self,
        user_id: UserId,
        service_id: Option<ServiceId>,
    ) -> Vec<RoleId> {
        self.resolve_effective_roles(user_id, service_id)
            .await
            .map(|roles| roles.iter().map(Role::id).collect())
            .unwrap_or_else(|error| {
                warn!(
                    user_id = %user_id,
                    service_id = ?service_id,
                    error = %error,
                    "effective role listing failed closed"
                );
                Vec::new()
            })
    }

    async fn holds_role(
        &self,
        user_id: UserId,
        role_name: &str,
        service_id: Option<ServiceId>,
    ) -> AppResult<bool> {
        let roles = self.resolve_effective_roles(user_id, service_id).await?;
        Ok(roles.iter().any(|role| role.name_matches(role_name)))
    }
}
