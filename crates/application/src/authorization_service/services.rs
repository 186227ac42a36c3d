use super::*;

impl AuthorizationService {
    /// Lists directory services the user may open.
    ///
    /// Public services are always listed. Gated services are listed when the
    /// user holds at least one role the service exposes.
    pub async fn list_available_services(&self, user_id: UserId) -> Vec<DirectoryService> {
        self.available_services(user_id)
            .await
            .unwrap_or_else(|error| {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "available service listing failed closed"
                );
                Vec::new()
            })
    }

    async fn available_services(&self, user_id: UserId) -> AppResult<Vec<DirectoryService>> {
        let (user_roles, services) = tokio::join!(
            self.relations.user_roles.list_targets(user_id),
            self.service_directory.list_services()
        );
        let services = services?;
        let user_roles: HashSet<RoleId> = self
            .live_roles(&user_roles?)
            .await?
            .iter()
            .map(Role::id)
            .collect();

        let gated: Vec<ServiceId> = services
            .iter()
            .filter(|service| !service.is_public)
            .map(|service| service.id)
            .collect();
        let visible_roles = if user_roles.is_empty() || gated.is_empty() {
            HashMap::new()
        } else {
            self.relations
                .service_roles
                .list_targets_for_sources(&gated)
                .await?
        };

        Ok(services
            .into_iter()
            .filter(|service| {
                service.is_public
                    || visible_roles.get(&service.id).is_some_and(|role_ids| {
                        role_ids.iter().any(|role_id| user_roles.contains(role_id))
                    })
            })
            .collect())
    }
}
