use super::*;

/// In-memory service directory.
#[derive(Debug, Default)]
pub struct InMemoryServiceDirectory {
    services: RwLock<Vec<DirectoryService>>,
}

impl InMemoryServiceDirectory {
    /// Registers or replaces a service record.
    pub async fn upsert(&self, service: DirectoryService) {
        let mut services = self.services.write().await;
        services.retain(|stored| stored.id != service.id);
        services.push(service);
    }
}

#[async_trait]
impl ServiceDirectory for InMemoryServiceDirectory {
    async fn find_by_id(&self, id: ServiceId) -> AppResult<Option<DirectoryService>> {
        Ok(self
            .services
            .read()
            .await
            .iter()
            .find(|service| service.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ServiceId]) -> AppResult<Vec<DirectoryService>> {
        Ok(self
            .services
            .read()
            .await
            .iter()
            .filter(|service| ids.contains(&service.id))
            .cloned()
            .collect())
    }

    async fn list_services(&self) -> AppResult<Vec<DirectoryService>> {
        Ok(self.services.read().await.clone())
    }
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, DirectoryUser>>,
}

impl InMemoryUserDirectory {
    /// Registers or replaces a user record.
    pub async fn upsert(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<DirectoryUser>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}
