use super::*;

/// Entity rows a join table may point at, like a SQL foreign key.
///
/// Soft-deleted rows still count, as they do for the database constraint.
#[async_trait]
pub(super) trait ReferencedRows<T: EntityId>: Send + Sync {
    async fn is_stored(&self, id: T) -> bool;
}

/// In-memory join table between `A` and `B`.
pub struct InMemoryRelationRepository<A: EntityId, B: EntityId> {
    rows: RwLock<BTreeSet<(A, B)>>,
    sources: Option<Arc<dyn ReferencedRows<A>>>,
    targets: Option<Arc<dyn ReferencedRows<B>>>,
}

impl<A: EntityId, B: EntityId> Default for InMemoryRelationRepository<A, B> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeSet::new()),
            sources: None,
            targets: None,
        }
    }
}

impl<A: EntityId, B: EntityId> InMemoryRelationRepository<A, B> {
    pub(super) fn with_sources(mut self, rows: Arc<dyn ReferencedRows<A>>) -> Self {
        self.sources = Some(rows);
        self
    }

    pub(super) fn with_targets(mut self, rows: Arc<dyn ReferencedRows<B>>) -> Self {
        self.targets = Some(rows);
        self
    }

    pub(super) async fn read_rows(&self) -> RwLockReadGuard<'_, BTreeSet<(A, B)>> {
        self.rows.read().await
    }

    async fn ensure_referenced(&self, source: A, targets: &[B]) -> AppResult<()> {
        if let Some(sources) = &self.sources
            && !sources.is_stored(source).await
        {
            return Err(AppError::NotFound(format!(
                "cannot link a missing {} {source}",
                A::LABEL
            )));
        }

        if let Some(known) = &self.targets {
            for target in targets {
                if !known.is_stored(*target).await {
                    return Err(AppError::NotFound(format!(
                        "cannot link {} {source} to a missing {} {target}",
                        A::LABEL,
                        B::LABEL
                    )));
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<A, B> RelationRepository<A, B> for InMemoryRelationRepository<A, B>
where
    A: EntityId,
    B: EntityId,
{
    async fn list_targets(&self, source: A) -> AppResult<Vec<B>> {
        Ok(self
            .rows
            .read()
            .await
            .range((source, B::from_uuid(uuid::Uuid::nil()))..)
            .take_while(|(stored_source, _)| *stored_source == source)
            .map(|(_, target)| *target)
            .collect())
    }

    async fn list_sources(&self, target: B) -> AppResult<Vec<A>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|(_, stored_target)| *stored_target == target)
            .map(|(source, _)| *source)
            .collect())
    }

    async fn list_targets_for_sources(&self, sources: &[A]) -> AppResult<HashMap<A, Vec<B>>> {
        let sources: HashSet<A> = sources.iter().copied().collect();
        let mut grouped: HashMap<A, Vec<B>> = HashMap::new();
        for (source, target) in self.rows.read().await.iter() {
            if sources.contains(source) {
                grouped.entry(*source).or_default().push(*target);
            }
        }
        Ok(grouped)
    }

    async fn list_sources_for_targets(&self, targets: &[B]) -> AppResult<HashMap<B, Vec<A>>> {
        let targets: HashSet<B> = targets.iter().copied().collect();
        let mut grouped: HashMap<B, Vec<A>> = HashMap::new();
        for (source, target) in self.rows.read().await.iter() {
            if targets.contains(target) {
                grouped.entry(*target).or_default().push(*source);
            }
        }
        Ok(grouped)
    }

    async fn list_existing_targets(&self, source: A, candidates: &[B]) -> AppResult<Vec<B>> {
        let rows = self.rows.read().await;
        Ok(candidates
            .iter()
            .copied()
            .filter(|target| rows.contains(&(source, *target)))
            .collect())
    }

    async fn exists(&self, source: A, target: B) -> AppResult<bool> {
        Ok(self.rows.read().await.contains(&(source, target)))
    }

    async fn has_any_for_target(&self, target: B) -> AppResult<bool> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .any(|(_, stored_target)| *stored_target == target))
    }

    async fn insert(&self, source: A, target: B) -> AppResult<bool> {
        self.ensure_referenced(source, &[target]).await?;
        Ok(self.rows.write().await.insert((source, target)))
    }

    async fn insert_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        self.ensure_referenced(source, targets).await?;
        let mut rows = self.rows.write().await;
        let inserted = targets
            .iter()
            .filter(|target| rows.insert((source, **target)))
            .count();
        Ok(inserted as u64)
    }

    async fn delete(&self, source: A, target: B) -> AppResult<u64> {
        Ok(u64::from(self.rows.write().await.remove(&(source, target))))
    }

    async fn delete_many(&self, source: A, targets: &[B]) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let removed = targets
            .iter()
            .filter(|target| rows.remove(&(source, **target)))
            .count();
        Ok(removed as u64)
    }

    async fn replace_all(&self, source: A, targets: &[B]) -> AppResult<()> {
        self.ensure_referenced(source, targets).await?;
        let mut rows = self.rows.write().await;
        rows.retain(|(stored_source, _)| *stored_source != source);
        rows.extend(targets.iter().map(|target| (source, *target)));
        Ok(())
    }
}
