use std::collections::HashMap;

use rolegate_domain::{ServiceId, ServiceSummary};
use tracing::warn;

use crate::ServiceDirectory;
use crate::relation_service::dedupe;

/// Owning-service details resolved for one page of results.
///
/// Lookups never fail: unknown services and directory failures both resolve to
/// [`ServiceSummary::unavailable`].
#[derive(Debug, Default)]
pub(crate) struct ServiceSummaries {
    by_id: HashMap<ServiceId, ServiceSummary>,
}

impl ServiceSummaries {
    /// Resolves services for the given ids with one directory call.
    pub(crate) async fn resolve(
        directory: &dyn ServiceDirectory,
        service_ids: impl IntoIterator<Item = ServiceId>,
    ) -> Self {
        let service_ids = dedupe(service_ids);
        if service_ids.is_empty() {
            return Self::default();
        }

        match directory.find_by_ids(&service_ids).await {
            Ok(services) => Self {
                by_id: services
                    .iter()
                    .map(|service| (service.id, ServiceSummary::from(service)))
                    .collect(),
            },
            Err(error) => {
                warn!(
                    operation = "service_directory.find_by_ids",
                    service_ids = ?service_ids,
                    error = %error,
                    "service enrichment unavailable"
                );
                Self::default()
            }
        }
    }

    /// Returns the summary for a service or the placeholder.
    pub(crate) fn get(&self, service_id: ServiceId) -> ServiceSummary {
        self.by_id
            .get(&service_id)
            .cloned()
            .unwrap_or_else(ServiceSummary::unavailable)
    }
}

/// Resolves one service summary, falling back to the placeholder.
pub(crate) async fn resolve_service_summary(
    directory: &dyn ServiceDirectory,
    service_id: ServiceId,
) -> ServiceSummary {
    match directory.find_by_id(service_id).await {
        Ok(Some(service)) => ServiceSummary::from(&service),
        Ok(None) => ServiceSummary::unavailable(),
        Err(error) => {
            warn!(
                operation = "service_directory.find_by_id",
                service_id = %service_id,
                error = %error,
                "service enrichment unavailable"
            );
            ServiceSummary::unavailable()
        }
    }
}

/// Counts how many sources reference each target in a batch lookup result.
pub(crate) fn count_links<K, V>(grouped: &HashMap<K, Vec<V>>, key: &K) -> u64
where
    K: Eq + std::hash::Hash,
{
    grouped.get(key).map_or(0, |values| values.len() as u64)
}
