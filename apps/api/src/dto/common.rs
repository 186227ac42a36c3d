use rolegate_domain::{DirectoryService, ServiceSummary};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Service returned by the available-services lookup.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/service-response.ts"
)]
pub struct ServiceResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
}

impl From<DirectoryService> for ServiceResponse {
    fn from(service: DirectoryService) -> Self {
        Self {
            id: service.id.to_string(),
            name: service.name,
            description: service.description,
            is_public: service.is_public,
        }
    }
}

/// Owning-service details attached to search results.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/service-summary-response.ts"
)]
pub struct ServiceSummaryResponse {
    pub id: String,
    pub name: String,
}

impl From<ServiceSummary> for ServiceSummaryResponse {
    fn from(summary: ServiceSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
        }
    }
}
