use rolegate_application::BatchAssignResult;
use rolegate_domain::EntityId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Target ids for batch and replace operations.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relation-targets-request.ts"
)]
pub struct RelationTargetsRequest {
    pub target_ids: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/relation-targets-response.ts"
)]
pub struct RelationTargetsResponse {
    pub target_ids: Vec<String>,
}

impl RelationTargetsResponse {
    pub fn from_ids<B: EntityId>(ids: Vec<B>) -> Self {
        Self {
            target_ids: ids.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Outcome of a batch assignment.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-assign-response.ts"
)]
pub struct BatchAssignResponse {
    pub assigned: usize,
    pub skipped: usize,
    pub duplicates: Vec<String>,
    pub new_assignments: Vec<String>,
}

impl<B: EntityId> From<BatchAssignResult<B>> for BatchAssignResponse {
    fn from(result: BatchAssignResult<B>) -> Self {
        Self {
            assigned: result.assigned,
            skipped: result.skipped,
            duplicates: result.duplicates.iter().map(ToString::to_string).collect(),
            new_assignments: result
                .new_assignments
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-revoke-response.ts"
)]
pub struct BatchRevokeResponse {
    #[ts(type = "number")]
    pub revoked: u64,
}
