//! Request and response models for the list gateway API.

use serde::{Deserialize, Serialize};

use listgate_sync::{BatchMode, BatchReport};

/// Query parameters for POST /send-to-list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendQuery {
    /// `detail=entities` switches the batch into per-entity isolation
    /// and returns one result per entity instead of aborting on the
    /// first failure.
    pub detail: Option<String>,
}

impl SendQuery {
    pub fn batch_mode(&self) -> BatchMode {
        match self.detail.as_deref() {
            Some("entities") => BatchMode::Isolate,
            _ => BatchMode::AbortOnError,
        }
    }
}

/// Aggregate counts returned when a batch succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl From<&BatchReport> for BatchSummary {
    fn from(report: &BatchReport) -> Self {
        Self {
            created: report.created,
            updated: report.updated,
            deleted: report.deleted,
            skipped: report.skipped,
            failed: report.failed,
        }
    }
}

/// Default-mode success body: a status marker plus the counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

impl From<&BatchReport> for BatchResponse {
    fn from(report: &BatchReport) -> Self {
        Self {
            status: "success",
            summary: BatchSummary::from(report),
        }
    }
}

/// One per-entity result, returned in detail mode.
#[derive(Debug, Clone, Serialize)]
pub struct EntityReport {
    /// Position in the submitted batch.
    pub index: usize,
    /// "created", "updated", "deleted", "skipped" or "failed".
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detail-mode response body: per-entity results plus the counts.
#[derive(Debug, Clone, Serialize)]
pub struct BatchDetailResponse {
    pub summary: BatchSummary,
    pub entities: Vec<EntityReport>,
}

impl From<&BatchReport> for BatchDetailResponse {
    fn from(report: &BatchReport) -> Self {
        let entities = report
            .results
            .iter()
            .map(|r| match &r.outcome {
                Ok(outcome) => EntityReport {
                    index: r.index,
                    status: outcome.as_str().to_string(),
                    error: None,
                },
                Err(e) => EntityReport {
                    index: r.index,
                    status: "failed".to_string(),
                    error: Some(e.to_string()),
                },
            })
            .collect();
        Self {
            summary: BatchSummary::from(report),
            entities,
        }
    }
}
