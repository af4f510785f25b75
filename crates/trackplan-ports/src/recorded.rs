//! File-backed collaborators for offline replays.
//!
//! A `RecordedTracker` serves a tracker export (metadata plus an already
//! reconstructed plan) and a `RecordedScheduler` serves a saved schedule.
//! Together they let a full pass run without network access.

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collaborator_traits::*;
use crate::error::CollaboratorError;
use crate::schema::*;

/// On-disk tracker export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerExport {
    pub metadata: TrackerMetadata,
    pub plan: RawPlan,
}

/// Tracker backed by a [`TrackerExport`].
#[derive(Debug, Clone)]
pub struct RecordedTracker {
    export: TrackerExport,
}

impl RecordedTracker {
    pub fn new(export: TrackerExport) -> Self {
        Self { export }
    }

    /// Load an export from a JSON file.
    pub async fn load(path: &Path) -> CollaboratorResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let export: TrackerExport = serde_json::from_slice(&bytes)?;
        info!(path = %path.display(), issues = export.plan.issues.len(), "Loaded tracker export");
        Ok(Self::new(export))
    }

    fn check_base_url(&self, base_url: &str) -> CollaboratorResult<()> {
        if self.export.metadata.base_url != base_url {
            return Err(CollaboratorError::Unauthorized {
                base_url: base_url.to_string(),
                reason: format!(
                    "export was recorded from {}",
                    self.export.metadata.base_url
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TrackerClient for RecordedTracker {
    async fn connect(&self, base_url: &str, service_id: &str) -> CollaboratorResult<()> {
        debug!(base_url, service_id, "Recorded tracker needs no handshake");
        self.check_base_url(base_url)
    }

    async fn fetch_metadata(&self, base_url: &str) -> CollaboratorResult<TrackerMetadata> {
        self.check_base_url(base_url)?;
        Ok(self.export.metadata.clone())
    }

    async fn reconstruct(
        &self,
        base_url: &str,
        request: &ReconstructionRequest,
        on_progress: ProgressFn<'_>,
    ) -> CollaboratorResult<RawPlan> {
        self.check_base_url(base_url)?;
        on_progress(0.0);

        let mut plan = self.export.plan.clone();
        for issue in &mut plan.issues {
            issue.splittable = request.splittable.is_splittable(issue);
        }

        on_progress(1.0);
        Ok(plan)
    }
}

/// Scheduler backed by a saved [`Schedule`].
#[derive(Debug, Clone)]
pub struct RecordedScheduler {
    schedule: Schedule,
}

impl RecordedScheduler {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    /// Load a schedule from a JSON file.
    pub async fn load(path: &Path) -> CollaboratorResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let schedule: Schedule = serde_json::from_slice(&bytes)?;
        Ok(Self::new(schedule))
    }
}

#[async_trait]
impl SchedulingEngine for RecordedScheduler {
    async fn schedule(
        &self,
        issues: &[TrackerIssue],
        options: &SchedulingOptions,
    ) -> CollaboratorResult<Schedule> {
        debug!(
            issues = issues.len(),
            contributors = options.contributors.len(),
            "Serving recorded schedule"
        );
        Ok(self.schedule.clone())
    }

    fn merge_schedule(
        &self,
        raw: &RawPlan,
        schedule: &Schedule,
        prediction_start: DateTime<Utc>,
    ) -> Result<FinalPlan, MergeFailure> {
        let known: BTreeSet<&str> = raw.issues.iter().map(|i| i.id.as_str()).collect();
        if let Some(unknown) = schedule
            .issues
            .iter()
            .find(|entry| !known.contains(entry.issue_id.as_str()))
        {
            return Err(MergeFailure::new(format!(
                "schedule refers to unknown issue {}",
                unknown.issue_id
            )));
        }

        Ok(FinalPlan {
            issues: raw.issues.clone(),
            schedule: schedule.clone(),
            warnings: raw.warnings.clone(),
            prediction_start,
        })
    }
}
