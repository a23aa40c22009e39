//! Respondent submissions: live preview, submit, list and delete
//!
//! Preview and submit share one assessment path, so the CR shown
//! while answering is exactly the CR stored with the answers.

use super::aggregation::{partition_indicators, AggregationOrchestrator, IterationComputation};
use crate::ahp::{assess_group, judgments_from_pairs, GroupAssessment};
use crate::stores::{IndicatorCatalog, IterationCounter, SubmissionRepository};
use ahp_common::events::{AhpEvent, EventBus};
use ahp_common::models::{GroupConsistency, Respondent};
use ahp_common::{Category, Error, Iteration, Judgment, Result, Submission};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Answers as they arrive from the survey form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub respondent: Respondent,
    /// `"<itemA>_<itemB>"` → raw slider value
    pub comparisons: BTreeMap<String, f64>,
}

/// Per-group assessment of a draft
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyPreview {
    pub groups: Vec<(Category, GroupAssessment)>,
    pub consistency: GroupConsistency,
    pub threshold: f64,
    #[serde(skip)]
    judgments: Vec<Judgment>,
}

impl ConsistencyPreview {
    /// Groups whose CR is above the threshold
    pub fn inconsistent_groups(&self) -> Vec<Category> {
        self.groups
            .iter()
            .filter(|(_, g)| !g.report.is_acceptable())
            .map(|(c, _)| *c)
            .collect()
    }

    /// Caller should ask the respondent to confirm before submitting
    pub fn requires_confirmation(&self) -> bool {
        !self.inconsistent_groups().is_empty()
    }

    /// Adjusted judgments the preview was computed from
    pub fn judgments(&self) -> &[Judgment] {
        &self.judgments
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub iteration: Iteration,
    pub consistency: GroupConsistency,
    pub inconsistent_groups: Vec<Category>,
    /// At least one group is above the threshold (accepted anyway)
    pub exceeds_threshold: bool,
}

pub struct SubmissionService {
    catalog: Arc<dyn IndicatorCatalog>,
    submissions: Arc<dyn SubmissionRepository>,
    counter: Arc<dyn IterationCounter>,
    orchestrator: Arc<AggregationOrchestrator>,
    event_bus: EventBus,
}

fn validate_respondent(respondent: &Respondent) -> Result<()> {
    for (field, value) in [
        ("name", &respondent.name),
        ("title", &respondent.title),
        ("institution", &respondent.institution),
    ] {
        if value.trim().is_empty() {
            return Err(Error::InvalidInput(format!("Respondent {} is required", field)));
        }
    }
    Ok(())
}

impl SubmissionService {
    pub fn new(
        catalog: Arc<dyn IndicatorCatalog>,
        submissions: Arc<dyn SubmissionRepository>,
        counter: Arc<dyn IterationCounter>,
        orchestrator: Arc<AggregationOrchestrator>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            catalog,
            submissions,
            counter,
            orchestrator,
            event_bus,
        }
    }

    /// Live CR per group for the current catalog
    pub async fn preview(&self, draft: &SubmissionDraft) -> Result<ConsistencyPreview> {
        let (_, preview) = self.assess(draft).await?;
        Ok(preview)
    }

    /// Store a draft under the current iteration
    ///
    /// High CR is reported on the receipt, never rejected.
    pub async fn submit(&self, draft: SubmissionDraft) -> Result<SubmissionReceipt> {
        validate_respondent(&draft.respondent)?;

        let (criteria, preview) = self.assess(&draft).await?;
        let iteration = self.counter.current().await?;
        let inconsistent_groups = preview.inconsistent_groups();

        let submission = Submission {
            id: Uuid::new_v4(),
            respondent: draft.respondent,
            iteration,
            criteria,
            judgments: preview.judgments,
            consistency: preview.consistency,
            submitted_at: Utc::now(),
        };
        let submission_id = submission.id;
        self.submissions.insert_submission(submission).await?;

        if inconsistent_groups.is_empty() {
            info!(%submission_id, iteration, "Submission stored");
        } else {
            warn!(
                %submission_id,
                iteration,
                groups = ?inconsistent_groups,
                "Submission stored with inconsistent judgments"
            );
        }
        self.event_bus.emit_lossy(AhpEvent::SubmissionReceived {
            submission_id,
            iteration,
            inconsistent_groups: inconsistent_groups.clone(),
            timestamp: Utc::now(),
        });

        Ok(SubmissionReceipt {
            submission_id,
            iteration,
            consistency: preview.consistency,
            exceeds_threshold: !inconsistent_groups.is_empty(),
            inconsistent_groups,
        })
    }

    pub async fn list(&self) -> Result<Vec<Submission>> {
        self.submissions.list_submissions().await
    }

    /// Remove a submission and recompute its iteration
    pub async fn delete(&self, id: Uuid) -> Result<Option<IterationComputation>> {
        let removed = self
            .submissions
            .delete_submission(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Submission {}", id)))?;

        info!(submission_id = %id, iteration = removed.iteration, "Submission deleted");
        self.event_bus.emit_lossy(AhpEvent::SubmissionDeleted {
            submission_id: id,
            iteration: removed.iteration,
            timestamp: Utc::now(),
        });

        self.orchestrator.compute_iteration(removed.iteration).await
    }

    /// Catalog names plus the per-group assessment of `draft`
    async fn assess(&self, draft: &SubmissionDraft) -> Result<(Vec<String>, ConsistencyPreview)> {
        let indicators = self.catalog.list_indicators().await?;
        let criteria: Vec<String> = indicators.iter().map(|i| i.name.clone()).collect();
        let known: HashSet<&str> = criteria.iter().map(String::as_str).collect();

        let judgments = judgments_from_pairs(&draft.comparisons, &known);
        let checker = self.orchestrator.checker();

        let mut consistency = GroupConsistency::default();
        let mut groups = Vec::new();
        for (category, keys) in partition_indicators(&indicators) {
            let key_set: HashSet<&str> = keys.iter().map(String::as_str).collect();
            let in_group: Vec<Judgment> = judgments
                .iter()
                .filter(|j| j.within(&key_set))
                .cloned()
                .collect();
            let assessment = assess_group(&keys, &in_group, checker)?;
            consistency.set(category, assessment.report.ratio);
            groups.push((category, assessment));
        }

        Ok((
            criteria,
            ConsistencyPreview {
                groups,
                consistency,
                threshold: checker.threshold(),
                judgments,
            },
        ))
    }
}
