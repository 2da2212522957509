//! Objective-to-emails run: plan criteria, find the cohort, draft emails.

use cohort_finder::PatientCohortFinder;
use shared_types::{CohortOutcome, OutreachEmail};
use std::sync::Arc;

use crate::cohort_planner::CohortPlannerAgent;
use crate::llm::{LlmClient, LlmConfig};
use crate::outreach_writer::OutreachWriterAgent;
use crate::storage::{record_outcome, AgentStorage, Session};

pub const AGENT_TYPE: &str = "outreach-run";

#[derive(Debug, Clone)]
pub struct OutreachRun {
    pub session_id: i64,
    pub criteria: String,
    pub emails: Vec<OutreachEmail>,
}

pub struct OutreachPipeline {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<dyn AgentStorage>,
    finder: Arc<PatientCohortFinder>,
    config: LlmConfig,
}

impl OutreachPipeline {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        storage: Arc<dyn AgentStorage>,
        finder: Arc<PatientCohortFinder>,
        config: LlmConfig,
    ) -> Self {
        Self {
            llm_client,
            storage,
            finder,
            config,
        }
    }

    /// Runs the three stages under one session. The session ends as
    /// `completed` or `failed` whichever way the run goes.
    pub async fn run(&self, objective: &str) -> anyhow::Result<OutreachRun> {
        let session_id = self
            .storage
            .create_session(Session::running(AGENT_TYPE, &self.config.model, objective))
            .await?;

        let outcome = self.run_stages(session_id, objective).await;
        record_outcome(self.storage.as_ref(), session_id, outcome, |run| {
            format!("{} emails drafted for: {}", run.emails.len(), run.criteria)
        })
        .await
    }

    async fn run_stages(&self, session_id: i64, objective: &str) -> anyhow::Result<OutreachRun> {
        let planner =
            CohortPlannerAgent::new(self.llm_client.clone(), self.storage.clone(), self.config.clone());
        let planned = planner.plan(session_id, objective).await?;

        let outcome = self
            .finder
            .find(
                planned.criteria.ages.min_age,
                planned.criteria.ages.max_age,
                &planned.criteria.condition,
            )
            .await?;

        let patients = match outcome {
            CohortOutcome::NoRecordsInWindow => {
                tracing::info!("No condition records in the birthdate window");
                Vec::new()
            }
            CohortOutcome::Found { patients } => patients,
        };

        let writer =
            OutreachWriterAgent::new(self.llm_client.clone(), self.storage.clone(), self.config.clone());
        let emails = writer.write(session_id, &planned.text, &patients).await?;

        Ok(OutreachRun {
            session_id,
            criteria: planned.text,
            emails,
        })
    }
}
