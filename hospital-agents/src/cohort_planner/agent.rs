use crate::llm::{strip_terminate, CompletionRequest, LlmClient, LlmConfig, Message as LlmMessage};
use crate::storage::{AgentStorage, Message};
use cohort_finder::{parse_criteria, CohortCriteria};
use std::sync::Arc;

pub const AGENT_TYPE: &str = "cohort-planner";

#[derive(Debug, Clone)]
pub struct PlannedCohort {
    pub criteria: CohortCriteria,
    /// Reply the criteria were parsed from, without the `TERMINATE` marker
    pub text: String,
}

pub struct CohortPlannerAgent {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<dyn AgentStorage>,
    config: LlmConfig,
}

impl CohortPlannerAgent {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        storage: Arc<dyn AgentStorage>,
        config: LlmConfig,
    ) -> Self {
        Self {
            llm_client,
            storage,
            config,
        }
    }

    /// Asks for criteria matching `objective`, reviewing each reply and
    /// asking again while it cannot be parsed.
    pub async fn plan(&self, session_id: i64, objective: &str) -> anyhow::Result<PlannedCohort> {
        let system_prompt = super::system_prompt::build_system_prompt();

        self.storage
            .create_message(Message::new(session_id, "user", objective))
            .await?;
        let mut conversation = vec![LlmMessage::user(objective)];
        let mut last_error = None;

        for turn in 0..self.config.planner_max_turns {
            tracing::info!("Cohort planner turn {}", turn);

            let response = self
                .llm_client
                .complete(CompletionRequest {
                    messages: conversation.clone(),
                    model: self.config.model.clone(),
                    system: Some(system_prompt.clone()),
                    max_tokens: self.config.max_tokens,
                    temperature: Some(self.config.temperature),
                    tools: None,
                })
                .await?;

            self.storage
                .create_message(Message::new(session_id, "assistant", &response.content))
                .await?;
            conversation.push(LlmMessage::assistant(response.content.clone()));

            match parse_criteria(&response.content) {
                Ok(criteria) => {
                    tracing::info!(
                        "Planned cohort: ages {}..={} with '{}'",
                        criteria.ages.min_age,
                        criteria.ages.max_age,
                        criteria.condition
                    );
                    let (text, _) = strip_terminate(&response.content);
                    return Ok(PlannedCohort {
                        criteria,
                        text: text.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Planner reply rejected: {}", e);
                    let feedback = super::system_prompt::build_feedback(&e.to_string());
                    self.storage
                        .create_message(Message::new(session_id, "user", &feedback))
                        .await?;
                    conversation.push(LlmMessage::user(feedback));
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(anyhow::anyhow!(
                "No usable cohort criteria after {} turns: {}",
                self.config.planner_max_turns,
                e
            )),
            None => Err(anyhow::anyhow!("Cohort planner is configured with zero turns")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Session;
    use crate::testing::{memory_storage, text, ScriptedLlm};

    #[tokio::test]
    async fn test_plans_from_first_reply() {
        let llm = ScriptedLlm::new(vec![text(
            "Patients aged between 50 and 75 with Colon polyp. TERMINATE",
        )]);
        let storage = memory_storage();
        let session_id = storage
            .create_session(Session::running(AGENT_TYPE, "gpt-4", "screening"))
            .await
            .unwrap();
        let agent = CohortPlannerAgent::new(llm.clone(), storage.clone(), LlmConfig::default());

        let planned = agent
            .plan(session_id, "Find patients for colonoscopy screening")
            .await
            .unwrap();

        assert_eq!(planned.criteria.ages.min_age, 50);
        assert_eq!(planned.criteria.ages.max_age, 75);
        assert_eq!(planned.criteria.condition, "Colon polyp");
        assert_eq!(planned.text, "Patients aged between 50 and 75 with Colon polyp.");
        assert_eq!(storage.get_messages(session_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retries_with_feedback() {
        let llm = ScriptedLlm::new(vec![
            text("Patients with diabetes should be screened. TERMINATE"),
            text("Patients aged 40 to 65 with Hyperglycemia. TERMINATE"),
        ]);
        let storage = memory_storage();
        let session_id = storage
            .create_session(Session::running(AGENT_TYPE, "gpt-4", "diabetes"))
            .await
            .unwrap();
        let agent = CohortPlannerAgent::new(llm.clone(), storage, LlmConfig::default());

        let planned = agent.plan(session_id, "Diabetes check-ups").await.unwrap();

        assert_eq!(planned.criteria.condition, "Hyperglycemia");
        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let feedback = requests[1].messages.last().unwrap();
        assert!(feedback.content.starts_with("The criteria could not be used"));
    }

    #[tokio::test]
    async fn test_fails_after_max_turns() {
        let llm = ScriptedLlm::new(vec![
            text("I need more information."),
            text("Still not sure."),
        ]);
        let storage = memory_storage();
        let session_id = storage
            .create_session(Session::running(AGENT_TYPE, "gpt-4", "vague"))
            .await
            .unwrap();
        let agent = CohortPlannerAgent::new(
            llm,
            storage,
            LlmConfig {
                planner_max_turns: 2,
                ..LlmConfig::default()
            },
        );

        let err = agent.plan(session_id, "Someone").await.unwrap_err();
        assert!(err.to_string().contains("after 2 turns"));
    }
}
