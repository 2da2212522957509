use crate::llm::{strip_terminate, CompletionRequest, LlmClient, LlmConfig, Message as LlmMessage};
use crate::storage::{AgentStorage, Message, ToolCall};
use crate::tools::{FindPatientsParams, HospitalToolExecutor, ToolOutput, FIND_PATIENTS_TOOL};
use shared_types::CohortOutcome;
use std::sync::Arc;

pub const AGENT_TYPE: &str = "data-analyst";

#[derive(Debug, Clone)]
pub struct AnalystReport {
    /// Final reply with any `TERMINATE` marker removed
    pub reply: String,
    /// Outcome of the last successful patient search, if one ran
    pub cohort: Option<CohortOutcome>,
}

pub struct DataAnalystAgent {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<dyn AgentStorage>,
    tool_executor: Arc<HospitalToolExecutor>,
    config: LlmConfig,
}

impl DataAnalystAgent {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        storage: Arc<dyn AgentStorage>,
        tool_executor: Arc<HospitalToolExecutor>,
        config: LlmConfig,
    ) -> Self {
        Self {
            llm_client,
            storage,
            tool_executor,
            config,
        }
    }

    pub async fn execute(&self, session_id: i64, request: &str) -> anyhow::Result<AnalystReport> {
        let system_prompt = super::system_prompt::build_system_prompt();
        let tools = vec![HospitalToolExecutor::find_patients_tool()];

        self.storage
            .create_message(Message::new(session_id, "user", request))
            .await?;

        for iteration in 0..self.config.max_iterations {
            tracing::info!("Data analyst iteration {}", iteration);

            let llm_messages = self
                .storage
                .get_messages(session_id)
                .await?
                .into_iter()
                .filter_map(|msg| match msg.role.as_str() {
                    "user" | "tool" => Some(LlmMessage::user(msg.content)),
                    "assistant" => Some(LlmMessage::assistant(msg.content)),
                    _ => None,
                })
                .collect();

            let response = self
                .llm_client
                .complete(CompletionRequest {
                    messages: llm_messages,
                    model: self.config.model.clone(),
                    system: Some(system_prompt.clone()),
                    max_tokens: self.config.max_tokens,
                    temperature: Some(self.config.temperature),
                    tools: Some(tools.clone()),
                })
                .await?;

            let assistant_text = if response.content.trim().is_empty() {
                response
                    .tool_calls
                    .iter()
                    .map(|call| format!("Calling {} with {}", call.name(), call.arguments))
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                response.content.clone()
            };
            self.storage
                .create_message(Message::new(session_id, "assistant", assistant_text))
                .await?;

            let (reply, terminated) = strip_terminate(&response.content);
            if response.tool_calls.is_empty() {
                return Ok(AnalystReport {
                    reply: reply.to_string(),
                    cohort: self.tool_executor.last_cohort(),
                });
            }

            for tool_call in &response.tool_calls {
                let mut record = ToolCall {
                    id: None,
                    session_id,
                    tool_call_id: tool_call.id.clone(),
                    tool_name: tool_call.name().to_string(),
                    tool_input: tool_call.arguments.clone(),
                    tool_output: None,
                    status: "pending".to_string(),
                    error_message: None,
                };
                record.id = Some(self.storage.create_tool_call(record.clone()).await?);

                let output = match tool_call.name() {
                    FIND_PATIENTS_TOOL => match tool_call.parse_arguments::<FindPatientsParams>() {
                        Ok(params) => match self.tool_executor.find_patients(params).await {
                            Ok(output) => output,
                            Err(e) => {
                                record.status = "failed".to_string();
                                record.error_message = Some(e.to_string());
                                self.storage.update_tool_call(record).await?;
                                return Err(e);
                            }
                        },
                        Err(e) => ToolOutput {
                            content: format!("Error: {}", e),
                            is_error: true,
                        },
                    },
                    other => ToolOutput {
                        content: format!("Unknown tool: {}", other),
                        is_error: true,
                    },
                };

                record.status = if output.is_error { "failed" } else { "completed" }.to_string();
                record.tool_output = Some(output.content.clone());
                if output.is_error {
                    record.error_message = Some(output.content.clone());
                }
                self.storage.update_tool_call(record).await?;

                self.storage
                    .create_message(Message::new(
                        session_id,
                        "tool",
                        format!("Tool result for {}: {}", tool_call.name(), output.content),
                    ))
                    .await?;
            }

            // Tools requested alongside TERMINATE still run, but end the loop
            if terminated {
                return Ok(AnalystReport {
                    reply: reply.to_string(),
                    cohort: self.tool_executor.last_cohort(),
                });
            }
        }

        Err(anyhow::anyhow!(
            "Data analyst exceeded maximum of {} iterations",
            self.config.max_iterations
        ))
    }
}
