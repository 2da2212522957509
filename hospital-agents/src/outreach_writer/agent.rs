use crate::llm::{CompletionRequest, LlmClient, LlmConfig, Message as LlmMessage};
use crate::storage::{AgentStorage, Message};
use shared_types::{OutreachEmail, PatientSummary};
use std::sync::Arc;

pub const AGENT_TYPE: &str = "outreach-writer";

const DEFAULT_SUBJECT: &str = "An invitation from your care team";

pub struct OutreachWriterAgent {
    llm_client: Arc<dyn LlmClient>,
    storage: Arc<dyn AgentStorage>,
    config: LlmConfig,
}

impl OutreachWriterAgent {
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

    /// Drafts one email per patient, in input order.
    pub async fn write(
        &self,
        session_id: i64,
        campaign: &str,
        patients: &[PatientSummary],
    ) -> anyhow::Result<Vec<OutreachEmail>> {
        let system_prompt = super::system_prompt::build_system_prompt();
        let mut emails = Vec::with_capacity(patients.len());

        for patient in patients {
            let prompt = super::system_prompt::build_patient_prompt(campaign, patient);
            self.storage
                .create_message(Message::new(session_id, "user", &prompt))
                .await?;

            let response = self
                .llm_client
                .complete(CompletionRequest {
                    messages: vec![LlmMessage::user(prompt)],
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

            let (subject, body) = split_subject(&response.content);
            if patient.email.is_none() {
                tracing::warn!("No email address for patient {}", patient.patient_id);
            }

            emails.push(OutreachEmail {
                patient_id: patient.patient_id.clone(),
                full_name: patient.full_name.clone(),
                email: patient.email.clone(),
                subject,
                body,
            });
        }

        tracing::info!("Drafted {} outreach emails", emails.len());
        Ok(emails)
    }
}

/// Splits a leading `Subject:` line off the draft
fn split_subject(draft: &str) -> (String, String) {
    let draft = draft.trim();
    let (first, rest) = draft.split_once('\n').unwrap_or((draft, ""));

    match first.trim().strip_prefix("Subject:") {
        Some(subject) if !subject.trim().is_empty() => {
            (subject.trim().to_string(), rest.trim().to_string())
        }
        _ => (DEFAULT_SUBJECT.to_string(), draft.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Session;
    use crate::testing::{memory_storage, text, ScriptedLlm};

    fn patient(id: &str, name: &str, email: Option<&str>) -> PatientSummary {
        PatientSummary {
            patient_id: id.to_string(),
            source_url: format!("https://fhir.test/Patient/{}", id),
            full_name: name.to_string(),
            age: 64,
            postal_code: None,
            medical_record_number: None,
            email: email.map(str::to_string),
            condition_display_name: "Colon polyp".to_string(),
        }
    }

    #[test]
    fn test_split_subject() {
        assert_eq!(
            split_subject("Subject: Time for a check-up\n\nDear Ana,\nPlease call us."),
            (
                "Time for a check-up".to_string(),
                "Dear Ana,\nPlease call us.".to_string()
            )
        );
        assert_eq!(
            split_subject("Dear Ana, please call us."),
            (DEFAULT_SUBJECT.to_string(), "Dear Ana, please call us.".to_string())
        );
    }

    #[tokio::test]
    async fn test_one_email_per_patient() {
        let llm = ScriptedLlm::new(vec![
            text("Subject: Screening invitation\n\nDear Ana Silva, ..."),
            text("Dear Tom Reed, ..."),
        ]);
        let storage = memory_storage();
        let session_id = storage
            .create_session(Session::running(AGENT_TYPE, "gpt-4", "screening"))
            .await
            .unwrap();
        let agent = OutreachWriterAgent::new(llm.clone(), storage.clone(), LlmConfig::default());
        let patients = vec![
            patient("p1", "Ana Silva", Some("ana@example.org")),
            patient("p2", "Tom Reed", None),
        ];

        let emails = agent
            .write(session_id, "Colonoscopy screening", &patients)
            .await
            .unwrap();

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].subject, "Screening invitation");
        assert_eq!(emails[0].email.as_deref(), Some("ana@example.org"));
        assert_eq!(emails[1].patient_id, "p2");
        assert_eq!(emails[1].subject, DEFAULT_SUBJECT);
        assert!(emails[1].email.is_none());

        let requests = llm.requests.lock().unwrap();
        assert!(requests[1].messages[0].content.contains("Tom Reed"));
        assert_eq!(storage.get_messages(session_id).await.unwrap().len(), 4);
    }
}
