//! Test doubles shared by the agent tests.

use async_trait::async_trait;
use cohort_finder::fhir::{Bundle, Condition, Patient};
use cohort_finder::{
    BirthdateWindow, CohortError, FhirService, FinderOptions, PatientCohortFinder,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, ToolCall};
use crate::storage::SqliteAgentStorage;

pub struct FakeFhir {
    conditions: Vec<Condition>,
    patients: HashMap<String, Patient>,
}

impl FakeFhir {
    pub fn new(conditions: Value, patients: Vec<(&str, Value)>) -> Self {
        let bundle: Bundle<Condition> = serde_json::from_value(conditions).unwrap();
        Self {
            conditions: bundle.into_resources().collect(),
            patients: patients
                .into_iter()
                .map(|(id, value)| (id.to_string(), serde_json::from_value(value).unwrap()))
                .collect(),
        }
    }
}

#[async_trait]
impl FhirService for FakeFhir {
    async fn search_conditions(
        &self,
        _window: &BirthdateWindow,
    ) -> Result<Vec<Condition>, CohortError> {
        Ok(self.conditions.clone())
    }

    async fn read_patient(&self, patient_id: &str) -> Result<Patient, CohortError> {
        self.patients
            .get(patient_id)
            .cloned()
            .ok_or_else(|| CohortError::unavailable("Patient", "HTTP status 404 Not Found"))
    }

    fn patient_url(&self, patient_id: &str) -> String {
        format!("https://fhir.test/Patient/{}", patient_id)
    }
}

pub fn fake_finder(fake: FakeFhir) -> Arc<PatientCohortFinder> {
    Arc::new(PatientCohortFinder::new(
        Arc::new(fake),
        FinderOptions::default(),
    ))
}

pub fn condition_entry(subject: &str, display: &str) -> Value {
    json!({
        "resource": {
            "resourceType": "Condition",
            "code": {"coding": [{"display": display}]},
            "subject": {"reference": format!("Patient/{}", subject)}
        }
    })
}

pub fn complete_patient(given: &str, family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "name": [{"family": family, "given": [given]}],
        "birthDate": "1960-05-20",
        "telecom": [{"system": "email", "value": format!("{}@example.org", given.to_lowercase())}],
        "maritalStatus": {"text": "Married"},
        "identifier": [{"type": {"text": "Medical Record Number"}, "value": format!("MRN-{}", family)}],
        "address": [{"postalCode": "02139"}]
    })
}

/// LLM double that replays canned responses and records every request
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<CompletionResponse>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}

pub fn text(content: &str) -> CompletionResponse {
    CompletionResponse {
        content: content.to_string(),
        tool_calls: vec![],
        finish_reason: Some("stop".to_string()),
    }
}

pub fn tool_call(name: &str, arguments: Value) -> CompletionResponse {
    CompletionResponse {
        content: String::new(),
        tool_calls: vec![ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }],
        finish_reason: Some("tool_calls".to_string()),
    }
}

pub fn memory_storage() -> Arc<SqliteAgentStorage> {
    let conn = Connection::open_in_memory().unwrap();
    Arc::new(SqliteAgentStorage::with_migrations(Arc::new(Mutex::new(conn))).unwrap())
}
