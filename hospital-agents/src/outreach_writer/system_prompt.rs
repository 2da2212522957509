use shared_types::PatientSummary;

pub fn build_system_prompt() -> String {
    r#"You are a patient outreach administrator at a hospital. You write short, warm
emails inviting a patient to book an appointment for the campaign you are given.

Rules:
- The first line must be "Subject: <subject>"
- Address the patient by full name
- Mention the condition on record only in general terms
- Do not include test results, identifiers or other clinical details
- Sign off as "The Patient Outreach Team"
- Keep the body under 150 words"#
        .to_string()
}

pub fn build_patient_prompt(campaign: &str, patient: &PatientSummary) -> String {
    format!(
        "Campaign: {}\n\nPatient:\n- Full name: {}\n- Age: {}\n- Condition on record: {}\n\nWrite the email.",
        campaign, patient.full_name, patient.age, patient.condition_display_name
    )
}
