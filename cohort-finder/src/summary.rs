//! Field extraction from FHIR resources into a [`PatientSummary`].

use chrono::{Datelike, NaiveDate};
use shared_types::PatientSummary;

use crate::fhir::{Condition, Patient};

const MEDICAL_RECORD_NUMBER: &str = "Medical Record Number";
/// HL7 v2-0203 identifier type code for a medical record number
const MEDICAL_RECORD_NUMBER_CODE: &str = "MR";

/// First given name and family name of the first `name` entry.
///
/// Additional given names are dropped. Falls back to `name.text` when the
/// structured parts are missing.
pub fn full_name(patient: &Patient) -> Option<String> {
    let name = patient.name.first()?;
    let parts: Vec<&str> = name
        .given
        .first()
        .map(String::as_str)
        .into_iter()
        .chain(name.family.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return name
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
    }

    Some(parts.join(" "))
}

pub fn first_email(patient: &Patient) -> Option<String> {
    patient
        .telecom
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|contact| contact.system.as_deref() == Some("email"))
        .and_then(|contact| contact.value.clone())
}

pub fn medical_record_number(patient: &Patient) -> Option<String> {
    patient
        .identifier
        .iter()
        .find(|identifier| {
            identifier.type_.as_ref().is_some_and(|kind| {
                kind.text.as_deref() == Some(MEDICAL_RECORD_NUMBER)
                    || kind
                        .coding
                        .iter()
                        .any(|coding| coding.code.as_deref() == Some(MEDICAL_RECORD_NUMBER_CODE))
            })
        })
        .and_then(|identifier| identifier.value.clone())
}

/// Postal code of the first address only
pub fn first_postal_code(patient: &Patient) -> Option<String> {
    patient
        .address
        .first()
        .and_then(|address| address.postal_code.clone())
}

/// Parses a FHIR `date`, which may be `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
/// Partial dates resolve to the first day of the period.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(month) => month.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(day) => day.get(..2)?.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Completed years between `birth_date` and `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Display text of the condition's first coding, which is not necessarily
/// the coding that matched the search text.
pub fn condition_display(condition: &Condition) -> Option<String> {
    let code = condition.code.as_ref()?;
    code.coding
        .first()
        .and_then(|coding| coding.display.clone())
        .or_else(|| code.text.clone())
}

/// Why a resolved patient could not be summarised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryGap {
    Name,
    BirthDate,
    ConditionDisplay,
}

pub struct SummaryInput<'a> {
    pub patient_id: &'a str,
    pub source_url: String,
    pub patient: &'a Patient,
    pub condition: &'a Condition,
    pub today: NaiveDate,
    pub email_placeholder: Option<&'a str>,
}

pub fn summarize(input: SummaryInput<'_>) -> Result<PatientSummary, SummaryGap> {
    let full_name = full_name(input.patient).ok_or(SummaryGap::Name)?;
    let birth_date = input
        .patient
        .birth_date
        .as_deref()
        .and_then(parse_birth_date)
        .ok_or(SummaryGap::BirthDate)?;
    let condition_display_name =
        condition_display(input.condition).ok_or(SummaryGap::ConditionDisplay)?;

    Ok(PatientSummary {
        patient_id: input.patient_id.to_string(),
        source_url: input.source_url,
        full_name,
        age: age_on(birth_date, input.today),
        postal_code: first_postal_code(input.patient),
        medical_record_number: medical_record_number(input.patient),
        email: first_email(input.patient)
            .or_else(|| input.email_placeholder.map(str::to_string)),
        condition_display_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient(value: serde_json::Value) -> Patient {
        serde_json::from_value(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_name_keeps_first_given_only() {
        let p = patient(json!({
            "name": [{"family": "Hodkiewicz", "given": ["Ramiro", "Jr"]}, {"family": "Other"}]
        }));
        assert_eq!(full_name(&p).as_deref(), Some("Ramiro Hodkiewicz"));
    }

    #[test]
    fn test_full_name_falls_back_to_text() {
        let p = patient(json!({"name": [{"text": "Dr. Mei Tanaka"}]}));
        assert_eq!(full_name(&p).as_deref(), Some("Dr. Mei Tanaka"));

        let nameless = patient(json!({"name": []}));
        assert_eq!(full_name(&nameless), None);
    }

    #[test]
    fn test_first_email_skips_phone() {
        let p = patient(json!({
            "telecom": [
                {"system": "phone", "value": "555-0101"},
                {"system": "email", "value": "first@example.org"},
                {"system": "email", "value": "second@example.org"}
            ]
        }));
        assert_eq!(first_email(&p).as_deref(), Some("first@example.org"));
    }

    #[test]
    fn test_medical_record_number_requires_type() {
        let p = patient(json!({
            "identifier": [
                {"system": "https://github.com/synthetichealth/synthea", "value": "untyped"},
                {"type": {"text": "Social Security Number"}, "value": "999-12-3456"},
                {"type": {"text": "Medical Record Number"}, "value": "MRN-42"}
            ]
        }));
        assert_eq!(medical_record_number(&p).as_deref(), Some("MRN-42"));

        let coded = patient(json!({
            "identifier": [{
                "type": {"coding": [{"system": "http://terminology.hl7.org/CodeSystem/v2-0203", "code": "MR"}]},
                "value": "MRN-7"
            }]
        }));
        assert_eq!(medical_record_number(&coded).as_deref(), Some("MRN-7"));

        let none = patient(json!({"identifier": [{"value": "untyped"}]}));
        assert_eq!(medical_record_number(&none), None);
    }

    #[test]
    fn test_postal_code_from_first_address_only() {
        let p = patient(json!({
            "address": [{"city": "London"}, {"postalCode": "SW1A 1AA"}]
        }));
        assert_eq!(first_postal_code(&p), None);
    }

    #[test]
    fn test_parse_birth_date_partial_forms() {
        assert_eq!(parse_birth_date("1921-03-04"), Some(date(1921, 3, 4)));
        assert_eq!(parse_birth_date("1921-03"), Some(date(1921, 3, 1)));
        assert_eq!(parse_birth_date("1921"), Some(date(1921, 1, 1)));
        assert_eq!(parse_birth_date("1921-13-01"), None);
        assert_eq!(parse_birth_date("unknown"), None);
    }

    #[test]
    fn test_age_on_birthday_boundaries() {
        let birth = date(1950, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), 73);
        assert_eq!(age_on(birth, date(2024, 6, 15)), 74);

        let leap = date(2000, 2, 29);
        assert_eq!(age_on(leap, date(2023, 2, 28)), 22);
        assert_eq!(age_on(leap, date(2023, 3, 1)), 23);
    }

    #[test]
    fn test_condition_display_uses_first_coding() {
        let condition: Condition = serde_json::from_value(json!({
            "code": {"coding": [
                {"display": "Diabetes mellitus type 2"},
                {"display": "Hyperglycemia (disorder)"}
            ]}
        }))
        .unwrap();
        assert_eq!(
            condition_display(&condition).as_deref(),
            Some("Diabetes mellitus type 2")
        );
    }

    #[test]
    fn test_summarize_uses_placeholder_when_no_email() {
        let p = patient(json!({
            "name": [{"family": "Reyes", "given": ["Ana"]}],
            "birthDate": "1920-01-10",
            "telecom": [{"system": "phone", "value": "555-0101"}]
        }));
        let condition: Condition = serde_json::from_value(json!({
            "code": {"coding": [{"display": "Acute bronchitis"}]}
        }))
        .unwrap();

        let summary = summarize(SummaryInput {
            patient_id: "7",
            source_url: "https://fhir.example/Patient/7".to_string(),
            patient: &p,
            condition: &condition,
            today: date(2024, 1, 10),
            email_placeholder: Some("outreach@hospital.example"),
        })
        .unwrap();

        assert_eq!(summary.age, 104);
        assert_eq!(summary.email.as_deref(), Some("outreach@hospital.example"));
        assert_eq!(summary.full_name, "Ana Reyes");
    }

    #[test]
    fn test_summarize_reports_missing_birth_date() {
        let p = patient(json!({"name": [{"family": "Reyes", "given": ["Ana"]}]}));
        let condition: Condition = serde_json::from_value(json!({
            "code": {"coding": [{"display": "Acute bronchitis"}]}
        }))
        .unwrap();

        let gap = summarize(SummaryInput {
            patient_id: "7",
            source_url: String::new(),
            patient: &p,
            condition: &condition,
            today: date(2024, 1, 10),
            email_placeholder: None,
        })
        .unwrap_err();
        assert_eq!(gap, SummaryGap::BirthDate);
    }
}
