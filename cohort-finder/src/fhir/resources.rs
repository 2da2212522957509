use serde::{Deserialize, Serialize};

/// [Bundle](<https://hl7.org/fhir/R4/bundle.html>) returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle<R> {
    pub resource_type: Option<String>,
    pub total: Option<u64>,
    #[serde(default = "Vec::new")]
    pub link: Vec<BundleLink>,
    #[serde(default = "Vec::new")]
    pub entry: Vec<BundleEntry<R>>,
}

impl<R> Bundle<R> {
    /// URL of the next page, if the server paginated the result
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == "next")
            .map(|link| link.url.as_str())
    }

    pub fn into_resources(self) -> impl Iterator<Item = R> {
        self.entry.into_iter().filter_map(|entry| entry.resource)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry<R> {
    pub full_url: Option<String>,
    pub resource: Option<R>,
}

/// [Coding](<https://hl7.org/fhir/R4/datatypes.html#Coding>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    pub system: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
}

/// [CodeableConcept](<https://hl7.org/fhir/R4/datatypes.html#CodeableConcept>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

/// [Reference](<https://hl7.org/fhir/R4/references.html#Reference>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub reference: Option<String>,
    pub display: Option<String>,
}

impl Reference {
    /// Logical id of the referenced patient.
    ///
    /// Accepts relative (`Patient/123`), absolute
    /// (`https://host/baseR4/Patient/123`) and versioned
    /// (`Patient/123/_history/2`) forms.
    pub fn patient_id(&self) -> Option<&str> {
        let reference = self.reference.as_deref()?;
        let mut segments = reference.split('/');
        segments.find(|segment| *segment == "Patient")?;
        segments.next().filter(|id| !id.is_empty())
    }
}

/// [Condition](<https://hl7.org/fhir/R4/condition.html>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub resource_type: Option<String>,
    pub id: Option<String>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
}

impl Condition {
    /// Codings of the condition's code; empty when the record is uncoded
    pub fn codings(&self) -> &[Coding] {
        self.code
            .as_ref()
            .map(|code| code.coding.as_slice())
            .unwrap_or(&[])
    }
}

/// [HumanName](<https://hl7.org/fhir/R4/datatypes.html#HumanName>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    pub text: Option<String>,
    pub family: Option<String>,
    #[serde(default)]
    pub given: Vec<String>,
}

/// [ContactPoint](<https://hl7.org/fhir/R4/datatypes.html#ContactPoint>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub system: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "use")]
    pub use_: Option<String>,
}

/// [Identifier](<https://hl7.org/fhir/R4/datatypes.html#Identifier>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub type_: Option<CodeableConcept>,
    pub system: Option<String>,
    pub value: Option<String>,
}

/// [Address](<https://hl7.org/fhir/R4/datatypes.html#Address>)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// [Patient](<https://hl7.org/fhir/R4/patient.html>)
///
/// `telecom` stays an `Option` so that "field present but empty" and
/// "field absent" remain distinguishable for the inclusion policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: Option<String>,
    pub id: Option<String>,
    #[serde(default)]
    pub name: Vec<HumanName>,
    pub birth_date: Option<String>,
    pub telecom: Option<Vec<ContactPoint>>,
    pub marital_status: Option<CodeableConcept>,
    #[serde(default)]
    pub identifier: Vec<Identifier>,
    #[serde(default)]
    pub address: Vec<Address>,
}
