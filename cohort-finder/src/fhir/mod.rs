//! JSON models for the FHIR R4 resources the cohort search reads.
//!
//! These models only cover the fields the search needs. Every field is
//! optional so that sparse test servers still deserialize; the finder
//! decides which absences exclude a record.

mod resources;

pub use resources::{
    Address, Bundle, BundleEntry, BundleLink, CodeableConcept, Coding, Condition, ContactPoint,
    HumanName, Identifier, Patient, Reference,
};
