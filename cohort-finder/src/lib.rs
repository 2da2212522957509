//! Cohort Finder Crate
//!
//! Finds patients on a FHIR R4 server whose age falls in a range and who
//! carry a condition whose coded display name contains a given text.
//!
//! # Architecture
//!
//! - **Types**: `AgeRange`, `PatientSummary` and `CohortOutcome` live in the
//!   `shared-types` crate so the API and agents can serialize them
//! - **Transport**: `FhirService` is the seam to the FHIR server;
//!   `HttpFhirService` is the `reqwest` implementation
//! - **Pipeline**: `PatientCohortFinder` derives the birthdate window,
//!   searches conditions, filters them and resolves each patient
//!
//! # Example
//!
//! ```rust,ignore
//! use cohort_finder::{FhirConfig, FinderOptions, HttpFhirService, PatientCohortFinder};
//! use std::sync::Arc;
//!
//! let service = Arc::new(HttpFhirService::new(FhirConfig::default())?);
//! let finder = PatientCohortFinder::new(service, FinderOptions::default());
//! let outcome = finder.find(100, 105, "Hyperglycemia").await?;
//! ```

pub mod criteria;
pub mod error;
pub mod fhir;
pub mod finder;
pub mod service;
pub mod summary;
pub mod window;

pub use criteria::{parse_criteria, CohortCriteria, CriteriaError};
pub use error::CohortError;
pub use finder::{FinderOptions, PatientCohortFinder};
pub use service::{FhirConfig, FhirService, HttpFhirService};
pub use window::BirthdateWindow;

// Re-export the data contract for convenience
pub use shared_types::{AgeRange, CohortOutcome, PatientSummary};
