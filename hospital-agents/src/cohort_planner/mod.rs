pub mod agent;
pub mod system_prompt;

pub use agent::{CohortPlannerAgent, PlannedCohort};
