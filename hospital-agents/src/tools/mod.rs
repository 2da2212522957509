pub mod executor;

pub use executor::{
    FindPatientsParams, HospitalToolExecutor, ToolOutput, FIND_PATIENTS_TOOL, NO_PATIENTS_MESSAGE,
};
