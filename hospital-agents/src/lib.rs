pub mod cohort_planner;
pub mod config;
pub mod data_analyst;
pub mod llm;
pub mod outreach_writer;
pub mod pipeline;
pub mod storage;
pub mod tools;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use storage::AgentStorage;
