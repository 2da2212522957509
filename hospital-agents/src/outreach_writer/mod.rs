pub mod agent;
pub mod output;
pub mod system_prompt;

pub use agent::OutreachWriterAgent;
pub use output::{write_outreach, OUTREACH_CSV};
