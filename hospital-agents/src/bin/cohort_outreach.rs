use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cohort_finder::{CohortOutcome, HttpFhirService, PatientCohortFinder};
use hospital_agents::data_analyst::{self, DataAnalystAgent};
use hospital_agents::llm::{LlmClient, OpenAiClient};
use hospital_agents::outreach_writer::write_outreach;
use hospital_agents::pipeline::OutreachPipeline;
use hospital_agents::storage::{record_outcome, sqlite_storage::SqliteAgentStorage, Session};
use hospital_agents::tools::{HospitalToolExecutor, NO_PATIENTS_MESSAGE};
use hospital_agents::{AgentStorage, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "cohort-outreach", about = "Find patient cohorts on a FHIR server and draft outreach")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for patients by age range and condition
    Find {
        #[arg(long)]
        min_age: u32,

        #[arg(long)]
        max_age: u32,

        /// Text contained in the condition display name, e.g. "Hyperglycemia"
        #[arg(long)]
        condition: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the data analyst agent for patients matching a plain-language request
    Analyze {
        #[arg(long)]
        request: String,
    },

    /// Plan a cohort from an objective, find it and write outreach emails
    Outreach {
        /// Target cohort, e.g. "Find patients for colonoscopy screening"
        #[arg(long)]
        objective: String,

        #[arg(long, value_name = "DIR", default_value = "outreach")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let (config, config_path) = AppConfig::load().context("Failed to load hospital config")?;
    tracing::info!("Using config at {:?}", config_path);

    let service = HttpFhirService::new(config.fhir.clone())?;
    let finder = Arc::new(PatientCohortFinder::new(
        Arc::new(service),
        config.finder.clone(),
    ));

    match cli.command {
        Command::Find {
            min_age,
            max_age,
            condition,
            json,
        } => {
            let outcome = finder.find(min_age, max_age, &condition).await?;
            print_outcome(&outcome, json)?;
        }
        Command::Analyze { request } => {
            let llm_client = llm_client(&config, &config_path)?;
            let storage = open_storage(&config)?;
            let tool_executor = Arc::new(HospitalToolExecutor::new(finder));

            let session_id = storage
                .create_session(Session::running(
                    data_analyst::agent::AGENT_TYPE,
                    &config.llm.model,
                    request.clone(),
                ))
                .await?;

            let agent = DataAnalystAgent::new(
                llm_client,
                storage.clone(),
                tool_executor,
                config.llm.clone(),
            );
            let outcome = agent.execute(session_id, &request).await;
            let report = record_outcome(storage.as_ref(), session_id, outcome, |report| {
                report.reply.clone()
            })
            .await?;

            println!("{}", report.reply);
        }
        Command::Outreach {
            objective,
            output_dir,
        } => {
            let llm_client = llm_client(&config, &config_path)?;
            let storage = open_storage(&config)?;

            let pipeline = OutreachPipeline::new(llm_client, storage, finder, config.llm.clone());
            let run = pipeline.run(&objective).await?;

            println!("Criteria: {}", run.criteria);
            if run.emails.is_empty() {
                println!("{}", NO_PATIENTS_MESSAGE);
                return Ok(());
            }
            let csv_path = write_outreach(&output_dir, &run.emails)?;
            println!("Wrote {} emails; index at {}", run.emails.len(), csv_path.display());
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_outcome(outcome: &CohortOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        CohortOutcome::NoRecordsInWindow => println!("{}", NO_PATIENTS_MESSAGE),
        CohortOutcome::Found { patients } if patients.is_empty() => {
            println!("Condition records found, but no patient passed the filters")
        }
        CohortOutcome::Found { patients } => {
            for patient in patients {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    patient.full_name,
                    patient.age,
                    patient.condition_display_name,
                    patient.email.as_deref().unwrap_or("-"),
                    patient.source_url
                );
            }
        }
    }
    Ok(())
}

fn llm_client(config: &AppConfig, config_path: &Path) -> Result<Arc<dyn LlmClient>> {
    let api_key = config.llm_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "Missing llm.api_key in config at {:?} (or set OPENAI_API_KEY)",
            config_path
        )
    })?;
    Ok(Arc::new(OpenAiClient::new(api_key, &config.llm)?))
}

fn open_storage(config: &AppConfig) -> Result<Arc<dyn AgentStorage>> {
    let db_path = config.resolve_db_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Failed to open db at {:?}", db_path))?;
    Ok(Arc::new(SqliteAgentStorage::with_migrations(Arc::new(
        Mutex::new(conn),
    ))?))
}
