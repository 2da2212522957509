use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use cohort_finder::{HttpFhirService, PatientCohortFinder};
use hospital_agents::llm::{LlmClient, OpenAiClient};
use hospital_agents::storage::SqliteAgentStorage;
use hospital_agents::AppConfig;
use hospital_api::{handlers, helpers, AppState};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("hospital-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (config, config_path) = AppConfig::load().map_err(std::io::Error::other)?;
    tracing::info!("Loaded config from {:?}", config_path);

    let connection = helpers::database::initialize_database(&config).map_err(std::io::Error::other)?;

    let service = HttpFhirService::new(config.fhir.clone()).map_err(std::io::Error::other)?;
    let finder = Arc::new(PatientCohortFinder::new(
        Arc::new(service),
        config.finder.clone(),
    ));

    let llm_client: Option<Arc<dyn LlmClient>> = match config.llm_api_key() {
        Some(api_key) => Some(Arc::new(
            OpenAiClient::new(api_key, &config.llm).map_err(std::io::Error::other)?,
        )),
        None => {
            tracing::warn!("No LLM API key configured; outreach runs are disabled");
            None
        }
    };

    let state = AppState {
        connection: connection.clone(),
        storage: Arc::new(SqliteAgentStorage::new(connection)),
        finder,
        llm_client,
        llm_config: config.llm.clone(),
    };

    let host = config.server.host.clone();
    let port = config.server.port;
    tracing::info!("Starting server on {}:{}", host, port);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        let cors = cors
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .route("/health", web::get().to(handlers::health::health))
            .route("/api/cohorts/search", web::post().to(handlers::cohorts::search_cohort))
            .route("/api/outreach/runs", web::post().to(handlers::outreach::create_outreach_run))
            .route("/api/sessions/{id}", web::get().to(handlers::sessions::get_session))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
