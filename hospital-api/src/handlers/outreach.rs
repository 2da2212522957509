use actix_web::{web, HttpResponse, Result as ActixResult};
use hospital_agents::pipeline::OutreachPipeline;
use shared_types::{CreateOutreachRunRequest, ErrorResponse, OutreachRunResponse};

use crate::AppState;

/// `POST /api/outreach/runs`: plans a cohort for the objective, finds it and
/// drafts one email per patient.
pub async fn create_outreach_run(
    state: web::Data<AppState>,
    request: web::Json<CreateOutreachRunRequest>,
) -> ActixResult<HttpResponse> {
    let objective = request.into_inner().objective;
    if objective.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("objective must not be empty")));
    }

    let llm_client = match &state.llm_client {
        Some(client) => client.clone(),
        None => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new("LLM API key not configured")));
        }
    };

    let pipeline = OutreachPipeline::new(
        llm_client,
        state.storage.clone(),
        state.finder.clone(),
        state.llm_config.clone(),
    );

    match pipeline.run(&objective).await {
        Ok(run) => Ok(HttpResponse::Ok().json(OutreachRunResponse {
            session_id: run.session_id,
            status: "completed".to_string(),
            criteria: Some(run.criteria),
            emails: run.emails,
        })),
        Err(e) => {
            tracing::error!("Outreach run failed: {:#}", e);
            Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new(format!("Outreach run failed: {}", e))))
        }
    }
}
