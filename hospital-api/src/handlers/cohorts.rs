use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{CohortSearchRequest, ErrorResponse};

use crate::AppState;

/// `POST /api/cohorts/search`
///
/// Bad input answers 400 before any FHIR request; FHIR failures answer 502.
pub async fn search_cohort(
    state: web::Data<AppState>,
    request: web::Json<CohortSearchRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();

    match state
        .finder
        .find(request.min_age, request.max_age, &request.condition)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Err(e) if e.is_invalid_input() => {
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())))
        }
        Err(e) => {
            tracing::error!("Cohort search failed: {}", e);
            Ok(HttpResponse::BadGateway().json(ErrorResponse::new(e.to_string())))
        }
    }
}
