use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    match state.connection.lock() {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::InternalServerError().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}
