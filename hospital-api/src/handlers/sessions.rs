use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{ErrorResponse, SessionMessage, SessionResponse, SessionToolCall};

use crate::AppState;

pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let session_id = path.into_inner();
    let internal = |e: anyhow::Error| actix_web::error::ErrorInternalServerError(e.to_string());

    let session = match state.storage.get_session(session_id).await.map_err(internal)? {
        Some(session) => session,
        None => {
            return Ok(HttpResponse::NotFound()
                .json(ErrorResponse::new(format!("Session {} not found", session_id))));
        }
    };
    let messages = state.storage.get_messages(session_id).await.map_err(internal)?;
    let tool_calls = state.storage.get_tool_calls(session_id).await.map_err(internal)?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        id: session_id,
        agent_name: session.agent_type,
        model: session.model,
        objective: session.objective,
        status: session.status,
        result: session.result,
        messages: messages
            .into_iter()
            .map(|m| SessionMessage {
                role: m.role,
                content: m.content,
                created_at: m.created_at.unwrap_or_default(),
            })
            .collect(),
        tool_calls: tool_calls
            .into_iter()
            .map(|t| SessionToolCall {
                tool_name: t.tool_name,
                request: t.tool_input,
                response: t.tool_output,
                status: t.status,
                error_details: t.error_message,
            })
            .collect(),
        started_at: session.started_at.unwrap_or_default(),
        ended_at: session.ended_at,
    }))
}
