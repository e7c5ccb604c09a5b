use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info, warn};

use lever_core::api::{
    ErrorDetail, ErrorResponse, MethodNotAllowedResponse, PromptRequest, TextResponse,
    ONLY_POST_MESSAGE,
};
use lever_core::{reply_text, CompletionError};

use super::ProxyState;

/// Errors a proxy request can end in, each mapped to a JSON body.
#[derive(Debug)]
pub enum ProxyError {
    /// Body was not a JSON `{prompt}` object.
    BadRequest(JsonRejection),
    /// The upstream completion call failed.
    Upstream(CompletionError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ProxyError::BadRequest(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    kind: "bad_request".to_string(),
                    message: rejection.body_text(),
                    status: None,
                },
            ),
            ProxyError::Upstream(err) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorDetail::from(&err)),
        };
        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// `POST /api/message`: forward the prompt upstream and relay the first candidate.
pub(crate) async fn handle_message(
    State(state): State<ProxyState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, ProxyError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("rejected request body: {rejection}");
        ProxyError::BadRequest(rejection)
    })?;

    info!(prompt = %request.prompt, "forwarding prompt");

    let candidates = state.client.complete(&request.prompt).await.map_err(|e| {
        error!(kind = e.kind(), "completion failed: {e}");
        ProxyError::Upstream(e)
    })?;

    Ok(Json(TextResponse {
        text: reply_text(&candidates),
    }))
}

/// Any method other than POST on the message route.
pub(crate) async fn method_not_allowed(method: Method) -> impl IntoResponse {
    debug!(%method, "method not allowed");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(MethodNotAllowedResponse {
            message: ONLY_POST_MESSAGE.to_string(),
        }),
    )
}
