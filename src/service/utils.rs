use crate::types::ApiError;
use anyhow::Result;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Check response status and turn failures into a classified `ApiError`.
/// Returns Ok(Response) if successful.
pub async fn check_response_error(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let response_text = response
        .text()
        .await
        .map_err(|e| ApiError::NetworkError(e.to_string()))?;
    let detail = extract_error_message(&response_text).unwrap_or(response_text);

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Authentication(detail),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::InvalidRequest(detail)
        }
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        status if status.is_server_error() => ApiError::ServiceError(detail),
        _ => ApiError::Unknown(format!("Status {status}: {detail}")),
    };

    Err(error.into())
}

/// Read the body and deserialize it, reporting decode failures as malformed responses
pub async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::NetworkError(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| {
        debug!("Failed to decode response body: {}", body);
        ApiError::MalformedResponse(e.to_string()).into()
    })
}

/// Services wrap errors as `{"error": {"message": "..."}}`
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
        .map(|message| message.to_string())
}
