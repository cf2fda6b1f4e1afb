use crate::YouTubeError;
use http_body_util::BodyExt;
use hyper::body::{Bytes, Incoming};
use hyper::http::request::Builder;
use hyper::{Response, StatusCode};
use serde::Deserialize;

use crate::GoogleAPIRequestFields;

const QUOTA_MESSAGE_PREFIX: &str = "The request cannot be completed because you have exceeded your";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

impl ErrorBody {
    fn is_quota(&self) -> bool {
        self.message.starts_with(QUOTA_MESSAGE_PREFIX)
            || self.errors.iter().any(|e| {
                matches!(e.reason.as_deref(), Some("quotaExceeded") | Some("rateLimitExceeded"))
            })
    }
}

pub(crate) fn apply_fields(mut builder: Builder, fields: &GoogleAPIRequestFields<'_>) -> Builder {
    if let Some(key) = fields.key {
        builder = builder.header("X-Goog-Api-Key", key);
    }

    if let Some(bearer_token) = fields.bearer_token {
        builder = builder.header("Authorization", format!("Bearer {}", bearer_token));
    }

    builder
}

pub(crate) async fn read_body(resp: Response<Incoming>) -> Result<Bytes, YouTubeError> {
    let status = resp.status();
    let body = resp.into_body().collect().await?.to_bytes();

    if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
        return Ok(body);
    }

    let api_error = serde_json::from_slice::<ErrorResponse>(&body).ok().map(|e| e.error);

    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(YouTubeError::Ratelimited),
        StatusCode::FORBIDDEN => match api_error {
            Some(error) if error.is_quota() => Err(YouTubeError::Ratelimited),
            Some(error) => {
                tracing::warn!("Forbidden: {}", error.message);
                Err(YouTubeError::Forbidden(error.message))
            }
            None => {
                let body_str = String::from_utf8_lossy(&body);
                tracing::warn!("Failed to parse error response: {}", body_str);
                Err(YouTubeError::Forbidden(body_str.into_owned()))
            }
        },
        StatusCode::BAD_REQUEST => {
            let message = api_error
                .map(|e| e.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            Err(YouTubeError::BadRequest(message))
        }
        StatusCode::NOT_FOUND => Err(YouTubeError::NotFound),
        StatusCode::UNAUTHORIZED => {
            tracing::warn!("Unauthorized error response: {}", String::from_utf8_lossy(&body));
            Err(YouTubeError::Unauthorized)
        }
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
            Err(YouTubeError::InternalServerError)
        }
        status => {
            tracing::warn!("Unknown status code {}: {}", status.as_u16(), String::from_utf8_lossy(&body));
            Err(YouTubeError::UnknownStatusCode(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_detected_from_message_or_reason() {
        let by_message: ErrorResponse = serde_json::from_str(
            r#"{"error":{"message":"The request cannot be completed because you have exceeded your quota."}}"#,
        )
        .unwrap();
        assert!(by_message.error.is_quota());

        let by_reason: ErrorResponse = serde_json::from_str(
            r#"{"error":{"message":"nope","errors":[{"reason":"rateLimitExceeded"}]}}"#,
        )
        .unwrap();
        assert!(by_reason.error.is_quota());

        let other: ErrorResponse = serde_json::from_str(
            r#"{"error":{"message":"Insufficient permission","errors":[{"reason":"insufficientPermissions"}]}}"#,
        )
        .unwrap();
        assert!(!other.error.is_quota());
    }
}
