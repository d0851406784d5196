/// JSON request bodies with field-level errors
///
/// [`ValidJson`] stands in for `axum::Json` on request bodies. A value of the
/// wrong type is reported like any other field failure:
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": { "status": ["\"bogus\" is not a valid choice."] }
/// }
/// ```
///
/// Syntax errors and non-object bodies stay `400 Bad Request`.

use crate::error::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use projectdesk_shared::error::FieldErrors;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

/// Deserialized request body
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(ApiError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        parse_json(&bytes).map(ValidJson)
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or_default().trim();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

/// Parses a JSON body, keying type errors by the offending field's path
///
/// Handlers that must authorize before looking at the body take raw
/// [`Bytes`] and call this themselves.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let parsed: Result<T, serde_path_to_error::Error<serde_json::Error>> =
        serde_path_to_error::deserialize(&mut deserializer);

    let value = parsed.map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();

        if inner.classify() == Category::Data && path != "." {
            tracing::debug!(field = %path, error = %inner, "Rejected request field");
            ApiError::ValidationError(FieldErrors::single(path, describe(&inner)))
        } else {
            ApiError::BadRequest(format!("Malformed JSON body: {}", inner))
        }
    })?;

    deserializer
        .end()
        .map_err(|err| ApiError::BadRequest(format!("Malformed JSON body: {}", err)))?;

    Ok(value)
}

/// Client-facing message without serde's position suffix
fn describe(err: &serde_json::Error) -> String {
    let text = err.to_string();
    let message = match text.rsplit_once(" at line ") {
        Some((message, _)) => message,
        None => text.as_str(),
    };

    if let Some((variant, _)) = message
        .strip_prefix("unknown variant `")
        .and_then(|rest| rest.split_once('`'))
    {
        return format!("\"{}\" is not a valid choice.", variant);
    }

    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use projectdesk_shared::models::task::TaskStatus;
    use projectdesk_shared::validation::{AddMemberPayload, TaskPatch, TaskPayload};

    fn field_errors<T: std::fmt::Debug>(result: Result<T, ApiError>) -> FieldErrors {
        match result {
            Err(ApiError::ValidationError(errors)) => errors,
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_well_formed_body() {
        let payload: TaskPayload =
            parse_json(br#"{"title": "Ship", "status": "In Progress"}"#).unwrap();

        assert_eq!(payload.title.as_deref(), Some("Ship"));
        assert_eq!(payload.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn test_unknown_choice_is_keyed_by_field() {
        let errors = field_errors(parse_json::<TaskPayload>(
            br#"{"title": "t", "status": "bogus"}"#,
        ));
        assert_eq!(
            errors.get("status").unwrap(),
            ["\"bogus\" is not a valid choice.".to_string()]
        );

        let errors = field_errors(parse_json::<TaskPayload>(br#"{"priority": "Urgent"}"#));
        assert_eq!(
            errors.get("priority").unwrap(),
            ["\"Urgent\" is not a valid choice.".to_string()]
        );
    }

    #[test]
    fn test_mistyped_values_are_keyed_by_field() {
        let errors = field_errors(parse_json::<TaskPayload>(
            br#"{"assigned_to_id": "not-a-uuid"}"#,
        ));
        assert!(errors.get("assigned_to_id").is_some());

        let errors = field_errors(parse_json::<TaskPatch>(br#"{"due_date": "tomorrow"}"#));
        assert!(errors.get("due_date").is_some());

        let errors = field_errors(parse_json::<AddMemberPayload>(br#"{"user_id": "x"}"#));
        assert!(errors.get("user_id").is_some());

        let errors = field_errors(parse_json::<AddMemberPayload>(br#"{"role": 5}"#));
        let message = &errors.get("role").unwrap()[0];
        assert!(!message.contains("line"), "position leaked: {}", message);
    }

    #[test]
    fn test_syntax_errors_are_bad_requests() {
        assert!(matches!(
            parse_json::<TaskPayload>(br#"{"title": "#),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_json::<TaskPayload>(br#"[1, 2]"#),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_json::<TaskPayload>(br#"{"title": "t"} trailing"#),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_content_type_detection() {
        let mut headers = HeaderMap::new();
        assert!(!has_json_content_type(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(has_json_content_type(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!has_json_content_type(&headers));
    }
}
