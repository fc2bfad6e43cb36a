use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use validator::{Validate, ValidationError, ValidationErrors};

/// JSON body extractor that runs `validator` rules before the handler sees
/// the payload. Both malformed JSON and rule violations answer 400.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let payload = json!({
                    "status": "error",
                    "message": format!("Invalid JSON: {}", rejection.body_text()),
                });
                (StatusCode::BAD_REQUEST, axum::Json(payload))
            })?;

        value.validate().map_err(|errors| {
            let payload = json!({
                "status": "error",
                "message": format_validation_errors(&errors),
                "details": format_validation_errors_detailed(&errors),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload))
        })?;

        Ok(Self(value))
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => match error.code.as_ref() {
            "email" => "Invalid email format".to_string(),
            "length" => "Invalid length".to_string(),
            "range" => "Value out of range".to_string(),
            _ => format!("Invalid {field}"),
        },
    }
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| format!("{field}: {}", describe(&field, e))))
        .collect();
    messages.sort();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn format_validation_errors_detailed(errors: &ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();

    for (field, errs) in errors.field_errors() {
        let messages: Vec<String> = errs.iter().map(|e| describe(&field, e)).collect();
        details.insert(field.to_string(), json!(messages));
    }

    Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::requests::RegisterRequest;

    #[test]
    fn collects_every_failing_field() {
        let req = RegisterRequest {
            username: String::new(),
            email: "not-an-email".into(),
            password: "123".into(),
            recaptcha_response: String::new(),
        };

        let errors = req.validate().unwrap_err();
        let message = format_validation_errors(&errors);
        let details = format_validation_errors_detailed(&errors);

        assert!(message.contains("password: Password must be at least 6 characters"));
        assert!(message.contains("email: Invalid email format"));
        assert_eq!(details.as_object().unwrap().len(), 3);
    }
}
