//! Request body extractors.
//!
//! Both reject with the API envelope: a body that does not parse, or a DTO
//! that fails its `validator` rules, comes back as 400 with every message in
//! `errors`.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::core::error::AppError;

/// JSON body without validation
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| AppError::InvalidFields(vec![rejection_message(&rejection)]))
    }
}

/// JSON body that must also pass the DTO's `Validate` rules
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|errors| AppError::InvalidFields(validation_messages(&errors)))?;
        Ok(Self(value))
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a request with Content-Type: application/json".to_string()
        }
        _ => "Failed to read request body".to_string(),
    }
}

/// Flatten validator output into messages, fields in name order. Violations
/// without a message fall back to `<field>: <code>`.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
                .collect::<Vec<_>>(),
            ValidationErrorsKind::Struct(nested) => validation_messages(nested),
            ValidationErrorsKind::List(items) => items
                .values()
                .flat_map(|nested| validation_messages(nested))
                .collect::<Vec<_>>(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, Validate)]
    struct Station {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, max = 10))]
        units: u8,
    }

    async fn create(ValidatedJson(station): ValidatedJson<Station>) -> String {
        format!("{}:{}", station.name, station.units)
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/stations", post(create))).unwrap()
    }

    #[test]
    fn test_validation_messages_are_ordered_by_field() {
        let station = Station {
            name: String::new(),
            units: 0,
        };
        let errors = station.validate().unwrap_err();

        assert_eq!(
            validation_messages(&errors),
            vec!["Name is required".to_string(), "units: range".to_string()]
        );
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let response = server()
            .post("/stations")
            .json(&json!({ "name": "Station 3", "units": 4 }))
            .await;

        response.assert_status_ok();
        response.assert_text("Station 3:4");
    }

    #[tokio::test]
    async fn test_invalid_body_lists_every_violation() {
        let response = server()
            .post("/stations")
            .json(&json!({ "name": "", "units": 11 }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().map(|e| e.len()), Some(2));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let response = server()
            .post("/stations")
            .bytes("{\"name\":".into())
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["errors"][0]
            .as_str()
            .is_some_and(|m| m.starts_with("Malformed JSON")));
    }
}
