use axum::{
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::{first_validation_message, AppError};
use validator::{Validate, ValidationError};

/// Json extractor that runs `validator` rules and rejects with the
/// `{error}` body contract: parse failures and rule failures both map
/// to 400.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Json parse error: {}", e)).into_response())?;

        value
            .validate()
            .map_err(|e| AppError::ValidationError(first_validation_message(&e)).into_response())?;

        Ok(ValidatedJson(value))
    }
}

pub fn validate_message_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
