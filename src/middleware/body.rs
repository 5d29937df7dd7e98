use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` whose rejections use the API error envelope: malformed bodies,
/// unknown fields and missing fields all answer 400 VALIDATION_ERROR.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        ApiError::validation_error(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Patch {
        #[allow(dead_code)]
        year: Option<i64>,
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("PUT")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_field_is_a_validation_error() {
        let err = JsonBody::<Patch>::from_request(request(r#"{"year":2,"id":9}"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref m) if m.contains("unknown field")));
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let JsonBody(patch) = JsonBody::<Patch>::from_request(request(r#"{"year":2}"#), &())
            .await
            .unwrap();
        assert_eq!(patch.year, Some(2));
    }
}
