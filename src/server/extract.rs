//! Extractors that turn axum's rejections into `ApiError::Validation`
//!
//! axum answers bad JSON with 400/415/422 and bad path or query values with
//! 400. The API reports all of them as 422 with a `detail` message.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use crate::server::error::ApiError;

/// Typed JSON body
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// Typed path parameters
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// Typed query string
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use crate::NewFieldMapping;
    use crate::server::routes::LogQuery;

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/api/mappings")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn query_parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_valid_json_accepts_body() {
        let req = json_request(r##"{"platform": "lever", "field_name": "email", "selectors": ["#email"]}"##);
        let ValidJson(body) = ValidJson::<NewFieldMapping>::from_request(req, &()).await.unwrap();
        assert_eq!(body.platform, "lever");
        assert_eq!(body.selectors, vec!["#email"]);
    }

    #[tokio::test]
    async fn test_valid_json_rejects_missing_field() {
        let req = json_request(r#"{"platform": "lever", "selectors": []}"#);
        let err = ValidJson::<NewFieldMapping>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref msg) if msg.contains("field_name")));
    }

    #[tokio::test]
    async fn test_valid_json_rejects_wrong_types() {
        let req = json_request(r##"{"platform": "lever", "field_name": "email", "selectors": "#email"}"##);
        let err = ValidJson::<NewFieldMapping>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let req = json_request("not json");
        let err = ValidJson::<NewFieldMapping>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_valid_query_defaults() {
        let mut parts = query_parts("/api/logs");
        let ValidQuery(query) = ValidQuery::<LogQuery>::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 50);

        let mut parts = query_parts("/api/logs?skip=5&limit=2");
        let ValidQuery(query) = ValidQuery::<LogQuery>::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!((query.skip, query.limit), (5, 2));
    }

    #[tokio::test]
    async fn test_valid_query_limit_has_no_ceiling() {
        let mut parts = query_parts("/api/logs?limit=5000000000");
        let ValidQuery(query) = ValidQuery::<LogQuery>::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(query.limit, 5_000_000_000);
        assert_eq!(query.skip, 0);
    }

    #[tokio::test]
    async fn test_valid_query_rejects_negative_limit() {
        let mut parts = query_parts("/api/logs?limit=-1");
        let err = ValidQuery::<LogQuery>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
