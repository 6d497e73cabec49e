use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::attempt::{ApplicationLog, DEFAULT_LOG_LIMIT, NewApplicationLog};
use crate::mapping::{FieldMapping, NewFieldMapping, PlatformMappings};
use crate::selector::{CustomSelector, NewCustomSelector};
use crate::seed;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::extract::{ValidJson, ValidPath, ValidQuery};

pub const API_TITLE: &str = "Job Application Autofill API";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

/// `?skip=&limit=` for the log listing. `limit` has no upper bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    pub skip: u64,
    pub limit: u64,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_LOG_LIMIT }
    }
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: API_TITLE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ========== Field Mappings ==========

/// `field_name -> selectors` for one platform. Unknown platforms resolve to
/// an empty map.
pub async fn get_platform_mappings(
    State(state): State<Arc<AppState>>,
    ValidPath(platform): ValidPath<String>,
) -> Result<Json<PlatformMappings>, ApiError> {
    let resolved = state
        .with_store(move |store| {
            let rows = store.find_field_mappings_by_platform(&platform)?;
            Ok(PlatformMappings::resolve(platform, rows))
        })
        .await?;
    Ok(Json(resolved))
}

pub async fn create_mapping(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<NewFieldMapping>,
) -> Result<Json<FieldMapping>, ApiError> {
    let created = state.with_store(move |store| store.insert_field_mapping(&body)).await?;
    tracing::debug!("Created mapping {} ({}/{})", created.id, created.platform, created.field_name);
    Ok(Json(created))
}

pub async fn update_mapping(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(body): ValidJson<NewFieldMapping>,
) -> Result<Json<FieldMapping>, ApiError> {
    let updated = state.with_store(move |store| store.update_field_mapping(id, &body)).await?;
    Ok(Json(updated))
}

pub async fn delete_mapping(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.with_store(move |store| store.delete_field_mapping(id)).await?;
    Ok(MessageResponse::new("Mapping deleted"))
}

// ========== Application Logs ==========

pub async fn create_log(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<NewApplicationLog>,
) -> Result<Json<ApplicationLog>, ApiError> {
    let created = state.with_store(move |store| store.insert_application_log(&body)).await?;
    Ok(Json(created))
}

pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<LogQuery>,
) -> Result<Json<Vec<ApplicationLog>>, ApiError> {
    let logs = state
        .with_store(move |store| store.list_application_logs(query.skip, query.limit))
        .await?;
    Ok(Json(logs))
}

// ========== Custom Selectors ==========

pub async fn list_selectors(
    State(state): State<Arc<AppState>>,
    ValidPath(domain): ValidPath<String>,
) -> Result<Json<Vec<CustomSelector>>, ApiError> {
    let selectors = state
        .with_store(move |store| store.find_custom_selectors_by_domain(&domain))
        .await?;
    Ok(Json(selectors))
}

pub async fn create_selector(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<NewCustomSelector>,
) -> Result<Json<CustomSelector>, ApiError> {
    let created = state.with_store(move |store| store.insert_custom_selector(&body)).await?;
    Ok(Json(created))
}

pub async fn delete_selector(
    State(state): State<Arc<AppState>>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.with_store(move |store| store.delete_custom_selector(id)).await?;
    Ok(MessageResponse::new("Selector deleted"))
}

// ========== Seed ==========

pub async fn seed_greenhouse(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = state.with_store(seed::seed_greenhouse).await?;
    Ok(MessageResponse::new(outcome.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tempfile::TempDir;

    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::initialize(dir.path().join("autofill.db")).unwrap();
        (dir, Arc::new(state))
    }

    fn mapping_body(platform: &str, field_name: &str, selectors: &[&str]) -> ValidJson<NewFieldMapping> {
        ValidJson(NewFieldMapping::new(platform, field_name, selectors.iter().copied()))
    }

    fn log_body(url: &str) -> ValidJson<NewApplicationLog> {
        ValidJson(NewApplicationLog {
            url: url.to_string(),
            platform: "greenhouse".to_string(),
            fields_filled: vec!["first_name".to_string(), "email".to_string()],
            fields_failed: vec![],
            resume_uploaded: false,
        })
    }

    #[tokio::test]
    async fn test_root_banner() {
        let Json(banner) = root().await;
        assert_eq!(banner.message, "Job Application Autofill API");
        assert_eq!(banner.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_create_mapping_returns_fresh_record() {
        let (_dir, state) = test_state();

        let Json(first) = create_mapping(State(state.clone()), mapping_body("lever", "email", &["#email"]))
            .await
            .unwrap();
        let Json(second) = create_mapping(State(state.clone()), mapping_body("lever", "email", &["#email"]))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.updated_at.is_none());

        let json = serde_json::to_value(&first).unwrap();
        assert_eq!(json["field_type"], "input");
        assert!(json["updated_at"].is_null());
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_platform_resolves_empty() {
        let (_dir, state) = test_state();

        let Json(resolved) = get_platform_mappings(State(state), ValidPath("workday".to_string()))
            .await
            .unwrap();
        assert_eq!(resolved.platform, "workday");
        assert!(resolved.mappings.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_field_resolves_to_later_row() {
        let (_dir, state) = test_state();

        create_mapping(State(state.clone()), mapping_body("x", "email", &["#first"])).await.unwrap();
        create_mapping(State(state.clone()), mapping_body("x", "phone", &["#phone"])).await.unwrap();
        create_mapping(State(state.clone()), mapping_body("x", "email", &["#second", "#third"])).await.unwrap();

        let Json(resolved) = get_platform_mappings(State(state), ValidPath("x".to_string())).await.unwrap();
        assert_eq!(resolved.mappings.len(), 2);
        assert_eq!(resolved.selectors_for("email").unwrap(), &["#second", "#third"]);
    }

    #[tokio::test]
    async fn test_update_mapping_replaces_fields() {
        let (_dir, state) = test_state();

        let Json(created) = create_mapping(State(state.clone()), mapping_body("lever", "email", &["#email"]))
            .await
            .unwrap();
        let Json(updated) = update_mapping(
            State(state.clone()),
            ValidPath(created.id),
            mapping_body("lever", "cover_letter", &["textarea#cover"]),
        )
        .await
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.field_name, "cover_letter");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_mapping_is_404() {
        let (_dir, state) = test_state();

        let err = update_mapping(State(state), ValidPath(999), mapping_body("x", "a", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Mapping not found"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_mapping_twice() {
        let (_dir, state) = test_state();

        let Json(created) = create_mapping(State(state.clone()), mapping_body("x", "a", &[])).await.unwrap();

        let Json(msg) = delete_mapping(State(state.clone()), ValidPath(created.id)).await.unwrap();
        assert_eq!(msg.message, "Mapping deleted");

        let err = delete_mapping(State(state), ValidPath(created.id)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_logs_paginated_newest_first() {
        let (_dir, state) = test_state();

        let mut ids = Vec::new();
        for url in ["https://a.example/1", "https://a.example/2", "https://a.example/3"] {
            let Json(log) = create_log(State(state.clone()), log_body(url)).await.unwrap();
            ids.push(log.id);
        }

        let Json(page) = list_logs(State(state.clone()), ValidQuery(LogQuery { skip: 0, limit: 2 }))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);
        assert!(page[0].created_at >= page[1].created_at);

        let Json(rest) = list_logs(State(state), ValidQuery(LogQuery { skip: 2, limit: 50 }))
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, ids[0]);
    }

    #[tokio::test]
    async fn test_log_resume_flag_stored_as_int() {
        let (_dir, state) = test_state();

        let mut body = log_body("https://jobs.lever.co/acme/1");
        body.0.resume_uploaded = true;
        let Json(created) = create_log(State(state), body).await.unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["resume_uploaded"], 1);
    }

    #[tokio::test]
    async fn test_seed_twice() {
        let (_dir, state) = test_state();

        let Json(first) = seed_greenhouse(State(state.clone())).await.unwrap();
        assert_eq!(first.message, "Seeded 6 Greenhouse mappings");

        let Json(second) = seed_greenhouse(State(state.clone())).await.unwrap();
        assert_eq!(second.message, "Greenhouse mappings already exist");

        let Json(resolved) = get_platform_mappings(State(state), ValidPath("greenhouse".to_string()))
            .await
            .unwrap();
        assert_eq!(resolved.mappings.len(), 6);
        assert_eq!(
            resolved.selectors_for("first_name").unwrap()[0],
            r#"input[name*="first_name"]"#
        );
    }

    #[tokio::test]
    async fn test_selectors_by_domain() {
        let (_dir, state) = test_state();

        let Json(created) = create_selector(
            State(state.clone()),
            ValidJson(NewCustomSelector::new("jobs.apple.com", "email", "#applicant-email")),
        )
        .await
        .unwrap();

        let Json(found) = list_selectors(State(state.clone()), ValidPath("jobs.apple.com".to_string()))
            .await
            .unwrap();
        assert_eq!(found, vec![created.clone()]);

        let Json(other) = list_selectors(State(state.clone()), ValidPath("careers.google.com".to_string()))
            .await
            .unwrap();
        assert!(other.is_empty());

        let Json(msg) = delete_selector(State(state.clone()), ValidPath(created.id)).await.unwrap();
        assert_eq!(msg.message, "Selector deleted");
        let err = delete_selector(State(state), ValidPath(created.id)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Selector not found"));
    }
}
