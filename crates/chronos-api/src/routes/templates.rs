//! 템플릿 API 라우트
//!
//! - `POST /templates` - 생성 (201, 중복 409, 잘못된 설정 422)
//! - `GET /templates?kind=` - 목록
//! - `GET /templates/{id}` - 조회

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chronos_core::{NewTemplate, StrategyTemplate, TemplateKind};
use chronos_strategy::TemplateConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::error::{api_error, not_found, validate_request, ApiResult};
use crate::state::AppState;

/// 템플릿 생성 요청
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    pub kind: TemplateKind,
    #[validate(length(min = 1, max = 200, message = "이름은 1-200자여야 합니다"))]
    pub name: String,
    #[serde(default = "default_version")]
    #[validate(range(min = 1, message = "version은 1 이상이어야 합니다"))]
    pub version: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub config_json: serde_json::Value,
}

fn default_version() -> i32 {
    1
}

/// 템플릿 목록 쿼리
#[derive(Debug, Deserialize, Validate)]
pub struct TemplateListQuery {
    #[serde(default)]
    pub kind: Option<TemplateKind>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200, message = "limit은 1-200 사이여야 합니다"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset은 0 이상이어야 합니다"))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// POST /templates
///
/// 설정은 저장 전에 검증되고 JSON 객체 형태로 정규화됩니다.
async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<StrategyTemplate>)> {
    validate_request(&request)?;

    let config_json = TemplateConfig::normalize(&request.config_json).map_err(api_error)?;

    let template = state
        .store
        .create_template(NewTemplate {
            kind: request.kind,
            name: request.name,
            version: request.version,
            description: request.description,
            config_json,
        })
        .await
        .map_err(api_error)?;

    info!(
        template_id = template.id,
        kind = %template.kind.as_str(),
        name = %template.name,
        version = template.version,
        "템플릿 생성"
    );
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /templates
async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TemplateListQuery>,
) -> ApiResult<Json<Vec<StrategyTemplate>>> {
    validate_request(&query)?;

    let templates = state
        .store
        .list_templates(query.kind, query.limit, query.offset)
        .await
        .map_err(api_error)?;
    Ok(Json(templates))
}

/// GET /templates/{id}
async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<StrategyTemplate>> {
    let template = state
        .store
        .get_template(id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("template not found"))?;
    Ok(Json(template))
}

/// 템플릿 라우터 생성.
pub fn templates_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route("/{id}", get(get_template))
}
