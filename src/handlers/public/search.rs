// handlers/public/search.rs - POST /api/search handler

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct School {
    pub name: String,
    pub state: String,
    pub ownership: String,
    pub size: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub schools: Vec<School>,
}

/// POST /api/search - Institution search placeholder
///
/// Returns a single mock institution derived from the query until a real
/// institution index is wired in.
pub async fn search_post(payload: Result<Json<SearchRequest>, JsonRejection>) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    tracing::debug!("Institution search for '{}'", request.query);

    Ok(Json(SearchResponse {
        schools: mock_schools(&request.query),
    }))
}

fn mock_schools(query: &str) -> Vec<School> {
    vec![School {
        name: format!("University of {}", query),
        state: "CA".to_string(),
        ownership: "Public".to_string(),
        size: 25000,
    }]
}
