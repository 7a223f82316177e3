use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::ApiError;
use super::state::{GuardedCatalogReader, ServerState};
use crate::catalog::{find_all, find_first, list_tools, CatalogReader, MatchKind, ToolSummary};

const TOOL_IDENTIFIER_PREFIX: &str = "edc:tool.";

#[derive(Deserialize, Debug)]
struct ToolSearchQuery {
    #[serde(rename = "toolURI")]
    tool_uri: Option<String>,
    #[serde(rename = "typeURI")]
    type_uri: Option<String>,
}

/// Runs a catalog scan on the blocking pool.
async fn scan<T, F>(catalog: GuardedCatalogReader, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn CatalogReader) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(catalog.as_ref()))
        .await
        .map_err(|err| ApiError::Internal(format!("Catalog scan failed: {}", err)))
}

async fn get_all_tools(
    State(catalog): State<GuardedCatalogReader>,
) -> Result<Json<Vec<ToolSummary>>, ApiError> {
    let tools = scan(catalog, |catalog| list_tools(catalog.records())).await?;
    Ok(Json(tools))
}

async fn search_tools(
    State(catalog): State<GuardedCatalogReader>,
    Query(query): Query<ToolSearchQuery>,
) -> Result<Json<Vec<ToolSummary>>, ApiError> {
    let lookups: Vec<(MatchKind, String)> = [
        (MatchKind::ByIdentifier, query.tool_uri),
        (MatchKind::ByDeclaredType, query.type_uri),
    ]
    .into_iter()
    .filter_map(|(kind, value)| value.filter(|v| !v.is_empty()).map(|v| (kind, v)))
    .collect();

    let matches = scan(catalog, move |catalog| {
        lookups
            .iter()
            .filter_map(|(kind, value)| find_first(catalog.records(), *kind, value))
            .collect::<Vec<_>>()
    })
    .await?;

    if matches.is_empty() {
        return Err(ApiError::NotFound("No matching tools found"));
    }
    Ok(Json(matches))
}

async fn get_tools_by_input_extension(
    State(catalog): State<GuardedCatalogReader>,
    Path(extension): Path<String>,
) -> Result<Json<Vec<ToolSummary>>, ApiError> {
    let tools = scan(catalog, move |catalog| {
        find_all(catalog.records(), MatchKind::ByInputExtension, &extension)
    })
    .await?;
    Ok(Json(tools))
}

async fn get_tool(
    State(catalog): State<GuardedCatalogReader>,
    Path(identifier): Path<String>,
) -> Result<Json<ToolSummary>, ApiError> {
    if !identifier.starts_with(TOOL_IDENTIFIER_PREFIX) {
        return Err(ApiError::BadRequest("Invalid identifier format"));
    }

    scan(catalog, move |catalog| {
        find_first(catalog.records(), MatchKind::ByIdentifier, &identifier)
    })
    .await?
    .map(Json)
    .ok_or(ApiError::NotFound("Tool not found"))
}

pub fn make_tools_routes(state: ServerState) -> Router {
    Router::new()
        .route("/tools", get(get_all_tools))
        .route("/tools/", get(get_all_tools))
        .route("/tools/search", get(search_tools))
        .route("/tools/input/{ext}", get(get_tools_by_input_extension))
        .route("/tools/{identifier}", get(get_tool))
        .with_state(state)
}
