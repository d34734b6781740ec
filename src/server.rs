use std::future::Future;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;

use crate::client::{
    FatSecretClient, FatSecretError, NutritionDetails, RequestOptions, SearchParams, SearchResult,
    Serving,
};

// Parameter structs for tools
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    /// Free text or barcode digits
    pub query: String,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetFoodDetailsParams {
    /// Id from a previous search result
    pub food_id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LookupBarcodeParams {
    /// Decoded barcode payload, e.g. an EAN-13 or UPC-A string
    pub barcode: String,
}

fn search_result_json(food: &SearchResult) -> serde_json::Value {
    json!({
        "food_id": food.id,
        "name": food.name,
        "description": food.description,
        "brand": food.brand
    })
}

fn serving_json(serving: &Serving) -> serde_json::Value {
    json!({
        "calories": serving.calories,
        "serving_description": serving.serving_description,
        "metric_amount": serving.metric_amount,
        "metric_unit": serving.metric_unit,
        "protein": serving.protein,
        "carbohydrate": serving.carbohydrate,
        "fat": serving.fat
    })
}

fn details_json(details: &NutritionDetails) -> serde_json::Value {
    json!({
        "food_id": details.id,
        "name": details.name,
        "servings": details.servings.iter().map(serving_json).collect::<Vec<_>>()
    })
}

fn success(result: serde_json::Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn failure(message: &str, error: &FatSecretError) -> Result<CallToolResult, McpError> {
    tracing::warn!("{}: {}", message, error);
    let error = json!({
        "error": message,
        "details": error.to_string()
    });
    Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
}

fn invalid_input(message: &str) -> Result<CallToolResult, McpError> {
    let error = json!({ "error": message });
    Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
}

/// MCP front end for a shared [`FatSecretClient`].
///
/// Every session clones the same `Arc`, so all of them reuse one token cache.
#[derive(Clone)]
pub struct FatSecretMcpServer {
    client: Arc<FatSecretClient>,
    tool_router: ToolRouter<FatSecretMcpServer>,
}

#[tool_router]
impl FatSecretMcpServer {
    pub fn new(client: Arc<FatSecretClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    pub fn client(&self) -> &FatSecretClient {
        &self.client
    }

    #[tool(description = "Search the FatSecret food database by name or barcode")]
    pub async fn search_foods(
        &self,
        Parameters(params): Parameters<SearchFoodsParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.query.trim().is_empty() {
            return invalid_input("query must not be empty");
        }

        let search = SearchParams {
            max_results: params.max_results,
            page_number: None,
        };

        match self
            .client
            .search_foods_with(&params.query, &search, &RequestOptions::default())
            .await
        {
            Ok(foods) => success(json!({
                "foods": foods.iter().map(search_result_json).collect::<Vec<_>>(),
                "total_count": foods.len(),
                "search_interpretation": format!("Found {} foods matching '{}'", foods.len(), params.query)
            })),
            Err(e) => failure("Failed to search foods", &e),
        }
    }

    #[tool(description = "Get nutrition details and every serving size for a food id")]
    pub async fn get_food_details(
        &self,
        Parameters(params): Parameters<GetFoodDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.food_id.trim().is_empty() {
            return invalid_input("food_id must not be empty");
        }

        match self.client.get_food(&params.food_id).await {
            Ok(details) => success(details_json(&details)),
            Err(e) => failure("Failed to get food details", &e),
        }
    }

    #[tool(description = "Look up a scanned barcode: find the first matching food and summarise its first serving")]
    pub async fn lookup_barcode(
        &self,
        Parameters(params): Parameters<LookupBarcodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let barcode = params.barcode.trim();
        if barcode.is_empty() {
            return invalid_input("barcode must not be empty");
        }

        let foods = match self.client.search_foods(barcode).await {
            Ok(foods) => foods,
            Err(e) => return failure("Failed to search foods", &e),
        };

        let Some(food) = foods.first() else {
            tracing::info!("No food found for barcode {}", barcode);
            return success(json!({
                "barcode": barcode,
                "found": false,
                "message": "No food found for this barcode"
            }));
        };

        match self.client.get_food(&food.id).await {
            Ok(details) => {
                let first = details.first_serving();
                success(json!({
                    "barcode": barcode,
                    "found": true,
                    "match": search_result_json(food),
                    "other_matches": foods.len() - 1,
                    "name": details.name,
                    "serving": first.map(serving_json),
                    "summary": first.map(|s| s.to_string())
                        .unwrap_or_else(|| "No serving information available".to_string())
                }))
            }
            Err(e) => failure("Failed to get food details", &e),
        }
    }
}

#[tool_handler]
impl ServerHandler for FatSecretMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("This server looks up nutrition information in the FatSecret food database. Use search_foods to find foods by name or barcode, get_food_details to fetch every serving for a food id, and lookup_barcode to resolve a scanned barcode straight to its first serving.".to_string()),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}
