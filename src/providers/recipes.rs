use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{upstream_message, ProviderError};
use crate::config::ProviderConfig;
use crate::state::AppState;

const PROVIDER: &str = "SPOONACULAR";

/// Thin client for the Spoonacular recipe API. Successful responses are
/// forwarded verbatim.
#[derive(Clone)]
pub struct RecipeProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RecipeProvider {
    pub fn new(cfg: &ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: cfg.spoonacular_base_url.clone(),
            api_key: cfg.spoonacular_api_key.clone(),
        }
    }

    async fn fetch(&self, path: &str, params: Vec<(&str, String)>) -> Result<Value, ProviderError> {
        let mut query = vec![("apiKey", self.api_key.clone())];
        query.extend(params);

        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: upstream_message(&body, "Recipe provider error"),
            });
        }
        Ok(resp.json().await?)
    }

    pub async fn search(&self, p: &RecipeSearch) -> Result<Value, ProviderError> {
        let mut params = vec![
            ("number", p.number.unwrap_or(10).to_string()),
            ("offset", p.offset.unwrap_or(0).to_string()),
            ("addRecipeInformation", "true".into()),
            ("fillIngredients", "true".into()),
        ];
        if let Some(q) = &p.query {
            params.push(("query", q.clone()));
        }
        if let Some(c) = &p.cuisine {
            params.push(("cuisine", c.clone()));
        }
        if let Some(d) = &p.diet {
            params.push(("diet", d.clone()));
        }
        if let Some(t) = &p.max_ready_time {
            params.push(("maxReadyTime", t.clone()));
        }
        self.fetch("/recipes/complexSearch", params).await
    }

    pub async fn by_id(&self, id: &str) -> Result<Value, ProviderError> {
        self.fetch(
            &format!("/recipes/{id}/information"),
            vec![("includeNutrition", "true".into())],
        )
        .await
    }

    pub async fn random(&self, number: Option<u32>, tags: Option<&str>) -> Result<Value, ProviderError> {
        let mut params = vec![("number", number.unwrap_or(10).to_string())];
        if let Some(tags) = tags {
            params.push(("tags", tags.to_string()));
        }
        self.fetch("/recipes/random", params).await
    }

    pub async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        number: Option<u32>,
    ) -> Result<Value, ProviderError> {
        self.fetch(
            "/recipes/findByIngredients",
            vec![
                ("ingredients", ingredients.join(",")),
                ("number", number.unwrap_or(10).to_string()),
                // ranking 2 maximizes used ingredients
                ("ranking", "2".into()),
                ("ignorePantry", "true".into()),
            ],
        )
        .await
    }

    pub async fn similar(&self, id: &str, number: Option<u32>) -> Result<Value, ProviderError> {
        self.fetch(
            &format!("/recipes/{id}/similar"),
            vec![("number", number.unwrap_or(10).to_string())],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipeSearch {
    pub query: Option<String>,
    pub cuisine: Option<String>,
    pub diet: Option<String>,
    #[serde(rename = "maxReadyTime")]
    pub max_ready_time: Option<String>,
    pub number: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub number: Option<u32>,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByIngredientsRequest {
    pub ingredients: Vec<String>,
    pub number: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub number: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes/search", get(search))
        .route("/recipes/random", get(random))
        .route("/recipes/by-ingredients", post(by_ingredients))
        .route("/recipes/:id", get(by_id))
        .route("/recipes/:id/similar", get(similar))
}

#[instrument(skip(state))]
async fn search(
    State(state): State<AppState>,
    Query(p): Query<RecipeSearch>,
) -> Result<Json<Value>, ProviderError> {
    state.recipes.search(&p).await.map(Json)
}

#[instrument(skip(state))]
async fn random(
    State(state): State<AppState>,
    Query(p): Query<RandomParams>,
) -> Result<Json<Value>, ProviderError> {
    state.recipes.random(p.number, p.tags.as_deref()).await.map(Json)
}

#[instrument(skip(state))]
async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProviderError> {
    state.recipes.by_id(&id).await.map(Json)
}

#[instrument(skip(state, payload))]
async fn by_ingredients(
    State(state): State<AppState>,
    Json(payload): Json<ByIngredientsRequest>,
) -> Result<Json<Value>, ProviderError> {
    state
        .recipes
        .find_by_ingredients(&payload.ingredients, payload.number)
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn similar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(p): Query<SimilarParams>,
) -> Result<Json<Value>, ProviderError> {
    state.recipes.similar(&id, p.number).await.map(Json)
}
