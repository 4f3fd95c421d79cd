use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use super::{upstream_message, ProviderError};
use crate::config::ProviderConfig;
use crate::state::AppState;

const PROVIDER: &str = "COCKTAILDB";

/// Thin client for TheCocktailDB. The API key is a path segment rather than
/// a query parameter; "1" is the public development key.
#[derive(Clone)]
pub struct CocktailProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CocktailProvider {
    pub fn new(cfg: &ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: cfg.cocktaildb_base_url.clone(),
            api_key: cfg.cocktaildb_api_key.clone(),
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/api/json/v1/{}/{}",
            self.base_url, self.api_key, endpoint
        );
        let resp = self.client.get(url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: upstream_message(&body, "Cocktail provider error"),
            });
        }
        Ok(resp.json().await?)
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Value, ProviderError> {
        self.fetch("search.php", vec![("s", name.to_string())]).await
    }

    pub async fn by_id(&self, id: &str) -> Result<Value, ProviderError> {
        self.fetch("lookup.php", vec![("i", id.to_string())]).await
    }

    pub async fn random(&self) -> Result<Value, ProviderError> {
        self.fetch("random.php", Vec::new()).await
    }

    pub async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Value, ProviderError> {
        self.fetch("filter.php", vec![("i", ingredient.to_string())])
            .await
    }

    pub async fn filter_by_category(&self, category: &str) -> Result<Value, ProviderError> {
        self.fetch("filter.php", vec![("c", category.to_string())])
            .await
    }

    pub async fn filter_by_alcoholic(&self, alcoholic: &str) -> Result<Value, ProviderError> {
        self.fetch("filter.php", vec![("a", alcoholic.to_string())])
            .await
    }

    pub async fn list_categories(&self) -> Result<Value, ProviderError> {
        self.fetch("list.php", vec![("c", "list".into())]).await
    }

    pub async fn list_ingredients(&self) -> Result<Value, ProviderError> {
        self.fetch("list.php", vec![("i", "list".into())]).await
    }

    pub async fn list_glasses(&self) -> Result<Value, ProviderError> {
        self.fetch("list.php", vec![("g", "list".into())]).await
    }
}

#[derive(Debug, Deserialize)]
pub struct NameParam {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientParam {
    pub ingredient: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryParam {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlcoholicParam {
    pub alcoholic: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cocktails/search", get(search))
        .route("/cocktails/random", get(random))
        .route("/cocktails/by-ingredient", get(by_ingredient))
        .route("/cocktails/by-category", get(by_category))
        .route("/cocktails/by-alcoholic", get(by_alcoholic))
        .route("/cocktails/categories", get(categories))
        .route("/cocktails/ingredients", get(ingredients))
        .route("/cocktails/glasses", get(glasses))
        .route("/cocktails/:id", get(by_id))
}

#[instrument(skip(state))]
async fn search(
    State(state): State<AppState>,
    Query(p): Query<NameParam>,
) -> Result<Json<Value>, ProviderError> {
    state
        .cocktails
        .search_by_name(p.name.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn random(State(state): State<AppState>) -> Result<Json<Value>, ProviderError> {
    state.cocktails.random().await.map(Json)
}

#[instrument(skip(state))]
async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProviderError> {
    state.cocktails.by_id(&id).await.map(Json)
}

#[instrument(skip(state))]
async fn by_ingredient(
    State(state): State<AppState>,
    Query(p): Query<IngredientParam>,
) -> Result<Json<Value>, ProviderError> {
    state
        .cocktails
        .filter_by_ingredient(p.ingredient.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn by_category(
    State(state): State<AppState>,
    Query(p): Query<CategoryParam>,
) -> Result<Json<Value>, ProviderError> {
    state
        .cocktails
        .filter_by_category(p.category.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn by_alcoholic(
    State(state): State<AppState>,
    Query(p): Query<AlcoholicParam>,
) -> Result<Json<Value>, ProviderError> {
    state
        .cocktails
        .filter_by_alcoholic(p.alcoholic.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

#[instrument(skip(state))]
async fn categories(State(state): State<AppState>) -> Result<Json<Value>, ProviderError> {
    state.cocktails.list_categories().await.map(Json)
}

#[instrument(skip(state))]
async fn ingredients(State(state): State<AppState>) -> Result<Json<Value>, ProviderError> {
    state.cocktails.list_ingredients().await.map(Json)
}

#[instrument(skip(state))]
async fn glasses(State(state): State<AppState>) -> Result<Json<Value>, ProviderError> {
    state.cocktails.list_glasses().await.map(Json)
}
