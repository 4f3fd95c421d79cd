use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Date, OffsetDateTime};
use tracing::warn;

use super::kv::{DiskKv, KEY_PLANNER_ITEMS, KEY_SAVED_RECIPES};

/// Upstream recipe identifier. The recipe provider hands out numeric ids
/// and the cocktail provider string ids; keeping both shapes in the type
/// means the two id spaces can never collide through equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Num(i64),
    Text(String),
}

impl From<i64> for RecipeId {
    fn from(n: i64) -> Self {
        RecipeId::Num(n)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        RecipeId::Text(s.to_string())
    }
}

/// A recipe as returned by its provider, cached verbatim for offline
/// display. Only `id` is interpreted; everything else rides along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

pub const DEFAULT_MEAL_TYPE: &str = "Dinner";

/// A scheduled meal. The recipe is embedded by value so a plan survives the
/// recipe being removed from the saved list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerItem {
    pub id: String,
    pub recipe: Recipe,
    pub date: Date,
    pub meal_type: String,
}

/// The saved-recipe library and meal planner, durable across restarts.
///
/// Mutations take `&mut self`: the store belongs to a single logical thread
/// of control, and every mutation rewrites the affected collection in full
/// before returning.
pub struct LibraryStore {
    kv: DiskKv,
    saved: Vec<Recipe>,
    planner: Vec<PlannerItem>,
    last_planner_id: i128,
}

impl LibraryStore {
    /// Loads both collections from durable storage. A missing or unreadable
    /// entry loads as an empty collection; first run and corruption both
    /// start clean rather than failing.
    pub fn open(kv: DiskKv) -> Self {
        let saved: Vec<Recipe> = read_collection(&kv, KEY_SAVED_RECIPES);
        let planner: Vec<PlannerItem> = read_collection(&kv, KEY_PLANNER_ITEMS);
        let last_planner_id = planner
            .iter()
            .filter_map(|i| i.id.parse::<i128>().ok())
            .max()
            .unwrap_or(0);
        Self {
            kv,
            saved,
            planner,
            last_planner_id,
        }
    }

    pub fn saved(&self) -> &[Recipe] {
        &self.saved
    }

    pub fn planner(&self) -> &[PlannerItem] {
        &self.planner
    }

    /// Planner entries in display order, earliest date first.
    pub fn planner_by_date(&self) -> Vec<&PlannerItem> {
        let mut items: Vec<&PlannerItem> = self.planner.iter().collect();
        items.sort_by_key(|i| i.date);
        items
    }

    pub fn is_saved(&self, id: &RecipeId) -> bool {
        self.saved.iter().any(|r| r.id == *id)
    }

    /// Saving an already-saved recipe is a no-op; the collection holds at
    /// most one entry per id.
    pub fn add_to_saved(&mut self, recipe: Recipe) -> anyhow::Result<()> {
        if self.is_saved(&recipe.id) {
            return Ok(());
        }
        self.saved.push(recipe);
        self.persist_saved()
    }

    /// Removing an id that is not present is a no-op.
    pub fn remove_from_saved(&mut self, id: &RecipeId) -> anyhow::Result<()> {
        let before = self.saved.len();
        self.saved.retain(|r| r.id != *id);
        if self.saved.len() == before {
            return Ok(());
        }
        self.persist_saved()
    }

    /// Always creates a new entry: planning the same recipe twice for the
    /// same slot yields two items with distinct ids. Returns the new id.
    pub fn add_to_planner(
        &mut self,
        recipe: Recipe,
        date: Date,
        meal_type: Option<&str>,
    ) -> anyhow::Result<String> {
        let id = self.next_planner_id();
        self.planner.push(PlannerItem {
            id: id.clone(),
            recipe,
            date,
            meal_type: meal_type.unwrap_or(DEFAULT_MEAL_TYPE).to_string(),
        });
        self.persist_planner()?;
        Ok(id)
    }

    pub fn remove_from_planner(&mut self, id: &str) -> anyhow::Result<()> {
        let before = self.planner.len();
        self.planner.retain(|i| i.id != id);
        if self.planner.len() == before {
            return Ok(());
        }
        self.persist_planner()
    }

    // Unix-millisecond ids, bumped past the previous one so two entries
    // created within the same millisecond stay distinct.
    fn next_planner_id(&mut self) -> String {
        let now_millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let id = now_millis.max(self.last_planner_id + 1);
        self.last_planner_id = id;
        id.to_string()
    }

    fn persist_saved(&self) -> anyhow::Result<()> {
        self.kv
            .set(KEY_SAVED_RECIPES, &serde_json::to_string(&self.saved)?)
    }

    fn persist_planner(&self) -> anyhow::Result<()> {
        self.kv
            .set(KEY_PLANNER_ITEMS, &serde_json::to_string(&self.planner)?)
    }
}

fn read_collection<T: serde::de::DeserializeOwned>(kv: &DiskKv, key: &str) -> Vec<T> {
    let Some(raw) = kv.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(key, error = %e, "stored collection unreadable, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn recipe(id: impl Into<RecipeId>, title: &str) -> Recipe {
        let mut details = Map::new();
        details.insert("title".into(), json!(title));
        details.insert("image".into(), json!("https://img.example/1.jpg"));
        Recipe {
            id: id.into(),
            details,
        }
    }

    fn open_store(dir: &std::path::Path) -> LibraryStore {
        LibraryStore::open(DiskKv::open(dir).expect("kv"))
    }

    #[test]
    fn saving_twice_keeps_a_single_copy() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());

        store.add_to_saved(recipe(716429i64, "Pasta")).expect("save");
        store.add_to_saved(recipe(716429i64, "Pasta")).expect("save again");

        assert_eq!(store.saved().len(), 1);
        assert!(store.is_saved(&RecipeId::from(716429i64)));
    }

    #[test]
    fn removing_an_absent_id_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());
        store.add_to_saved(recipe(1i64, "Soup")).expect("save");

        store
            .remove_from_saved(&RecipeId::from(999i64))
            .expect("remove absent");
        assert_eq!(store.saved().len(), 1);

        store.remove_from_saved(&RecipeId::from(1i64)).expect("remove");
        assert!(store.saved().is_empty());
    }

    #[test]
    fn numeric_and_string_ids_never_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());

        store.add_to_saved(recipe(11007i64, "Pasta")).expect("save");
        store.add_to_saved(recipe("11007", "Margarita")).expect("save");

        assert_eq!(store.saved().len(), 2);
        assert!(store.is_saved(&RecipeId::from(11007i64)));
        assert!(store.is_saved(&RecipeId::from("11007")));
    }

    #[test]
    fn planner_never_deduplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());
        let day = date!(2026 - 08 - 10);

        let first = store
            .add_to_planner(recipe(5i64, "Tacos"), day, Some("Lunch"))
            .expect("plan");
        let second = store
            .add_to_planner(recipe(5i64, "Tacos"), day, Some("Lunch"))
            .expect("plan again");

        assert_eq!(store.planner().len(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn planner_defaults_to_dinner_and_sorts_by_date() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());

        store
            .add_to_planner(recipe(2i64, "Stew"), date!(2026 - 08 - 12), None)
            .expect("plan");
        store
            .add_to_planner(recipe(3i64, "Salad"), date!(2026 - 08 - 09), Some("Breakfast"))
            .expect("plan");

        assert_eq!(store.planner()[0].meal_type, "Dinner");
        let ordered = store.planner_by_date();
        assert_eq!(ordered[0].date, date!(2026 - 08 - 09));
        assert_eq!(ordered[1].date, date!(2026 - 08 - 12));
    }

    #[test]
    fn planned_meal_survives_unsaving_the_recipe() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());

        store.add_to_saved(recipe(7i64, "Curry")).expect("save");
        store
            .add_to_planner(recipe(7i64, "Curry"), date!(2026 - 08 - 15), None)
            .expect("plan");
        store.remove_from_saved(&RecipeId::from(7i64)).expect("unsave");

        assert!(store.saved().is_empty());
        assert_eq!(store.planner().len(), 1);
        assert_eq!(store.planner()[0].recipe.details["title"], json!("Curry"));
    }

    #[test]
    fn collections_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut store = open_store(dir.path());
            store.add_to_saved(recipe(42i64, "Pizza")).expect("save");
            store
                .add_to_planner(recipe(42i64, "Pizza"), date!(2026 - 08 - 20), Some("Snack"))
                .expect("plan");
        }
        let store = open_store(dir.path());
        assert!(store.is_saved(&RecipeId::from(42i64)));
        assert_eq!(store.planner().len(), 1);
        assert_eq!(store.planner()[0].meal_type, "Snack");
    }

    #[test]
    fn planner_ids_stay_unique_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = {
            let mut store = open_store(dir.path());
            store
                .add_to_planner(recipe(1i64, "Eggs"), date!(2026 - 08 - 06), None)
                .expect("plan")
        };
        let mut store = open_store(dir.path());
        let second = store
            .add_to_planner(recipe(1i64, "Eggs"), date!(2026 - 08 - 06), None)
            .expect("plan");
        assert_ne!(first, second);
    }

    #[test]
    fn corrupt_storage_loads_as_empty_and_recovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("savedRecipes.json"), b"{not json!")
            .expect("corrupt file");

        let mut store = open_store(dir.path());
        assert!(store.saved().is_empty());

        store.add_to_saved(recipe(8i64, "Ramen")).expect("save");
        drop(store);
        let store = open_store(dir.path());
        assert_eq!(store.saved().len(), 1);
    }

    #[test]
    fn cached_payload_round_trips_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = open_store(dir.path());
        let mut details = Map::new();
        details.insert("title".into(), json!("Pad Thai"));
        details.insert("readyInMinutes".into(), json!(25));
        details.insert(
            "extendedIngredients".into(),
            json!([{"name": "rice noodles"}, {"name": "tamarind"}]),
        );
        store
            .add_to_saved(Recipe {
                id: RecipeId::from(636087i64),
                details: details.clone(),
            })
            .expect("save");

        drop(store);
        let store = open_store(dir.path());
        assert_eq!(store.saved()[0].details, details);
    }
}
