//! On-device persistence for the mobile client: the saved-recipe library,
//! the meal planner and the signed-in session. Nothing here talks to the
//! server; mutations apply locally and are durable across restarts.

pub mod kv;
pub mod library;
pub mod session;

pub use kv::DiskKv;
pub use library::{LibraryStore, PlannerItem, Recipe, RecipeId};
pub use session::{SessionStore, StoredSession};
