use sqlx::SqlitePool;

use crate::config::Config;

pub mod done_record;
pub mod pet;
pub mod refresh_token;
pub mod task;
pub mod user;
pub mod weight_record;

pub use done_record::*;
pub use pet::*;
pub use refresh_token::*;
pub use task::*;
pub use user::*;
pub use weight_record::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}
