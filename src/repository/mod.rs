//! Durable snapshot store, per SPEC_FULL.md §4.1. The trait deals only in raw
//! `(game_id, game_type_tag, payload)` triples — typed decoding into a concrete
//! `GameModel::State` happens one layer up, in `persistence`, using the `codec` and
//! the matching `GameModule`'s type. This mirrors the teacher's `Database` enum
//! dispatching between a production and a test backend behind `GameDbTrait`.

pub mod entity;
pub mod in_memory;
pub mod sql;

use crate::domain::GameId;
use crate::errors::ServiceError;
use async_trait::async_trait;

pub use in_memory::InMemoryRepository;
pub use sql::SqlRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    pub game_id: GameId,
    pub game_type: String,
    pub game_state: String,
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// Ensures the `games` table exists. Idempotent; safe to call on every startup.
    async fn init(&self) -> Result<(), ServiceError>;

    /// Upserts the row for `game_id`.
    async fn save(&self, game_id: GameId, game_type: &str, payload: String)
        -> Result<(), ServiceError>;

    /// `Some(payload)` only if the row exists and its stored `game_type` matches the
    /// one passed in; `None` otherwise. Only I/O failures are `Err`.
    async fn load(&self, game_id: GameId, game_type: &str) -> Result<Option<String>, ServiceError>;

    /// Every row with a well-formed `game_id`. Malformed ids are skipped with a
    /// warning rather than failing the whole call — SPEC_FULL.md §4.1's tolerance for
    /// partial corruption starts here; recognized-type and decodable-payload
    /// filtering happen further up, in `supervisor::restore`.
    async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError>;
}

/// Lets callers share one backend across multiple `PersistenceWorker`s — used by the
/// integration suite to simulate a process restart against the same storage.
#[async_trait]
impl<R: Repository + ?Sized> Repository for std::sync::Arc<R> {
    async fn init(&self) -> Result<(), ServiceError> {
        (**self).init().await
    }

    async fn save(&self, game_id: GameId, game_type: &str, payload: String) -> Result<(), ServiceError> {
        (**self).save(game_id, game_type, payload).await
    }

    async fn load(&self, game_id: GameId, game_type: &str) -> Result<Option<String>, ServiceError> {
        (**self).load(game_id, game_type).await
    }

    async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError> {
        (**self).load_all().await
    }
}

/// One enum selecting the concrete backend, the way the teacher's `Database` enum
/// dispatches between `Cosmos` and `Test`. Chosen once at startup from config.
pub enum Backend {
    Sql(SqlRepository),
    InMemory(InMemoryRepository),
}

#[async_trait]
impl Repository for Backend {
    async fn init(&self) -> Result<(), ServiceError> {
        match self {
            Backend::Sql(r) => r.init().await,
            Backend::InMemory(r) => r.init().await,
        }
    }

    async fn save(
        &self,
        game_id: GameId,
        game_type: &str,
        payload: String,
    ) -> Result<(), ServiceError> {
        match self {
            Backend::Sql(r) => r.save(game_id, game_type, payload).await,
            Backend::InMemory(r) => r.save(game_id, game_type, payload).await,
        }
    }

    async fn load(&self, game_id: GameId, game_type: &str) -> Result<Option<String>, ServiceError> {
        match self {
            Backend::Sql(r) => r.load(game_id, game_type).await,
            Backend::InMemory(r) => r.load(game_id, game_type).await,
        }
    }

    async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError> {
        match self {
            Backend::Sql(r) => r.load_all().await,
            Backend::InMemory(r) => r.load_all().await,
        }
    }
}
