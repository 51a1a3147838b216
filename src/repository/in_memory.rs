//! In-process `Repository` for tests, mirroring the teacher's `TestDb` backend: same
//! contract as the production store, no network, wiped when the process exits.

use super::{GameRow, Repository};
use crate::domain::GameId;
use crate::errors::ServiceError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryRepository {
    rows: RwLock<HashMap<GameId, GameRow>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn init(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn save(
        &self,
        game_id: GameId,
        game_type: &str,
        payload: String,
    ) -> Result<(), ServiceError> {
        let mut rows = self.rows.write().await;
        rows.insert(
            game_id,
            GameRow {
                game_id,
                game_type: game_type.to_string(),
                game_state: payload,
            },
        );
        Ok(())
    }

    async fn load(&self, game_id: GameId, game_type: &str) -> Result<Option<String>, ServiceError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&game_id).and_then(|r| {
            if r.game_type == game_type {
                Some(r.game_state.clone())
            } else {
                None
            }
        }))
    }

    async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn round_trips_a_saved_row() {
        let repo = InMemoryRepository::new();
        let id = GameId(Uuid::new_v4());
        repo.save(id, "tictactoe", "{\"a\":1}".to_string())
            .await
            .unwrap();
        let loaded = repo.load(id, "tictactoe").await.unwrap();
        assert_eq!(loaded, Some("{\"a\":1}".to_string()));
    }

    #[tokio::test]
    async fn type_mismatch_returns_none() {
        let repo = InMemoryRepository::new();
        let id = GameId(Uuid::new_v4());
        repo.save(id, "tictactoe", "{}".to_string()).await.unwrap();
        assert_eq!(repo.load(id, "othergame").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_row_returns_none() {
        let repo = InMemoryRepository::new();
        let id = GameId(Uuid::new_v4());
        assert_eq!(repo.load(id, "tictactoe").await.unwrap(), None);
    }

    #[tokio::test]
    async fn load_all_reflects_every_saved_row() {
        let repo = InMemoryRepository::new();
        let a = GameId(Uuid::new_v4());
        let b = GameId(Uuid::new_v4());
        repo.save(a, "tictactoe", "{}".to_string()).await.unwrap();
        repo.save(b, "tictactoe", "{}".to_string()).await.unwrap();
        let all = repo.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
