//! Postgres-backed `Repository`, replacing the teacher's Cosmos DB client with
//! `sea-orm` per SPEC_FULL.md §4.1 and the `db.*` config block — grounded on
//! PocketRelay-Server's `sea-orm`/`sqlx-postgres` stack, the closest SQL example in
//! the pack, since the teacher's own persistence is document-oriented.

use super::entity::{self, Entity as Games};
use super::{GameRow, Repository};
use crate::config::DbConfig;
use crate::domain::GameId;
use crate::errors::ServiceError;
use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
};
use std::str::FromStr;

pub struct SqlRepository {
    conn: DatabaseConnection,
}

impl SqlRepository {
    pub async fn connect(config: &DbConfig) -> Result<Self, ServiceError> {
        let url = if config.user.is_empty() {
            config.url.clone()
        } else {
            // sea-orm expects credentials embedded in the connection string; the
            // `db.user`/`db.pass` config keys are folded in here rather than left
            // for the caller to splice together.
            embed_credentials(&config.url, &config.user, &config.pass)
        };
        let mut opt = sea_orm::ConnectOptions::new(url);
        opt.max_connections(config.pool_size);
        let conn = Database::connect(opt)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn embed_credentials(url: &str, user: &str, pass: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => format!("{}://{}:{}@{}", scheme, user, pass, rest),
        None => url.to_string(),
    }
}

#[async_trait]
impl Repository for SqlRepository {
    async fn init(&self) -> Result<(), ServiceError> {
        let backend = self.conn.get_database_backend();
        let stmt = sea_orm::Statement::from_string(
            backend,
            "CREATE TABLE IF NOT EXISTS games (\
                game_id TEXT PRIMARY KEY, \
                game_type TEXT NOT NULL, \
                game_state TEXT NOT NULL\
            )"
            .to_string(),
        );
        self.conn
            .execute(stmt)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn save(
        &self,
        game_id: GameId,
        game_type: &str,
        payload: String,
    ) -> Result<(), ServiceError> {
        let model = entity::ActiveModel {
            game_id: Set(game_id.to_string()),
            game_type: Set(game_type.to_string()),
            game_state: Set(payload),
        };
        Games::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(entity::Column::GameId)
                    .update_columns([entity::Column::GameType, entity::Column::GameState])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn load(&self, game_id: GameId, game_type: &str) -> Result<Option<String>, ServiceError> {
        let row = Games::find_by_id(game_id.to_string())
            .one(&self.conn)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(row.and_then(|r| {
            if r.game_type == game_type {
                Some(r.game_state)
            } else {
                None
            }
        }))
    }

    async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError> {
        let rows = Games::find()
            .all(&self.conn)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match GameId::from_str(&r.game_id) {
                Ok(game_id) => out.push(GameRow {
                    game_id,
                    game_type: r.game_type,
                    game_state: r.game_state,
                }),
                Err(_) => log::warn!("skipping row with malformed game_id: {}", r.game_id),
            }
        }
        Ok(out)
    }
}

