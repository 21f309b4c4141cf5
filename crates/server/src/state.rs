use std::sync::Arc;

use db::DBService;
use services::services::{
    ActivityService, AuthService, BoardService, CardService, JwtService, ListService,
};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub config: Arc<ServerConfig>,
    auth: AuthService,
    boards: BoardService,
    lists: ListService,
    cards: CardService,
    activity: ActivityService,
}

impl AppState {
    pub fn new(db: DBService, config: ServerConfig) -> Self {
        let jwt = Arc::new(JwtService::new(
            config.jwt_secret.clone(),
            config.access_token_ttl,
        ));

        Self {
            auth: AuthService::new(db.clone(), jwt),
            boards: BoardService::new(db.clone()),
            lists: ListService::new(db.clone()),
            cards: CardService::new(db.clone()),
            activity: ActivityService::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn boards(&self) -> &BoardService {
        &self.boards
    }

    pub fn lists(&self) -> &ListService {
        &self.lists
    }

    pub fn cards(&self) -> &CardService {
        &self.cards
    }

    pub fn activity(&self) -> &ActivityService {
        &self.activity
    }
}
