pub mod app;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::{customer_service::CustomerService, user_service::UserService};
use crate::utils::upload::UploadStore;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub customer_service: CustomerService,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let user_service = UserService::new(pool.clone());
        let customer_service = CustomerService::new(pool.clone());
        let uploads = UploadStore::new(config.uploads_dir.clone());

        Self {
            pool,
            user_service,
            customer_service,
            uploads,
        }
    }
}
