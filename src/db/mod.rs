use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::server::config::ServerConfig;

pub mod entities;
pub mod readiness;
pub mod schema;
pub mod services;

/// Opens the shared connection pool described by `config`.
pub async fn connect(config: &ServerConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.to_owned());
    opt.max_connections(config.db_max_connections)
        .sqlx_logging(false);

    Database::connect(opt).await
}
