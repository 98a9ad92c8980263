/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::prelude::*;
use lazy_static::lazy_static;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod database;
pub mod state;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// token lifetime in seconds
    #[serde(default = "default_jwt_expires_in")]
    pub jwt_expires_in: i64,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "smarttask.db".to_owned()
}

fn default_jwt_secret() -> String {
    // only suitable for local development, override via JWT_SECRET
    "smarttask-development-secret".to_owned()
}

fn default_jwt_expires_in() -> i64 {
    // 24h
    86400
}

fn default_port() -> u16 {
    3000
}

lazy_static! {
    pub static ref CONFIGURATION: Config = envy::from_env::<Config>().unwrap();
}

pub async fn init() -> Result<()> {
    dotenvy::dotenv().ok();
    lazy_static::initialize(&CONFIGURATION);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let connection = database::connect().await?;
    let state = ApplicationState::from(connection);

    let router = crate::routes::router(state)
        .layer(CompressionLayer::new().gzip(true))
        .layer(CorsLayer::permissive());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], CONFIGURATION.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Received shutdown signal... Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {}
        Err(error) => error!("Unable to listen for shutdown signal: {}", error),
    }
}
