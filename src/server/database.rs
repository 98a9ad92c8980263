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
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub type DatabaseConnection = SqlitePool;

pub async fn connect() -> Result<DatabaseConnection> {
    cfg_if::cfg_if! {
        if #[cfg(test)] {
            // every test suite gets its own private in-memory database.
            // a single connection keeps it alive for the lifetime of the pool.
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;
        } else {
            let options = SqliteConnectOptions::from_str(CONFIGURATION.database_url.as_str())?
                .create_if_missing(true)
                .foreign_keys(true);
            let pool = SqlitePoolOptions::new().connect_with(options).await?;
            info!("Established connection to {}", CONFIGURATION.database_url);
        }
    }

    migrate(&pool).await?;
    info!("Initiated tables");

    Ok(pool)
}

/// Executes the schema bootstrap. Every statement is idempotent, so this runs
/// on every connect.
#[instrument(skip_all)]
pub async fn migrate(connection: &DatabaseConnection) -> Result<()> {
    for statement in include_str!("./schema.sql").split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        sqlx::query(statement).execute(connection).await?;
    }

    Ok(())
}
