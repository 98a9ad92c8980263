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
use chrono::{DateTime, Utc};

pub const DEFAULT_LIMIT: i64 = 50;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, strum::Display)]
pub enum ActivityAction {
    #[serde(rename = "CREATE")]
    #[sqlx(rename = "CREATE")]
    #[strum(serialize = "CREATE")]
    Create,
    #[serde(rename = "UPDATE")]
    #[sqlx(rename = "UPDATE")]
    #[strum(serialize = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    #[sqlx(rename = "DELETE")]
    #[strum(serialize = "DELETE")]
    Delete,
    #[serde(rename = "COMMENT")]
    #[sqlx(rename = "COMMENT")]
    #[strum(serialize = "COMMENT")]
    Comment,
}

/// An append-only audit entry, hydrated with the actor username. Entries are
/// never mutated, never pruned and intentionally outlive the entity they
/// reference.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct Activity {
    activity_id: i64,
    user_id: i64,
    action: ActivityAction,
    entity_type: String,
    entity_id: i64,
    description: String,
    created_at: DateTime<Utc>,
    username: String,
}

impl Activity {
    /// Appends an entry, best effort: a failed write is logged and swallowed,
    /// it never fails or rolls back the triggering mutation.
    #[instrument(skip(description, connection))]
    pub async fn record(
        actor_id: i64,
        action: ActivityAction,
        entity_type: &str,
        entity_id: i64,
        description: String,
        connection: &DatabaseConnection,
    ) {
        let result = sqlx::query(
            "INSERT INTO activity_logs (user_id, action, entity_type, entity_id, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(actor_id)
        .bind(&action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(description.as_str())
        .bind(Utc::now())
        .execute(connection)
        .await;

        if let Err(error) = result {
            warn!("Failed to record {action} activity for {entity_type} {entity_id}: {error}");
        }
    }

    #[instrument(skip(connection))]
    pub async fn list(limit: i64, connection: &DatabaseConnection) -> Result<Vec<Activity>> {
        Ok(sqlx::query_as::<_, Activity>(
            "SELECT a.*, u.username FROM activity_logs a \
             JOIN users u ON a.user_id = u.user_id \
             ORDER BY a.created_at DESC, a.activity_id DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(connection)
        .await?)
    }

    #[instrument(skip(connection))]
    pub async fn list_for_user(
        user_id: i64,
        limit: i64,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Activity>> {
        Ok(sqlx::query_as::<_, Activity>(
            "SELECT a.*, u.username FROM activity_logs a \
             JOIN users u ON a.user_id = u.user_id \
             WHERE a.user_id = ? \
             ORDER BY a.created_at DESC, a.activity_id DESC \
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(connection)
        .await?)
    }
}
