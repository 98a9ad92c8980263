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
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// A comment hydrated with the author username. Comments are never edited or
/// deleted in this design.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct Comment {
    comment_id: i64,
    task_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
    username: String,
}

impl Comment {
    /// All comments of the given task, newest first.
    #[instrument(skip(connection))]
    pub async fn for_task(task_id: i64, connection: &DatabaseConnection) -> Result<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(
            "SELECT c.*, u.username FROM comments c \
             JOIN users u ON c.user_id = u.user_id \
             WHERE c.task_id = ? \
             ORDER BY c.created_at DESC, c.comment_id DESC",
        )
        .bind(task_id)
        .fetch_all(connection)
        .await?)
    }
}

#[derive(Clone, Debug, Setters)]
pub struct WriteComment<'a> {
    #[set = "pub"]
    task: Option<i64>,
    #[set = "pub"]
    author: Option<i64>,
    #[set = "pub"]
    content: Option<String>,
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteComment<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            task: None,
            author: None,
            content: None,
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteComment<'a> {
    type Output = Result<Comment>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let content = self
                .content
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    ApplicationError::BadRequest("Comment content is required".to_owned())
                })?;
            let task = self
                .task
                .ok_or_else(|| ApplicationError::BadRequest("Task is required".to_owned()))?;
            let author = self
                .author
                .ok_or_else(|| ApplicationError::BadRequest("Author is required".to_owned()))?;

            // comments may only reference existing tasks
            let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE task_id = ?")
                .bind(task)
                .fetch_one(self.connection)
                .await?;
            if existing == 0 {
                return Err(ApplicationError::NotFound("Task not found".to_owned()));
            }

            let result = sqlx::query(
                "INSERT INTO comments (task_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(task)
            .bind(author)
            .bind(content.as_str())
            .bind(Utc::now())
            .execute(self.connection)
            .await?;

            let comment = sqlx::query_as::<_, Comment>(
                "SELECT c.*, u.username FROM comments c \
                 JOIN users u ON c.user_id = u.user_id \
                 WHERE c.comment_id = ?",
            )
            .bind(result.last_insert_rowid())
            .fetch_one(self.connection)
            .await?;

            Ok(comment)
        })
    }
}
