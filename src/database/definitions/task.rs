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
use chrono::{DateTime, NaiveDate, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, strum::Display,
)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    #[sqlx(rename = "To Do")]
    #[strum(serialize = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    #[sqlx(rename = "Done")]
    #[strum(serialize = "Done")]
    Done,
}

#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, strum::Display,
)]
pub enum TaskPriority {
    #[serde(rename = "Low")]
    #[sqlx(rename = "Low")]
    #[strum(serialize = "Low")]
    Low,
    #[default]
    #[serde(rename = "Medium")]
    #[sqlx(rename = "Medium")]
    #[strum(serialize = "Medium")]
    Medium,
    #[serde(rename = "High")]
    #[sqlx(rename = "High")]
    #[strum(serialize = "High")]
    High,
}

/// A hydrated task row: the foreign keys are resolved into usernames, callers
/// never have to look up ids themselves.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct Task {
    task_id: i64,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<NaiveDate>,
    created_by_id: i64,
    assigned_to_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by_username: Option<String>,
    assigned_to_username: Option<String>,
}

const HYDRATED: &str = "SELECT t.*, \
        u1.username AS created_by_username, \
        u2.username AS assigned_to_username \
    FROM tasks t \
    LEFT JOIN users u1 ON t.created_by_id = u1.user_id \
    LEFT JOIN users u2 ON t.assigned_to_id = u2.user_id";

impl Task {
    #[instrument(skip_all)]
    pub async fn all(connection: &DatabaseConnection) -> Result<Vec<Task>> {
        let query = format!("{HYDRATED} ORDER BY t.created_at DESC, t.task_id DESC");

        Ok(sqlx::query_as::<_, Task>(query.as_str())
            .fetch_all(connection)
            .await?)
    }

    #[instrument(skip(connection))]
    pub async fn from_id(id: i64, connection: &DatabaseConnection) -> Result<Option<Task>> {
        let query = format!("{HYDRATED} WHERE t.task_id = ?");

        Ok(sqlx::query_as::<_, Task>(query.as_str())
            .bind(id)
            .fetch_optional(connection)
            .await?)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WriteTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<NaiveDate>,
    assigned_to_id: Option<i64>,
}

#[derive(Clone, Debug, Setters)]
pub struct WriteTask<'a> {
    #[set = "pub"]
    title: Option<String>,
    #[set = "pub"]
    description: Option<String>,
    #[set = "pub"]
    status: TaskStatus,
    #[set = "pub"]
    priority: TaskPriority,
    #[set = "pub"]
    due_date: Option<NaiveDate>,
    #[set = "pub"]
    assigned_to: Option<i64>,
    #[set = "pub"]
    created_by: Option<i64>,
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteTask<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            title: None,
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            assigned_to: None,
            created_by: None,
            connection,
        }
    }
}

impl<'a> WriteTask<'a> {
    pub fn with_request(&mut self, request: WriteTaskRequest) -> &mut Self {
        self.title = Some(request.title);
        self.description = request.description;
        self.status = request.status.unwrap_or_default();
        self.priority = request.priority.unwrap_or_default();
        self.due_date = request.due_date;
        self.assigned_to = request.assigned_to_id;

        self
    }
}

impl<'a> IntoFuture for WriteTask<'a> {
    type Output = Result<Task>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let title = self
                .title
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApplicationError::BadRequest("Title is required".to_owned()))?;
            // the creator is set by the service from the acting identity and
            // stays immutable afterwards
            let created_by = self
                .created_by
                .ok_or_else(|| ApplicationError::BadRequest("Creator is required".to_owned()))?;

            let now = Utc::now();
            let result = sqlx::query(
                "INSERT INTO tasks \
                    (title, description, status, priority, due_date, created_by_id, \
                     assigned_to_id, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(title.as_str())
            .bind(&self.description)
            .bind(&self.status)
            .bind(&self.priority)
            .bind(self.due_date)
            .bind(created_by)
            .bind(self.assigned_to)
            .bind(now)
            .bind(now)
            .execute(self.connection)
            .await?;

            let task = Task::from_id(result.last_insert_rowid(), self.connection)
                .await?
                .ok_or_else(|| ApplicationError::NotFound("Task not found".to_owned()))?;

            Ok(task)
        })
    }
}

/// A partial update: unset fields keep their previous value. Concurrent
/// updates resolve as last-write-wins on row level.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EditTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to_id: Option<i64>,
}

impl EditTask {
    #[instrument(skip(connection))]
    pub async fn apply(self, id: i64, connection: &DatabaseConnection) -> Result<Task> {
        sqlx::query(
            "UPDATE tasks SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                status = COALESCE(?, status), \
                priority = COALESCE(?, priority), \
                due_date = COALESCE(?, due_date), \
                assigned_to_id = COALESCE(?, assigned_to_id), \
                updated_at = ? \
             WHERE task_id = ?",
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.status)
        .bind(&self.priority)
        .bind(self.due_date)
        .bind(self.assigned_to_id)
        .bind(Utc::now())
        .bind(id)
        .execute(connection)
        .await?;

        let task = Task::from_id(id, connection)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Task not found".to_owned()))?;

        Ok(task)
    }
}

/// Removes the task row. Comments cascade on store level, activity log
/// entries stay behind by design.
#[instrument(skip(connection))]
pub async fn delete(id: i64, connection: &DatabaseConnection) -> Result<()> {
    sqlx::query("DELETE FROM tasks WHERE task_id = ?")
        .bind(id)
        .execute(connection)
        .await?;

    Ok(())
}
