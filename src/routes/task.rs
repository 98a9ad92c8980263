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

use crate::auth::authz;
use crate::auth::token::AuthClaims;
use crate::database::definitions::activity::{Activity, ActivityAction};
use crate::database::definitions::comment::{Comment, WriteComment};
use crate::database::definitions::task::{self, EditTask, Task, WriteTask, WriteTaskRequest};
use crate::prelude::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Router};

pub fn router(state: ApplicationState) -> Router {
    Router::new()
        .route("/", get(get_tasks).post(create_task))
        .route("/:id", get(get_task).put(put_task).delete(delete_task))
        .route("/:id/comments", post(add_comment))
        .route_layer(require_auth!())
        .with_state(state)
}

async fn get_tasks(State(state): State<ApplicationState>) -> Result<Json<serde_json::Value>> {
    let tasks = Task::all(state.connection()).await?;

    Ok(Json(json!({ "tasks": tasks })))
}

#[derive(Serialize, Debug, Clone)]
struct TaskWithComments {
    #[serde(flatten)]
    task: Task,
    comments: Vec<Comment>,
}

async fn get_task(
    State(state): State<ApplicationState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let task = Task::from_id(id, state.connection())
        .await?
        .ok_or_else(|| ApplicationError::NotFound("Task not found".to_owned()))?;
    let comments = Comment::for_task(id, state.connection()).await?;

    Ok(Json(json!({
        "task": TaskWithComments { task, comments }
    })))
}

async fn create_task(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
    Json(data): Json<WriteTaskRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let task = WriteTask::from(state.connection())
        .with_request(data)
        .set_created_by(Some(actor.user_id()))
        .to_owned()
        .await?;

    Activity::record(
        actor.user_id(),
        ActivityAction::Create,
        "task",
        *task.task_id(),
        format!("Created task \"{}\"", task.title()),
        state.connection(),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Task created successfully", "task": task})),
    ))
}

async fn put_task(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
    Path(id): Path<i64>,
    Json(data): Json<EditTask>,
) -> Result<Json<serde_json::Value>> {
    let task = Task::from_id(id, state.connection())
        .await?
        .ok_or_else(|| ApplicationError::NotFound("Task not found".to_owned()))?;
    if !authz::can_edit(&task, &actor) {
        return Err(ApplicationError::Forbidden(
            "Access denied. You can only update your own tasks.".to_owned(),
        ));
    }

    let task = data.apply(id, state.connection()).await?;
    Activity::record(
        actor.user_id(),
        ActivityAction::Update,
        "task",
        id,
        format!("Updated task \"{}\"", task.title()),
        state.connection(),
    )
    .await;

    Ok(Json(
        json!({"message": "Task updated successfully", "task": task}),
    ))
}

async fn delete_task(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let task = Task::from_id(id, state.connection())
        .await?
        .ok_or_else(|| ApplicationError::NotFound("Task not found".to_owned()))?;
    if !authz::can_delete(&task, &actor) {
        return Err(ApplicationError::Forbidden(
            "Access denied. Only task creator or admin can delete tasks.".to_owned(),
        ));
    }

    // the entry has to reference the title the deletion is about to erase,
    // so it is appended before the row goes away
    Activity::record(
        actor.user_id(),
        ActivityAction::Delete,
        "task",
        id,
        format!("Deleted task \"{}\"", task.title()),
        state.connection(),
    )
    .await;
    task::delete(id, state.connection()).await?;

    Ok(Json(json!({"message": "Task deleted successfully"})))
}

#[derive(Deserialize, Debug, Clone)]
pub struct WriteCommentRequest {
    content: String,
}

async fn add_comment(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
    Path(id): Path<i64>,
    Json(data): Json<WriteCommentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let comment = WriteComment::from(state.connection())
        .set_task(Some(id))
        .set_author(Some(actor.user_id()))
        .set_content(Some(data.content))
        .to_owned()
        .await?;

    // comments intentionally produce no activity log entry

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Comment added successfully", "comment": comment})),
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;

    #[tokio::test]
    async fn test_create_task_defaults() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let response = suite
            .post("/api/tasks", creator.token())
            .json(&json!({"title": "Ship v1", "priority": "High"}))
            .await;
        assert_eq!(StatusCode::CREATED, response.status_code());

        let task = response.json::<Value>()["task"].clone();
        assert_eq!("To Do", task["status"].as_str().unwrap());
        assert_eq!("High", task["priority"].as_str().unwrap());
        assert_eq!("first", task["created_by_username"].as_str().unwrap());
        assert!(task["assigned_to_id"].is_null());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_task_requires_title() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let response = suite
            .post("/api/tasks", creator.token())
            .json(&json!({"title": ""}))
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status_code());

        let response = suite
            .post("/api/tasks", creator.token())
            .json(&json!({"description": "no title"}))
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_tasks_newest_first() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        for title in ["one", "two"] {
            suite
                .post("/api/tasks", creator.token())
                .json(&json!({ "title": title }))
                .await;
        }

        let response = suite.get("/api/tasks", creator.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());
        let tasks = response.json::<Value>()["tasks"].clone();
        assert_eq!(2, tasks.as_array().unwrap().len());
        assert_eq!("two", tasks[0]["title"].as_str().unwrap());
        assert_eq!("one", tasks[1]["title"].as_str().unwrap());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_task_with_comments() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;
        let commenter = suite.register("second", "user").await;

        let task = suite.create_task(creator.token(), json!({"title": "Ship v1"})).await;
        let id = task["task_id"].as_i64().unwrap();

        let response = suite
            .post(format!("/api/tasks/{id}/comments").as_str(), commenter.token())
            .json(&json!({"content": "looks good"}))
            .await;
        assert_eq!(StatusCode::CREATED, response.status_code());
        assert_eq!(
            "second",
            response.json::<Value>()["comment"]["username"]
                .as_str()
                .unwrap()
        );

        let response = suite
            .get(format!("/api/tasks/{id}").as_str(), creator.token())
            .await;
        assert_eq!(StatusCode::OK, response.status_code());
        let task = response.json::<Value>()["task"].clone();
        assert_eq!("Ship v1", task["title"].as_str().unwrap());
        assert_eq!(1, task["comments"].as_array().unwrap().len());
        assert_eq!(
            "looks good",
            task["comments"][0]["content"].as_str().unwrap()
        );

        let response = suite.get("/api/tasks/4711", creator.token()).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_comment_validation() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let task = suite.create_task(creator.token(), json!({"title": "Ship v1"})).await;
        let id = task["task_id"].as_i64().unwrap();

        let response = suite
            .post(format!("/api/tasks/{id}/comments").as_str(), creator.token())
            .json(&json!({"content": "   "}))
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status_code());

        let response = suite
            .post("/api/tasks/4711/comments", creator.token())
            .json(&json!({"content": "lost"}))
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_partial_update() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let task = suite
            .create_task(
                creator.token(),
                json!({
                    "title": "Ship v1",
                    "description": "release checklist",
                    "priority": "High",
                    "due_date": "2030-01-01"
                }),
            )
            .await;
        let id = task["task_id"].as_i64().unwrap();

        let response = suite
            .put(format!("/api/tasks/{id}").as_str(), creator.token())
            .json(&json!({"status": "In Progress"}))
            .await;
        assert_eq!(StatusCode::OK, response.status_code());

        let updated = response.json::<Value>()["task"].clone();
        assert_eq!("In Progress", updated["status"].as_str().unwrap());
        // every other field stays untouched
        for field in [
            "task_id",
            "title",
            "description",
            "priority",
            "due_date",
            "created_by_id",
            "assigned_to_id",
            "created_at",
        ] {
            assert_eq!(task[field], updated[field], "field {field} changed");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_update_permissions() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;
        let assignee = suite.register("second", "user").await;
        let outsider = suite.register("third", "user").await;
        let admin = suite.register("boss", "admin").await;

        let task = suite
            .create_task(
                creator.token(),
                json!({
                    "title": "Ship v1",
                    "assigned_to_id": assignee.user().user_id()
                }),
            )
            .await;
        let path = format!("/api/tasks/{}", task["task_id"].as_i64().unwrap());

        // a third party may neither update nor delete
        let response = suite
            .put(path.as_str(), outsider.token())
            .json(&json!({"status": "Done"}))
            .await;
        assert_eq!(StatusCode::FORBIDDEN, response.status_code());
        let response = suite.delete(path.as_str(), outsider.token()).await;
        assert_eq!(StatusCode::FORBIDDEN, response.status_code());

        // the assignee may update but not delete
        let response = suite
            .put(path.as_str(), assignee.token())
            .json(&json!({"status": "Done"}))
            .await;
        assert_eq!(StatusCode::OK, response.status_code());
        assert_eq!(
            "second",
            response.json::<Value>()["task"]["assigned_to_username"]
                .as_str()
                .unwrap()
        );
        let response = suite.delete(path.as_str(), assignee.token()).await;
        assert_eq!(StatusCode::FORBIDDEN, response.status_code());

        // admins may do both
        let response = suite
            .put(path.as_str(), admin.token())
            .json(&json!({"priority": "Low"}))
            .await;
        assert_eq!(StatusCode::OK, response.status_code());
        let response = suite.delete(path.as_str(), admin.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_as_creator() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let task = suite.create_task(creator.token(), json!({"title": "Ship v1"})).await;
        let path = format!("/api/tasks/{}", task["task_id"].as_i64().unwrap());

        let response = suite.delete(path.as_str(), creator.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());

        let response = suite.get(path.as_str(), creator.token()).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status_code());
        // deleting twice reports the absence
        let response = suite.delete(path.as_str(), creator.token()).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_task() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let creator = suite.register("first", "user").await;

        let response = suite
            .put("/api/tasks/4711", creator.token())
            .json(&json!({"status": "Done"}))
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status_code());

        Ok(())
    }
}
