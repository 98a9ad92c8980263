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
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

pub mod activity;
pub mod analytics;
pub mod auth;
pub mod extractor;
pub mod task;

pub fn router(state: ApplicationState) -> Router {
    Router::new()
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/tasks", task::router(state.clone()))
        .nest("/api/analytics", analytics::router(state.clone()))
        .nest("/api/activities", activity::router(state))
        .route("/api/health", get(health))
        .fallback(fallback)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "OK", "message": "SmartTask API is running"}))
}

async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Route not found"})),
    )
}
