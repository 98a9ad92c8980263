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

use crate::auth::token::AuthClaims;
use crate::database::definitions::activity::{self, Activity};
use crate::prelude::*;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Router};

pub fn router(state: ApplicationState) -> Router {
    Router::new()
        .route("/", get(get_activities))
        .route("/user", get(get_user_activities))
        .route_layer(require_auth!())
        .with_state(state)
}

#[derive(Deserialize, Debug, Clone)]
pub struct ActivityQuery {
    limit: Option<i64>,
}

async fn get_activities(
    State(state): State<ApplicationState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<serde_json::Value>> {
    let activities = Activity::list(
        query.limit.unwrap_or(activity::DEFAULT_LIMIT),
        state.connection(),
    )
    .await?;

    Ok(Json(json!({ "activities": activities })))
}

async fn get_user_activities(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<serde_json::Value>> {
    let activities = Activity::list_for_user(
        actor.user_id(),
        query.limit.unwrap_or(activity::DEFAULT_LIMIT),
        state.connection(),
    )
    .await?;

    Ok(Json(json!({ "activities": activities })))
}
