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

use crate::database::definitions::analytics::Analytics;
use crate::prelude::*;
use axum::extract::State;
use axum::routing::get;
use axum::Router;

pub fn router(state: ApplicationState) -> Router {
    Router::new()
        .route("/", get(get_analytics))
        .route_layer(require_auth!())
        .with_state(state)
}

async fn get_analytics(State(state): State<ApplicationState>) -> Result<Json<Analytics>> {
    Ok(Json(Analytics::compute(state.connection()).await?))
}
