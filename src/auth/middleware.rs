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

use crate::auth::token;
use crate::prelude::*;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Layers [`require_auth`] onto a route or router.
#[macro_export]
macro_rules! require_auth {
    () => {
        axum::middleware::from_fn($crate::auth::middleware::require_auth)
    };
}

/// Rejects every request without a valid `Authorization: Bearer` token and
/// inserts the verified claims as an extension for the handlers.
pub async fn require_auth(mut request: Request, next: Next) -> Response {
    let claims = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(token::verify);

    match claims {
        Some(Ok(claims)) => {
            request.extensions_mut().insert(claims);

            next.run(request).await
        }
        _ => ApplicationError::Unauthorized.into_response(),
    }
}
