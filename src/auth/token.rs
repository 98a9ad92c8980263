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

use crate::database::definitions::account::{Account, Role};
use crate::prelude::*;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};

/// The verified claims of a bearer token. This is the acting identity for
/// every protected operation, passed explicitly into the services instead of
/// living in some ambient current-user state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters)]
pub struct AuthClaims {
    sub: i64,
    #[get = "pub"]
    username: String,
    #[get = "pub"]
    role: Role,
    iat: i64,
    exp: i64,
}

impl AuthClaims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Issues a signed, time-limited token for the given account.
#[instrument(skip_all)]
pub fn issue(account: &Account) -> Result<String> {
    let iat = Utc::now();
    let exp = iat + Duration::seconds(CONFIGURATION.jwt_expires_in);

    let claims = AuthClaims {
        sub: *account.user_id(),
        username: account.username().clone(),
        role: account.role().clone(),
        iat: iat.timestamp(),
        exp: exp.timestamp(),
    };

    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(CONFIGURATION.jwt_secret.as_bytes()),
    )?)
}

/// Verifies signature and expiry. Any defect collapses into `Unauthorized`,
/// the caller never learns why a token was rejected.
#[instrument(skip_all)]
pub fn verify(token: &str) -> Result<AuthClaims> {
    jsonwebtoken::decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(CONFIGURATION.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApplicationError::Unauthorized)
}
