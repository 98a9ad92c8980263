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

#[derive(
    Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sqlx(rename = "user")]
    #[strum(serialize = "user")]
    User,
    #[sqlx(rename = "admin")]
    #[strum(serialize = "admin")]
    Admin,
}

/// A full account row. The password hash never leaves this type, callers
/// receive the [`PublicAccount`] projection instead.
#[derive(Clone, Debug, Deserialize, PartialEq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct Account {
    user_id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters, sqlx::FromRow)]
#[get = "pub"]
pub struct PublicAccount {
    user_id: i64,
    username: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<&Account> for PublicAccount {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.user_id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            created_at: account.created_at,
        }
    }
}

impl Account {
    #[instrument(skip(connection))]
    pub async fn from_username(
        username: &str,
        connection: &DatabaseConnection,
    ) -> Result<Option<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(connection)
                .await?,
        )
    }

    #[instrument(skip(connection))]
    pub async fn from_id(id: i64, connection: &DatabaseConnection) -> Result<Option<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM users WHERE user_id = ?")
                .bind(id)
                .fetch_optional(connection)
                .await?,
        )
    }

    /// Lists every account, ordered by username. Any authenticated caller may
    /// enumerate accounts (used for task assignment).
    #[instrument(skip_all)]
    pub async fn list(connection: &DatabaseConnection) -> Result<Vec<PublicAccount>> {
        Ok(sqlx::query_as::<_, PublicAccount>(
            "SELECT user_id, username, email, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(connection)
        .await?)
    }
}

#[derive(Clone, Debug, Setters)]
pub struct WriteAccount<'a> {
    #[set = "pub"]
    username: Option<&'a str>,
    #[set = "pub"]
    email: Option<&'a str>,
    #[set = "pub"]
    password: Option<String>,
    #[set = "pub"]
    role: Role,
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteAccount<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            username: None,
            email: None,
            password: None,
            role: Role::default(),
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteAccount<'a> {
    type Output = Result<Account>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let username = self
                .username
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApplicationError::BadRequest("All fields are required".to_owned()))?;
            let email = self
                .email
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApplicationError::BadRequest("All fields are required".to_owned()))?;
            let password = self
                .password
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ApplicationError::BadRequest("All fields are required".to_owned()))?;

            // uniqueness is checked up front to answer with a clean conflict,
            // the UNIQUE constraints remain the source of truth
            let existing = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE username = ? OR email = ?",
            )
            .bind(username)
            .bind(email)
            .fetch_one(self.connection)
            .await?;
            if existing > 0 {
                return Err(ApplicationError::Conflict(
                    "Username or email already exists".to_owned(),
                ));
            }

            let password_hash = crate::auth::hash_password(password.as_str())?;
            let result = sqlx::query(
                "INSERT INTO users (username, email, password_hash, role, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(username)
            .bind(email)
            .bind(password_hash.as_str())
            .bind(&self.role)
            .bind(Utc::now())
            .execute(self.connection)
            .await?;

            let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE user_id = ?")
                .bind(result.last_insert_rowid())
                .fetch_one(self.connection)
                .await?;

            Ok(account)
        })
    }
}
