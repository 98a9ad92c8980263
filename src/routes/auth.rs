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

use crate::auth::token::{self, AuthClaims};
use crate::auth::Authenticate;
use crate::database::definitions::account::{Account, PublicAccount, Role, WriteAccount};
use crate::prelude::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Router};

pub fn router(state: ApplicationState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).route_layer(require_auth!()))
        .route("/users", get(users).route_layer(require_auth!()))
        .with_state(state)
}

#[derive(Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<Role>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Getters)]
#[get = "pub"]
pub struct AuthResponse {
    message: String,
    token: String,
    user: PublicAccount,
}

async fn register(
    State(state): State<ApplicationState>,
    Json(data): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let account = WriteAccount::from(state.connection())
        .set_username(Some(data.username.as_str()))
        .set_email(Some(data.email.as_str()))
        .set_password(Some(data.password))
        .set_role(data.role.unwrap_or_default())
        .to_owned()
        .await?;
    let token = token::issue(&account)?;
    info!("Registered user {}", account.username());

    let response = AuthResponse {
        message: "User registered successfully".to_owned(),
        token,
        user: PublicAccount::from(&account),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<ApplicationState>,
    Json(data): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    match Account::from_username(data.username.as_str(), state.connection()).await? {
        Some(account) => {
            account.login(data.password.as_str())?;
            let token = token::issue(&account)?;

            Ok(Json(AuthResponse {
                message: "Login successful".to_owned(),
                token,
                user: PublicAccount::from(&account),
            }))
        }
        // an unknown username reads exactly like a wrong password
        None => Err(ApplicationError::Unauthorized),
    }
}

async fn me(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<AuthClaims>,
) -> Result<Json<serde_json::Value>> {
    match Account::from_id(actor.user_id(), state.connection()).await? {
        Some(account) => Ok(Json(json!({ "user": PublicAccount::from(&account) }))),
        None => Err(ApplicationError::NotFound("User not found".to_owned())),
    }
}

async fn users(State(state): State<ApplicationState>) -> Result<Json<serde_json::Value>> {
    let users = Account::list(state.connection()).await?;

    Ok(Json(json!({ "users": users })))
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::account::Role;
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_register() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .server()
            .post("/api/auth/register")
            .json(&json!({
                "username": "first",
                "email": "first@test.de",
                "password": "password"
            }))
            .await;
        assert_eq!(StatusCode::CREATED, response.status_code());

        let body = response.json::<AuthResponse>();
        assert!(!body.token().is_empty());
        assert_eq!("first", body.user().username().as_str());
        assert_eq!(&Role::User, body.user().role());

        // the issued token authenticates immediately
        let response = suite.get("/api/auth/me", body.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_requires_all_fields() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        // missing mail
        let response = suite
            .server()
            .post("/api/auth/register")
            .json(&json!({"username": "first", "password": "password"}))
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status_code());

        // blank password
        let response = suite
            .server()
            .post("/api/auth/register")
            .json(&json!({
                "username": "first",
                "email": "first@test.de",
                "password": ""
            }))
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_register_conflicts() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        suite.register("first", "user").await;

        let response = suite
            .server()
            .post("/api/auth/register")
            .json(&json!({
                "username": "first",
                "email": "other@test.de",
                "password": "password"
            }))
            .await;
        assert_eq!(StatusCode::CONFLICT, response.status_code());

        // reused mail under a different username conflicts as well
        let response = suite
            .server()
            .post("/api/auth/register")
            .json(&json!({
                "username": "second",
                "email": "first@test.de",
                "password": "password"
            }))
            .await;
        assert_eq!(StatusCode::CONFLICT, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_login() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        suite.register("first", "user").await;

        let response = suite
            .server()
            .post("/api/auth/login")
            .json(&json!({"username": "first", "password": "password"}))
            .await;
        assert_eq!(StatusCode::OK, response.status_code());
        let body = response.json::<AuthResponse>();
        assert_eq!("first", body.user().username().as_str());

        let response = suite
            .server()
            .post("/api/auth/login")
            .json(&json!({"username": "first", "password": "wrong"}))
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        let response = suite
            .server()
            .post("/api/auth/login")
            .json(&json!({"username": "nobody", "password": "password"}))
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_me() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let registered = suite.register("first", "admin").await;

        let response = suite.get("/api/auth/me", registered.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());
        let user = response.json::<serde_json::Value>()["user"].clone();
        assert_eq!("first", user["username"].as_str().unwrap());
        assert_eq!("admin", user["role"].as_str().unwrap());

        Ok(())
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bad_tokens() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let registered = suite.register("first", "user").await;

        // no token at all
        let response = suite.server().get("/api/auth/me").await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        // tampered token
        let tampered = format!("{}x", registered.token());
        let response = suite.get("/api/auth/me", tampered.as_str()).await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        // wrong scheme
        let response = suite
            .server()
            .get("/api/auth/me")
            .add_header(
                axum::http::header::AUTHORIZATION,
                axum::http::HeaderValue::from_str(registered.token()).unwrap(),
            )
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        Ok(())
    }

    #[tokio::test]
    async fn test_users() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let registered = suite.register("zulu", "user").await;
        suite.register("alpha", "user").await;

        let response = suite.get("/api/auth/users", registered.token()).await;
        assert_eq!(StatusCode::OK, response.status_code());
        let users = response.json::<serde_json::Value>()["users"].clone();
        assert_eq!(2, users.as_array().unwrap().len());
        assert_eq!("alpha", users[0]["username"].as_str().unwrap());

        let response = suite.server().get("/api/auth/users").await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status_code());

        Ok(())
    }
}
