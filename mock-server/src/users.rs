//! Account routes: signup, signin, session restore, logout, lookup.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{token_from_headers, AuthUser};
use crate::error::ApiFailure;
use crate::{Account, SharedState};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

const EMAIL_AND_PASSWORD_REQUIRED: ApiFailure =
    ApiFailure::new(StatusCode::BAD_REQUEST, "EMAIL_AND_PASSWORD_REQUIRED");
const USER_ALREADY_REGISTERED: ApiFailure =
    ApiFailure::new(StatusCode::CONFLICT, "USER_ALREADY_REGISTERED");
const USER_NOT_EXISTS_LOGIN: ApiFailure =
    ApiFailure::new(StatusCode::UNAUTHORIZED, "USER_NOT_EXISTS");
const EMAIL_OR_PASSWORD_INVALID: ApiFailure =
    ApiFailure::new(StatusCode::UNAUTHORIZED, "EMAIL_OR_PASSWORD_INVALID");
const USER_NOT_EXISTS: ApiFailure = ApiFailure::new(StatusCode::NOT_FOUND, "USER_NOT_EXISTS");

/// Emails compare trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_reply(token: &str, user: &User) -> Json<Value> {
    Json(json!({ "ok": true, "token": token, "user": user }))
}

pub async fn signup(
    State(state): State<SharedState>,
    Json(input): Json<SignupInput>,
) -> Result<Json<Value>, ApiFailure> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(EMAIL_AND_PASSWORD_REQUIRED);
    }

    let user = {
        let mut accounts = state.accounts.write().await;
        if accounts.values().any(|a| a.user.email == email) {
            return Err(USER_ALREADY_REGISTERED);
        }
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: input.name.filter(|n| !n.trim().is_empty()),
        };
        accounts.insert(
            user.id,
            Account {
                user: user.clone(),
                password: input.password,
            },
        );
        user
    };

    let token = state.open_session(user.id).await;
    tracing::info!(user_id = %user.id, "user signed up");
    Ok(session_reply(&token, &user))
}

pub async fn signin(
    State(state): State<SharedState>,
    Json(input): Json<SigninInput>,
) -> Result<Json<Value>, ApiFailure> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(EMAIL_AND_PASSWORD_REQUIRED);
    }

    let account = state
        .accounts
        .read()
        .await
        .values()
        .find(|a| a.user.email == email)
        .cloned()
        .ok_or(USER_NOT_EXISTS_LOGIN)?;
    if account.password != input.password {
        tracing::info!(user_id = %account.user.id, "rejected signin");
        return Err(EMAIL_OR_PASSWORD_INVALID);
    }

    let token = state.open_session(account.user.id).await;
    tracing::info!(user_id = %account.user.id, "user signed in");
    Ok(session_reply(&token, &account.user))
}

/// Re-issue the caller's identity for the token they already hold.
pub async fn signin_token(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiFailure> {
    let accounts = state.accounts.read().await;
    let account = accounts.get(&auth.user_id).ok_or(ApiFailure::unauthorized())?;
    Ok(session_reply(&auth.token, &account.user))
}

/// Revoke the presented session, if any. Always succeeds.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = token_from_headers(&headers) {
        if state.close_session(&token).await {
            tracing::info!("session closed");
        }
    }
    Json(json!({ "ok": true }))
}

pub async fn get_user(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiFailure> {
    let accounts = state.accounts.read().await;
    let account = accounts.get(&id).ok_or(USER_NOT_EXISTS)?;
    Ok(Json(json!({ "ok": true, "data": account.user })))
}
