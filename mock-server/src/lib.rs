//! In-memory stand-in for the starter kit's JSON backend.
//!
//! Serves the user routes (signup, signin, session restore, logout, lookup)
//! and a task resource behind session auth, plus two fixture routes used to
//! provoke arbitrary statuses and non-JSON bodies. Handler replies follow the
//! backend's `{ ok, code?, ... }` convention; requests axum's own extractors
//! reject (malformed JSON, a bad id in the path) get axum's plain-text 4xx.

pub mod auth;
pub mod error;
mod fixtures;
pub mod tasks;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use auth::AuthUser;
pub use error::ApiFailure;
pub use tasks::{Task, TaskStatus};
pub use users::User;

/// A registered account. Passwords are kept verbatim: this is a test
/// fixture, not an identity provider.
#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    environment: String,
    accounts: RwLock<HashMap<Uuid, Account>>,
    sessions: RwLock<HashMap<String, Uuid>>,
    tasks: RwLock<Vec<Task>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(environment: &str) -> Self {
        Self {
            environment: environment.to_string(),
            ..Self::default()
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// User id behind `token`, if the session is live.
    pub async fn session_user(&self, token: &str) -> Option<Uuid> {
        self.sessions.read().await.get(token).copied()
    }

    async fn open_session(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone(), user_id);
        token
    }

    async fn close_session(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

pub fn app() -> Router {
    app_with_environment("development")
}

pub fn app_with_environment(environment: &str) -> Router {
    let state: SharedState = Arc::new(AppState::new(environment));
    Router::new()
        .route("/health", get(health))
        .route("/user/signup", post(users::signup))
        .route("/user/signin", post(users::signin))
        .route("/user/signin_token", get(users::signin_token))
        .route("/user/logout", post(users::logout))
        .route("/user/{id}", get(users::get_user))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/status/{code}", get(fixtures::status))
        .route("/plain", get(fixtures::plain))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "ok": true, "name": "api", "environment": state.environment() }))
}
