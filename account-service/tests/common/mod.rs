use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::auth::service::AuthService;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(Authenticator::new(TEST_SECRET, chrono::Duration::hours(24)));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::clone(&authenticator),
        ));
        let auth_service = Arc::new(AuthService::new(repository, Arc::clone(&authenticator)));

        let router = create_router(user_service, auth_service, authenticator);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(TEST_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return the response body's `data`
    pub async fn create_user(&self, email: &str, password: &str) -> Value {
        let response = self
            .post("/api/users")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// Log in and return the issued access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}

/// `UserRepository` backed by a vector, with the same uniqueness and
/// not-found behavior as the Postgres adapter.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    users: Vec<User>,
}

impl Store {
    fn insert(&mut self, user: NewUser) -> User {
        self.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId(self.next_id),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut store = self.state.lock().unwrap();
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        Ok(store.insert(user))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let store = self.state.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let store = self.state.lock().unwrap();
        Ok(store.users.iter().find(|u| u.email == *email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut store = self.state.lock().unwrap();
        if store
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let stored = store
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;
        *stored = User {
            updated_at: Utc::now(),
            ..user
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut store = self.state.lock().unwrap();
        let before = store.users.len();
        store.users.retain(|u| u.id != *id);
        if store.users.len() == before {
            return Err(UserError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn upsert_by_email(&self, user: NewUser) -> Result<User, UserError> {
        let mut store = self.state.lock().unwrap();
        if let Some(stored) = store.users.iter_mut().find(|u| u.email == user.email) {
            stored.password_hash = user.password_hash;
            stored.updated_at = Utc::now();
            return Ok(stored.clone());
        }
        Ok(store.insert(user))
    }
}
