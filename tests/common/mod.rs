#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use mindgarden::auth::PasswordHasher;
use mindgarden::configuration::{JwtSettings, PasswordSettings};
use mindgarden::startup::run;
use mindgarden::store::{InMemoryUserStore, NewUser, UserStore};
use serde_json::{json, Value};

pub const ACCESS_TOKEN_EXPIRY: i64 = 900;

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryUserStore>,
    pub client: reqwest::Client,
}

pub fn password_settings() -> PasswordSettings {
    PasswordSettings { bcrypt_cost: 4 }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt_config = JwtSettings {
        secret: "integration-test-secret-at-least-32-bytes".to_string(),
        issuer: "mindgarden-test".to_string(),
        access_token_expiry: ACCESS_TOKEN_EXPIRY,
    };

    let store = Arc::new(InMemoryUserStore::new());
    let server = run(listener, store.clone(), jwt_config, password_settings())
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/api/v1/auth/register",
            &json!({
                "email": email,
                "username": username,
                "password": password
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/api/v1/auth/login",
            &json!({
                "email": email,
                "password": password
            }),
        )
        .await
    }

    /// Register and log in, returning the token response body
    pub async fn register_and_login(&self, email: &str, username: &str, password: &str) -> Value {
        let response = self.register(email, username, password).await;
        assert_eq!(201, response.status().as_u16());

        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn get_me(&self, access_token: &str) -> reqwest::Response {
        self.client
            .get(self.url("/api/v1/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Insert a superuser directly into the store and log in as them
    pub async fn superuser_token(&self) -> String {
        let hasher = PasswordHasher::new(password_settings());
        self.store
            .insert(NewUser {
                email: "root@x.com".to_string(),
                username: "root".to_string(),
                full_name: None,
                password_hash: hasher.hash("rootpass123").unwrap(),
                is_superuser: true,
            })
            .await
            .expect("Failed to seed superuser");

        let body: Value = self
            .login("root@x.com", "rootpass123")
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn set_status(&self, token: &str, email: &str, is_active: bool) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/api/v1/users/{}/status", email)))
            .bearer_auth(token)
            .json(&json!({ "is_active": is_active }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
