#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use recipe_api::db::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag, user};
use recipe_api::db::{schema, services};
use recipe_api::server::config::ServerConfig;
use recipe_api::services::auth_service::create_jwt_for_user;
use recipe_api::web::create_axum_router;
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub router: NormalizePath<Router>,
    pub db: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    /// Names from a JSON array of `{id, name}` objects, in response order.
    pub fn names(&self) -> Vec<String> {
        self.json()
            .as_array()
            .expect("expected a JSON array")
            .iter()
            .map(|item| item["name"].as_str().expect("name").to_string())
            .collect()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory database.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect to sqlite");
        schema::create_tables(&db).await.expect("create tables");

        let config = Arc::new(ServerConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            token_ttl_hours: 1,
            db_max_connections: 1,
        });
        let router = create_axum_router(db.clone(), config.clone());

        Self { router, db, config }
    }

    pub async fn create_user(&self, email: &str) -> user::Model {
        services::create_user(&self.db, email, "Test User", "not-a-real-hash")
            .await
            .expect("create user")
    }

    pub fn token_for(&self, user: &user::Model) -> String {
        create_jwt_for_user(user, TEST_SECRET, 1)
            .expect("create token")
            .token
    }

    pub async fn create_tag(&self, user: &user::Model, name: &str) -> tag::Model {
        services::create_tag(&self.db, user.id, name)
            .await
            .expect("create tag")
    }

    pub async fn create_ingredient(&self, user: &user::Model, name: &str) -> ingredient::Model {
        services::create_ingredient(&self.db, user.id, name)
            .await
            .expect("create ingredient")
    }

    pub async fn create_recipe(&self, user: &user::Model, title: &str) -> recipe::Model {
        recipe::ActiveModel {
            user_id: Set(user.id),
            title: Set(title.to_string()),
            description: Set(String::new()),
            time_minutes: Set(5),
            price: Set(Decimal::new(405, 2)),
            link: Set(String::new()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("create recipe")
    }

    pub async fn link_tag(&self, recipe: &recipe::Model, tag: &tag::Model) {
        recipe_tag::ActiveModel {
            recipe_id: Set(recipe.id),
            tag_id: Set(tag.id),
        }
        .insert(&self.db)
        .await
        .expect("link tag");
    }

    pub async fn link_ingredient(&self, recipe: &recipe::Model, ingredient: &ingredient::Model) {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(ingredient.id),
        }
        .insert(&self.db)
        .await
        .expect("link ingredient");
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes()
            .to_vec();

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send("GET", uri, token, None).await
    }
}
