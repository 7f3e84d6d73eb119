use std::time::Duration;

use hbp::{get_random_free_port, make_router, serve_app};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;

struct TestApp {
    address: String,
    client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    std::env::set_var("JWT_SECRET", "test-secret");

    // A single connection keeps every request on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let (port, addr) = get_random_free_port();
    tokio::spawn(serve_app(make_router(), addr, pool));

    let app = TestApp {
        address: format!("http://127.0.0.1:{port}"),
        client: reqwest::Client::new(),
    };
    for _ in 0..50 {
        if app
            .client
            .get(format!("{}/check_health", app.address))
            .send()
            .await
            .is_ok()
        {
            return app;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("server did not come up");
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Register a user; returns (token, user id).
    async fn register(&self, username: &str, role: Option<&str>) -> (String, i64) {
        let mut body = json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "password": "secret123",
        });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Create an article; returns the article JSON.
    async fn create_article(&self, token: &str, title: &str, content: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/articles"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["article"].clone()
    }

    async fn publish(&self, admin_token: &str, article_id: i64) {
        let response = self
            .client
            .post(self.url(&format!("/api/articles/{article_id}/publish")))
            .bearer_auth(admin_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn list_articles(&self, token: Option<&str>, query: &str) -> Value {
        let mut request = self.client.get(self.url(&format!("/api/articles{query}")));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.unwrap()
    }
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/check_health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = spawn_app().await;
    app.register("john", None).await;

    // Same email, different username.
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "john@example.com",
            "username": "johnny",
            "password": "secret123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "email");

    // Same username, different email.
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "john2@example.com",
            "username": "john",
            "password": "secret123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "username");

    // Short password never reaches the database.
    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "email": "mary@example.com",
            "username": "mary",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_is_generic_about_bad_credentials() {
    let app = spawn_app().await;
    app.register("john", None).await;

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "john@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = response.json().await.unwrap();

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let no_such_user: Value = response.json().await.unwrap();

    // No distinction between "no such user" and "wrong password".
    assert_eq!(wrong_password["error"], no_such_user["error"]);

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": "john@example.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "john@example.com");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn profile_roundtrip() {
    let app = spawn_app().await;
    let (token, _) = app.register("john", None).await;

    let response = app
        .client
        .get(app.url("/api/auth/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], "john@example.com");
    assert_eq!(body["user"]["counts"]["articles"], 0);

    let response = app
        .client
        .put(app.url("/api/auth/profile"))
        .bearer_auth(&token)
        .json(&json!({ "bio": "Rustacean", "firstName": "John" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["bio"], "Rustacean");
    assert_eq!(body["user"]["firstName"], "John");

    let response = app
        .client
        .get(app.url("/api/auth/profile"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn slugs_are_unique_and_deterministic() {
    let app = spawn_app().await;
    let (token, _) = app.register("john", None).await;

    let first = app.create_article(&token, "Hello World", "one").await;
    let second = app.create_article(&token, "Hello World", "two").await;
    let third = app.create_article(&token, "Hello World", "three").await;
    assert_eq!(first["slug"], "hello-world");
    assert_eq!(second["slug"], "hello-world-1");
    assert_eq!(third["slug"], "hello-world-2");

    let punctuated = app.create_article(&token, "  Rust & Tokio!  ", "four").await;
    assert_eq!(punctuated["slug"], "rust-tokio");
}

#[tokio::test]
async fn drafts_are_hidden_from_everyone_but_owner_and_admin() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (other, _) = app.register("other", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    let article = app.create_article(&john, "Secret Draft", "top secret contents").await;
    let article_id = article["id"].as_i64().unwrap();
    assert_eq!(article["status"], "DRAFT");

    let anonymous = app.list_articles(None, "").await;
    assert_eq!(anonymous["articles"].as_array().unwrap().len(), 0);

    let own = app.list_articles(Some(&john), "").await;
    assert_eq!(own["articles"].as_array().unwrap().len(), 1);

    let others = app.list_articles(Some(&other), "").await;
    assert_eq!(others["articles"].as_array().unwrap().len(), 0);

    let admins = app.list_articles(Some(&admin), "").await;
    assert_eq!(admins["articles"].as_array().unwrap().len(), 1);

    // Search never leaks a draft to someone who cannot see it.
    let searched = app.list_articles(Some(&other), "?search=secret").await;
    assert_eq!(searched["articles"].as_array().unwrap().len(), 0);

    // Detail view: forbidden for anonymous and other users, fine for owner.
    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn publishing_is_admin_only_and_makes_articles_public() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    let article = app.create_article(&john, "Hello World", "the body").await;
    let article_id = article["id"].as_i64().unwrap();
    assert!(article["publishedAt"].is_null());

    let response = app
        .client
        .post(app.url(&format!("/api/articles/{article_id}/publish")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.publish(&admin, article_id).await;

    let listing = app.list_articles(None, "").await;
    let articles = listing["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["status"], "PUBLISHED");
    assert!(articles[0]["publishedAt"].as_str().is_some());
}

#[tokio::test]
async fn liking_is_at_most_once_per_user() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;
    let article = app.create_article(&john, "Likeable", "body").await;
    let article_id = article["id"].as_i64().unwrap();
    app.publish(&admin, article_id).await;

    let like_url = app.url(&format!("/api/articles/{article_id}/like"));

    let response = app.client.post(&like_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .post(&like_url)
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["likeCount"], 1);
    assert_eq!(body["isLiked"], true);

    // Second like hits the unique pair constraint.
    let response = app
        .client
        .post(&like_url)
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}/likes")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["likes"][0]["user"]["username"], "john");

    let response = app
        .client
        .delete(&like_url)
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["likeCount"], 0);
    assert_eq!(body["isLiked"], false);

    let response = app
        .client
        .delete(&like_url)
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_duplicate_likes_have_exactly_one_winner() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;
    let article = app.create_article(&john, "Raced", "body").await;
    let article_id = article["id"].as_i64().unwrap();
    app.publish(&admin, article_id).await;

    let like_url = app.url(&format!("/api/articles/{article_id}/like"));
    let (first, second) = tokio::join!(
        app.client.post(&like_url).bearer_auth(&john).send(),
        app.client.post(&like_url).bearer_auth(&john).send(),
    );
    let statuses = [first.unwrap().status(), second.unwrap().status()];
    assert!(statuses.contains(&StatusCode::OK));
    assert!(statuses.contains(&StatusCode::CONFLICT));
}

#[tokio::test]
async fn comment_threads_are_one_level_and_same_article() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (mary, _) = app.register("mary", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    let draft = app.create_article(&john, "Draft", "body").await;
    let draft_id = draft["id"].as_i64().unwrap();
    let article = app.create_article(&john, "Commentable", "body").await;
    let article_id = article["id"].as_i64().unwrap();
    let second = app.create_article(&john, "Another", "body").await;
    let second_id = second["id"].as_i64().unwrap();
    app.publish(&admin, article_id).await;
    app.publish(&admin, second_id).await;

    // Unpublished articles cannot be commented on.
    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "first!", "articleId": draft_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "first!", "articleId": article_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let top_id = body["comment"]["id"].as_i64().unwrap();

    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&john)
        .json(&json!({ "content": "thanks!", "articleId": article_id, "parentId": top_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let reply_id = body["comment"]["id"].as_i64().unwrap();

    // Replying to a reply exceeds the single nesting level.
    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "nested", "articleId": article_id, "parentId": reply_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A parent must belong to the same article.
    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "cross", "articleId": second_id, "parentId": top_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A parent must exist.
    let response = app
        .client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "orphan", "articleId": article_id, "parentId": 9999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .get(app.url(&format!("/api/comments/article/{article_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"].as_i64().unwrap(), top_id);
    assert_eq!(comments[0]["replies"][0]["id"].as_i64().unwrap(), reply_id);

    // Only the owner or an admin may edit.
    let response = app
        .client
        .put(app.url(&format!("/api/comments/{top_id}")))
        .bearer_auth(&john)
        .json(&json!({ "content": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .put(app.url(&format!("/api/comments/{top_id}")))
        .bearer_auth(&mary)
        .json(&json!({ "content": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["comment"]["content"], "edited");

    // Deleting the parent takes the replies with it.
    let response = app
        .client
        .delete(app.url(&format!("/api/comments/{top_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(app.url(&format!("/api/comments/article/{article_id}")))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["comments"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn article_updates_respect_ownership_and_regenerate_derived_fields() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (mary, _) = app.register("mary", None).await;

    let response = app
        .client
        .post(app.url("/api/articles"))
        .bearer_auth(&john)
        .json(&json!({
            "title": "Original Title",
            "content": "original content",
            "tags": ["rust", "web"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let article = &body["article"];
    let article_id = article["id"].as_i64().unwrap();
    assert_eq!(article["excerpt"], "original content");
    let tags: Vec<&str> = article["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["rust", "web"]);

    let response = app
        .client
        .put(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&mary)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .put(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&john)
        .json(&json!({
            "title": "Renamed Title",
            "content": "rewritten content",
            "tags": ["async"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let article = &body["article"];
    assert_eq!(article["slug"], "renamed-title");
    assert_eq!(article["excerpt"], "rewritten content");
    let tags: Vec<&str> = article["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["async"]);

    // Updating without a title keeps the slug.
    let response = app
        .client
        .put(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&john)
        .json(&json!({ "content": "more content" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["article"]["slug"], "renamed-title");
}

#[tokio::test]
async fn article_detail_includes_thread_counts_and_like_state() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (mary, _) = app.register("mary", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    let article = app.create_article(&john, "Detailed", "body").await;
    let article_id = article["id"].as_i64().unwrap();
    app.publish(&admin, article_id).await;

    app.client
        .post(app.url("/api/comments"))
        .bearer_auth(&mary)
        .json(&json!({ "content": "nice", "articleId": article_id }))
        .send()
        .await
        .unwrap();
    app.client
        .post(app.url(&format!("/api/articles/{article_id}/like")))
        .bearer_auth(&mary)
        .send()
        .await
        .unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .bearer_auth(&mary)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let article = &body["article"];
    assert_eq!(article["author"]["username"], "john");
    assert_eq!(article["counts"]["likes"], 1);
    assert_eq!(article["counts"]["comments"], 1);
    assert_eq!(article["isLiked"], true);
    assert_eq!(article["comments"][0]["user"]["username"], "mary");

    // Anonymous callers see the thread but no like state of their own.
    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["article"]["isLiked"], false);
}

#[tokio::test]
async fn user_directory_gates_emails_by_role_and_ownership() {
    let app = spawn_app().await;
    let (john, john_id) = app.register("john", None).await;
    let (_mary, mary_id) = app.register("mary", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    // Anonymous directory listing carries no emails.
    let response = app.client.get(app.url("/api/users")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    for user in body["users"].as_array().unwrap() {
        assert!(user.get("email").is_none());
    }

    // Admins see every email.
    let response = app
        .client
        .get(app.url("/api/users"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    for user in body["users"].as_array().unwrap() {
        assert!(user["email"].as_str().is_some());
    }

    // A user sees their own email but not someone else's.
    let response = app
        .client
        .get(app.url(&format!("/api/users/{john_id}")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], "john@example.com");

    let response = app
        .client
        .get(app.url(&format!("/api/users/{mary_id}")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["user"].get("email").is_none());

    // Search and role filters.
    let response = app
        .client
        .get(app.url("/api/users?search=mar"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "mary");

    let response = app
        .client
        .get(app.url("/api/users?role=ADMIN"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "boss");
}

#[tokio::test]
async fn per_user_article_listing_applies_visibility() {
    let app = spawn_app().await;
    let (john, john_id) = app.register("john", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    let draft = app.create_article(&john, "Draft Piece", "body").await;
    let published = app.create_article(&john, "Public Piece", "body").await;
    app.publish(&admin, published["id"].as_i64().unwrap()).await;
    assert_eq!(draft["status"], "DRAFT");

    let response = app
        .client
        .get(app.url(&format!("/api/users/{john_id}/articles")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);

    let response = app
        .client
        .get(app.url(&format!("/api/users/{john_id}/articles")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_user_is_admin_only_and_cascades() {
    let app = spawn_app().await;
    let (john, john_id) = app.register("john", None).await;
    let (mary, _) = app.register("mary", None).await;
    let (admin, admin_id) = app.register("boss", Some("ADMIN")).await;

    let article = app.create_article(&john, "Doomed", "body").await;
    let article_id = article["id"].as_i64().unwrap();
    app.publish(&admin, article_id).await;
    app.client
        .post(app.url("/api/comments"))
        .bearer_auth(&john)
        .json(&json!({ "content": "mine", "articleId": article_id }))
        .send()
        .await
        .unwrap();
    app.client
        .post(app.url(&format!("/api/articles/{article_id}/like")))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();

    // Only admins may delete, and never themselves.
    let response = app
        .client
        .delete(app.url(&format!("/api/users/{john_id}")))
        .bearer_auth(&mary)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .delete(app.url(&format!("/api/users/{admin_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .delete(app.url(&format!("/api/users/{john_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["deletedUser"], "john");

    // The user's article is gone, along with its comments and likes.
    let response = app
        .client
        .get(app.url(&format!("/api/articles/{article_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let listing = app.list_articles(Some(&admin), "").await;
    assert_eq!(listing["articles"].as_array().unwrap().len(), 0);

    // A token for a deleted account stops working.
    let response = app
        .client
        .get(app.url("/api/auth/profile"))
        .bearer_auth(&john)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_is_paginated_with_metadata() {
    let app = spawn_app().await;
    let (john, _) = app.register("john", None).await;
    let (admin, _) = app.register("boss", Some("ADMIN")).await;

    for title in ["One", "Two", "Three"] {
        let article = app.create_article(&john, title, "body").await;
        app.publish(&admin, article["id"].as_i64().unwrap()).await;
    }

    let body = app.list_articles(None, "?page=1&limit=2").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], false);

    let body = app.list_articles(None, "?page=2&limit=2").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);

    // The author-substring filter is case-insensitive.
    let body = app.list_articles(None, "?author=JOH").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 3);

    let body = app.list_articles(None, "?search=two").await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    assert_eq!(body["articles"][0]["title"], "Two");
}
