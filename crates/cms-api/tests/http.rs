//! End-to-end HTTP behaviour over the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use cms_api::{build_router, AppState};
use cms_core::domain::{Role, User};
use cms_infrastructure::InMemoryStore;
use cms_security::{SessionCodec, SessionIdentity};
use cms_shared::config::AppConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@hacktricks.com";
const READER_EMAIL: &str = "reader@hacktricks.com";

struct TestApp {
    router: Router,
    config: AppConfig,
}

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Value,
}

async fn app() -> TestApp {
    let config = AppConfig::defaults().unwrap();
    let repos = InMemoryStore::new().repositories();

    for (name, email, role) in [("admin", ADMIN_EMAIL, Role::Admin), ("reader", READER_EMAIL, Role::User)] {
        let user = User::new(name.into(), email.into(), role, None).unwrap();
        repos.users.create(&user).await.unwrap();
    }

    TestApp {
        router: build_router(AppState::new(config.clone(), repos)),
        config,
    }
}

impl TestApp {
    async fn send(&self, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        Reply { status, headers, body }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, Some(body), None).await
    }

    async fn put(&self, uri: &str, body: Value) -> Reply {
        self.send(Method::PUT, uri, Some(body), None).await
    }

    /// Logs in and returns the `name=value` pair to send back as `Cookie`.
    async fn login(&self, email: &str) -> String {
        let reply = self
            .post("/api/auth/login", json!({"email": email, "password": "anything"}))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let cookie = set_cookie(&reply);
        cookie.split(';').next().unwrap().to_string()
    }

    fn forged_session(&self, role: &str, ttl: Duration) -> String {
        let codec = SessionCodec::new(&self.config.session.secret);
        let issued = codec
            .issue(
                SessionIdentity {
                    user_id: uuid::Uuid::new_v4().to_string(),
                    email: ADMIN_EMAIL.into(),
                    role: role.into(),
                },
                ttl,
            )
            .unwrap();
        format!("session={}", issued.token)
    }
}

fn set_cookie(reply: &Reply) -> String {
    reply
        .headers
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

fn location(reply: &Reply) -> &str {
    reply.headers.get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn login_with_unknown_email_is_rejected() {
    let app = app().await;
    let reply = app
        .post("/api/auth/login", json!({"email": "ghost@hacktricks.com", "password": "x"}))
        .await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        reply.body,
        json!({"error": "Invalid credentials or insufficient permissions"})
    );
    assert!(reply.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn login_as_non_admin_is_rejected() {
    let app = app().await;
    let reply = app
        .post("/api/auth/login", json!({"email": READER_EMAIL, "password": "x"}))
        .await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = app().await;
    let reply = app.post("/api/auth/login", json!({"email": ADMIN_EMAIL})).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({"error": "Email and password are required"}));
}

#[tokio::test]
async fn admin_login_sets_session_cookie_and_me_returns_user() {
    let app = app().await;
    let reply = app
        .post("/api/auth/login", json!({"email": ADMIN_EMAIL, "password": "anything"}))
        .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "Login successful");
    assert_eq!(reply.body["user"]["role"], "admin");
    assert_eq!(reply.body["user"]["email"], ADMIN_EMAIL);

    let cookie = set_cookie(&reply);
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Expires="));

    let session = cookie.split(';').next().unwrap();
    let me = app.send(Method::GET, "/api/auth/me", None, Some(session)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(me.body["user"]["username"], "admin");
}

#[tokio::test]
async fn me_without_session_is_unauthorized() {
    let app = app().await;
    let reply = app.get("/api/auth/me").await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body, json!({"error": "Not authenticated"}));
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = app().await;
    let reply = app.post("/api/auth/logout", json!({})).await;

    assert_eq!(reply.status, StatusCode::OK);
    let cookie = set_cookie(&reply);
    assert!(cookie.starts_with("session=;"));
    assert!(cookie.contains("1970"));
}

#[tokio::test]
async fn admin_area_redirects_without_session() {
    let app = app().await;

    for path in ["/admin", "/admin/pages", "/admin/menu/edit"] {
        let reply = app.get(path).await;
        assert_eq!(reply.status, StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&reply), "/admin/login");
    }
}

#[tokio::test]
async fn admin_login_page_is_exempt() {
    let app = app().await;
    let reply = app.get("/admin/login").await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["loginEndpoint"], "/api/auth/login");
}

#[tokio::test]
async fn admin_area_allows_admin_session() {
    let app = app().await;
    let cookie = app.login(ADMIN_EMAIL).await;

    let reply = app.send(Method::GET, "/admin", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["counts"]["pages"], 0);

    let missing = app.send(Method::GET, "/admin/unknown", None, Some(&cookie)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_area_rejects_expired_forged_and_non_admin_sessions() {
    let app = app().await;
    let expired = app.forged_session("admin", Duration::hours(-1));
    let non_admin = app.forged_session("user", Duration::hours(1));
    let forged = {
        let codec = SessionCodec::new("some-other-secret");
        let issued = codec
            .issue(
                SessionIdentity {
                    user_id: "x".into(),
                    email: ADMIN_EMAIL.into(),
                    role: "admin".into(),
                },
                Duration::hours(1),
            )
            .unwrap();
        format!("session={}", issued.token)
    };

    for cookie in [expired, non_admin, forged, "session=".to_string()] {
        let reply = app.send(Method::GET, "/admin", None, Some(&cookie)).await;
        assert_eq!(reply.status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&reply), "/admin/login");
    }
}

#[tokio::test]
async fn api_routes_stay_public() {
    let app = app().await;
    assert_eq!(app.get("/api/pages").await.status, StatusCode::OK);
    assert_eq!(app.get("/api/menu").await.status, StatusCode::OK);
    assert_eq!(app.get("/health").await.status, StatusCode::OK);
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let app = app().await;
    let reply = app.get("/api/pages/unknown").await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({"error": "Page not found"}));

    let reply = app.put("/api/pages/unknown", json!({"title": "x"})).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.send(Method::DELETE, "/api/pages/unknown", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_menu_and_article_are_not_found() {
    let app = app().await;

    let reply = app.get("/api/menu/unknown").await;
    assert_eq!(reply.body, json!({"error": "Menu not found"}));

    let reply = app.get("/api/articles/unknown").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({"error": "Article not found"}));
}

#[tokio::test]
async fn page_creation_validates_and_rejects_duplicates() {
    let app = app().await;

    let created = app
        .post("/api/pages", json!({"title": "SQLi", "slug": "sqli", "published": true}))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["page"]["views"], 0);
    assert!(created.body["page"]["_id"].is_number());

    let duplicate = app
        .post("/api/pages", json!({"title": "Other", "slug": "sqli"}))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let invalid = app.post("/api/pages", json!({"content": "no title"})).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let message = invalid.body["error"].as_str().unwrap();
    assert!(message.contains("slug") && message.contains("title"));
}

#[tokio::test]
async fn reading_a_published_page_counts_a_view() {
    let app = app().await;
    let created = app
        .post("/api/pages", json!({"title": "SQLi", "slug": "sqli", "published": true}))
        .await;
    let id = created.body["page"]["id"].as_str().unwrap().to_string();

    app.get(&format!("/api/pages/{id}")).await;
    app.get(&format!("/api/pages/{id}")).await;
    let third = app.get(&format!("/api/pages/{id}")).await;

    assert_eq!(third.body["page"]["views"], 2);
}

#[tokio::test]
async fn page_menu_change_is_reflected_on_both_sides() {
    let app = app().await;
    let menu = app.post("/api/menu", json!({"label": "Hacking"})).await;
    assert_eq!(menu.status, StatusCode::CREATED);
    let menu_id = menu.body["menu"]["id"].as_str().unwrap().to_string();

    let page = app
        .post(
            "/api/pages",
            json!({"title": "SQLi", "slug": "sqli", "published": true, "menuId": menu_id}),
        )
        .await;
    assert_eq!(page.status, StatusCode::CREATED);
    let page_id = page.body["page"]["id"].as_str().unwrap().to_string();
    assert_eq!(page.body["page"]["menuId"], menu_id.as_str());

    let menu = app.get(&format!("/api/menu/{menu_id}")).await;
    assert_eq!(menu.body["menu"]["pages"], json!([page_id]));

    let listed = app.get(&format!("/api/pages?menuId={menu_id}")).await;
    assert_eq!(listed.body["pages"].as_array().unwrap().len(), 1);

    let moved = app.put(&format!("/api/pages/{page_id}"), json!({"menuId": null})).await;
    assert_eq!(moved.status, StatusCode::OK);
    assert!(moved.body["page"]["menuId"].is_null());

    let menu = app.get(&format!("/api/menu/{menu_id}")).await;
    assert_eq!(menu.body["menu"]["pages"], json!([]));
}

#[tokio::test]
async fn attach_and_detach_endpoints() {
    let app = app().await;
    let menu = app.post("/api/menu", json!({"label": "Web"})).await;
    let menu_id = menu.body["menu"]["id"].as_str().unwrap().to_string();
    let page = app.post("/api/pages", json!({"title": "XSS", "slug": "xss"})).await;
    let page_id = page.body["page"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/menu/{menu_id}/pages/{page_id}");

    let attached = app.send(Method::POST, &uri, None, None).await;
    assert_eq!(attached.status, StatusCode::OK);
    assert_eq!(attached.body["menu"]["pages"], json!([page_id]));

    let detached = app.send(Method::DELETE, &uri, None, None).await;
    assert_eq!(detached.status, StatusCode::OK);
    assert_eq!(detached.body["menu"]["pages"], json!([]));

    let missing = app
        .send(Method::POST, &format!("/api/menu/{menu_id}/pages/nope"), None, None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body, json!({"error": "Page not found"}));
}

#[tokio::test]
async fn deleting_a_menu_frees_its_pages() {
    let app = app().await;
    let menu = app.post("/api/menu", json!({"label": "Cloud"})).await;
    let menu_id = menu.body["menu"]["id"].as_str().unwrap().to_string();
    let page = app
        .post("/api/pages", json!({"title": "SSRF", "slug": "ssrf", "menuId": menu_id}))
        .await;
    let page_id = page.body["page"]["id"].as_str().unwrap().to_string();

    let deleted = app.send(Method::DELETE, &format!("/api/menu/{menu_id}"), None, None).await;
    assert_eq!(deleted.body, json!({"message": "Menu deleted successfully"}));

    let page = app.get(&format!("/api/pages/{page_id}")).await;
    assert!(page.body["page"]["menuId"].is_null());
}

#[tokio::test]
async fn navigation_lists_published_pages_per_menu() {
    let app = app().await;
    let menu = app.post("/api/menu", json!({"label": "Hacking", "order": 1})).await;
    let menu_id = menu.body["menu"]["id"].as_str().unwrap().to_string();
    app.post(
        "/api/pages",
        json!({"title": "SQLi", "slug": "sqli", "published": true, "menuId": menu_id}),
    )
    .await;
    app.post(
        "/api/pages",
        json!({"title": "Draft", "slug": "draft", "menuId": menu_id}),
    )
    .await;

    let nav = app.get("/api/navigation").await;
    assert_eq!(nav.status, StatusCode::OK);
    let entries = nav.body["menus"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["menu"]["label"], "Hacking");
    assert_eq!(entries[0]["pages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn articles_by_category_and_slug() {
    let app = app().await;
    for (slug, category) in [("aws-iam", "cloud"), ("gcp-iam", "cloud"), ("xss", "web")] {
        let reply = app
            .post(
                "/api/articles",
                json!({"title": slug, "slug": slug, "category": category, "published": true}),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let cloud = app.get("/api/articles?category=cloud&limit=1").await;
    assert_eq!(cloud.body["articles"].as_array().unwrap().len(), 1);

    let first = app.get("/api/articles/xss").await;
    assert_eq!(first.body["article"]["views"], 0);
    let second = app.get("/api/articles/xss").await;
    assert_eq!(second.body["article"]["views"], 1);

    let popular = app.get("/api/articles").await;
    assert_eq!(popular.body["articles"][0]["slug"], "xss");
}
