//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth
//! POST   /auth/login                     - Login, sets refresh cookie
//! GET    /auth/token                     - Mint a new access token
//! DELETE /auth/logout                    - Clear refresh token
//! GET    /auth/me                        - Current user from refresh cookie
//! GET    /auth/verify-email?token=       - Confirm email address
//! POST   /auth/request-new-email-token   - Re-send verification email
//! POST   /auth/send-reset-password-token - Start password reset
//! POST   /auth/reset-password/{token}    - Finish password reset
//!
//! # Content
//! /users /posts /products /categories /tags - CRUD (mutations require auth)
//! GET /products/slug/{slug}    - Product detail by slug
//! GET /categories/{id}/posts   - Posts in one category
//!
//! # Site chrome
//! /about /contact /logo /config /banners /carousels /menus /seo
//!
//! # Analytics
//! GET /visitors                - Daily visit counts (requires auth)
//! ```

pub mod about;
pub mod auth;
pub mod banners;
pub mod carousels;
pub mod categories;
pub mod contact;
mod forms;
pub mod logo;
pub mod menus;
pub mod posts;
pub mod products;
pub mod seo;
pub mod site_config;
pub mod tags;
pub mod users;
pub mod visitors;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{Page, PageRequest};
use crate::middleware::track_visit;
use crate::state::AppState;

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    fn page_request(&self, default_limit: i64) -> PageRequest {
        PageRequest::new(self.page, self.limit, default_limit)
    }

    fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// List envelope: `{result, page, totalRows, totalPage}`, or a bare
/// `{message}` when the page comes back empty.
fn list_response<T: Serialize>(page: Page<T>, empty_message: &str) -> Response {
    if page.rows.is_empty() {
        return Json(json!({ "message": empty_message })).into_response();
    }
    Json(json!({
        "result": page.rows,
        "page": page.page,
        "totalRows": page.total_rows,
        "totalPage": page.total_pages,
    }))
    .into_response()
}

/// `{message}` body with the given status.
fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Assemble the full application router.
pub fn router(state: AppState) -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/token", get(auth::refresh))
        .route("/logout", delete(auth::logout))
        .route("/me", get(auth::me))
        .route("/verify-email", get(auth::verify_email))
        .route("/request-new-email-token", post(auth::request_new_email_token))
        .route("/send-reset-password-token", post(auth::send_reset_password_token))
        .route("/reset-password/{token}", post(auth::reset_password));

    let user_routes = Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::show).patch(users::update).delete(users::remove),
        );

    let post_routes = Router::new()
        .route("/", get(posts::list).post(posts::create))
        .route(
            "/{id}",
            get(posts::show).patch(posts::update).delete(posts::remove),
        );

    let product_routes = Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/slug/{slug}", get(products::show_by_slug))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::remove),
        );

    let category_routes = Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .patch(categories::update)
                .delete(categories::remove),
        )
        .route("/{id}/posts", get(categories::posts_in_category));

    let tag_routes = Router::new()
        .route("/", get(tags::list).post(tags::create))
        .route(
            "/{id}",
            get(tags::show).patch(tags::update).delete(tags::remove),
        );

    let about_routes = Router::new().route(
        "/",
        get(about::show)
            .post(about::create)
            .patch(about::update)
            .delete(about::remove),
    );

    let contact_routes = Router::new()
        .route(
            "/",
            get(contact::show)
                .post(contact::create)
                .patch(contact::update)
                .delete(contact::remove),
        )
        .route("/whatsapp-number", get(contact::whatsapp_number));

    let logo_routes = Router::new().route(
        "/",
        get(logo::show).post(logo::create).patch(logo::update),
    );

    let config_routes = Router::new()
        .route("/", get(site_config::show).patch(site_config::update));

    let banner_routes = Router::new()
        .route("/", get(banners::list).post(banners::create))
        .route(
            "/{id}",
            get(banners::show)
                .patch(banners::update)
                .delete(banners::remove),
        );

    let carousel_routes = Router::new()
        .route("/", get(carousels::list).post(carousels::create))
        .route(
            "/{id}",
            get(carousels::show)
                .patch(carousels::update)
                .delete(carousels::remove),
        );

    let menu_routes = Router::new()
        .route("/", get(menus::list).post(menus::create))
        .route(
            "/{id}",
            get(menus::show).patch(menus::update).delete(menus::remove),
        );

    let seo_routes = Router::new()
        .route("/", get(seo::list).post(seo::create))
        .route(
            "/{id}",
            get(seo::show).patch(seo::update).delete(seo::remove),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/posts", post_routes)
        .nest("/products", product_routes)
        .nest("/categories", category_routes)
        .nest("/tags", tag_routes)
        .nest("/about", about_routes)
        .nest("/contact", contact_routes)
        .nest("/logo", logo_routes)
        .nest("/config", config_routes)
        .nest("/banners", banner_routes)
        .nest("/carousels", carousel_routes)
        .nest("/menus", menu_routes)
        .nest("/seo", seo_routes)
        .route("/visitors", get(visitors::daily))
        .layer(from_fn_with_state(state, track_visit))
}
