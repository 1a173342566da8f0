pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::AppError;
use crate::state::AppState;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    info(title = "pisces", description = "Inquiries, orders, carts and PayPal checkout"),
    paths(
        handlers::inquiries::save_inquiry,
        handlers::inquiries::get_inquiry,
        handlers::inquiries::list_inquiries,
        handlers::orders::save_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::get_total,
        handlers::orders::authorize_order,
        handlers::orders::accept_order,
        handlers::carts::get_cart,
        handlers::carts::save_cart,
        handlers::carts::save_cart_item,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::save_product,
        handlers::products::delete_product,
        handlers::auth::login,
        handlers::auth::check,
        handlers::auth::create_user,
        handlers::payments::client_token,
    ),
    components(schemas(
        handlers::inquiries::InquiryRequest,
        handlers::inquiries::InquiryResponse,
        handlers::orders::SaveOrderRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderTotalResponse,
        handlers::carts::CartItemRequest,
        handlers::carts::SaveCartRequest,
        handlers::carts::CartItemActionRequest,
        handlers::carts::CartItemResponse,
        handlers::carts::CartResponse,
        handlers::products::ProductRequest,
        handlers::products::ProductResponse,
        handlers::auth::LoginBody,
        handlers::auth::LoginResponse,
        handlers::auth::CreateUserBody,
        handlers::auth::UserResponse,
        handlers::payments::ClientTokenResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "inquiries"),
        (name = "orders"),
        (name = "carts"),
        (name = "products"),
        (name = "auth"),
        (name = "payments"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The full route table. Shared by [`build_server`] and the API tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{auth, carts, inquiries, orders, payments, products};

    cfg.service(
        web::scope("/inquiries")
            .route("", web::post().to(inquiries::save_inquiry))
            .route("", web::get().to(inquiries::list_inquiries))
            .route("/{id}", web::get().to(inquiries::get_inquiry)),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::save_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/total", web::get().to(orders::get_total))
            .route("/{id}/authorize", web::post().to(orders::authorize_order))
            .route("/{id}/accept", web::post().to(orders::accept_order))
            .route("/{id}/cart", web::get().to(carts::get_cart))
            .route("/{id}/cart", web::put().to(carts::save_cart))
            .route("/{id}/cart/items", web::post().to(carts::save_cart_item)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("", web::post().to(products::save_product))
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}", web::delete().to(products::delete_product)),
    )
    .service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/check", web::post().to(auth::check))
            .route("/users", web::post().to(auth::create_user)),
    )
    .route(
        "/payments/paypal/client-token",
        web::get().to(payments::client_token),
    );
}

/// Malformed JSON bodies and query strings get the usual `{"error": ..}` 400.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(extractor_config)
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .default_service(web::to(handlers::not_found))
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/inquiries",
            "/inquiries/{id}",
            "/orders",
            "/orders/{id}",
            "/orders/{id}/total",
            "/orders/{id}/authorize",
            "/orders/{id}/accept",
            "/orders/{id}/cart",
            "/orders/{id}/cart/items",
            "/products",
            "/products/{id}",
            "/auth/login",
            "/auth/check",
            "/auth/users",
            "/payments/paypal/client-token",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
