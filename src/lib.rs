pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::cart_service::CartService;
use crate::application::order_service::OrderService;
use crate::application::report_service::ReportService;
use crate::auth::JwtSettings;
use crate::domain::ports::Mailer;
use crate::errors::AppError;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::report_repo::DieselReportRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        log::info!("Applied migration {}", version);
    }
    Ok(())
}

/// Services shared by every worker.
pub struct AppState {
    pub carts: CartService<DieselCartRepository>,
    pub orders: OrderService<DieselOrderRepository>,
    pub reports: ReportService<DieselReportRepository>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            carts: CartService::new(DieselCartRepository::new(pool.clone())),
            orders: OrderService::new(DieselOrderRepository::new(pool.clone())),
            reports: ReportService::new(DieselReportRepository::new(pool)),
            mailer,
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::create_cart,
        handlers::cart::add_item,
        handlers::cart::list_items,
        handlers::cart::remove_item,
        handlers::cart::increment_quantity,
        handlers::cart::decrement_quantity,
        handlers::cart::set_quantity,
        handlers::orders::place_order,
        handlers::orders::approve_order,
        handlers::orders::reject_order,
        handlers::orders::delete_order,
        handlers::orders::my_orders,
        handlers::orders::store_orders,
        handlers::orders::all_orders,
        handlers::reports::daily_orders,
        handlers::reports::item_sales,
        handlers::reports::individual_orders,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "cart", description = "The caller's shopping cart"),
        (name = "orders", description = "Order placement, review and listings"),
        (name = "reports", description = "Sales and order reports"),
    )
)]
pub struct ApiDoc;

/// Mounts every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    use handlers::{cart, orders, reports};

    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/cart")
                    .route("/create", web::post().to(cart::create_cart))
                    .route("/additem", web::post().to(cart::add_item))
                    .route("/items", web::get().to(cart::list_items))
                    .route("/removeitem/{itemId}", web::delete().to(cart::remove_item))
                    .route("/incrementquantity/{itemId}", web::post().to(cart::increment_quantity))
                    .route("/decrementquantity/{itemId}", web::post().to(cart::decrement_quantity))
                    .route("/setquantity/{itemId}", web::post().to(cart::set_quantity))
                    .route("/placeorder", web::post().to(orders::place_order)),
            )
            .service(
                web::scope("/order")
                    .route("/placeorder", web::post().to(orders::place_order))
                    .route("/accept/{orderId}", web::post().to(orders::approve_order))
                    .route("/reject/{orderId}", web::post().to(orders::reject_order))
                    .route("/deleteorder/{orderId}", web::delete().to(orders::delete_order))
                    .route("/myorders", web::get().to(orders::my_orders))
                    .route("/storeorders", web::get().to(orders::store_orders))
                    .route("/allorders", web::get().to(orders::all_orders)),
            )
            .service(
                web::scope("/report")
                    .route("/daily-orders", web::get().to(reports::daily_orders))
                    .route("/item-sales", web::get().to(reports::item_sales))
                    .route("/individual-orders", web::get().to(reports::individual_orders)),
            ),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    jwt: JwtSettings,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    let jwt = web::Data::new(jwt);
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(jwt.clone())
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(Logger::default())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test, HttpResponse};
    use uuid::Uuid;

    use super::*;

    async fn echo_id(path: web::Path<Uuid>) -> HttpResponse {
        HttpResponse::Ok().body(path.into_inner().to_string())
    }

    #[actix_web::test]
    async fn malformed_path_id_is_a_json_bad_request() {
        let app = actix_test::init_service(
            App::new()
                .app_data(path_config())
                .route("/orders/{orderId}", web::get().to(echo_id)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/orders/not-a-uuid").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert!(body["error"].is_string());

        let id = Uuid::new_v4();
        let req = actix_test::TestRequest::get()
            .uri(&format!("/orders/{id}"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[test]
    fn openapi_documents_every_route_with_bearer_auth() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/cart/additem",
            "/api/order/placeorder",
            "/api/order/accept/{orderId}",
            "/api/report/item-sales",
            "/api/report/individual-orders",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
