pub mod application;
pub mod auth;
pub mod config;
pub mod console;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod middleware;
pub mod schema;

use actix_governor::Governor;
use actix_web::middleware::{from_fn, Condition, Logger};
use actix_web::{web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use auth::AdminAuth;
use config::ServerConfig;
use domain::ports::OrderRepository;
use errors::AppError;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The order service shared by every worker, independent of the backing store.
pub type AppOrderService = OrderService<Box<dyn OrderRepository>>;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::orders::list_orders, handlers::orders::update_status),
    components(schemas(
        handlers::orders::Envelope,
        handlers::orders::ListOrdersResponse,
        handlers::orders::OrderResponse,
        handlers::orders::UpdateStatusRequest,
        domain::order::OrderStatus,
        domain::order::OrderItem,
        domain::order::Address,
    )),
    tags((name = "orders", description = "Admin order management"))
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Registers the order routes. Also used by the handler tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {err}");
        AppError::BadRequest(err.to_string()).into()
    }))
    .route("/", web::get().to(handlers::misc::root))
    .service(
        web::scope("/api/order")
            .route("/list", web::post().to(handlers::orders::list_orders))
            .route("/status", web::post().to(handlers::orders::update_status)),
    );
}

/// Build and return an actix-web `Server` bound to `config.host:config.port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: AppOrderService,
    config: &ServerConfig,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let admin_auth = web::Data::new(AdminAuth::new(
        &config.jwt_secret,
        &config.admin_email,
        &config.admin_password,
    ));
    let rate_limit = middleware::rate_limit(config.rate_limit_max, config.rate_limit_window)
        .ok_or_else(|| std::io::Error::other("rate limit must allow at least one request"))?;
    let allowed_origins = config.allowed_origins.clone();
    let production = config.is_production();
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(admin_auth.clone())
            .wrap(middleware::cors(&allowed_origins))
            .wrap(middleware::secure_headers(production))
            .wrap(Governor::new(&rate_limit))
            .wrap(Condition::new(production, from_fn(middleware::redirect_to_https)))
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .default_service(web::to(handlers::misc::route_not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run())
}
