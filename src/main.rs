use dotenvy::dotenv;
use storefront_orders::application::order_service::OrderService;
use storefront_orders::config::ServerConfig;
use storefront_orders::infrastructure::order_repo::DieselOrderRepository;
use storefront_orders::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {e}");
        std::process::exit(1);
    });

    let pool = create_pool(&config.database_url).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    let service = OrderService::boxed(DieselOrderRepository::new(pool));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(service, &config)?.await
}
