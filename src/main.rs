use actix_web::{web, App, HttpServer};
use sitemock::{logger, Config, MockupService};

const DEFAULT_PORT: u16 = 8888;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init_with_config(logger::LoggerConfig::from_env()) {
        eprintln!("{}", e);
    }
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    let port = config.port.unwrap_or(DEFAULT_PORT);
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), port);
    logger::log_config_info(&config);

    let service = MockupService::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let service = web::Data::new(service);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .configure(sitemock::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
