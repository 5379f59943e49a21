pub mod commands;
pub mod config;
pub mod db;
pub mod filter;
pub mod flows;
pub mod gateway;
pub mod lifecycle;
pub mod matchmaker;
pub mod models;
pub mod pool;
pub mod relay;
pub mod rooms;
pub mod routes;
pub mod texts;

use config::Config;
use db::Db;
use filter::StrikeCounter;
use flows::FlowTracker;
use gateway::GatewayClient;
use pool::Pool;
use std::env;
use std::sync::Arc;

/// Everything the call graph needs, built once at startup and passed through
/// explicitly. Background loops receive it at construction.
pub struct Services {
    pub config: Config,
    pub db: Db,
    pub gateway: GatewayClient,
    pub pool: Pool,
    pub strikes: StrikeCounter,
    pub flows: FlowTracker,
}

pub fn rocket() -> rocket::Rocket<rocket::Build> {
    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "data/chat.db".to_string());
    rocket_with_db(&db_path)
}

pub fn rocket_with_db(db_path: &str) -> rocket::Rocket<rocket::Build> {
    let config = Config::from_env();
    let gateway = GatewayClient::http(&config.gateway_api_base);
    rocket_with_services(db_path, config, gateway)
}

/// Assemble with explicit config and gateway transport. The test suite uses
/// this with a capture transport and a fixed config.
pub fn rocket_with_services(
    db_path: &str,
    config: Config,
    gateway: GatewayClient,
) -> rocket::Rocket<rocket::Build> {
    // Ensure data directory exists
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db = Db::new(db_path);
    // Startup reconciliation: nobody is online after a restart, and bindings
    // to missing or inactive rooms are dropped.
    db.mark_all_users_offline();
    let stale = db.cleanup_stale_rooms();
    if stale > 0 {
        println!("🧹 Startup: removed {stale} stale room bindings");
    }

    let services = Arc::new(Services {
        config,
        db,
        gateway,
        pool: Pool::new(),
        strikes: StrikeCounter::new(),
        flows: FlowTracker::new(),
    });
    let sweeper_services = services.clone();

    rocket::build()
        .manage(services)
        .register(
            "/",
            rocket::catchers![routes::not_found, routes::unauthorized],
        )
        .mount(
            "/",
            rocket::routes![
                routes::health,
                routes::stats,
                routes::run_maintenance,
                routes::gateway_update,
            ],
        )
        .attach(rocket::fairing::AdHoc::on_liftoff(
            "Lifecycle Sweepers",
            move |_rocket| {
                Box::pin(async move {
                    lifecycle::spawn_lifecycle_tasks(sweeper_services);
                    println!("⏰ Lifecycle sweepers started");
                })
            },
        ))
}
