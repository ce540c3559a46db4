use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::routes;
use backend::services::stall_watchdog;
use backend::state::app_state::AppState;
use backend::{InMemoryRosterStore, RosterEntry, SessionConfig};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let roster = Arc::new(InMemoryRosterStore::new(config.role_seed));
    // Convenience room for local runs; real room setup is the roster
    // collaborator's job.
    if std::env::var("BACKEND_DEMO_ROOM").is_ok() {
        roster.insert(1, demo_roster());
    }

    let app_state = AppState::with_tracing_sink(roster, config);
    stall_watchdog::spawn(app_state.flow().clone());

    println!("Starting session backend on http://{}:{}", host, port);

    let data = web::Data::new(app_state);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

fn demo_roster() -> Vec<RosterEntry> {
    let mut entries = vec![RosterEntry {
        name: "you".to_string(),
        is_human: true,
        persona: None,
    }];
    for name in ["ash", "briar", "cedar", "dahlia"] {
        entries.push(RosterEntry {
            name: name.to_string(),
            is_human: false,
            persona: None,
        });
    }
    entries
}
