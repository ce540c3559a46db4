#![allow(dead_code)]

pub mod websocket_client;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use backend::domain::roles::Role;
use backend::domain::state::RoomId;
use backend::errors::domain::DomainError;
use backend::{AppState, RosterEntry, RosterStore, SessionConfig};

/// Roster store with a fixed role map, so tests know which seat holds
/// which role: werewolf at 0, seer at 1, bodyguard at 2, villagers at 3/4.
pub struct FixedRosterStore {
    entries: Vec<RosterEntry>,
    roles: Vec<Role>,
}

impl FixedRosterStore {
    pub fn five_seats() -> Self {
        let entries = ["wolf", "seer", "guard", "villager_a", "villager_b"]
            .into_iter()
            .map(|name| RosterEntry {
                name: name.to_string(),
                is_human: true,
                persona: None,
            })
            .collect();
        let roles = vec![
            Role::Werewolf,
            Role::Seer,
            Role::Bodyguard,
            Role::Villager,
            Role::Villager,
        ];
        Self { entries, roles }
    }
}

#[async_trait]
impl RosterStore for FixedRosterStore {
    async fn get_roster(&self, _room_id: RoomId) -> Result<Vec<RosterEntry>, DomainError> {
        Ok(self.entries.clone())
    }

    async fn assign_roles(&self, _room_id: RoomId) -> Result<Vec<Role>, DomainError> {
        Ok(self.roles.clone())
    }
}

pub fn build_test_state() -> AppState {
    build_test_state_with(SessionConfig::for_tests())
}

pub fn build_test_state_with(config: SessionConfig) -> AppState {
    AppState::with_tracing_sink(Arc::new(FixedRosterStore::five_seats()), config)
}

/// Bind the app on an ephemeral port and run it in the background.
pub async fn start_test_server(
    state: AppState,
) -> Result<
    (
        ServerHandle,
        SocketAddr,
        tokio::task::JoinHandle<std::io::Result<()>>,
    ),
    Box<dyn std::error::Error>,
> {
    let data = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(backend::routes::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))?;
    let addr = server
        .addrs()
        .first()
        .copied()
        .ok_or("server bound no address")?;
    let server = server.run();
    let handle = server.handle();
    let join = tokio::spawn(server);
    Ok((handle, addr, join))
}
