use std::sync::Arc;
use std::time::Instant;

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::events::SessionEvent;
use crate::domain::snapshot;
use crate::domain::state::ParticipantId;
use crate::services::registry::RoomHandle;
use crate::state::app_state::AppState;
use crate::ws::hub::{CatchUp, WsRegistry};
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg, Topic, PROTOCOL_VERSION};

#[derive(Debug, Deserialize)]
pub struct RealtimeQuery {
    /// Claimed roster index. The validator is the authorization boundary
    /// for individual actions; the claim only scopes the private viewer
    /// projection.
    pub participant: Option<ParticipantId>,
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<RealtimeQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn_id = Uuid::new_v4();
    let session = WsSession::new(conn_id, query.participant, app_state);
    ws::start(session, &req, stream)
}

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub enum HubEvent {
    Event { event: SessionEvent },
}

pub struct WsSession {
    conn_id: Uuid,
    viewer: Option<ParticipantId>,
    app_state: web::Data<AppState>,

    last_heartbeat: Instant,

    hello_done: bool,
}

impl WsSession {
    fn new(conn_id: Uuid, viewer: Option<ParticipantId>, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            viewer,
            app_state,
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn registry(&self) -> &Arc<WsRegistry> {
        self.app_state.ws_registry()
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        self.send_error(ctx, code, message);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let interval = self.app_state.config().heartbeat_interval;
        let timeout = self.app_state.config().client_timeout;
        ctx.run_interval(interval, move |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > timeout {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_subscribe(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        topic: Topic,
        last_seen_seq: Option<u64>,
    ) {
        let Topic::Session { id: room_id } = topic;
        let Ok(handle) = self.app_state.session_registry().get(room_id) else {
            self.send_error(ctx, ErrorCode::NotFound, format!("session {room_id} not found"));
            return;
        };

        // Subscribe before reading the buffer so no event falls into the
        // gap; a duplicate across the race is dropped by the client's
        // last-seen sequence filter.
        self.registry().subscribe(self.conn_id, topic);

        // Ordering guarantee: ack, then catch-up or snapshot, then live events.
        Self::send_json(ctx, &ServerMsg::Ack { message: "subscribed" });
        match last_seen_seq {
            Some(last_seen) => match self.registry().catch_up(room_id, last_seen) {
                CatchUp::Events(events) => {
                    for event in events {
                        Self::send_json(ctx, &ServerMsg::Event { topic, event });
                    }
                }
                CatchUp::SnapshotRequired => self.send_snapshot(ctx, topic, &handle),
            },
            None => self.send_snapshot(ctx, topic, &handle),
        }
    }

    fn send_snapshot(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        topic: Topic,
        handle: &Arc<RoomHandle>,
    ) {
        let snap = handle.snapshot();
        let viewer = {
            let state = handle.state.lock();
            snapshot::viewer_state(&state, self.viewer)
        };
        Self::send_json(
            ctx,
            &ServerMsg::SessionState {
                topic,
                version: snap.version,
                session: (*snap).clone(),
                viewer,
            },
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        let recipient = ctx.address().recipient::<HubEvent>();
        self.registry().register_connection(self.conn_id, recipient);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry().unregister_connection(self.conn_id);
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::Hello { protocol } => {
                        if protocol != PROTOCOL_VERSION {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadProtocol,
                                "Unsupported protocol version",
                            );
                            return;
                        }
                        self.hello_done = true;
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                                participant: self.viewer,
                            },
                        );
                    }

                    ClientMsg::Subscribe {
                        topic,
                        last_seen_seq,
                    } => {
                        if !self.hello_done {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadRequest,
                                "Must send hello first",
                            );
                            return;
                        }
                        self.handle_subscribe(ctx, topic, last_seen_seq);
                    }

                    ClientMsg::Unsubscribe { topic } => {
                        if !self.hello_done {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadRequest,
                                "Must send hello first",
                            );
                            return;
                        }
                        self.registry().unsubscribe(self.conn_id, &topic);
                        Self::send_json(
                            ctx,
                            &ServerMsg::Ack {
                                message: "unsubscribed",
                            },
                        );
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    conn_id = %self.conn_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<HubEvent> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: HubEvent, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            HubEvent::Event { event } => {
                let topic = Topic::Session { id: event.room_id };
                Self::send_json(ctx, &ServerMsg::Event { topic, event });
            }
        }
    }
}
