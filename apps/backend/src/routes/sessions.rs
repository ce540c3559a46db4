//! Session operation handlers. Each returns the updated public snapshot or
//! a problem-details rejection; actor identity is attributed per request
//! and authorized by the domain validator.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::actions::NightActionKind;
use crate::domain::snapshot::{SessionSnapshot, ViewerState};
use crate::domain::state::{ParticipantId, RoomId};
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct SpeechBody {
    pub actor: ParticipantId,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub voter: ParticipantId,
    pub target: ParticipantId,
}

#[derive(Debug, Deserialize)]
pub struct NightActionBody {
    pub actor: ParticipantId,
    pub kind: NightActionKind,
    pub target: ParticipantId,
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub viewer: Option<ParticipantId>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub session: SessionSnapshot,
    pub viewer: ViewerState,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{id}/start").route(web::post().to(start)))
        .service(web::resource("/{id}/speech").route(web::post().to(speech)))
        .service(web::resource("/{id}/vote").route(web::post().to(vote)))
        .service(web::resource("/{id}/night_action").route(web::post().to(night_action)))
        .service(web::resource("/{id}/force_advance").route(web::post().to(force_advance)))
        .service(web::resource("/{id}/call_vote").route(web::post().to(call_vote)))
        .service(web::resource("/{id}/state").route(web::get().to(state)))
        .service(web::resource("/{id}").route(web::delete().to(close)));
}

async fn start(
    path: web::Path<RoomId>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app.flow().start_session(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn speech(
    path: web::Path<RoomId>,
    body: web::Json<SpeechBody>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot = app
        .flow()
        .submit_speech(path.into_inner(), body.actor, body.text)?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn vote(
    path: web::Path<RoomId>,
    body: web::Json<VoteBody>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot = app
        .flow()
        .submit_vote(path.into_inner(), body.voter, body.target)?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn night_action(
    path: web::Path<RoomId>,
    body: web::Json<NightActionBody>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let snapshot =
        app.flow()
            .submit_night_action(path.into_inner(), body.actor, body.kind, body.target)?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn force_advance(
    path: web::Path<RoomId>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app.flow().force_advance(path.into_inner())?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn call_vote(
    path: web::Path<RoomId>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app.flow().call_vote(path.into_inner())?;
    Ok(HttpResponse::Ok().json(&*snapshot))
}

async fn state(
    path: web::Path<RoomId>,
    query: web::Query<StateQuery>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();
    match query.viewer {
        None => Ok(HttpResponse::Ok().json(&*app.flow().get_state(room_id)?)),
        Some(viewer) => {
            let (session, viewer) = app.flow().get_state_for(room_id, viewer)?;
            Ok(HttpResponse::Ok().json(StateResponse { session, viewer }))
        }
    }
}

async fn close(
    path: web::Path<RoomId>,
    app: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app.flow().close_session(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
