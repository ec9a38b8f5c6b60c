use crate::room::AttachTarget;
use crate::signaling::SignalingService;
use crate::transport::WsConnection;
use axum::extract::ws::WebSocket;
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use switchboard_core::{Role, RoomId, StreamId};
use tracing::{info, warn};

/// HTTP surface of the hub.
///
/// ```text
/// GET /room/create                     -> {"room_id": "..."}
/// GET /room/{room_id}/websocket        peer
/// GET /room/{room_id}/chat/websocket   chat
/// GET /room/{room_id}/viewer/websocket viewer of the room's stream
/// GET /stream/{stream_id}/websocket    broadcaster
/// GET /stream/{stream_id}/viewer/websocket
/// GET /stream/{stream_id}/chat/websocket
/// ```
pub fn routes(service: SignalingService) -> Router {
    Router::new()
        .route("/room/create", get(create_room))
        .route("/room/{room_id}/websocket", get(room_ws))
        .route("/room/{room_id}/chat/websocket", get(room_chat_ws))
        .route("/room/{room_id}/viewer/websocket", get(room_viewer_ws))
        .route("/stream/{stream_id}/websocket", get(stream_ws))
        .route("/stream/{stream_id}/viewer/websocket", get(viewer_ws))
        .route("/stream/{stream_id}/chat/websocket", get(stream_chat_ws))
        .with_state(service)
}

#[derive(Serialize)]
struct CreatedRoom {
    room_id: RoomId,
}

async fn create_room(State(service): State<SignalingService>) -> Json<CreatedRoom> {
    let room_id = service.create_room();
    info!("Allocated room id {}", room_id);

    Json(CreatedRoom { room_id })
}

async fn room_ws(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(ws, service, AttachTarget::Room(RoomId::from(room_id)), Role::Peer)
}

async fn room_chat_ws(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(ws, service, AttachTarget::Room(RoomId::from(room_id)), Role::Chat)
}

async fn room_viewer_ws(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(ws, service, AttachTarget::Room(RoomId::from(room_id)), Role::Viewer)
}

async fn stream_ws(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(
        ws,
        service,
        AttachTarget::Stream(StreamId::from(stream_id)),
        Role::Stream,
    )
}

async fn viewer_ws(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(
        ws,
        service,
        AttachTarget::Stream(StreamId::from(stream_id)),
        Role::Viewer,
    )
}

async fn stream_chat_ws(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<String>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    upgrade(
        ws,
        service,
        AttachTarget::Stream(StreamId::from(stream_id)),
        Role::Chat,
    )
}

fn upgrade(
    ws: WebSocketUpgrade,
    service: SignalingService,
    target: AttachTarget,
    role: Role,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service, target, role))
}

async fn handle_socket(
    socket: WebSocket,
    service: SignalingService,
    target: AttachTarget,
    role: Role,
) {
    info!("New WebSocket connection for {:?} as {}", target, role);

    match service.attach(WsConnection::new(socket), target, role).await {
        Ok(outcome) => info!("WebSocket session ended: {:?}", outcome),
        Err(e) => warn!("WebSocket session rejected: {}", e),
    }
}
