//! Integration tests for the server, handler, and full connection flow
//! over real WebSockets.

use std::time::Duration;

use cardroom::Server;
use cardroom_protocol::{
    Card, ClientMessage, JoinRequest, RoomName, ServerEvent, ServerMessage,
    StateView,
};
use cardroom_store::MemoryStore;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start(store: MemoryStore) -> (String, tokio::task::JoinHandle<()>) {
    let server = Server::<MemoryStore>::builder()
        .bind("127.0.0.1:0")
        .build(store)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    let task = tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, task)
}

async fn ws(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .unwrap();
    ws
}

fn enc(msg: &ClientMessage) -> Message {
    Message::Binary(serde_json::to_vec(msg).unwrap().into())
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed while expecting a frame")
            .expect("websocket error");
        match msg {
            Message::Binary(data) => return serde_json::from_slice(&data).unwrap(),
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).unwrap();
            }
            _ => continue,
        }
    }
}

/// Reads frames until the server closes the connection.
async fn assert_closed(ws: &mut Ws) {
    loop {
        match tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for close")
        {
            None | Some(Ok(Message::Close(_))) | Some(Err(_)) => return,
            Some(Ok(_)) => continue,
        }
    }
}

fn as_hand(msg: &ServerMessage) -> Option<Vec<Card>> {
    match msg {
        ServerMessage::Event(ServerEvent::State(StateView::Hand(view))) => {
            Some(view.hand.clone())
        }
        _ => None,
    }
}

fn as_shared(msg: &ServerMessage) -> Option<&cardroom_protocol::SharedView> {
    match msg {
        ServerMessage::Event(ServerEvent::State(StateView::Shared(view))) => {
            Some(view)
        }
        _ => None,
    }
}

/// Sends the join frame and drains the hand + shared replies.
/// Returns the dealt (or restored) hand.
async fn join(ws: &mut Ws, room: &str, name: &str) -> Vec<Card> {
    let msg = ClientMessage::Join(JoinRequest {
        room: RoomName::new(room).unwrap(),
        name: name.to_string(),
    });
    ws.send(enc(&msg)).await.unwrap();
    let hand = as_hand(&recv(ws).await).expect("hand view after join");
    let shared = recv(ws).await;
    assert!(as_shared(&shared).is_some(), "shared view after hand");
    hand
}

// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_join_deals_hand_and_shared_view() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;

    let msg = ClientMessage::Join(JoinRequest {
        room: RoomName::new("r1").unwrap(),
        name: "Ann".to_string(),
    });
    ann.send(enc(&msg)).await.unwrap();

    let hand = as_hand(&recv(&mut ann).await).expect("hand view first");
    assert_eq!(hand.len(), 7);
    assert!(hand.windows(2).all(|w| w[0] <= w[1]), "hand arrives sorted");

    let msg = recv(&mut ann).await;
    let shared = as_shared(&msg).expect("shared view second");
    assert_eq!(shared.players, vec![("Ann".to_string(), 7)]);
    assert_eq!(shared.history.last().unwrap(), "Ann picked up 7");
}

#[tokio::test]
async fn test_two_players_see_each_others_moves() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;
    let mut bo = ws(&addr).await;

    let ann_hand = join(&mut ann, "r1", "Ann").await;
    let _ = join(&mut bo, "r1", "Bo").await;
    let _ = recv(&mut ann).await; // shared view after Bo joined

    let card = ann_hand[0];
    ann.send(enc(&ClientMessage::Discard(card))).await.unwrap();

    let hand = as_hand(&recv(&mut ann).await).unwrap();
    assert_eq!(hand.len(), 6);

    let msg = recv(&mut bo).await;
    let shared = as_shared(&msg).expect("Bo sees the shared update");
    assert_eq!(shared.players[0], ("Ann".to_string(), 6));
    assert_eq!(
        shared.history.last().unwrap(),
        &format!("Ann played a {}", card.name())
    );
    assert_eq!(shared.discards.last().unwrap(), &("Ann".to_string(), card));
}

#[tokio::test]
async fn test_pickup_reply_is_private() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;
    let mut bo = ws(&addr).await;
    let _ = join(&mut ann, "r1", "Ann").await;
    let _ = join(&mut bo, "r1", "Bo").await;
    let _ = recv(&mut ann).await;

    ann.send(enc(&ClientMessage::Pickup)).await.unwrap();

    let msg = recv(&mut ann).await;
    let drawn = match msg {
        ServerMessage::Event(ServerEvent::LatestCard(card)) => card,
        other => panic!("expected latest_card, got {other:?}"),
    };
    let hand = as_hand(&recv(&mut ann).await).unwrap();
    assert!(hand.contains(&drawn));

    // Bo's only frame is the shared view: hand sizes, not the card.
    let msg = recv(&mut bo).await;
    let shared = as_shared(&msg).expect("shared view only");
    assert_eq!(shared.players[0], ("Ann".to_string(), 8));
}

#[tokio::test]
async fn test_malformed_frame_is_ignored_and_connection_survives() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;
    let _ = join(&mut ann, "r1", "Ann").await;

    ann.send(Message::Text("this is not a command".into()))
        .await
        .unwrap();
    ann.send(Message::Binary(br#"{"cmd":"cheat"}"#.to_vec().into()))
        .await
        .unwrap();

    // Still connected: a real command round-trips.
    ann.send(enc(&ClientMessage::Pass)).await.unwrap();
    let hand = as_hand(&recv(&mut ann).await);
    assert!(hand.is_some(), "connection survived the garbage frames");
}

#[tokio::test]
async fn test_first_frame_must_be_join() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ws = ws(&addr).await;

    ws.send(enc(&ClientMessage::Pass)).await.unwrap();

    let msg = recv(&mut ws).await;
    assert_eq!(msg, ServerMessage::error("expected join"));
    assert_closed(&mut ws).await;
}

#[tokio::test]
async fn test_reset_closes_every_connection() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;
    let mut bo = ws(&addr).await;
    let _ = join(&mut ann, "r1", "Ann").await;
    let _ = join(&mut bo, "r1", "Bo").await;
    let _ = recv(&mut ann).await;

    ann.send(enc(&ClientMessage::Reset)).await.unwrap();

    assert_closed(&mut ann).await;
    assert_closed(&mut bo).await;
}

#[tokio::test]
async fn test_table_survives_server_restart() {
    let store = MemoryStore::new();
    let (addr, task) = start(store.clone()).await;

    let mut ann = ws(&addr).await;
    let hand = join(&mut ann, "persist", "Ann").await;
    // The join itself is not persisted; a command is. Send two so the
    // first one's snapshot write is provably finished (the actor works
    // strictly in order).
    ann.send(enc(&ClientMessage::Pass)).await.unwrap();
    let _ = recv(&mut ann).await; // hand
    let _ = recv(&mut ann).await; // shared
    ann.send(enc(&ClientMessage::Pass)).await.unwrap();
    let _ = recv(&mut ann).await;
    let _ = recv(&mut ann).await;

    ann.close(None).await.unwrap();
    task.abort();

    let (addr, _task) = start(store).await;
    let mut ann = ws(&addr).await;
    let restored = join(&mut ann, "persist", "Ann").await;
    assert_eq!(restored, hand, "hand survives the restart");
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let (addr, _task) = start(MemoryStore::new()).await;
    let mut ann = ws(&addr).await;
    let mut bo = ws(&addr).await;
    let _ = join(&mut ann, "r1", "Ann").await;
    let _ = join(&mut bo, "r2", "Bo").await;

    ann.send(enc(&ClientMessage::Pickup)).await.unwrap();
    let _ = recv(&mut ann).await; // latest_card
    let _ = recv(&mut ann).await; // hand
    let msg = recv(&mut ann).await; // shared
    let shared = as_shared(&msg).unwrap();
    assert_eq!(shared.players.len(), 1, "rooms do not share tables");

    // Bo's room heard nothing; his next traffic is his own.
    bo.send(enc(&ClientMessage::Pass)).await.unwrap();
    let msg = recv(&mut bo).await;
    let hand = as_hand(&msg).expect("Bo's own hand view");
    assert_eq!(hand.len(), 7);
}
