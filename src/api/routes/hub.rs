//! Live stats hub over WebSocket.
//!
//! A connected client is subscribed to the notification hub and receives the
//! current snapshot right away, then every committed change as a
//! `stats_updated` message. Clients may also call hub methods by sending
//! `{"method": ...}` objects; mutations are acknowledged by the broadcast that
//! follows them, reads get a direct reply.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::models::{Outcome, StatField, Stats};
use crate::progression::RankProgress;
use crate::service::{RankService, ServiceError};
use crate::storage::Snapshot;

/// Client to server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HubRequest {
    Win,
    #[serde(alias = "loose")]
    Loss,
    Tie,
    GetAll,
    SetAll { stats: Stats },
    Get { field: StatField },
    Set { field: StatField, value: i64 },
    GetRank,
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubMessage {
    StatsUpdated { revision: u64, stats: Stats },
    Stats { stats: Stats },
    Value { field: StatField, value: u32 },
    Rank { progress: RankProgress },
    Error { message: String },
}

impl From<Snapshot> for HubMessage {
    fn from(snapshot: Snapshot) -> Self {
        HubMessage::StatsUpdated {
            revision: snapshot.revision,
            stats: snapshot.stats,
        }
    }
}

impl From<ServiceError> for HubMessage {
    fn from(err: ServiceError) -> Self {
        HubMessage::Error {
            message: err.to_string(),
        }
    }
}

/// Run one hub call. Successful mutations return `None`; the caller sees
/// the result through its subscription.
pub async fn handle_request(service: &RankService, request: HubRequest) -> Option<HubMessage> {
    let result = match request {
        HubRequest::Win => service.record_outcome(Outcome::Win).await.map(|_| None),
        HubRequest::Loss => service.record_outcome(Outcome::Loss).await.map(|_| None),
        HubRequest::Tie => service.record_outcome(Outcome::Tie).await.map(|_| None),
        HubRequest::SetAll { stats } => service.set_stats(stats).await.map(|_| None),
        HubRequest::Set { field, value } => service.set_field(field, value).await.map(|_| None),
        HubRequest::GetAll => service
            .get_stats()
            .await
            .map(|stats| Some(HubMessage::Stats { stats })),
        HubRequest::Get { field } => service
            .get_field(field)
            .await
            .map(|value| Some(HubMessage::Value { field, value })),
        HubRequest::GetRank => service
            .progress()
            .await
            .map(|progress| Some(HubMessage::Rank { progress })),
    };

    result.unwrap_or_else(|e| Some(e.into()))
}

pub async fn stats_hub(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, mut socket: WebSocket) {
    let service = state.service.clone();

    let (mut subscription, initial) = match service.connect().await {
        Ok(connected) => connected,
        Err(e) => {
            warn!("Hub connection refused: {}", e);
            let _ = send(&mut socket, &HubMessage::from(e)).await;
            return;
        }
    };
    let id = subscription.id();
    info!("Hub client {} connected", id);

    if send(&mut socket, &initial.into()).await.is_ok() {
        loop {
            tokio::select! {
                update = subscription.recv() => {
                    let Some(snapshot) = update else {
                        warn!("Hub client {} dropped by the hub", id);
                        break;
                    };
                    if send(&mut socket, &snapshot.into()).await.is_err() {
                        break;
                    }
                }
                incoming = socket.recv() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            let reply = match serde_json::from_str::<HubRequest>(&text) {
                                Ok(request) => {
                                    debug!("Hub client {} called {:?}", id, request);
                                    handle_request(&service, request).await
                                }
                                Err(e) => Some(HubMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                }),
                            };
                            if let Some(reply) = reply {
                                if send(&mut socket, &reply).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            debug!("Hub client {} socket error: {}", id, e);
                            break;
                        }
                        Some(Ok(_)) => continue,
                    }
                }
            }
        }
    }

    service.disconnect(id).await;
    info!("Hub client {} disconnected", id);
}

async fn send(socket: &mut WebSocket, message: &HubMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(e) => {
            warn!("Failed to encode hub message: {}", e);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::NotificationHub;
    use crate::ladder::RankLadder;
    use crate::models::Rank;
    use crate::storage::{MemoryStore, StatsStore};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    fn service() -> (Arc<MemoryStore>, RankService) {
        let backend = Arc::new(MemoryStore::new());
        let service = RankService::new(
            StatsStore::new(backend.clone(), Duration::from_secs(5)),
            Arc::new(RankLadder::standard()),
            NotificationHub::new(8),
        );
        (backend, service)
    }

    #[test]
    fn test_parse_requests() {
        let parse = |s: &str| serde_json::from_str::<HubRequest>(s).unwrap();

        assert_eq!(parse(r#"{"method":"win"}"#), HubRequest::Win);
        assert_eq!(parse(r#"{"method":"loose"}"#), HubRequest::Loss);
        assert_eq!(parse(r#"{"method":"get_all"}"#), HubRequest::GetAll);
        assert_eq!(
            parse(r#"{"method":"get","field":"win_streaks"}"#),
            HubRequest::Get {
                field: StatField::WinStreak
            }
        );
        assert_eq!(
            parse(r#"{"method":"set","field":"points","value":-4}"#),
            HubRequest::Set {
                field: StatField::Points,
                value: -4
            }
        );
        assert_eq!(
            parse(r#"{"method":"set_all","stats":{"Wins":2,"Looses":1}}"#),
            HubRequest::SetAll {
                stats: Stats {
                    wins: 2,
                    losses: 1,
                    ..Default::default()
                }
            }
        );
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(serde_json::from_str::<HubRequest>(r#"{"method":"forfeit"}"#).is_err());
        assert!(serde_json::from_str::<HubRequest>(r#"{"method":"get","field":"elo"}"#).is_err());
    }

    #[test]
    fn test_message_encoding() {
        let json = serde_json::to_value(HubMessage::StatsUpdated {
            revision: 3,
            stats: Stats {
                wins: 1,
                points: 10,
                win_streak: 1,
                ..Default::default()
            },
        })
        .unwrap();

        assert_eq!(json["type"], "stats_updated");
        assert_eq!(json["revision"], 3);
        assert_eq!(json["stats"]["points"], 10);

        let json = serde_json::to_value(HubMessage::Value {
            field: StatField::Losses,
            value: 4,
        })
        .unwrap();
        assert_eq!(json["type"], "value");
        assert_eq!(json["field"], "losses");
    }

    #[tokio::test]
    async fn test_mutation_is_broadcast_not_replied() {
        let (backend, service) = service();
        let (mut sub, _) = service.connect().await.unwrap();

        assert_eq!(handle_request(&service, HubRequest::Win).await, None);
        assert_eq!(handle_request(&service, HubRequest::Win).await, None);

        assert_eq!(sub.recv().await.unwrap().stats.points, 10);
        assert_eq!(sub.recv().await.unwrap().stats.points, 23);
        assert_eq!(backend.stored().await.unwrap().win_streak, 2);
    }

    #[tokio::test]
    async fn test_reads_reply_directly() {
        let (_, service) = service();
        handle_request(
            &service,
            HubRequest::Set {
                field: StatField::Points,
                value: 355,
            },
        )
        .await;

        assert_eq!(
            handle_request(
                &service,
                HubRequest::Get {
                    field: StatField::Points
                }
            )
            .await,
            Some(HubMessage::Value {
                field: StatField::Points,
                value: 355
            })
        );

        match handle_request(&service, HubRequest::GetAll).await {
            Some(HubMessage::Stats { stats }) => assert_eq!(stats.points, 355),
            other => panic!("unexpected reply: {:?}", other),
        }

        match handle_request(&service, HubRequest::GetRank).await {
            Some(HubMessage::Rank { progress }) => assert_eq!(progress.rank, Rank::GreatBall1),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_set_replies_error() {
        let (backend, service) = service();
        let reply = handle_request(
            &service,
            HubRequest::Set {
                field: StatField::Wins,
                value: -1,
            },
        )
        .await;

        assert!(matches!(reply, Some(HubMessage::Error { .. })));
        assert_eq!(backend.stored().await, None);
    }

    #[tokio::test]
    async fn test_storage_failure_replies_error() {
        let (backend, service) = service();
        service.get_stats().await.unwrap();
        backend.set_fail_saves(true);

        let reply = handle_request(&service, HubRequest::Tie).await;
        assert!(matches!(reply, Some(HubMessage::Error { .. })));
    }
}
