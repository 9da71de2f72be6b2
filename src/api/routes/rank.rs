use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::ladder::LadderEntry;
use crate::progression::RankProgress;

#[derive(Debug, Serialize)]
pub struct LadderResponse {
    pub entries: Vec<LadderEntry>,
}

/// Rank progress for the current stats.
pub async fn get_rank(State(state): State<AppState>) -> Result<Json<RankProgress>, ApiError> {
    Ok(Json(state.service.progress().await?))
}

pub async fn get_ladder(State(state): State<AppState>) -> Json<LadderResponse> {
    Json(LadderResponse {
        entries: state.service.ladder().entries().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::hub::NotificationHub;
    use crate::ladder::RankLadder;
    use crate::models::Stats;
    use crate::service::RankService;
    use crate::storage::{MemoryStore, StatsStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn setup_test_state(initial: Stats) -> AppState {
        let backend = Arc::new(MemoryStore::with_stats(initial));
        AppState::new(RankService::new(
            StatsStore::new(backend, Duration::from_secs(5)),
            Arc::new(RankLadder::standard()),
            NotificationHub::new(8),
        ))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_get_rank() {
        let state = setup_test_state(Stats {
            wins: 30,
            losses: 10,
            points: 470,
            points_started: 300,
            win_streak: 2,
            ..Default::default()
        });

        let (status, json) = get_json(build_router(state), "/api/rank").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rank"], "GreatBall2");
        assert_eq!(json["label"], "Great Ball 2");
        assert_eq!(json["tier"], "great_ball");
        assert_eq!(json["threshold"], 420);
        assert_eq!(json["next_rank"]["rank"], "GreatBall3");
        assert_eq!(json["next_rank"]["points_needed"], 20);
        // 16 + 19 = 35 >= 20
        assert_eq!(json["wins_to_next_rank"], 2);
        assert_eq!(json["next_hundred"], 500);
        assert_eq!(json["games_played"], 40);
        assert_eq!(json["points_since_start"], 170);
    }

    #[tokio::test]
    async fn test_get_rank_at_master() {
        let state = setup_test_state(Stats {
            points: 2000,
            ..Default::default()
        });

        let (status, json) = get_json(build_router(state), "/api/rank").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rank"], "MasterBall");
        assert!(json["next_rank"].is_null());
        assert_eq!(json["wins_to_next_rank"], 0);
    }

    #[tokio::test]
    async fn test_get_ladder() {
        let state = setup_test_state(Stats::default());

        let (status, json) = get_json(build_router(state), "/api/ladder").await;
        assert_eq!(status, StatusCode::OK);

        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 17);
        assert_eq!(entries[0]["threshold"], 0);
        assert_eq!(entries[0]["rank"], "Beginner1");
        assert_eq!(entries[16]["threshold"], 1450);
        assert_eq!(entries[16]["tier"], "master");
    }
}
