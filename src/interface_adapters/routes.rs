use crate::interface_adapters::handlers::{damage_data, delivery_data, ingest_snapshot};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

// Build the HTTP router: snapshot ingest plus the two read-only views.
pub fn app(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/", post(ingest_snapshot))
        .route("/damage_data", get(damage_data))
        .route("/delivery_data", get(delivery_data))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Clock;
    use crate::use_cases::{DerivedView, EngineSettings, SnapshotProcessor, engine_task};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio::sync::{mpsc, watch};
    use tower::ServiceExt;

    const TICK_MILLIS: u64 = 1_700_000_000_000;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_epoch_millis(&self) -> u64 {
            self.0
        }
    }

    fn build_test_app(body_limit_bytes: usize) -> (Router, watch::Receiver<Arc<DerivedView>>) {
        let (ingest_tx, ingest_rx) = mpsc::channel(16);
        let (view_tx, view_rx) = watch::channel(Arc::new(DerivedView::default()));
        tokio::spawn(engine_task(
            ingest_rx,
            view_tx.clone(),
            SnapshotProcessor::default(),
            FixedClock(TICK_MILLIS),
            EngineSettings {
                stale_after: Duration::from_secs(60),
                stale_check_interval: Duration::from_secs(30),
            },
        ));

        let state = Arc::new(AppState { ingest_tx, view_tx });
        (app(state, body_limit_bytes), view_rx)
    }

    fn post_json(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("expected request to build")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("expected request to build")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("expected response body");
        serde_json::from_slice(&body).expect("expected json body")
    }

    async fn wait_for_version(view_rx: &mut watch::Receiver<Arc<DerivedView>>, version: u64) {
        view_rx
            .wait_for(|view| view.version >= version)
            .await
            .expect("engine should keep publishing");
    }

    fn in_progress(health: i64, courier_item: &str) -> String {
        json!({
            "map": { "game_state": "DOTA_GAMERULES_STATE_GAME_IN_PROGRESS" },
            "player": {
                "team2": { "player0": { "team_name": "radiant", "kills": 2, "hero_damage": 1200 } }
            },
            "hero": {
                "team2": { "player0": { "name": "npc_dota_hero_axe", "id": 2, "level": 6, "health": health } }
            },
            "couriers": {
                "courier0": { "owner": 0, "alive": true, "items": { "item0": { "name": courier_item } } }
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn when_snapshot_is_posted_then_returns_200_ok() {
        let (app, _view_rx) = build_test_app(1024 * 1024);

        let response = app.oneshot(post_json(in_progress(700, "empty"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("expected response body");
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn when_nothing_was_ingested_then_views_are_empty() {
        let (app, _view_rx) = build_test_app(1024 * 1024);

        let damage = app.clone().oneshot(get("/damage_data")).await.unwrap();
        assert_eq!(damage.status(), StatusCode::OK);
        assert_eq!(json_body(damage).await, json!({}));

        let deliveries = app.oneshot(get("/delivery_data")).await.unwrap();
        assert_eq!(deliveries.status(), StatusCode::OK);
        assert_eq!(json_body(deliveries).await, json!([]));
    }

    #[tokio::test]
    async fn when_courier_picks_up_item_then_delivery_data_lists_it() {
        let (app, mut view_rx) = build_test_app(1024 * 1024);

        app.clone()
            .oneshot(post_json(in_progress(700, "empty")))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json(in_progress(700, "item_ward_observer")))
            .await
            .unwrap();
        wait_for_version(&mut view_rx, 2).await;

        let response = app.oneshot(get("/delivery_data")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([{
                "deliveryId": "courier0-1700000000000",
                "courierId": "courier0",
                "ownerPlayerKey": "player0",
                "heroName": "npc_dota_hero_axe",
                "items": [{ "name": "item_ward_observer" }],
                "startTime": TICK_MILLIS,
                "courierAlive": true
            }])
        );
    }

    #[tokio::test]
    async fn when_hero_loses_health_then_damage_data_reports_damage_received() {
        let (app, mut view_rx) = build_test_app(1024 * 1024);

        app.clone()
            .oneshot(post_json(in_progress(700, "empty")))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json(in_progress(555, "empty")))
            .await
            .unwrap();
        wait_for_version(&mut view_rx, 2).await;

        let response = app.oneshot(get("/damage_data")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["player0"]["heroName"], "npc_dota_hero_axe");
        assert_eq!(payload["player0"]["heroId"], 2);
        assert_eq!(payload["player0"]["level"], 6);
        assert_eq!(payload["player0"]["team"], "radiant");
        assert_eq!(payload["player0"]["kills"], 2);
        assert_eq!(payload["player0"]["damage_dealt"], 1200);
        assert_eq!(payload["player0"]["damage_received"], 145);
    }

    #[tokio::test]
    async fn when_sections_are_malformed_then_snapshot_is_still_accepted() {
        let (app, mut view_rx) = build_test_app(1024 * 1024);

        let response = app
            .oneshot(post_json(
                json!({ "map": { "game_state": 7 }, "couriers": 5, "hero": [] }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_for_version(&mut view_rx, 1).await;
    }

    #[tokio::test]
    async fn when_body_is_not_json_then_returns_400() {
        let (app, _view_rx) = build_test_app(1024 * 1024);

        let response = app
            .oneshot(post_json("{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn when_body_exceeds_limit_then_returns_413() {
        let (app, _view_rx) = build_test_app(64);

        let response = app
            .oneshot(post_json(in_progress(700, "item_ward_observer")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn when_engine_is_gone_then_returns_503_and_error_message() {
        let (ingest_tx, ingest_rx) = mpsc::channel(1);
        let (view_tx, _view_rx) = watch::channel(Arc::new(DerivedView::default()));
        drop(ingest_rx);
        let app = app(Arc::new(AppState { ingest_tx, view_tx }), 1024 * 1024);

        let response = app
            .oneshot(post_json(in_progress(700, "empty")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let payload = json_body(response).await;
        assert_eq!(payload["message"], "snapshot engine unavailable");
    }

    #[tokio::test]
    async fn when_root_is_called_with_get_then_returns_405() {
        let (app, _view_rx) = build_test_app(1024 * 1024);

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn when_route_does_not_exist_then_returns_404() {
        let (app, _view_rx) = build_test_app(1024 * 1024);

        let response = app.oneshot(get("/does-not-exist")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
