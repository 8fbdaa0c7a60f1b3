use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::load_balancer::pool::BackendManager;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub pools: Vec<PoolStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PoolStatus {
    pub name: String,
    pub healthy: usize,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub pool: String,
    pub address: String,
    pub alive: bool,
}

pub async fn get_status(State(backends): State<Arc<BackendManager>>) -> Json<SystemStatus> {
    let pools: Vec<PoolStatus> = backends
        .pools()
        .iter()
        .map(|pool| PoolStatus {
            name: pool.name().to_string(),
            healthy: pool.healthy_count(),
            total: pool.backends().len(),
        })
        .collect();

    let status = if pools.iter().all(|p| p.healthy > 0) {
        "operational"
    } else {
        "degraded"
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: status.to_string(),
        pools,
    })
}

pub async fn get_backends(State(backends): State<Arc<BackendManager>>) -> Json<Vec<BackendStatus>> {
    let statuses = backends
        .all_backends()
        .into_iter()
        .map(|(pool, backend)| BackendStatus {
            pool: pool.name().to_string(),
            address: backend.to_string(),
            alive: backend.is_alive(),
        })
        .collect();

    Json(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::router;
    use crate::config::GatewayConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn manager() -> Arc<BackendManager> {
        Arc::new(BackendManager::new(&GatewayConfig::default().pools).unwrap())
    }

    async fn get(
        backends: Arc<BackendManager>,
        key: Option<&str>,
        auth: Option<&str>,
        uri: &str,
    ) -> (StatusCode, Vec<u8>) {
        let mut request = Request::get(uri);
        if let Some(auth) = auth {
            request = request.header("authorization", auth);
        }
        let response = router(backends, key.map(String::from))
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn status_counts_live_backends() {
        let backends = manager();
        backends.get("order").unwrap().backends()[1].set_alive(false);

        let (status, body) = get(backends, None, None, "/admin/status").await;
        assert_eq!(status, StatusCode::OK);

        let report: SystemStatus = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.status, "operational");
        assert_eq!(report.pools[1].name, "order");
        assert_eq!(report.pools[1].healthy, 1);
        assert_eq!(report.pools[1].total, 2);
    }

    #[tokio::test]
    async fn backends_lists_every_instance() {
        let backends = manager();
        backends.get("restaurant").unwrap().backends()[0].set_alive(false);

        let (_, body) = get(backends, None, None, "/admin/backends").await;
        let list: Vec<BackendStatus> = serde_json::from_slice(&body).unwrap();

        assert_eq!(list.len(), 4);
        assert_eq!(list[0].pool, "restaurant");
        assert_eq!(list[0].address, "http://localhost:5001");
        assert!(!list[0].alive);
        assert!(list[1].alive);
    }

    #[tokio::test]
    async fn key_is_enforced_when_configured() {
        let (status, _) = get(manager(), Some("s3cret"), None, "/admin/status").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get(manager(), Some("s3cret"), Some("Bearer wrong"), "/admin/status").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get(manager(), Some("s3cret"), Some("Bearer s3cret"), "/admin/status").await;
        assert_eq!(status, StatusCode::OK);
    }
}
