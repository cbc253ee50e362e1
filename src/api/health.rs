use serde::Serialize;

pub(super) fn route(router: axum::Router<super::State>) -> axum::Router<super::State> {
    router.route("/health", axum::routing::get(health))
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    timestamp: u64,
}

async fn health() -> axum::response::Json<Health> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    axum::response::Json(Health {
        status: "ok",
        timestamp,
    })
}
