//! The HTTP surface: `GET /health` and `POST /quote`, wired the way
//! `driver::api`'s newer endpoints are — one module per route exposing a
//! `route(Router<State>) -> Router<State>` function.

pub mod error;
pub mod health;
pub mod quote;

use {
    crate::pipeline::QuotePipeline,
    std::sync::Arc,
    tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer},
};

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct State {
    pipeline: Arc<QuotePipeline>,
}

impl State {
    pub fn new(pipeline: Arc<QuotePipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &QuotePipeline {
        &self.pipeline
    }
}

pub fn router(state: State) -> axum::Router {
    let router = axum::Router::<State>::new();
    let router = health::route(router);
    let router = quote::route(router);

    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
