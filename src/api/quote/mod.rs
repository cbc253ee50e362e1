use crate::{api::error::ApiError, domain::quote::QuoteRequest};

pub mod dto;

pub(super) fn route(router: axum::Router<super::State>) -> axum::Router<super::State> {
    router.route("/quote", axum::routing::post(quote))
}

async fn quote(
    state: axum::extract::State<super::State>,
    body: axum::extract::Json<dto::QuoteRequestDto>,
) -> Result<axum::response::Json<dto::QuoteResponseDto>, ApiError> {
    let request: QuoteRequest = body.0.try_into().map_err(ApiError::from)?;

    tracing::info!(
        src_chain = request.input_token.chain_id,
        dst_chain = request.output_token.chain_id,
        "handling quote request"
    );

    let result = state.pipeline().quote(request).await?;

    Ok(axum::response::Json(dto::QuoteResponseDto {
        data: dto::CompactDto::from(&result.compact),
        context: dto::ContextResponseDto::new(&result.amounts, result.witness_hash),
    }))
}
