use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("store error: {0}")]
    Store(#[from] hush_store::StoreError),

    #[error("gateway error: {0}")]
    Gateway(#[from] hush_gateway::GatewayError),

    #[error(transparent)]
    Params(#[from] hush_types::HushError),
}
