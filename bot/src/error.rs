use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("moderation error: {0}")]
    Moderation(#[from] hush_moderation::ModerationError),

    #[error("gateway error: {0}")]
    Gateway(#[from] hush_gateway::GatewayError),

    #[error("store error: {0}")]
    Store(#[from] hush_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event loop task failed: {0}")]
    Task(String),
}
