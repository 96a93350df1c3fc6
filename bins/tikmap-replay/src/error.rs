#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Load(#[from] tikmap_engine::LoadError),

    #[error("output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("worker: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
