#[derive(Debug, thiserror::Error)]
pub enum PolicyPackError {
    #[error("unknown policy pack: {0}")]
    UnknownPack(String),
    #[error("failed to persist policy pack intent: {0}")]
    Storage(#[from] edon_store::StoreError),
}
