use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read table '{table}': {message}")]
    SourceRead { table: String, message: String },

    #[error("failed to render export document: {0}")]
    Render(#[from] csv::Error),

    #[error("failed to write export object '{key}': {message}")]
    ObjectWrite { key: String, message: String },
}
