#[derive(Debug, thiserror::Error)]
pub enum WiremarkError {
    #[error("sheet '{requested}' not found. Available sheets: {}", available.join(", "))]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    #[error("column '{column}' not found after normalization. Available columns: {}", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
