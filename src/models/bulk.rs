// src/models/bulk.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Resposta padrão das operações em lote.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkResponse {
    #[schema(example = "3 items affected")]
    pub message: String,
    pub affected: u64,
}

impl BulkResponse {
    pub fn affected(affected: u64) -> Self {
        Self {
            message: format!("{affected} items affected"),
            affected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_reports_count() {
        assert_eq!(BulkResponse::affected(3).message, "3 items affected");
        assert_eq!(BulkResponse::affected(0).message, "0 items affected");
    }
}
