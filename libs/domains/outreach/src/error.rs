use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OutreachError {
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type OutreachResult<T> = Result<T, OutreachError>;

impl From<sea_orm::DbErr> for OutreachError {
    fn from(err: sea_orm::DbErr) -> Self {
        OutreachError::Database(err.to_string())
    }
}
