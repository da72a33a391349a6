//! Estate repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Estate, EstatePage, TransactionId};
use super::query::{EstateFilter, Pagination};
use crate::domain::DomainError;

/// Repository trait for estate storage
#[async_trait]
pub trait EstateRepository: Send + Sync + Debug {
    /// Fetch one page of matching rows, newest transaction first, plus the total match count
    async fn list(
        &self,
        filter: &EstateFilter,
        pagination: Pagination,
    ) -> Result<EstatePage, DomainError>;

    /// Get a row by its identifier
    async fn get(&self, id: &TransactionId) -> Result<Option<Estate>, DomainError>;

    /// Insert a new row; fails with `Conflict` when the identifier is taken
    async fn create(&self, estate: Estate) -> Result<Estate, DomainError>;

    /// Replace every column of an existing row, returning the affected row count
    async fn update(&self, estate: &Estate) -> Result<u64, DomainError>;

    /// Remove a row, returning the affected row count
    async fn delete(&self, id: &TransactionId) -> Result<u64, DomainError>;

    /// Cheap connectivity probe
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
