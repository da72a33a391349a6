//! In-memory estate repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::estate::{
    Estate, EstateFilter, EstatePage, EstateRepository, Pagination, TransactionId,
};
use crate::domain::DomainError;

/// In-memory implementation of EstateRepository
///
/// Applies the same filter, ordering and paging rules as the SQL statements
/// built by [`crate::domain::EstateQuery`].
#[derive(Debug, Default)]
pub struct InMemoryEstateRepository {
    rows: Arc<RwLock<HashMap<TransactionId, Estate>>>,
}

impl InMemoryEstateRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(filter: &EstateFilter, estate: &Estate) -> bool {
    filter.city.as_ref().is_none_or(|c| *c == estate.city)
        && filter.district.as_ref().is_none_or(|d| *d == estate.district)
        && filter
            .building_type
            .as_ref()
            .is_none_or(|b| *b == estate.building_type)
        && filter.min_price.is_none_or(|min| estate.price >= min)
        && filter.max_price.is_none_or(|max| estate.price <= max)
}

#[async_trait]
impl EstateRepository for InMemoryEstateRepository {
    async fn list(
        &self,
        filter: &EstateFilter,
        pagination: Pagination,
    ) -> Result<EstatePage, DomainError> {
        let rows = self.rows.read().await;

        let mut matching: Vec<&Estate> = rows
            .values()
            .filter(|e| matches_filter(filter, e))
            .collect();
        matching.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then_with(|| a.transaction_id.as_str().cmp(b.transaction_id.as_str()))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(pagination.offset().max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit.max(0)).unwrap_or(usize::MAX);

        Ok(EstatePage {
            rows: matching.into_iter().skip(offset).take(limit).cloned().collect(),
            total,
        })
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Estate>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn create(&self, estate: Estate) -> Result<Estate, DomainError> {
        let mut rows = self.rows.write().await;

        if rows.contains_key(&estate.transaction_id) {
            return Err(DomainError::conflict(format!(
                "Record with transaction_id '{}' already exists",
                estate.transaction_id
            )));
        }

        rows.insert(estate.transaction_id.clone(), estate.clone());

        Ok(estate)
    }

    async fn update(&self, estate: &Estate) -> Result<u64, DomainError> {
        let mut rows = self.rows.write().await;

        match rows.get_mut(&estate.transaction_id) {
            Some(existing) => {
                *existing = estate.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &TransactionId) -> Result<u64, DomainError> {
        let mut rows = self.rows.write().await;
        Ok(u64::from(rows.remove(id).is_some()))
    }
}
