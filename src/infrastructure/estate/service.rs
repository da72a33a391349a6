//! Estate service
//!
//! Application-level operations over an [`EstateRepository`]: id handling,
//! record validation, pagination metadata and not-found detection.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::estate::{
    Estate, EstateDraft, EstateFilter, EstateRepository, Pagination, TransactionId,
};
use crate::domain::DomainError;

/// Pagination metadata returned with every list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: u64,
    pub page: i64,
    pub limit: i64,
    pub pages: u64,
}

/// One page of records plus its metadata
#[derive(Debug, Clone)]
pub struct EstateList {
    pub data: Vec<Estate>,
    pub pagination: PageInfo,
}

/// Estate service
#[derive(Debug)]
pub struct EstateService {
    repository: Arc<dyn EstateRepository>,
}

impl EstateService {
    pub fn new(repository: Arc<dyn EstateRepository>) -> Self {
        Self { repository }
    }

    /// Probe the backing store
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    /// List matching records, newest transaction first
    pub async fn list(
        &self,
        filter: &EstateFilter,
        pagination: Pagination,
    ) -> Result<EstateList, DomainError> {
        debug!(?filter, ?pagination, "Listing estate records");

        let page = self.repository.list(filter, pagination).await?;

        Ok(EstateList {
            pagination: PageInfo {
                total: page.total,
                page: pagination.page,
                limit: pagination.limit,
                pages: pagination.page_count(page.total),
            },
            data: page.rows,
        })
    }

    /// Get one record; the id must be UUID-shaped
    pub async fn get(&self, id: &str) -> Result<Estate, DomainError> {
        let id = parse_id(id)?;

        self.repository
            .get(&id)
            .await?
            .ok_or_else(|| not_found(&id))
    }

    /// Create a record, generating an id when the draft has none
    ///
    /// A supplied id must be UUID-shaped, like the ids the item routes accept.
    pub async fn create(&self, mut draft: EstateDraft) -> Result<Estate, DomainError> {
        let id = match draft.transaction_id.take() {
            Some(id) if !id.trim().is_empty() => parse_id(&id)?,
            _ => TransactionId::generate(),
        };

        let estate = draft.into_estate(id)?;

        info!("Creating estate record: transaction_id={}", estate.transaction_id);

        self.repository.create(estate).await
    }

    /// Replace every mutable column of an existing record
    ///
    /// The path id always wins over a `transaction_id` in the body.
    pub async fn update(&self, id: &str, mut draft: EstateDraft) -> Result<u64, DomainError> {
        let id = parse_id(id)?;
        draft.transaction_id = None;

        let estate = draft.into_estate(id.clone())?;

        info!("Updating estate record: transaction_id={}", id);

        match self.repository.update(&estate).await? {
            0 => Err(not_found(&id)),
            affected => Ok(affected),
        }
    }

    /// Delete a record, returning the affected row count
    pub async fn delete(&self, id: &str) -> Result<u64, DomainError> {
        let id = parse_id(id)?;

        info!("Deleting estate record: transaction_id={}", id);

        match self.repository.delete(&id).await? {
            0 => Err(not_found(&id)),
            affected => Ok(affected),
        }
    }
}

fn parse_id(id: &str) -> Result<TransactionId, DomainError> {
    TransactionId::parse(id).map_err(|e| DomainError::invalid_id(e.to_string()))
}

fn not_found(id: &TransactionId) -> DomainError {
    DomainError::not_found(format!("Record '{}' not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::estate::{MockEstateRepository, NumericInput};
    use crate::infrastructure::estate::InMemoryEstateRepository;

    fn create_service() -> EstateService {
        EstateService::new(Arc::new(InMemoryEstateRepository::new()))
    }

    fn draft(date: &str, city: &str, price: f64) -> EstateDraft {
        EstateDraft {
            transaction_date: Some(date.to_string()),
            city: Some(city.to_string()),
            district: Some("信義區".to_string()),
            building_type: Some("住宅".to_string()),
            price: Some(NumericInput::Number(price)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_id_and_round_trips() {
        let service = create_service();

        let created = service
            .create(draft("2024-05-01", "台北市", 15_000_000.0))
            .await
            .unwrap();

        assert!(TransactionId::parse(created.transaction_id.as_str()).is_ok());

        let fetched = service.get(created.transaction_id.as_str()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_keeps_client_id_and_rejects_duplicates() {
        let service = create_service();
        let mut input = draft("2024-05-01", "台北市", 1.0);
        input.transaction_id = Some("6F9619FF-8B86-D011-B42D-00C04FC964FF".to_string());

        let created = service.create(input.clone()).await.unwrap();
        assert_eq!(
            created.transaction_id.as_str(),
            "6F9619FF-8B86-D011-B42D-00C04FC964FF"
        );
        assert!(service.get(created.transaction_id.as_str()).await.is_ok());

        assert!(matches!(
            service.create(input).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_client_id_that_cannot_be_addressed() {
        let service = create_service();
        let mut input = draft("2024-05-01", "台北市", 1.0);
        input.transaction_id = Some("P-2024-0001".to_string());

        assert!(matches!(
            service.create(input).await,
            Err(DomainError::InvalidId { .. })
        ));

        let page = service
            .list(&EstateFilter::default(), Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_record() {
        let service = create_service();

        let result = service.create(EstateDraft::default()).await;

        match result {
            Err(DomainError::InvalidRecord { errors }) => assert_eq!(errors.len(), 5),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_id() {
        let service = create_service();

        assert!(matches!(
            service.get("not-a-uuid").await,
            Err(DomainError::InvalidId { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_id_fails_before_storage() {
        let repo = Arc::new(MockEstateRepository::new());
        repo.set_should_fail(true).await;
        let service = EstateService::new(repo);

        assert!(matches!(
            service.delete("12345").await,
            Err(DomainError::InvalidId { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let service = create_service();
        let id = TransactionId::generate();

        assert!(matches!(
            service.get(id.as_str()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_uses_path_id() {
        let service = create_service();
        let created = service
            .create(draft("2024-05-01", "台北市", 1.0))
            .await
            .unwrap();
        let id = created.transaction_id.as_str();

        let mut replacement = draft("2024-06-01", "新北市", 2.0);
        replacement.transaction_id = Some(TransactionId::generate().to_string());

        assert_eq!(service.update(id, replacement).await.unwrap(), 1);

        let fetched = service.get(id).await.unwrap();
        assert_eq!(fetched.city, "新北市");
        assert_eq!(fetched.price, 2.0);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_is_not_found() {
        let service = create_service();
        let id = TransactionId::generate();

        assert!(matches!(
            service.update(id.as_str(), draft("2024-05-01", "台北市", 1.0)).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(id.as_str()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = create_service();
        let created = service
            .create(draft("2024-05-01", "台北市", 1.0))
            .await
            .unwrap();
        let id = created.transaction_id.as_str();

        assert_eq!(service.delete(id).await.unwrap(), 1);
        assert!(matches!(
            service.get(id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_reports_page_metadata() {
        let service = create_service();

        for day in 1..=12 {
            service
                .create(draft(&format!("2024-01-{:02}", day), "台北市", 100.0))
                .await
                .unwrap();
        }
        service
            .create(draft("2024-02-01", "新北市", 100.0))
            .await
            .unwrap();

        let filter = EstateFilter::default().with_city("台北市");
        let list = service.list(&filter, Pagination::new(5, 2)).await.unwrap();

        assert_eq!(
            list.pagination,
            PageInfo {
                total: 12,
                page: 2,
                limit: 5,
                pages: 3
            }
        );

        let dates: Vec<String> = list
            .data
            .iter()
            .map(|e| e.transaction_date.to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-01-07", "2024-01-06", "2024-01-05", "2024-01-04", "2024-01-03"]
        );
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let repo = Arc::new(MockEstateRepository::new());
        repo.set_should_fail(true).await;
        let service = EstateService::new(repo);

        assert!(matches!(
            service
                .list(&EstateFilter::default(), Pagination::default())
                .await,
            Err(DomainError::Storage { .. })
        ));
    }
}
