//! Estate record endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireApiKey, RequireWrite};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path, Query};
use crate::domain::estate::{Estate, EstateDraft, EstateFilter, Pagination};
use crate::infrastructure::estate::PageInfo;

/// Raw list query string; every value arrives as text
#[derive(Debug, Default, Deserialize)]
pub struct ListEstatesQuery {
    pub city: Option<String>,
    pub district: Option<String>,
    pub building_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl ListEstatesQuery {
    /// Parse into a filter set and page, rejecting malformed values.
    ///
    /// Empty values count as absent.
    pub fn parse(&self) -> Result<(EstateFilter, Pagination), ApiError> {
        let filter = EstateFilter {
            city: present(&self.city).map(str::to_string),
            district: present(&self.district).map(str::to_string),
            building_type: present(&self.building_type).map(str::to_string),
            min_price: parse_price("min_price", &self.min_price)?,
            max_price: parse_price("max_price", &self.max_price)?,
        };

        let pagination = Pagination::new(
            parse_positive("limit", &self.limit)?.unwrap_or(Pagination::DEFAULT_LIMIT),
            parse_positive("page", &self.page)?.unwrap_or(Pagination::DEFAULT_PAGE),
        );

        Ok((filter, pagination))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(name: &str, value: &Option<String>) -> Result<Option<f64>, ApiError> {
    present(value)
        .map(|v| {
            v.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| {
                    ApiError::bad_request(format!("{} must be a number", name)).with_param(name)
                })
        })
        .transpose()
}

fn parse_positive(name: &str, value: &Option<String>) -> Result<Option<i64>, ApiError> {
    present(value)
        .map(|v| {
            v.parse::<i64>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                ApiError::bad_request(format!("{} must be an integer of at least 1", name))
                    .with_param(name)
            })
        })
        .transpose()
}

#[derive(Debug, Serialize)]
pub struct ListEstatesResponse {
    pub data: Vec<Estate>,
    pub pagination: PageInfo,
}

/// Acknowledgement of a create
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub transaction_id: String,
}

/// Acknowledgement of an update or delete
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub message: &'static str,
    pub transaction_id: String,
    pub affected_rows: u64,
}

/// GET /estates
pub async fn list_estates(
    State(state): State<AppState>,
    RequireApiKey(api_key): RequireApiKey,
    Query(query): Query<ListEstatesQuery>,
) -> Result<Json<ListEstatesResponse>, ApiError> {
    debug!(key_id = %api_key.id(), "Listing estates");

    let (filter, pagination) = query.parse()?;
    let list = state.estate_service.list(&filter, pagination).await?;

    Ok(Json(ListEstatesResponse {
        data: list.data,
        pagination: list.pagination,
    }))
}

/// GET /estates/{id}
pub async fn get_estate(
    State(state): State<AppState>,
    RequireApiKey(_): RequireApiKey,
    Path(id): Path<String>,
) -> Result<Json<Estate>, ApiError> {
    debug!(transaction_id = %id, "Getting estate");

    let estate = state.estate_service.get(&id).await?;

    Ok(Json(estate))
}

/// POST /estates
pub async fn create_estate(
    State(state): State<AppState>,
    RequireWrite(api_key): RequireWrite,
    Json(draft): Json<EstateDraft>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(key_id = %api_key.id(), "Creating estate");

    let estate = state.estate_service.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Record created",
            transaction_id: estate.transaction_id.to_string(),
        }),
    ))
}

/// PUT /estates/{id}
pub async fn update_estate(
    State(state): State<AppState>,
    RequireWrite(api_key): RequireWrite,
    Path(id): Path<String>,
    Json(draft): Json<EstateDraft>,
) -> Result<Json<MutationResponse>, ApiError> {
    debug!(key_id = %api_key.id(), transaction_id = %id, "Updating estate");

    let affected_rows = state.estate_service.update(&id, draft).await?;

    Ok(Json(MutationResponse {
        message: "Record updated",
        transaction_id: id,
        affected_rows,
    }))
}

/// DELETE /estates/{id}
pub async fn delete_estate(
    State(state): State<AppState>,
    RequireWrite(api_key): RequireWrite,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    debug!(key_id = %api_key.id(), transaction_id = %id, "Deleting estate");

    let affected_rows = state.estate_service.delete(&id).await?;

    Ok(Json(MutationResponse {
        message: "Record deleted",
        transaction_id: id,
        affected_rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListEstatesQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/estates?{}", encoded).parse().unwrap();

        axum::extract::Query::<ListEstatesQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_defaults_when_nothing_supplied() {
        let (filter, pagination) = ListEstatesQuery::default().parse().unwrap();

        assert_eq!(filter, EstateFilter::default());
        assert_eq!(pagination, Pagination::new(10, 1));
    }

    #[test]
    fn test_parses_every_parameter() {
        let (filter, pagination) = query(&[
            ("city", "Taipei"),
            ("district", "Xinyi"),
            ("building_type", "Apartment"),
            ("min_price", "1000000"),
            ("max_price", "2500000.5"),
            ("limit", "5"),
            ("page", "2"),
        ])
        .parse()
        .unwrap();

        assert_eq!(
            filter,
            EstateFilter::default()
                .with_city("Taipei")
                .with_district("Xinyi")
                .with_building_type("Apartment")
                .with_min_price(1_000_000.0)
                .with_max_price(2_500_000.5)
        );
        assert_eq!(pagination, Pagination::new(5, 2));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let (filter, pagination) = query(&[("city", ""), ("min_price", ""), ("page", "")])
            .parse()
            .unwrap();

        assert_eq!(filter, EstateFilter::default());
        assert_eq!(pagination.page, 1);
    }

    #[test]
    fn test_zero_price_is_a_filter() {
        let (filter, _) = query(&[("min_price", "0")]).parse().unwrap();
        assert_eq!(filter.min_price, Some(0.0));
    }

    #[test]
    fn test_rejects_bad_paging() {
        for (name, value) in [("limit", "0"), ("limit", "-3"), ("page", "0"), ("page", "two")] {
            let err = query(&[(name, value)]).parse().unwrap_err();

            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{name}={value}");
            assert_eq!(err.response.error.param.as_deref(), Some(name));
        }
    }

    #[test]
    fn test_rejects_non_numeric_price() {
        let err = query(&[("max_price", "cheap")]).parse().unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("max_price"));
    }
}
