//! Parameterized list query construction
//!
//! Filter values never enter the SQL text. Each supplied filter gets the next
//! positional placeholder (`$1`, `$2`, ...) and its value is pushed to
//! [`EstateQuery::params`] at the same moment, so `params[i]` is always the
//! value of placeholder `$(i + 1)`.

/// Table holding the transaction rows
pub const ESTATE_TABLE: &str = "real_estate_data";

/// Column list selected for every estate read
pub const ESTATE_COLUMNS: &str = "transaction_id, transaction_date, city, district, address, \
     building_type, price, building_area, unit_price, floor_level, building_age, total_floors, \
     land_area, main_use, construction_materials, transaction_type";

/// Optional filters accepted by the list operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstateFilter {
    pub city: Option<String>,
    pub district: Option<String>,
    pub building_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl EstateFilter {
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    pub fn with_building_type(mut self, building_type: impl Into<String>) -> Self {
        self.building_type = Some(building_type.into());
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }
}

/// Page selection for list queries
///
/// Values are taken as given. A zero or negative `page`/`limit` yields a
/// meaningless offset; callers are expected to reject those first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const DEFAULT_PAGE: i64 = 1;

    pub fn new(limit: i64, page: i64) -> Self {
        Self { limit, page }
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` rows: `ceil(total / limit)`
    pub fn page_count(&self, total: u64) -> u64 {
        if self.limit <= 0 {
            return 0;
        }

        total.div_ceil(self.limit as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_PAGE)
    }
}

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(f64),
    Int(i64),
}

/// Data and count statements sharing one WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct EstateQuery {
    /// `SELECT <columns> ... ORDER BY ... LIMIT $n OFFSET $n+1`
    pub select_sql: String,
    /// `SELECT COUNT(*) ...` with the same WHERE clause
    pub count_sql: String,
    /// Filter values followed by limit and offset
    pub params: Vec<SqlParam>,
    filter_param_count: usize,
}

impl EstateQuery {
    /// Build the statements for a filter set and page.
    ///
    /// Conditions are emitted in the fixed order city, district, building_type,
    /// min_price, max_price and joined with `AND`. Without filters no WHERE
    /// clause is emitted at all.
    pub fn build(filter: &EstateFilter, pagination: Pagination) -> Self {
        let mut builder = PlaceholderBuilder::default();
        let mut conditions = Vec::new();

        if let Some(city) = &filter.city {
            conditions.push(format!("city = {}", builder.push(SqlParam::Text(city.clone()))));
        }

        if let Some(district) = &filter.district {
            conditions.push(format!(
                "district = {}",
                builder.push(SqlParam::Text(district.clone()))
            ));
        }

        if let Some(building_type) = &filter.building_type {
            conditions.push(format!(
                "building_type = {}",
                builder.push(SqlParam::Text(building_type.clone()))
            ));
        }

        if let Some(min_price) = filter.min_price {
            conditions.push(format!("price >= {}", builder.push(SqlParam::Float(min_price))));
        }

        if let Some(max_price) = filter.max_price {
            conditions.push(format!("price <= {}", builder.push(SqlParam::Float(max_price))));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let filter_param_count = builder.params.len();

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", ESTATE_TABLE, where_clause);

        let limit_placeholder = builder.push(SqlParam::Int(pagination.limit));
        let offset_placeholder = builder.push(SqlParam::Int(pagination.offset()));

        let select_sql = format!(
            "SELECT {} FROM {}{} ORDER BY transaction_date DESC, transaction_id LIMIT {} OFFSET {}",
            ESTATE_COLUMNS, ESTATE_TABLE, where_clause, limit_placeholder, offset_placeholder
        );

        Self {
            select_sql,
            count_sql,
            params: builder.params,
            filter_param_count,
        }
    }

    /// Parameters of the count statement (the filter values only)
    pub fn count_params(&self) -> &[SqlParam] {
        &self.params[..self.filter_param_count]
    }
}

#[derive(Default)]
struct PlaceholderBuilder {
    params: Vec<SqlParam>,
}

impl PlaceholderBuilder {
    fn push(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_part(sql: &str) -> Option<&str> {
        let start = sql.find(" WHERE ")? + " WHERE ".len();
        let end = sql.find(" ORDER BY").unwrap_or(sql.len());
        Some(&sql[start..end])
    }

    #[test]
    fn test_no_filters_omits_where_clause() {
        let query = EstateQuery::build(&EstateFilter::default(), Pagination::default());

        assert!(!query.select_sql.contains("WHERE"));
        assert!(!query.count_sql.contains("WHERE"));
        assert_eq!(query.count_sql, "SELECT COUNT(*) FROM real_estate_data");
        assert!(query.select_sql.ends_with("LIMIT $1 OFFSET $2"));
        assert_eq!(query.params, vec![SqlParam::Int(10), SqlParam::Int(0)]);
        assert!(query.count_params().is_empty());
    }

    #[test]
    fn test_all_filters_in_fixed_order() {
        let filter = EstateFilter::default()
            .with_max_price(2_000_000.0)
            .with_min_price(1_000_000.0)
            .with_building_type("住宅")
            .with_district("信義區")
            .with_city("台北市");

        let query = EstateQuery::build(&filter, Pagination::new(5, 2));

        assert_eq!(
            where_part(&query.select_sql),
            Some("city = $1 AND district = $2 AND building_type = $3 AND price >= $4 AND price <= $5")
        );
        assert!(query.select_sql.ends_with("LIMIT $6 OFFSET $7"));
        assert_eq!(
            query.params,
            vec![
                SqlParam::Text("台北市".to_string()),
                SqlParam::Text("信義區".to_string()),
                SqlParam::Text("住宅".to_string()),
                SqlParam::Float(1_000_000.0),
                SqlParam::Float(2_000_000.0),
                SqlParam::Int(5),
                SqlParam::Int(5),
            ]
        );
    }

    #[test]
    fn test_every_filter_subset_numbers_placeholders_consecutively() {
        for mask in 0u8..32 {
            let mut filter = EstateFilter::default();
            let mut expected = Vec::new();

            if mask & 1 != 0 {
                filter.city = Some("c".to_string());
                expected.push("city = ");
            }
            if mask & 2 != 0 {
                filter.district = Some("d".to_string());
                expected.push("district = ");
            }
            if mask & 4 != 0 {
                filter.building_type = Some("b".to_string());
                expected.push("building_type = ");
            }
            if mask & 8 != 0 {
                filter.min_price = Some(1.0);
                expected.push("price >= ");
            }
            if mask & 16 != 0 {
                filter.max_price = Some(2.0);
                expected.push("price <= ");
            }

            let query = EstateQuery::build(&filter, Pagination::default());
            let active = expected.len();

            assert_eq!(query.params.len(), active + 2, "mask {mask}");
            assert_eq!(query.count_params().len(), active, "mask {mask}");

            match where_part(&query.select_sql) {
                None => assert_eq!(active, 0, "mask {mask}"),
                Some(clause) => {
                    let conditions: Vec<&str> = clause.split(" AND ").collect();
                    assert_eq!(conditions.len(), active, "mask {mask}");

                    for (i, (condition, prefix)) in conditions.iter().zip(&expected).enumerate() {
                        assert_eq!(*condition, format!("{}${}", prefix, i + 1), "mask {mask}");
                    }
                }
            }

            assert_eq!(
                where_part(&query.count_sql),
                where_part(&query.select_sql).map(|w| w.trim_end())
            );
            assert!(query
                .select_sql
                .ends_with(&format!("LIMIT ${} OFFSET ${}", active + 1, active + 2)));
        }
    }

    #[test]
    fn test_filter_values_are_not_interpolated() {
        let filter = EstateFilter::default().with_city("x'; DROP TABLE real_estate_data; --");
        let query = EstateQuery::build(&filter, Pagination::default());

        assert!(!query.select_sql.contains("DROP"));
        assert!(!query.count_sql.contains("DROP"));
        assert_eq!(
            query.params[0],
            SqlParam::Text("x'; DROP TABLE real_estate_data; --".to_string())
        );
    }

    #[test]
    fn test_offset_arithmetic() {
        assert_eq!(Pagination::new(10, 1).offset(), 0);
        assert_eq!(Pagination::new(5, 2).offset(), 5);
        assert_eq!(Pagination::new(25, 4).offset(), 75);

        for page in 1..20 {
            for limit in 1..20 {
                assert_eq!(Pagination::new(limit, page).offset(), (page - 1) * limit);
            }
        }
    }

    #[test]
    fn test_unchecked_page_gives_negative_offset() {
        assert_eq!(Pagination::new(10, 0).offset(), -10);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        assert_eq!(Pagination::new(5, 1).page_count(12), 3);
        assert_eq!(Pagination::new(5, 1).page_count(10), 2);
        assert_eq!(Pagination::new(10, 1).page_count(0), 0);
        assert_eq!(Pagination::new(10, 1).page_count(1), 1);
        assert_eq!(Pagination::new(0, 1).page_count(7), 0);
    }
}
