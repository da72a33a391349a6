//! PostgreSQL estate repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, PgPool, Row};

use crate::domain::estate::{
    Estate, EstateFilter, EstatePage, EstateQuery, EstateRepository, Pagination, SqlParam,
    TransactionId, ESTATE_COLUMNS,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of EstateRepository over `real_estate_data`
#[derive(Debug, Clone)]
pub struct PostgresEstateRepository {
    pool: PgPool,
}

impl PostgresEstateRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Bind positional parameters in placeholder order
fn bind_params(params: &[SqlParam]) -> Result<PgArguments, DomainError> {
    let mut args = PgArguments::default();

    for param in params {
        let added = match param {
            SqlParam::Text(value) => args.add(value.clone()),
            SqlParam::Float(value) => args.add(*value),
            SqlParam::Int(value) => args.add(*value),
        };
        added.map_err(|e| DomainError::storage(format!("Failed to bind query parameter: {}", e)))?;
    }

    Ok(args)
}

#[async_trait]
impl EstateRepository for PostgresEstateRepository {
    async fn list(
        &self,
        filter: &EstateFilter,
        pagination: Pagination,
    ) -> Result<EstatePage, DomainError> {
        let query = EstateQuery::build(filter, pagination);

        let total: i64 =
            sqlx::query_scalar_with(&query.count_sql, bind_params(query.count_params())?)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to count records: {}", e)))?;

        let rows = sqlx::query_with(&query.select_sql, bind_params(&query.params)?)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list records: {}", e)))?;

        Ok(EstatePage {
            rows: rows.iter().map(row_to_estate).collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Estate>, DomainError> {
        let sql = format!(
            "SELECT {} FROM real_estate_data WHERE transaction_id = $1",
            ESTATE_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get record: {}", e)))?;

        row.as_ref().map(row_to_estate).transpose()
    }

    async fn create(&self, estate: Estate) -> Result<Estate, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO real_estate_data (transaction_id, transaction_date, city, district, address,
                building_type, price, building_area, unit_price, floor_level, building_age,
                total_floors, land_area, main_use, construction_materials, transaction_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(estate.transaction_id.as_str())
        .bind(estate.transaction_date)
        .bind(&estate.city)
        .bind(&estate.district)
        .bind(&estate.address)
        .bind(&estate.building_type)
        .bind(estate.price)
        .bind(estate.building_area)
        .bind(estate.unit_price)
        .bind(estate.floor_level)
        .bind(estate.building_age)
        .bind(estate.total_floors)
        .bind(estate.land_area)
        .bind(&estate.main_use)
        .bind(&estate.construction_materials)
        .bind(&estate.transaction_type)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(
                format!("Record with transaction_id '{}' already exists", estate.transaction_id),
            ),
            _ => DomainError::storage(format!("Failed to create record: {}", e)),
        })?;

        Ok(estate)
    }

    async fn update(&self, estate: &Estate) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE real_estate_data
            SET transaction_date = $2, city = $3, district = $4, address = $5,
                building_type = $6, price = $7, building_area = $8, unit_price = $9,
                floor_level = $10, building_age = $11, total_floors = $12, land_area = $13,
                main_use = $14, construction_materials = $15, transaction_type = $16
            WHERE transaction_id = $1
            "#,
        )
        .bind(estate.transaction_id.as_str())
        .bind(estate.transaction_date)
        .bind(&estate.city)
        .bind(&estate.district)
        .bind(&estate.address)
        .bind(&estate.building_type)
        .bind(estate.price)
        .bind(estate.building_area)
        .bind(estate.unit_price)
        .bind(estate.floor_level)
        .bind(estate.building_age)
        .bind(estate.total_floors)
        .bind(estate.land_area)
        .bind(&estate.main_use)
        .bind(&estate.construction_materials)
        .bind(&estate.transaction_type)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update record: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &TransactionId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM real_estate_data WHERE transaction_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete record: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database is unreachable: {}", e)))?;

        Ok(())
    }
}

fn row_to_estate(row: &PgRow) -> Result<Estate, DomainError> {
    let map_err = |e: sqlx::Error| DomainError::storage(format!("Invalid estate row: {}", e));

    let transaction_id: String = row.try_get("transaction_id").map_err(map_err)?;
    let transaction_date: NaiveDate = row.try_get("transaction_date").map_err(map_err)?;

    Ok(Estate {
        transaction_id: TransactionId::from_stored(transaction_id)
            .map_err(|e| DomainError::storage(format!("Invalid estate row: {}", e)))?,
        transaction_date,
        city: row.try_get("city").map_err(map_err)?,
        district: row.try_get("district").map_err(map_err)?,
        address: row.try_get("address").map_err(map_err)?,
        building_type: row.try_get("building_type").map_err(map_err)?,
        price: row.try_get("price").map_err(map_err)?,
        building_area: row.try_get("building_area").map_err(map_err)?,
        unit_price: row.try_get("unit_price").map_err(map_err)?,
        floor_level: row.try_get("floor_level").map_err(map_err)?,
        building_age: row.try_get("building_age").map_err(map_err)?,
        total_floors: row.try_get("total_floors").map_err(map_err)?,
        land_area: row.try_get("land_area").map_err(map_err)?,
        main_use: row.try_get("main_use").map_err(map_err)?,
        construction_materials: row.try_get("construction_materials").map_err(map_err)?,
        transaction_type: row.try_get("transaction_type").map_err(map_err)?,
    })
}
