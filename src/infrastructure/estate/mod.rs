//! Estate infrastructure: storage backends and the estate service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresEstateRepository;
pub use repository::InMemoryEstateRepository;
pub use service::{EstateList, EstateService, PageInfo};
