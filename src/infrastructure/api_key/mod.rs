//! API Key infrastructure implementations
//!
//! This module provides implementations for API key generation,
//! storage and validation.

mod generator;
mod postgres_repository;
mod repository;
mod service;

pub use generator::{hash_key, ApiKeyGenerator, GeneratedApiKey};
pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKeyRequest, CreateApiKeyResult};
