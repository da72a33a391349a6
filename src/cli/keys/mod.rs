//! create-key command - issues an API key without going through HTTP

use std::sync::Arc;

use anyhow::bail;
use clap::Args;

use crate::config::DatabaseBackend;
use crate::domain::api_key::parse_permissions;
use crate::infrastructure::api_key::{
    ApiKeyGenerator, ApiKeyService, CreateApiKeyRequest, PostgresApiKeyRepository,
};
use crate::infrastructure::storage::connect_pool;

#[derive(Debug, Args)]
pub struct CreateKeyArgs {
    /// Owner of the key
    #[arg(long)]
    pub user_id: String,

    /// Permission to grant (read, write, admin); repeatable
    #[arg(long = "permission", default_values_t = vec!["read".to_string()])]
    pub permissions: Vec<String>,

    /// Lifetime in days; the key never expires when omitted
    #[arg(long)]
    pub expires_in_days: Option<i64>,
}

pub async fn run(args: CreateKeyArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    if config.database.backend == DatabaseBackend::Memory {
        bail!("create-key needs the postgres backend; in-memory keys vanish with the process");
    }

    let permissions = parse_permissions(&args.permissions)?;

    let pool = connect_pool(&config.database).await?;
    let service = ApiKeyService::new(Arc::new(PostgresApiKeyRepository::new(pool.clone())))
        .with_generator(ApiKeyGenerator::new(&config.auth.key_prefix));

    let created = service
        .create(CreateApiKeyRequest {
            user_id: args.user_id,
            permissions,
            expires_in_days: args.expires_in_days,
        })
        .await?;

    println!("API key id:  {}", created.api_key.id());
    println!("Permissions: {}", join_permissions(&created.api_key));
    match created.api_key.expires_at() {
        Some(expires_at) => println!("Expires at:  {}", expires_at.to_rfc3339()),
        None => println!("Expires at:  never"),
    }
    println!();
    println!("{}", created.secret);
    println!();
    println!("Store this key now; it cannot be shown again.");

    pool.close().await;

    Ok(())
}

fn join_permissions(api_key: &crate::domain::ApiKey) -> String {
    api_key
        .permissions()
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
