use std::time::Duration;

use mongodb::{Client, Database, options::ClientOptions};
use regex::Regex;

use crate::config::Settings;
use crate::error::ApiError;

/// Maximum backoff between connection attempts.
const BACKOFF_CAP_MS: u64 = 10_000;

/// Handle to the MongoDB deployment, constructed once at startup and held in
/// the application state. The resolved database name is remembered so that
/// health checks and logs report what was actually picked.
#[derive(Clone)]
pub struct Mongo {
    pub client: Client,
    pub db: Database,
    pub db_name: String,
}

impl Mongo {
    pub async fn connect(settings: &Settings) -> Result<Mongo, ApiError> {
        let mut options = ClientOptions::parse(&settings.mongo_uri)
            .await
            .map_err(|e| ApiError::DatabaseUnavailable(e.to_string()))?;
        options.server_selection_timeout = Some(Duration::from_millis(settings.connect_timeout_ms));

        let client = Client::with_options(options)
            .map_err(|e| ApiError::DatabaseUnavailable(e.to_string()))?;

        let db_name = resolve_database_name(&ClientProbe(&client), settings).await?;
        let db = client.database(&db_name);
        Ok(Mongo { client, db, db_name })
    }

    /// Wrap an existing client without probing for the database. Used where
    /// resolution has already happened (or is not wanted, as in tests).
    pub fn with_database(client: Client, db_name: &str) -> Mongo {
        let db = client.database(db_name);
        Mongo {
            client,
            db,
            db_name: db_name.to_string(),
        }
    }
}

/// How the resolver questions the deployment. Production answers through the
/// live client; tests answer from a fixed table.
#[allow(async_fn_in_trait)]
pub trait DeploymentProbe {
    /// Ok when the named database answers a collection listing.
    async fn has_collections(&self, name: &str) -> Result<(), String>;

    /// Every database name the deployment reports.
    async fn database_names(&self) -> Result<Vec<String>, String>;
}

struct ClientProbe<'a>(&'a Client);

impl DeploymentProbe for ClientProbe<'_> {
    async fn has_collections(&self, name: &str) -> Result<(), String> {
        self.0
            .database(name)
            .list_collection_names(None)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn database_names(&self) -> Result<Vec<String>, String> {
        self.0
            .list_database_names(None, None)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Resolve the active database name: primary name first, then each
/// configured fallback in order, then the first non-system database on the
/// deployment. Each candidate is probed by listing its collections.
pub async fn resolve_database_name(
    probe: &impl DeploymentProbe,
    settings: &Settings,
) -> Result<String, ApiError> {
    let last_err = match probe.has_collections(&settings.mongo_db).await {
        Ok(()) => {
            tracing::info!(db = %settings.mongo_db, "connected to primary database");
            return Ok(settings.mongo_db.clone());
        }
        Err(e) => {
            tracing::warn!(db = %settings.mongo_db, error = %e, "primary database probe failed, trying fallbacks");
            e
        }
    };

    for name in &settings.fallback_db_names {
        match probe.has_collections(name).await {
            Ok(()) => {
                tracing::info!(db = %name, "connected to fallback database");
                return Ok(name.clone());
            }
            Err(e) => {
                tracing::warn!(db = %name, error = %e, "fallback database probe failed");
            }
        }
    }

    // Last resort: take the first database that is not a system one.
    match probe.database_names().await {
        Ok(names) => {
            tracing::info!(available = %names.join(", "), "listing available databases");
            for name in names {
                if matches!(name.as_str(), "admin" | "config" | "local") {
                    continue;
                }
                if probe.has_collections(&name).await.is_ok() {
                    tracing::info!(db = %name, "using first available database");
                    return Ok(name);
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list available databases");
        }
    }

    Err(ApiError::DatabaseUnavailable(last_err))
}

/// Outcome of the cold-start connection loop. Reported as data rather than
/// panicking so the caller decides policy (exit, degrade, ...).
pub struct InitReport {
    pub attempts: u32,
    pub outcome: Result<Mongo, ApiError>,
}

/// Backoff delay before a retry attempt. Saturating so an absurd configured
/// attempt count cannot overflow the doubling.
pub fn backoff_delay(base_ms: u64, attempt: u32) -> u64 {
    base_ms
        .saturating_mul(1u64 << attempt.min(13))
        .min(BACKOFF_CAP_MS)
}

/// Acquire a connection with exponential backoff and a per-attempt timeout.
pub async fn initialize_with_retry(settings: &Settings) -> InitReport {
    let max_attempts = settings.connect_attempts.max(1);
    let mut last_err = ApiError::DatabaseUnavailable("no attempts made".to_string());

    for attempt in 0..max_attempts {
        if attempt > 0 {
            let delay = backoff_delay(settings.connect_base_delay_ms, attempt);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let per_attempt = Duration::from_millis(settings.connect_timeout_ms);
        match tokio::time::timeout(per_attempt, Mongo::connect(settings)).await {
            Ok(Ok(mongo)) => {
                tracing::info!(attempts = attempt + 1, db = %mongo.db_name, "mongodb initialized");
                return InitReport {
                    attempts: attempt + 1,
                    outcome: Ok(mongo),
                };
            }
            Ok(Err(e)) => {
                tracing::warn!(attempt = attempt + 1, error = %e, "connection attempt failed");
                last_err = e;
            }
            Err(_) => {
                tracing::warn!(attempt = attempt + 1, "connection attempt timed out");
                last_err = ApiError::ConnectionTimeout(format!(
                    "connection attempt exceeded {}ms",
                    settings.connect_timeout_ms
                ));
            }
        }
    }

    InitReport {
        attempts: max_attempts,
        outcome: Err(last_err),
    }
}

/// Connection URI with credentials masked, for logs and the health endpoint.
pub fn masked_uri(uri: &str) -> String {
    // ":password@" -> ":***@"
    match Regex::new(r":[^:@]+@") {
        Ok(re) => re.replace(uri, ":***@").to_string(),
        Err(_) => uri.to_string(),
    }
}
