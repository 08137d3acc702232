//! PostgreSQL Database Plugin
//!
//! Implementation of `DatabaseConnection` that manages the validity and the
//! lifetime of leased PostgreSQL roles.
//!
//! # Features
//!
//! - Role templates with `{{name}}` / `{{expiration}}` placeholders
//! - Multi-statement templates executed in a single transaction
//! - Default renewal (`ALTER ROLE ... VALID UNTIL`) when a role has no template
//! - Default revocation that strips privileges before dropping the role
//!
//! # Security
//!
//! - Identifiers interpolated into default statements are always quoted
//! - The connection URL is never logged

use async_trait::async_trait;
use dbcreds_domain::credentials::{
    ConnectionConfig, ConnectionFactory, CredentialError, DatabaseConnection,
    EXPIRATION_PLACEHOLDER, MutationKind, NAME_PLACEHOLDER, Statements, render_template,
    split_statements,
};
use dbcreds_shared::config::DatabasePoolConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{DatabaseError, Result};

/// Plugin name stored in connection configurations
pub const PLUGIN_NAME: &str = "postgresql";

/// Renewal applied when the role has no renew template
pub const DEFAULT_RENEW_STATEMENT: &str = r#"ALTER ROLE "{{name}}" VALID UNTIL '{{expiration}}';"#;

/// Quotes an identifier, doubling embedded quotes
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Privilege revocations run before the role is dropped
///
/// `role` must already be quoted. Every statement is best-effort.
pub fn privilege_revocations(role: &str, schemas: &[String], database: &str) -> Vec<String> {
    let mut statements = Vec::with_capacity(schemas.len() * 2 + 4);

    for schema in schemas {
        let schema = quote_identifier(schema);
        statements.push(format!(
            "REVOKE ALL PRIVILEGES ON ALL TABLES IN SCHEMA {} FROM {}",
            schema, role
        ));
        statements.push(format!("REVOKE USAGE ON SCHEMA {} FROM {}", schema, role));
    }

    statements.push(format!(
        "REVOKE ALL PRIVILEGES ON ALL TABLES IN SCHEMA public FROM {}",
        role
    ));
    statements.push(format!(
        "REVOKE ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA public FROM {}",
        role
    ));
    statements.push(format!("REVOKE USAGE ON SCHEMA public FROM {}", role));
    statements.push(format!(
        "REVOKE CONNECT ON DATABASE {} FROM {}",
        quote_identifier(database),
        role
    ));

    statements
}

fn supports_plugin(plugin: &str) -> bool {
    plugin.eq_ignore_ascii_case(PLUGIN_NAME) || plugin.eq_ignore_ascii_case("postgres")
}

/// Opens pooled PostgreSQL connections
///
/// # Example
///
/// ```ignore
/// let factory = PostgresConnectionFactory::new(config.database.clone());
/// let registry = ConnectionRegistry::new(config_store, Arc::new(factory));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostgresConnectionFactory {
    pool_config: DatabasePoolConfig,
}

impl PostgresConnectionFactory {
    pub fn new(pool_config: DatabasePoolConfig) -> Self {
        Self { pool_config }
    }
}

#[async_trait]
impl ConnectionFactory for PostgresConnectionFactory {
    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> std::result::Result<Arc<dyn DatabaseConnection>, CredentialError> {
        if !supports_plugin(&config.plugin) {
            return Err(DatabaseError::UnsupportedPlugin(config.plugin.clone())
                .into_connection(&config.name));
        }

        let max_connections = config
            .max_open_connections
            .unwrap_or(self.pool_config.max_connections);
        let timeout = config
            .connect_timeout
            .unwrap_or_else(|| self.pool_config.connect_timeout());

        // connect() opens one connection up front, so bad URLs fail here.
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(&config.connection_url)
            .await
            .map_err(|e| DatabaseError::from(e).into_connection(&config.name))?;

        debug!(
            connection = %config.name,
            max_connections,
            "PostgreSQL pool ready"
        );

        Ok(Arc::new(PostgresDatabase::new(&config.name, pool)))
    }
}

/// PostgreSQL-backed database connection
pub struct PostgresDatabase {
    connection: String,
    pool: PgPool,
}

impl PostgresDatabase {
    /// Wraps an existing pool
    pub fn new(connection: impl Into<String>, pool: PgPool) -> Self {
        Self {
            connection: connection.into(),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Renders `template` and runs every statement in one transaction
    async fn execute_template(
        &self,
        template: &str,
        username: &str,
        expiration: Option<&str>,
    ) -> Result<()> {
        let mut values = vec![(NAME_PLACEHOLDER, username)];
        if let Some(expiration) = expiration {
            values.push((EXPIRATION_PLACEHOLDER, expiration));
        }
        let rendered = render_template(template, &values);

        let mut tx = self.pool.begin().await?;
        for statement in split_statements(&rendered) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn renew(&self, statements: &Statements, username: &str, expiration: &str) -> Result<()> {
        let template = if statements.has_renew() {
            statements.renew.as_str()
        } else {
            DEFAULT_RENEW_STATEMENT
        };

        self.execute_template(template, username, Some(expiration))
            .await
    }

    async fn revoke(&self, statements: &Statements, username: &str) -> Result<()> {
        if statements.has_revoke() {
            return self
                .execute_template(&statements.revoke, username, None)
                .await;
        }

        self.default_revoke(username).await
    }

    async fn default_revoke(&self, username: &str) -> Result<()> {
        let exists: bool = sqlx::query_scalar(
            "SELECT exists (SELECT rolname FROM pg_roles WHERE rolname = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(DatabaseError::UserNotFound {
                username: username.to_string(),
            });
        }

        let schemas: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT table_schema FROM information_schema.role_column_grants WHERE grantee = $1",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        let database: String = sqlx::query_scalar("SELECT current_database()")
            .fetch_one(&self.pool)
            .await?;

        let role = quote_identifier(username);

        // Privileges may already be gone; the drop below is what must succeed.
        for statement in privilege_revocations(&role, &schemas, &database) {
            if let Err(e) = sqlx::query(&statement).execute(&self.pool).await {
                warn!(
                    connection = %self.connection,
                    username = %username,
                    error = %e,
                    "Privilege revocation failed, continuing"
                );
            }
        }

        let drop_owned = format!("DROP OWNED BY {}", role);
        let drop_role = format!("DROP ROLE IF EXISTS {}", role);

        let mut tx = self.pool.begin().await?;
        sqlx::query(&drop_owned).execute(&mut *tx).await?;
        sqlx::query(&drop_role).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl DatabaseConnection for PostgresDatabase {
    fn plugin_name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn renew_user(
        &self,
        statements: &Statements,
        username: &str,
        expiration: &str,
    ) -> std::result::Result<(), CredentialError> {
        self.renew(statements, username, expiration)
            .await
            .map_err(|e| e.into_mutation(MutationKind::Renew, username))
    }

    async fn revoke_user(
        &self,
        statements: &Statements,
        username: &str,
    ) -> std::result::Result<(), CredentialError> {
        self.revoke(statements, username)
            .await
            .map_err(|e| e.into_mutation(MutationKind::Revoke, username))?;

        info!(connection = %self.connection, username = %username, "Dropped PostgreSQL role");
        Ok(())
    }

    async fn close(&self) -> std::result::Result<(), CredentialError> {
        self.pool.close().await;
        debug!(connection = %self.connection, "PostgreSQL pool closed");
        Ok(())
    }
}
