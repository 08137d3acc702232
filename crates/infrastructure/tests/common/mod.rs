#![allow(dead_code)]

use sqlx::{Connection, PgConnection};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

struct SharedPostgres {
    _container: ContainerAsync<Postgres>,
    admin_url: String,
    host: String,
    port: u16,
}

static POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

async fn shared_postgres() -> &'static SharedPostgres {
    POSTGRES
        .get_or_init(|| async {
            let container = Postgres::default()
                .with_tag("16-alpine")
                .start()
                .await
                .expect("Failed to start Postgres container");

            let host = container
                .get_host()
                .await
                .expect("Failed to get host")
                .to_string();
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("Failed to get port");

            let admin_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            for _ in 0..30 {
                if PgConnection::connect(&admin_url).await.is_ok() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }

            SharedPostgres {
                _container: container,
                admin_url,
                host,
                port,
            }
        })
        .await
}

/// A throwaway database inside the shared container
pub struct TestDatabase {
    pub url: String,
    pub name: String,
}

impl TestDatabase {
    pub async fn admin(&self) -> PgConnection {
        PgConnection::connect(&self.url)
            .await
            .expect("Failed to connect to test database")
    }

    /// Creates a login role that expires far in the future
    pub async fn create_user(&self, prefix: &str) -> String {
        let username = unique_name(prefix);
        let mut conn = self.admin().await;
        sqlx::query(&format!(
            "CREATE ROLE \"{}\" WITH LOGIN PASSWORD 'pw' VALID UNTIL '2099-01-01 00:00:00+0000'",
            username
        ))
        .execute(&mut conn)
        .await
        .expect("Failed to create role");
        username
    }

    pub async fn role_exists(&self, username: &str) -> bool {
        let mut conn = self.admin().await;
        sqlx::query_scalar("SELECT exists (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(username)
            .fetch_one(&mut conn)
            .await
            .expect("Failed to query pg_roles")
    }

    pub async fn valid_until(&self, username: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        let mut conn = self.admin().await;
        sqlx::query_scalar("SELECT rolvaliduntil FROM pg_roles WHERE rolname = $1")
            .bind(username)
            .fetch_one(&mut conn)
            .await
            .expect("Failed to query rolvaliduntil")
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn test_database() -> TestDatabase {
    let pg = shared_postgres().await;
    let name = format!("test_{}", Uuid::new_v4().simple());

    let mut conn = PgConnection::connect(&pg.admin_url)
        .await
        .expect("Failed to connect to postgres admin db");
    sqlx::query(&format!("CREATE DATABASE {}", name))
        .execute(&mut conn)
        .await
        .expect("Failed to create test database");

    TestDatabase {
        url: format!("postgres://postgres:postgres@{}:{}/{}", pg.host, pg.port, name),
        name,
    }
}
