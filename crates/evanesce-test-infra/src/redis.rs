use crate::error::{Result, TestInfraError};
use redis::aio::MultiplexedConnection;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const REDIS_IMAGE: &str = "redis";
const REDIS_TAG: &str = "8.6.0";
const REDIS_PORT: u16 = 6379;

/// A standalone Redis server running in a container.
///
/// The container is stopped when this value is dropped.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn start() -> Result<Self> {
        let container = GenericImage::new(REDIS_IMAGE, REDIS_TAG)
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;
        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(REDIS_PORT).await?)
    }

    /// Connection URL for clients, e.g. `redis://127.0.0.1:32768`.
    pub async fn url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!("redis://{host}:{port}"))
    }

    /// Opens a new multiplexed connection and checks that the server answers
    /// PING before handing it out.
    pub async fn connection(&self) -> Result<MultiplexedConnection> {
        let url = self.url().await?;
        let connect_error = |source: redis::RedisError| TestInfraError::Connect {
            url: url.clone(),
            source,
        };

        let client = redis::Client::open(url.as_str()).map_err(connect_error)?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(connect_error)?;

        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(connect_error)?;
        if reply != "PONG" {
            return Err(TestInfraError::NotReady { url, reply });
        }
        Ok(conn)
    }
}
