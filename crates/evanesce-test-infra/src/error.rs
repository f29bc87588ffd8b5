use thiserror::Error;

/// Failures while bringing up the Redis container for the integration suite.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("redis container failed: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: redis::RedisError,
    },

    /// The server accepted the connection but did not answer PING.
    #[error("redis at {url} is not ready, PING answered {reply:?}")]
    NotReady { url: String, reply: String },
}

pub type Result<T, E = TestInfraError> = std::result::Result<T, E>;
