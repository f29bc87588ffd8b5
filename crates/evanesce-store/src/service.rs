use crate::settings::StoreSettings;
use async_trait::async_trait;
use evanesce_core::error::StorageError;
use evanesce_core::{
    Clock, CreatePasteRequest, PasteError, PasteId, PasteStore, Repository, SystemClock,
    ViewedPaste,
};
use evanesce_generator::Generator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// A concrete implementation of the [`PasteStore`] trait.
///
/// This service wraps a [`Repository`] and a [`Generator`] to handle:
/// - request validation
/// - id generation, with a bounded retry when a generated id is taken
/// - bounding every backing-engine call by a timeout
///
/// View accounting is left entirely to [`Repository::consume`], which is
/// atomic in every backend.
#[derive(Debug, Clone)]
pub struct PasteService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: C,
    settings: StoreSettings,
}

impl<R: Repository, G: Generator> PasteService<R, G> {
    /// Creates a new `PasteService` with default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_settings(repository, generator, StoreSettings::default())
    }

    pub fn with_settings(repository: R, generator: G, settings: StoreSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: SystemClock,
            settings,
        }
    }
}

impl<R: Repository, G: Generator, C: Clock> PasteService<R, G, C> {
    /// Replaces the clock used to stamp `created_at` on new pastes.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> PasteService<R, G, C2> {
        PasteService {
            repository: self.repository,
            generator: self.generator,
            clock,
            settings: self.settings,
        }
    }

    fn generate_id(&self) -> PasteId {
        self.generator.generate().into()
    }
}

/// Runs a backing-engine call, failing with `Timeout` once `limit` elapses.
async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let message = format!("{operation} exceeded {limit:?}");
            Err(StorageError::Timeout(message))
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: Clock> PasteStore for PasteService<R, G, C> {
    #[instrument(skip_all)]
    async fn create(&self, request: CreatePasteRequest) -> Result<PasteId, PasteError> {
        let paste = match request.validate() {
            Ok(paste) => paste,
            Err(e) => {
                debug!(field = e.field(), error = %e, "Rejected create request");
                return Err(e.into());
            }
        };

        let ttl = paste.ttl();
        let record = paste.into_record(self.clock.now());
        let max_attempts = self.settings.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            let id = self.generate_id();
            let insert = self.repository.insert(&id, record.clone(), ttl);

            match bounded(self.settings.operation_timeout, "insert", insert).await {
                Ok(()) => {
                    info!(
                        id = %id,
                        ttl_secs = ttl.map(|ttl| ttl.as_secs()),
                        max_views = record.views.remaining(),
                        "Created paste"
                    );
                    return Ok(id);
                }
                Err(StorageError::Conflict(_)) if attempt < max_attempts => {
                    warn!(id = %id, attempt, "Generated id is taken, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    error!(id = %id, attempt, error = %e, "Failed to store paste");
                    return Err(e.into());
                }
            }
        }
    }

    /// Ids longer than [`PasteId::MAX_LENGTH`] cannot name a stored paste, so
    /// they read as not found without reaching the engine.
    #[instrument(skip_all)]
    async fn read(&self, id: &str) -> Result<Option<ViewedPaste>, PasteError> {
        if id.len() > PasteId::MAX_LENGTH {
            debug!(len = id.len(), "Id too long to name a paste");
            return Ok(None);
        }
        let id = PasteId::parse(id)?;

        let consume = self.repository.consume(&id);
        let viewed = match bounded(self.settings.operation_timeout, "consume", consume).await {
            Ok(viewed) => viewed,
            Err(e) => {
                error!(id = %id, error = %e, "Failed to read paste");
                return Err(e.into());
            }
        };

        match &viewed {
            Some(paste) => debug!(id = %id, remaining = paste.remaining_views, "Served paste"),
            None => debug!(id = %id, "Paste not found"),
        }

        Ok(viewed)
    }
}
