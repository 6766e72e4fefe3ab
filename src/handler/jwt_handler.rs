use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::poll::{spawn_poll, PollHandle, DEFAULT_POLL_INTERVAL_MS};
use super::sync::{SyncParameters, SyncReadOrder};
use crate::cookies::CookieSyncReader;
use crate::error::StorageError;
use crate::models::{ExtensionContext, SessionToken};
use crate::storage::{CacheKey, StorageCache};
use crate::utils::log_throttle::LogThrottle;

const STORAGE_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

struct CookieSync {
    reader: CookieSyncReader,
    params: SyncParameters,
    read_order: SyncReadOrder,
}

/// Per-context façade over the client JWT slot.
///
/// Without sync the token lives only in the storage cache. With sync the
/// cookie store is consulted too, and a token found there is written into
/// the cache before it is returned (pull-through). Contexts do not
/// coordinate: the last write to the slot wins.
pub struct JwtHandler {
    cache: StorageCache,
    key: CacheKey,
    sync: Option<CookieSync>,
    context: ExtensionContext,
    throttle: LogThrottle,
}

impl JwtHandler {
    /// A sync-disabled handler over `key`.
    pub fn new(cache: StorageCache, key: CacheKey) -> Self {
        JwtHandler {
            cache,
            key,
            sync: None,
            context: ExtensionContext::default(),
            throttle: LogThrottle::new(STORAGE_FAILURE_LOG_WINDOW),
        }
    }

    /// Enables cookie sync. Ignored when `params.enabled` is false.
    pub fn with_sync(
        mut self,
        reader: CookieSyncReader,
        params: SyncParameters,
        read_order: SyncReadOrder,
    ) -> Self {
        if params.enabled {
            self.sync = Some(CookieSync {
                reader,
                params,
                read_order,
            });
        }
        self
    }

    pub fn with_context(mut self, context: ExtensionContext) -> Self {
        self.context = context;
        self
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn context(&self) -> ExtensionContext {
        self.context
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.sync.is_some()
    }

    /// The current token, or `None`. Storage failures are logged and read
    /// as "no token".
    pub async fn get(&self) -> Option<SessionToken> {
        match self.resolve(false).await {
            Ok(token) => token,
            Err(e) => {
                self.log_storage_failure("read", &e);
                None
            }
        }
    }

    /// Like [`get`](Self::get) but reports a failed cache read instead of
    /// treating it as a miss. A failed pull-through write is still only
    /// logged, since the cookie value is returned either way.
    pub async fn try_get(&self) -> Result<Option<SessionToken>, StorageError> {
        self.resolve(true).await
    }

    /// Stores `token`, overwriting whatever another context wrote.
    pub async fn set(&self, token: &SessionToken) {
        if let Err(e) = self.try_set(token).await {
            self.log_storage_failure("write", &e);
        }
    }

    pub async fn try_set(&self, token: &SessionToken) -> Result<(), StorageError> {
        self.cache.set(&self.key, token.as_str()).await
    }

    /// Clears the slot. Clearing an empty slot is fine.
    pub async fn remove(&self) {
        if let Err(e) = self.try_remove().await {
            self.log_storage_failure("remove", &e);
        }
    }

    pub async fn try_remove(&self) -> Result<(), StorageError> {
        self.cache.remove(&self.key).await
    }

    /// Calls [`get`](Self::get) every `delay` until it yields a token.
    pub fn poll(self: &Arc<Self>, delay: Duration) -> PollHandle {
        self.poll_until(delay, CancellationToken::new())
    }

    /// [`poll`](Self::poll) with the default 1500 ms interval.
    pub fn poll_default(self: &Arc<Self>) -> PollHandle {
        self.poll(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }

    /// Polls until a token is found or `cancel` fires.
    pub fn poll_until(self: &Arc<Self>, delay: Duration, cancel: CancellationToken) -> PollHandle {
        debug!(
            context = %self.context,
            cache_key = self.key.as_str(),
            delay_ms = delay.as_millis() as u64,
            "Starting token poll"
        );
        let handler = Arc::clone(self);
        spawn_poll(delay, cancel, move || {
            let handler = Arc::clone(&handler);
            async move { handler.get().await }
        })
    }

    async fn resolve(&self, strict: bool) -> Result<Option<SessionToken>, StorageError> {
        let Some(sync) = &self.sync else {
            return self.read_cache().await;
        };

        match sync.read_order {
            SyncReadOrder::CookieFirst => {
                if let Some(token) = self.read_cookie(sync).await {
                    return Ok(Some(token));
                }
                self.read_cache().await
            }
            SyncReadOrder::CacheFirst => {
                match self.read_cache().await {
                    Ok(Some(token)) => return Ok(Some(token)),
                    Ok(None) => {}
                    Err(e) if strict => return Err(e),
                    Err(e) => self.log_storage_failure("read", &e),
                }
                Ok(self.read_cookie(sync).await)
            }
        }
    }

    async fn read_cache(&self) -> Result<Option<SessionToken>, StorageError> {
        Ok(self.cache.get(&self.key).await?.and_then(SessionToken::new))
    }

    /// Cookie lookup plus pull-through write. Lookup failures are misses.
    async fn read_cookie(&self, sync: &CookieSync) -> Option<SessionToken> {
        let cookie = sync
            .reader
            .get_client_cookie(&sync.params.cookie_name, &sync.params.host_urls)
            .await?;
        let token = SessionToken::new(cookie.value)?;
        trace!(
            context = %self.context,
            cookie = sync.params.cookie_name.as_str(),
            "Token discovered through cookie sync"
        );
        self.set(&token).await;
        Some(token)
    }

    fn log_storage_failure(&self, operation: &'static str, error: &StorageError) {
        let key = match operation {
            "read" => "handler.storage.read",
            "write" => "handler.storage.write",
            _ => "handler.storage.remove",
        };
        if let Some(suppressed_count) = self.throttle.should_emit(key) {
            warn!(
                event_name = key,
                event_domain = "handler",
                context = %self.context,
                cache_key = self.key.as_str(),
                suppressed_count,
                "Token storage {} failed, continuing without it: {}",
                operation,
                error
            );
        }
    }
}
