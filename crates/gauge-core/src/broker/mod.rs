//! Fetch orchestration across competing statusline processes.
//!
//! Every statusline invocation is a fresh short-lived process, and several
//! sessions may render at once. The broker makes the group behave like one
//! well-mannered client: fresh cache wins over a refetch, failures arm a
//! per-category cooldown, metered sources are serialized behind advisory
//! locks, and derived sources consume whatever resolved earlier in the same
//! cycle. Any process can run a cycle; the cache document is the only
//! coordination surface besides the lock files.

pub mod errors;
pub mod registry;
pub mod runner;
pub mod sources;
pub mod types;

pub use errors::{BrokerError, FetchError};
pub use registry::{register_session, session};
pub use sources::default_sources;
pub use types::{
    Aggregate, CycleOutcome, CycleStep, FetchContext, SessionRecord, Source, SourceId, StepAction,
};

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::cache::{CacheEntry, CacheError, CacheStore, SourceData};
use crate::clock;
use crate::freshness::{self, CooldownStore};
use crate::intent;
use crate::lock::{self, LockError};
use gauge_config::GaugeConfig;
use gauge_paths::GaugePaths;

pub struct Broker {
    config: GaugeConfig,
    paths: GaugePaths,
    sources: Vec<Box<dyn Source>>,
}

impl Broker {
    pub fn new(config: GaugeConfig, paths: GaugePaths) -> Self {
        Self::with_sources(config, paths, sources::default_sources())
    }

    pub fn with_sources(
        config: GaugeConfig,
        paths: GaugePaths,
        sources: Vec<Box<dyn Source>>,
    ) -> Self {
        Self {
            config,
            paths,
            sources,
        }
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn paths(&self) -> &GaugePaths {
        &self.paths
    }

    pub fn register_session(&self, record: &SessionRecord) -> Result<(), BrokerError> {
        registry::register_session(&self.paths, record)
    }

    pub fn session(&self, session_id: &str) -> Option<SessionRecord> {
        registry::session(&self.paths, session_id)
    }

    /// Run a refresh cycle for a previously registered session.
    pub fn refresh_by_id(&self, session_id: &str) -> Result<CycleOutcome, BrokerError> {
        let session =
            registry::session(&self.paths, session_id).ok_or_else(|| BrokerError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        Ok(self.refresh_cycle(&session))
    }

    pub fn refresh_cycle(&self, session: &SessionRecord) -> CycleOutcome {
        self.refresh_cycle_at(clock::now_ms(), session)
    }

    /// Walk every source in tier order and bring its cached data up to date.
    ///
    /// Per source, the first gate that applies decides the step: fresh cache,
    /// unresolved dependency, active cooldown, contended lock. Only then does
    /// the fetch run. A failing source never blocks the sources after it.
    pub fn refresh_cycle_at(&self, now_ms: u64, session: &SessionRecord) -> CycleOutcome {
        let cycle_id = Uuid::new_v4().to_string();
        tracing::info!(
            event = "core.broker.cycle_started",
            cycle_id = %cycle_id,
            session_id = %session.session_id,
        );

        let store = CacheStore::open(&self.paths);
        let mut cooldowns = CooldownStore::load(&self.paths);
        let mut resolved = self.seed_from_cache(now_ms, session, &store);

        let mut order: Vec<&dyn Source> = self.sources.iter().map(|source| source.as_ref()).collect();
        order.sort_by_key(|source| source.tier());

        let mut steps = Vec::with_capacity(order.len());
        for source in order {
            let id = source.id();

            let action = if resolved.contains_key(&id) {
                StepAction::SkippedFresh
            } else if let Some(dep) = source
                .dependencies()
                .iter()
                .find(|dep| !resolved.contains_key(dep))
            {
                tracing::debug!(
                    event = "core.broker.dependency_unresolved",
                    source = %id,
                    dependency = %dep,
                );
                StepAction::SkippedDependency
            } else if cooldowns.cooldown_active_at(now_ms, source.category()) {
                tracing::debug!(event = "core.broker.cooldown_active", source = %id);
                StepAction::SkippedCooldown
            } else if source.category().is_metered() {
                self.fetch_metered(now_ms, session, source, &store, &mut cooldowns, &mut resolved)
            } else {
                self.fetch_once(now_ms, session, source, &store, &mut cooldowns, &mut resolved)
            };
            steps.push(CycleStep { source: id, action });
        }

        let outcome = CycleOutcome { cycle_id, steps };
        tracing::info!(
            event = "core.broker.cycle_finished",
            cycle_id = %outcome.cycle_id,
            fetched = outcome.fetched(),
            failed = outcome.failed(),
        );
        outcome
    }

    pub fn get_data(&self, session: &SessionRecord, id: SourceId) -> Option<SourceData> {
        self.get_data_at(clock::now_ms(), session, id)
    }

    /// Read one source's data for a session. Cached data is returned at any
    /// age; absence is the only miss. A session-scoped miss triggers a direct
    /// fetch so a new session is not stuck waiting for a refresh cycle, while
    /// global sources stay on the metered cycle path.
    pub fn get_data_at(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        id: SourceId,
    ) -> Option<SourceData> {
        let store = CacheStore::open(&self.paths);
        let doc = store.load();
        let session_scoped = id.category().config().session_scoped;
        let cached = if session_scoped {
            doc.source_in_context(id.as_str(), &session.context_key())
        } else {
            doc.source(id.as_str())
        };
        if let Some(entry) = cached {
            return Some(entry.data.clone());
        }
        if !session_scoped {
            return None;
        }

        let source = self.sources.iter().find(|source| source.id() == id)?;
        let mut cooldowns = CooldownStore::load(&self.paths);
        let mut resolved = Aggregate::new();
        let action = if cooldowns.cooldown_active_at(now_ms, id.category()) {
            StepAction::SkippedCooldown
        } else if id.category().is_metered() {
            self.fetch_metered(
                now_ms,
                session,
                source.as_ref(),
                &store,
                &mut cooldowns,
                &mut resolved,
            )
        } else {
            self.fetch_once(
                now_ms,
                session,
                source.as_ref(),
                &store,
                &mut cooldowns,
                &mut resolved,
            )
        };
        match action {
            StepAction::Fetched | StepAction::SkippedFresh => resolved.remove(&id),
            _ => None,
        }
    }

    pub fn push_data(
        &self,
        session: &SessionRecord,
        items: Vec<(SourceId, SourceData)>,
    ) -> Result<(), CacheError> {
        self.push_data_at(clock::now_ms(), session, items)
    }

    /// Store payload-borne data directly, bypassing fetch. The statusline
    /// receives model and context data in its stdin payload; publishing it
    /// through the broker keeps every reader on the same cache document.
    pub fn push_data_at(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        items: Vec<(SourceId, SourceData)>,
    ) -> Result<(), CacheError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut entries = BTreeMap::new();
        for (id, data) in items {
            let mut entry = CacheEntry::new(data, now_ms);
            if id.category().config().session_scoped {
                entry = entry.with_context_key(session.context_key());
            }
            entries.insert(id.as_str().to_string(), entry);
        }
        CacheStore::open(&self.paths).update_at(now_ms, entries)?;
        Ok(())
    }

    /// Data already trustworthy at cycle start. Entries written by other
    /// processes count, which is how a dependent source can run even when
    /// its dependency was fetched elsewhere.
    fn seed_from_cache(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        store: &CacheStore,
    ) -> Aggregate {
        let doc = store.load();
        let context_key = session.context_key();
        let mut resolved = Aggregate::new();
        for (key, entry) in &doc.sources {
            let Some(id) = SourceId::ALL.iter().copied().find(|id| id.as_str() == key) else {
                continue;
            };
            let category = id.category();
            if category.config().session_scoped
                && entry.context_key.as_deref() != Some(context_key.as_str())
            {
                continue;
            }
            if freshness::is_fresh_at(now_ms, Some(entry.fetched_at), category) {
                resolved.insert(id, entry.data.clone());
            }
        }
        resolved
    }

    /// Fetch behind this source's advisory lock. Contention means another
    /// process is already on it; fall back to whatever the cache holds
    /// rather than queueing up a duplicate call.
    fn fetch_metered(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        source: &dyn Source,
        store: &CacheStore,
        cooldowns: &mut CooldownStore,
        resolved: &mut Aggregate,
    ) -> StepAction {
        let id = source.id();
        let token = match lock::acquire_at(now_ms, &self.paths, id.as_str()) {
            Ok(token) => token,
            Err(LockError::Held { holder_pid, .. }) => {
                tracing::debug!(
                    event = "core.broker.lock_held",
                    source = %id,
                    holder_pid = ?holder_pid,
                );
                return StepAction::SkippedLockHeld;
            }
            Err(e) => {
                tracing::warn!(
                    event = "core.broker.lock_failed",
                    source = %id,
                    error = %e,
                    message = "Failed to acquire fetch lock",
                );
                return StepAction::Failed {
                    error: e.to_string(),
                };
            }
        };

        // The lock holder we raced against may have landed this source
        let action = if let Some(data) = self.fresh_cached(now_ms, session, source, store) {
            source.merge(resolved, data);
            StepAction::SkippedFresh
        } else {
            self.fetch_once(now_ms, session, source, store, cooldowns, resolved)
        };

        if let Err(e) = token.release() {
            tracing::warn!(
                event = "core.broker.lock_release_failed",
                source = %id,
                error = %e,
            );
        }
        action
    }

    fn fresh_cached(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        source: &dyn Source,
        store: &CacheStore,
    ) -> Option<SourceData> {
        let doc = store.load();
        let entry = if source.session_scoped() {
            doc.source_in_context(source.id().as_str(), &session.context_key())
        } else {
            doc.source(source.id().as_str())
        }?;
        freshness::is_fresh_at(now_ms, Some(entry.fetched_at), source.category())
            .then(|| entry.data.clone())
    }

    fn fetch_once(
        &self,
        now_ms: u64,
        session: &SessionRecord,
        source: &dyn Source,
        store: &CacheStore,
        cooldowns: &mut CooldownStore,
        resolved: &mut Aggregate,
    ) -> StepAction {
        let id = source.id();
        let fetched = {
            let ctx = FetchContext {
                session,
                config: &self.config,
                paths: &self.paths,
                now_ms,
                resolved,
            };
            source.fetch(&ctx)
        };

        match fetched {
            Ok(data) => {
                let mut entry = CacheEntry::new(data.clone(), now_ms);
                if source.session_scoped() {
                    entry = entry.with_context_key(session.context_key());
                }
                let mut entries = BTreeMap::new();
                entries.insert(id.as_str().to_string(), entry);
                if let Err(e) = store.update_at(now_ms, entries) {
                    tracing::warn!(
                        event = "core.broker.cache_write_failed",
                        source = %id,
                        error = %e,
                        message = "Failed to persist fetched data",
                    );
                }
                if let Err(e) = cooldowns.record_fetch_at(now_ms, source.category(), true) {
                    tracing::warn!(
                        event = "core.broker.cooldown_record_failed",
                        source = %id,
                        error = %e,
                    );
                }
                if let Err(e) = intent::clear(&self.paths, source.category()) {
                    tracing::warn!(
                        event = "core.broker.intent_clear_failed",
                        source = %id,
                        error = %e,
                    );
                }
                tracing::debug!(
                    event = "core.broker.source_fetched",
                    source = %id,
                    kind = data.kind(),
                );
                source.merge(resolved, data);
                StepAction::Fetched
            }
            Err(e) if e.is_missing_input() => {
                tracing::debug!(
                    event = "core.broker.input_missing",
                    source = %id,
                    reason = %e,
                );
                StepAction::SkippedMissingInput
            }
            Err(e) => {
                tracing::warn!(
                    event = "core.broker.fetch_failed",
                    source = %id,
                    error = %e,
                    message = "Source fetch failed",
                );
                if let Err(save_err) = cooldowns.record_fetch_at(now_ms, source.category(), false) {
                    tracing::warn!(
                        event = "core.broker.cooldown_record_failed",
                        source = %id,
                        error = %save_err,
                    );
                }
                StepAction::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
