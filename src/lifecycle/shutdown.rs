//! Shutdown coordination for the process.
//!
//! Components that own external resources (the database connection, the
//! HTTP listener) register an [`InterruptHook`] here. When a termination
//! signal arrives, the signal task runs every live hook once, newest first,
//! and then exits the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use async_trait::async_trait;

static HOOK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered hook owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(HOOK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for HookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hook-{}", self.0)
    }
}

/// Cleanup to run before the process exits on a termination signal.
#[async_trait]
pub trait InterruptHook: Send + Sync {
    /// Short label for log output.
    fn name(&self) -> &'static str;

    /// Release the owned resource. Must tolerate being called after the
    /// resource was already released.
    async fn on_interrupt(&self);
}

struct Registration {
    id: HookId,
    hook: Weak<dyn InterruptHook>,
}

/// Set of hooks to run on interruption.
///
/// Hooks are held weakly: dropping the owner unregisters it implicitly.
pub struct ShutdownRegistry {
    hooks: Mutex<Vec<Registration>>,
}

impl ShutdownRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Register `hook` under `id`. Returns `false` when `id` is already
    /// registered; the registry keeps the first hook in that case.
    pub fn register(&self, id: HookId, hook: Weak<dyn InterruptHook>) -> bool {
        let mut hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        hooks.retain(|r| r.hook.strong_count() > 0);

        if hooks.iter().any(|r| r.id == id) {
            return false;
        }
        hooks.push(Registration { id, hook });
        true
    }

    /// Whether a live hook is registered under `id`.
    pub fn is_registered(&self, id: HookId) -> bool {
        let hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        hooks.iter().any(|r| r.id == id && r.hook.strong_count() > 0)
    }

    /// Number of live hooks.
    pub fn len(&self) -> usize {
        let hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        hooks.iter().filter(|r| r.hook.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every live hook, most recently registered first.
    pub async fn run(&self) {
        let live: Vec<Arc<dyn InterruptHook>> = {
            let hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
            hooks.iter().rev().filter_map(|r| r.hook.upgrade()).collect()
        };

        for hook in live {
            tracing::debug!(hook = hook.name(), "Running interrupt hook");
            hook.on_interrupt().await;
        }
    }
}

impl Default for ShutdownRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry used by the signal task.
pub fn global() -> &'static ShutdownRegistry {
    static REGISTRY: OnceLock<ShutdownRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ShutdownRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl InterruptHook for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn on_interrupt(&self) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    fn recorder(label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            label,
            log: log.clone(),
        })
    }

    #[test]
    fn hook_ids_unique() {
        assert_ne!(HookId::new(), HookId::new());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let registry = ShutdownRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = recorder("db", &log);
        let id = HookId::new();

        let weak: Weak<dyn InterruptHook> = Arc::downgrade(&hook) as Weak<dyn InterruptHook>;
        assert!(registry.register(id, weak.clone()));
        assert!(!registry.register(id, weak));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn hooks_run_newest_first() {
        let registry = ShutdownRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let database = recorder("database", &log);
        let listener = recorder("listener", &log);

        registry.register(HookId::new(), Arc::downgrade(&database) as Weak<dyn InterruptHook>);
        registry.register(HookId::new(), Arc::downgrade(&listener) as Weak<dyn InterruptHook>);
        registry.run().await;

        assert_eq!(*log.lock().unwrap(), vec!["listener", "database"]);
    }

    #[tokio::test]
    async fn dropped_owners_are_skipped() {
        let registry = ShutdownRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = HookId::new();
        {
            let gone = recorder("gone", &log);
            registry.register(id, Arc::downgrade(&gone) as Weak<dyn InterruptHook>);
        }

        assert!(!registry.is_registered(id));
        assert!(registry.is_empty());
        registry.run().await;
        assert!(log.lock().unwrap().is_empty());
    }
}
