//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use shop_cache::{Cache, FileBackend};
use shop_client::{
    telemetry, ApiProductLookup, CartStore, ClientConfig, Notification, ProductLookup,
    ProductReconciler, RecordingNotifier, Severity,
};

use crate::output::Output;

/// The cart as the CLI uses it: file-backed, notifications buffered until
/// the command prints them.
pub type Store = CartStore<FileBackend, RecordingNotifier>;

/// Execution context for CLI commands.
pub struct Context {
    /// Client configuration.
    pub config: ClientConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Skip checking the cart against the catalog on mount.
    pub offline: bool,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output, offline: bool) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let config = ClientConfig::resolve(config_path.map(Path::new), &cwd)
            .context("Failed to load configuration")?;

        Ok(Self {
            config,
            output,
            cwd,
            offline,
        })
    }

    /// Install the log subscriber. `--verbose` raises the default level.
    pub fn init_logging(&self) {
        let mut log = self.config.log.clone();
        if self.output.is_verbose() {
            log.level = "debug".to_string();
        }
        if let Err(e) = telemetry::init(&log) {
            self.output.warn(&format!("Logging disabled: {e}"));
        }
    }

    /// Directory the cart file lives in.
    pub fn storage_dir(&self) -> PathBuf {
        self.config.storage.resolve_dir(&self.cwd)
    }

    /// Mount the file-backed cart and drop products the catalog no longer
    /// carries, unless running offline.
    ///
    /// Every command that changes the cart goes through here, so a stale
    /// line is never written back alongside the change.
    pub async fn mount(&self) -> Result<(Store, RecordingNotifier)> {
        let (mut store, notifier) = self.open_store()?;
        if self.offline {
            self.output.debug("Offline: cart not checked against the catalog");
        } else {
            self.reconcile(&mut store, self.lookup()?).await;
        }
        Ok((store, notifier))
    }

    /// Check the mounted cart against the catalog, with a spinner.
    ///
    /// Returns whether an outcome was applied.
    pub async fn reconcile<L: ProductLookup>(&self, store: &mut Store, lookup: L) -> bool {
        if store.items().is_empty() {
            return false;
        }

        let reconciler = ProductReconciler::new(lookup);
        let spinner = self.output.spinner("Checking products against the catalog...");
        let applied = store.reconcile(&reconciler).await;
        spinner.finish_and_clear();
        applied
    }

    /// Open the file-backed cart without contacting the catalog.
    pub fn open_store(&self) -> Result<(Store, RecordingNotifier)> {
        let dir = self.storage_dir();
        let backend = FileBackend::open(&dir)
            .with_context(|| format!("Failed to open cart storage at {}", dir.display()))?;
        self.output.debug(&format!("Cart storage: {}", dir.display()));

        let notifier = RecordingNotifier::new();
        let store = CartStore::mount_with_key(
            Cache::new(backend),
            self.config.storage.key.clone(),
            notifier.clone(),
        );
        Ok((store, notifier))
    }

    /// Product lookup against the configured API.
    pub fn lookup(&self) -> Result<ApiProductLookup> {
        let currency = self.config.api.currency().context("Invalid [api] section")?;
        self.output
            .debug(&format!("Catalog API: {}", self.config.api.base_url));
        Ok(ApiProductLookup::new(self.config.fetch_client()).with_currency(currency))
    }

    /// Print buffered notifications and return them.
    pub fn report(&self, notifier: &RecordingNotifier) -> Vec<Notification> {
        let notifications = notifier.drain();
        for n in &notifications {
            match n.severity {
                Severity::Success => self.output.success(&n.message),
                Severity::Error => self.output.error(&n.message),
            }
        }
        notifications
    }
}
