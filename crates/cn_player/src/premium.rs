//! Premium status: one boolean derived from two sources.
//!
//! A user is premium when the subscription service says so or when the locally
//! persisted flag is exactly `"true"`. The holder is recomputed when a session
//! starts and whenever a [`PremiumSignal`] arrives; subscribers only wake up when
//! the derived value actually flips.

use cn_core::{LocalStore, Result};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

pub const PREMIUM_FLAG_VALUE: &str = "true";

pub fn resolve(subscription: bool, persisted_flag: Option<&str>) -> bool {
    subscription || persisted_flag == Some(PREMIUM_FLAG_VALUE)
}

/// A change notification for one of the two sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PremiumSignal {
    /// The subscription service reported a new value.
    Subscription(bool),
    /// The persisted flag changed, possibly from another process.
    Storage(Option<String>),
    /// The user just upgraded.
    Upgraded,
    /// Sign-out invalidates both sources.
    SignedOut,
}

#[derive(Debug, Default, Clone)]
struct Sources {
    subscription: bool,
    persisted_flag: Option<String>,
}

impl Sources {
    fn resolve(&self) -> bool {
        resolve(self.subscription, self.persisted_flag.as_deref())
    }
}

pub struct PremiumStatus {
    sources: Mutex<Sources>,
    tx: watch::Sender<bool>,
}

impl Default for PremiumStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl PremiumStatus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            sources: Mutex::new(Sources::default()),
            tx,
        }
    }

    pub fn is_premium(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Seed both sources at the start of a session.
    pub fn start_session(&self, subscription: bool, persisted_flag: Option<String>) -> bool {
        self.apply(|sources| {
            sources.subscription = subscription;
            sources.persisted_flag = persisted_flag;
        })
    }

    pub fn notify(&self, signal: PremiumSignal) -> bool {
        debug!("Premium signal: {:?}", signal);
        self.apply(|sources| match signal {
            PremiumSignal::Subscription(value) => sources.subscription = value,
            PremiumSignal::Storage(flag) => sources.persisted_flag = flag,
            PremiumSignal::Upgraded => sources.persisted_flag = Some(PREMIUM_FLAG_VALUE.to_string()),
            PremiumSignal::SignedOut => *sources = Sources::default(),
        })
    }

    /// Re-read the persisted flag after an explicit "status changed" notification.
    pub async fn refresh_from(&self, store: &dyn LocalStore) -> Result<bool> {
        let flag = store.premium_flag().await?;
        Ok(self.notify(PremiumSignal::Storage(flag)))
    }

    /// Persist the premium flag and tell everyone.
    pub async fn upgrade(&self, store: &dyn LocalStore) -> Result<bool> {
        store.set_premium_flag(Some(PREMIUM_FLAG_VALUE)).await?;
        info!("⭐ Premium unlocked");
        Ok(self.notify(PremiumSignal::Upgraded))
    }

    /// Clear the persisted flag and reset both sources.
    pub async fn sign_out(&self, store: &dyn LocalStore) -> Result<bool> {
        store.set_premium_flag(None).await?;
        Ok(self.notify(PremiumSignal::SignedOut))
    }

    fn apply<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut Sources),
    {
        let mut sources = self
            .sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        change(&mut sources);
        let value = sources.resolve();
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        value
    }
}
