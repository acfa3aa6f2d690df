// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling refresh coordinator.
//!
//! A [`Coordinator`] is the single entry point a scheduler calls on each
//! poll tick. Each [`refresh`](Coordinator::refresh) connects if needed,
//! reads identity, outlets and status, and publishes the resulting
//! [`Snapshot`]. A failed refresh is reported as [`RefreshFailed`] and marks
//! the device unavailable until the next successful one.
//!
//! Refreshes and outlet control share one lock around the [`Device`], so a
//! command is never interleaved with another caller's command/response
//! pairs.
//!
//! # Examples
//!
//! ```no_run
//! use wattbox_lib::config::WattboxConfig;
//! use wattbox_lib::coordinator::Coordinator;
//!
//! # async fn example() -> wattbox_lib::Result<()> {
//! let config = WattboxConfig::from_json(r#"{"host": "192.168.1.34"}"#)?;
//! let coordinator = Coordinator::from_config(&config)?;
//!
//! let snapshot = coordinator.refresh().await?;
//! println!("{} outlets", snapshot.outlets().len());
//!
//! // Or let the coordinator poll on its own until told to stop
//! let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
//! # drop(stop);
//! coordinator.run(async { stopped.await.ok(); }).await;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, Notify, watch};
use tokio::time::MissedTickBehavior;

use crate::config::{DEFAULT_OUTLET_COUNT, DEFAULT_POLLING_INTERVAL_SECS, WattboxConfig};
use crate::device::Device;
use crate::entity::EntityView;
use crate::error::{ConfigError, Error, RefreshFailed};
use crate::protocol::{Protocol, TelnetClient};
use crate::state::Snapshot;
use crate::types::{OutletIndex, PowerState};

/// Periodic refresh adapter around one [`Device`].
#[derive(Debug)]
pub struct Coordinator<P: Protocol> {
    device: Mutex<Device<P>>,
    last: RwLock<Option<Snapshot>>,
    updates: watch::Sender<Option<Snapshot>>,
    refresh_requested: Notify,
    polling_interval: Duration,
    outlet_count: usize,
}

impl Coordinator<TelnetClient> {
    /// Creates a coordinator for a telnet device from a validated
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn from_config(config: &WattboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let device = Device::telnet_config(config.to_telnet_config()).build();
        Ok(Self::new(device)
            .with_polling_interval(config.polling_interval())
            .with_outlet_count(config.outlet_count_hint()))
    }
}

impl<P: Protocol> Coordinator<P> {
    /// Creates a coordinator with the default polling interval and outlet
    /// count.
    #[must_use]
    pub fn new(device: Device<P>) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            device: Mutex::new(device),
            last: RwLock::new(None),
            updates,
            refresh_requested: Notify::new(),
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
            outlet_count: DEFAULT_OUTLET_COUNT,
        }
    }

    /// Sets the interval used by [`run`](Self::run).
    #[must_use]
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    /// Sets the outlet count used to size the device on its first refresh.
    #[must_use]
    pub fn with_outlet_count(mut self, count: usize) -> Self {
        self.outlet_count = count;
        self
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    // ========== Refresh ==========

    /// Reads the device and publishes a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RefreshFailed` if the device cannot be connected. The last
    /// snapshot is then marked disconnected.
    pub async fn refresh(&self) -> Result<Snapshot, RefreshFailed> {
        let result = {
            let mut device = self.device.lock().await;
            collect(&mut device, self.outlet_count).await
        };

        match result {
            Ok(snapshot) => {
                tracing::debug!(outlets = snapshot.outlets().len(), "Refresh complete");
                *self.last.write() = Some(snapshot.clone());
                self.updates.send_replace(Some(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) => {
                let failed = RefreshFailed::new(e);
                tracing::error!(error = %failed, "Refresh failed");
                self.mark_unavailable();
                Err(failed)
            }
        }
    }

    fn mark_unavailable(&self) {
        let stale = {
            let mut last = self.last.write();
            let stale = last.as_ref().map(Snapshot::disconnected);
            *last = stale.clone();
            stale
        };
        self.updates.send_replace(stale);
    }

    /// Asks [`run`](Self::run) to refresh now instead of waiting for the
    /// next tick. Requests made while a refresh is pending are coalesced.
    pub fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }

    /// Polls the device every interval until `shutdown` completes, then
    /// disconnects.
    ///
    /// The first refresh runs immediately. Ticks missed while a refresh is
    /// running are skipped, and a [`request_refresh`](Self::request_refresh)
    /// triggers an extra refresh and restarts the interval.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        let mut tick = tokio::time::interval(self.polling_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(interval_secs = self.polling_interval.as_secs(), "Polling started");
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = tick.tick() => {}
                () = self.refresh_requested.notified() => {
                    tick.reset();
                }
            }
            // Failures are logged by refresh and retried on the next tick.
            let _ = self.refresh().await;
        }

        tracing::info!("Polling stopped");
        self.disconnect().await;
    }

    // ========== Control ==========

    /// Switches one outlet and requests a refresh.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the command could not be sent.
    pub async fn set_outlet_state(
        &self,
        outlet: OutletIndex,
        state: impl Into<PowerState>,
    ) -> Result<(), Error> {
        let state = state.into();
        let result = self.device.lock().await.set_outlet_state(outlet, state).await;
        if let Err(e) = &result {
            tracing::error!(outlet = %outlet, error = %e, "Failed to set outlet state");
            return result;
        }
        self.request_refresh();
        Ok(())
    }

    /// Closes the session. Used at teardown.
    pub async fn disconnect(&self) {
        self.device.lock().await.disconnect().await;
    }

    // ========== Readers ==========

    /// Returns `true` if the last refresh succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.last.read().as_ref().is_some_and(Snapshot::is_connected)
    }

    /// Returns the last published snapshot, if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.last.read().clone()
    }

    /// Runs `f` with a facade over the last snapshot.
    pub fn view<R>(&self, f: impl FnOnce(EntityView<'_>) -> R) -> R {
        let last = self.last.read();
        f(EntityView::new(last.as_ref()))
    }

    /// Subscribes to published snapshots.
    ///
    /// The receiver sees `None` until the first refresh succeeds.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Snapshot>> {
        self.updates.subscribe()
    }
}

async fn collect<P: Protocol>(
    device: &mut Device<P>,
    outlet_count: usize,
) -> Result<Snapshot, Error> {
    device.connect().await?;
    let identity = device.get_device_identity().await?;
    let outlets = device.get_outlet_status(Some(outlet_count)).await?;
    let status = device.get_status_info().await?;
    Ok(Snapshot::new(identity, outlets, status))
}
