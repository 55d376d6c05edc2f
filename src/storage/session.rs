//! Typed view over the persisted per-device session state.
//!
//! The device cannot be asked which fans are populated or which lighting
//! program it runs, so `initialize` caches the topology and `set_color`
//! keeps the staged effects here.

use crate::error::Result;
use crate::protocol::{FanMode, LightingEffect};
use crate::storage::store::SessionStore;

pub const KEY_TEMP_SENSORS_CONNECTED: &str = "temp_sensors_connected";
pub const KEY_FAN_MODES: &str = "fan_modes";
pub const KEY_SAVED_EFFECTS: &str = "saved_effects";

/// Session state of one device, backed by a [`SessionStore`].
#[derive(Debug)]
pub struct SessionState<S> {
    store: S,
    fan_count: usize,
    temp_probe_count: usize,
}

impl<S: SessionStore> SessionState<S> {
    /// Wrap `store` for a device with the given channel counts.
    pub fn new(store: S, fan_count: usize, temp_probe_count: usize) -> Self {
        Self {
            store,
            fan_count,
            temp_probe_count,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Connection flags of the temperature probes, one per probe.
    ///
    /// Probes are reported disconnected until `initialize` ran.
    pub fn temp_sensors_connected(&self) -> Result<Vec<bool>> {
        let mut sensors = self
            .store
            .load(KEY_TEMP_SENSORS_CONNECTED, vec![false; self.temp_probe_count])?;
        sensors.resize(self.temp_probe_count, false);
        Ok(sensors)
    }

    pub fn set_temp_sensors_connected(&mut self, sensors: &[bool]) -> Result<()> {
        self.store.store(KEY_TEMP_SENSORS_CONNECTED, Some(sensors))
    }

    /// Mode of every fan header, one per fan.
    ///
    /// Fans are reported disconnected until `initialize` ran.
    pub fn fan_modes(&self) -> Result<Vec<FanMode>> {
        let mut modes = self
            .store
            .load(KEY_FAN_MODES, vec![FanMode::Disconnected; self.fan_count])?;
        modes.resize(self.fan_count, FanMode::Disconnected);
        Ok(modes)
    }

    pub fn set_fan_modes(&mut self, modes: &[FanMode]) -> Result<()> {
        self.store.store(KEY_FAN_MODES, Some(modes))
    }

    /// Staged lighting effects, in insertion order.
    pub fn saved_effects(&self) -> Result<Vec<LightingEffect>> {
        let effects: Option<Vec<LightingEffect>> = self.store.load(KEY_SAVED_EFFECTS, None)?;
        Ok(effects.unwrap_or_default())
    }

    /// Replace the staged effects; `None` clears them.
    pub fn set_saved_effects(&mut self, effects: Option<&[LightingEffect]>) -> Result<()> {
        self.store.store(KEY_SAVED_EFFECTS, effects)
    }
}
