//! Corsair Commander Pro device implementation.
//!
//! High-level interface for the Commander Pro fan/LED hub and the Lighting
//! Node Pro/Core LED controllers.

use std::ffi::CStr;
use std::path::Path;

use hidapi::{HidApi, HidDevice};

use crate::cooling::prepare_profile;
use crate::device::transport::HidTransport;
use crate::device::variant::{ChannelNames, DeviceVariant};
use crate::error::{CommanderError, Result};
use crate::protocol::{
    BootloaderVersion, CMD_BEGIN_LED_EFFECT, CMD_GET_BOOTLOADER, CMD_GET_FAN_MODES,
    CMD_GET_FAN_RPM, CMD_GET_FIRMWARE, CMD_GET_TEMP, CMD_GET_TEMP_CONFIG, CMD_GET_VOLTS,
    CMD_LED_COMMIT, CMD_LED_EFFECT, CMD_RESET_LED_CHANNEL, CMD_SET_FAN_DUTY,
    CMD_SET_FAN_PROFILE, CMD_SET_LED_CHANNEL_STATE, CRITICAL_TEMPERATURE,
    CRITICAL_TEMPERATURE_HIGH, EffectOptions, FirmwareVersion, LED_PORT_STATE_HARDWARE, LedMode,
    LightingEffect, MAX_STAGED_EFFECTS, RAIL_3V3, RAIL_5V, RAIL_12V, RESPONSE_LENGTH, Rgb,
    StatusEntry, build_command, build_fan_profile_payload, parse_fan_modes, parse_fan_rpm,
    parse_temp_config, parse_temperature, parse_voltage,
};
use crate::storage::{DeviceIdentity, FileStore, SessionState, SessionStore};

// =============================================================================
// Device Listing
// =============================================================================

/// A connected supported device.
#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub path: String,
    pub variant: &'static DeviceVariant,
    pub serial: Option<String>,
}

// =============================================================================
// CommanderPro
// =============================================================================

/// Commander Pro (or Lighting Node) device handle.
///
/// Holds the HID transport, the immutable variant description, the derived
/// channel names and the persisted session state.
///
/// # Example
///
/// ```no_run
/// use commander_rust_devices::device::CommanderPro;
/// use commander_rust_devices::protocol::EffectOptions;
///
/// let mut commander = CommanderPro::open()?;
/// for entry in commander.initialize()? {
///     println!("{}", entry);
/// }
///
/// commander.set_fixed_speed("fan1", 60)?;
/// commander.set_color("led1", "fixed", &[[0xff, 0x00, 0x00]], &EffectOptions::default())?;
/// # Ok::<(), commander_rust_devices::error::CommanderError>(())
/// ```
pub struct CommanderPro<T: HidTransport = HidDevice, S: SessionStore = FileStore> {
    transport: T,
    variant: &'static DeviceVariant,
    fan_names: ChannelNames,
    led_names: ChannelNames,
    session: SessionState<S>,
}

impl CommanderPro<HidDevice, FileStore> {
    /// Open the first supported device.
    ///
    /// # Errors
    /// Returns `DeviceNotFound` if no supported device is connected.
    pub fn open() -> Result<Self> {
        Self::open_device(None, None)
    }

    /// Open a device by HID path.
    ///
    /// Useful when multiple devices are connected.
    pub fn open_path(path: &CStr) -> Result<Self> {
        Self::open_device(Some(path), None)
    }

    /// Open a device, optionally by path, keeping session state under
    /// `store_dir` instead of the default runtime directory.
    pub fn open_device(path: Option<&CStr>, store_dir: Option<&Path>) -> Result<Self> {
        let api = HidApi::new().map_err(CommanderError::HidError)?;

        let (info, variant) = api
            .device_list()
            .filter(|info| path.is_none_or(|p| info.path() == p))
            .find_map(|info| {
                DeviceVariant::find(info.vendor_id(), info.product_id()).map(|v| (info, v))
            })
            .ok_or(CommanderError::DeviceNotFound)?;

        let device = info.open_device(&api).map_err(CommanderError::HidError)?;
        let identity = DeviceIdentity::new(
            variant.vendor_id,
            variant.product_id,
            info.path().to_string_lossy(),
        );
        let store = match store_dir {
            Some(base) => FileStore::with_base(base, &identity.key_prefixes())?,
            None => FileStore::new(&identity.key_prefixes())?,
        };

        tracing::debug!(device = variant.name, path = %identity.address, "opened device");
        Ok(Self::with_transport(device, variant, store))
    }

    /// List all connected supported devices.
    pub fn list_devices() -> Result<Vec<DeviceEntry>> {
        let api = HidApi::new().map_err(CommanderError::HidError)?;

        let devices = api
            .device_list()
            .filter_map(|info| {
                DeviceVariant::find(info.vendor_id(), info.product_id()).map(|variant| DeviceEntry {
                    path: info.path().to_string_lossy().into_owned(),
                    variant,
                    serial: info.serial_number().map(String::from),
                })
            })
            .collect();

        Ok(devices)
    }
}

impl<T: HidTransport, S: SessionStore> CommanderPro<T, S> {
    /// Build a handle from an already opened transport and session store.
    pub fn with_transport(transport: T, variant: &'static DeviceVariant, store: S) -> Self {
        Self {
            transport,
            variant,
            fan_names: ChannelNames::new("fan", variant.fan_count),
            led_names: ChannelNames::new("led", variant.led_channel_count),
            session: SessionState::new(store, variant.fan_count, variant.temp_probe_count),
        }
    }

    pub fn variant(&self) -> &'static DeviceVariant {
        self.variant
    }

    pub fn fan_names(&self) -> &ChannelNames {
        &self.fan_names
    }

    pub fn led_names(&self) -> &ChannelNames {
        &self.led_names
    }

    pub fn session(&self) -> &SessionState<S> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Initialize the device and cache its fan and probe topology.
    ///
    /// Must be called every time the device is powered on, including after
    /// resuming from suspend, and whenever fans or probes are re-wired.
    ///
    /// # Returns
    /// Firmware and bootloader versions, probe connections and fan modes.
    pub fn initialize(&mut self) -> Result<Vec<StatusEntry>> {
        let res = self.send_command(CMD_GET_FIRMWARE, &[])?;
        let firmware = FirmwareVersion::parse(&res)?;

        let res = self.send_command(CMD_GET_BOOTLOADER, &[])?;
        let bootloader = BootloaderVersion::parse(&res)?;

        let mut status = vec![
            StatusEntry::text("Firmware version", firmware.to_string()),
            StatusEntry::text("Bootloader version", bootloader.to_string()),
        ];

        if self.variant.temp_probe_count > 0 {
            let res = self.send_command(CMD_GET_TEMP_CONFIG, &[])?;
            let connected = parse_temp_config(&res, self.variant.temp_probe_count)?;
            self.session.set_temp_sensors_connected(&connected)?;

            status.extend(connected.iter().enumerate().map(|(i, &c)| {
                StatusEntry::text(
                    format!("Temp sensor {}", i + 1),
                    if c { "Connected" } else { "Not Connected" },
                )
            }));
        }

        if self.variant.fan_count > 0 {
            let res = self.send_command(CMD_GET_FAN_MODES, &[])?;
            let modes = parse_fan_modes(&res, self.variant.fan_count)?;
            self.session.set_fan_modes(&modes)?;

            status.extend(modes.iter().enumerate().map(|(i, mode)| {
                StatusEntry::text(format!("Fan {} Mode", i + 1), mode.description())
            }));
        }

        tracing::info!(device = self.variant.name, %firmware, "device initialized");
        Ok(status)
    }

    /// Get a status report.
    ///
    /// Reads the connected probes, the three supply rails and the speed of
    /// every connected fan, based on the topology cached by `initialize`.
    /// Devices without fan or probe hardware report nothing.
    pub fn get_status(&mut self) -> Result<Vec<StatusEntry>> {
        if !self.variant.has_telemetry() {
            tracing::debug!(device = self.variant.name, "no status telemetry on this device");
            return Ok(Vec::new());
        }

        let sensors = self.session.temp_sensors_connected()?;
        let fan_modes = self.session.fan_modes()?;

        let mut temps = vec![0.0; sensors.len()];
        for (i, &connected) in sensors.iter().enumerate() {
            if connected {
                temps[i] = self.read_temperature(i)?;
            }
        }

        let volt_12 = parse_voltage(&self.send_command(CMD_GET_VOLTS, &[RAIL_12V])?)?;
        let volt_5 = parse_voltage(&self.send_command(CMD_GET_VOLTS, &[RAIL_5V])?)?;
        let volt_3 = parse_voltage(&self.send_command(CMD_GET_VOLTS, &[RAIL_3V3])?)?;

        let mut speeds = vec![0u16; fan_modes.len()];
        for (i, mode) in fan_modes.iter().enumerate() {
            if mode.is_controllable() {
                speeds[i] = self.read_fan_rpm(i)?;
            }
        }

        let mut status = vec![
            StatusEntry::float("12 volt rail", volt_12, "V"),
            StatusEntry::float("5 volt rail", volt_5, "V"),
            StatusEntry::float("3.3 volt rail", volt_3, "V"),
        ];

        status.extend(
            temps
                .iter()
                .enumerate()
                .map(|(i, &t)| StatusEntry::float(format!("Temp sensor {}", i + 1), t, "°C")),
        );
        status.extend(speeds.iter().enumerate().map(|(i, &rpm)| {
            StatusEntry::integer(format!("Fan {} speed", i + 1), rpm as u32, "rpm")
        }));

        Ok(status)
    }

    /// Read one temperature probe, in degrees Celsius.
    ///
    /// # Arguments
    /// * `sensor` - Zero-based probe index
    pub fn read_temperature(&mut self, sensor: usize) -> Result<f64> {
        let probes = self.variant.temp_probe_count;
        if probes == 0 {
            return Err(self.unsupported());
        }
        if sensor >= probes {
            return Err(CommanderError::InvalidSensor {
                index: sensor,
                max: probes - 1,
            });
        }

        let res = self.send_command(CMD_GET_TEMP, &[sensor as u8])?;
        parse_temperature(&res)
    }

    /// Read the speed of one fan, in RPM.
    ///
    /// # Arguments
    /// * `fan` - Zero-based fan index
    pub fn read_fan_rpm(&mut self, fan: usize) -> Result<u16> {
        let fans = self.variant.fan_count;
        if fans == 0 {
            return Err(self.unsupported());
        }
        if fan >= fans {
            return Err(CommanderError::InvalidFan {
                index: fan,
                max: fans - 1,
            });
        }

        let res = self.send_command(CMD_GET_FAN_RPM, &[fan as u8])?;
        parse_fan_rpm(&res)
    }

    /// Set fan or fans to a fixed duty.
    ///
    /// Valid channels are `fanN` (N >= 1) and `sync` for every fan. The duty
    /// is clamped to 0-100%. Fans cached as disconnected are skipped.
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` on devices without fan headers and
    /// `UnknownChannel` for an unknown channel name.
    pub fn set_fixed_speed(&mut self, channel: &str, duty: u8) -> Result<()> {
        if self.variant.fan_count == 0 {
            return Err(self.unsupported());
        }

        let duty = duty.min(100);
        let fans = self.fan_names.resolve(channel)?;
        let modes = self.session.fan_modes()?;

        for fan in fans {
            if modes[fan as usize].is_controllable() {
                self.send_command(CMD_SET_FAN_DUTY, &[fan, duty])?;
            } else {
                tracing::debug!(fan = fan + 1, "fan not connected, skipping");
            }
        }

        Ok(())
    }

    /// Set fan or fans to follow a temperature profile.
    ///
    /// Up to six (temperature, value) points can be given, temperatures in
    /// Celsius. The profile is capped by a critical point at 60°C, or 100°C
    /// when `high_temperature` is set, and padded to six points.
    ///
    /// # Arguments
    /// * `channel` - `fanN` or `sync`
    /// * `profile` - Temperature/value pairs
    /// * `temperature_sensor` - 1-indexed probe the fans follow (clamped)
    /// * `high_temperature` - Allow critical temperatures up to 100°C
    ///
    /// # Errors
    /// Returns `TooManyPoints` when the profile does not fit, and
    /// `SensorNotConnected` when the probe was not detected by `initialize`.
    pub fn set_speed_profile(
        &mut self,
        channel: &str,
        profile: &[(u8, u16)],
        temperature_sensor: u8,
        high_temperature: bool,
    ) -> Result<()> {
        if self.variant.fan_count == 0 || self.variant.temp_probe_count == 0 {
            return Err(self.unsupported());
        }

        let critical = if high_temperature {
            CRITICAL_TEMPERATURE_HIGH
        } else {
            CRITICAL_TEMPERATURE
        };
        let points = prepare_profile(profile, critical)?;

        let sensor = temperature_sensor.clamp(1, self.variant.temp_probe_count as u8);
        let sensors = self.session.temp_sensors_connected()?;
        if !sensors[sensor as usize - 1] {
            return Err(CommanderError::SensorNotConnected(sensor));
        }

        let mut payload = build_fan_profile_payload(sensor - 1, &points);
        let fans = self.fan_names.resolve(channel)?;
        let modes = self.session.fan_modes()?;

        for fan in fans {
            if modes[fan as usize].is_controllable() {
                payload[0] = fan;
                self.send_command(CMD_SET_FAN_PROFILE, &payload)?;
            } else {
                tracing::debug!(fan = fan + 1, "fan not connected, skipping");
            }
        }

        Ok(())
    }

    /// Set the lighting effect of an LED channel.
    ///
    /// The device has no command to add a single effect, so every call
    /// stages a new effect per resolved channel and resends the whole
    /// staged program. Up to eight effects can be staged; the `clear` mode
    /// forgets them without touching the device.
    ///
    /// | Mode        | Colors |
    /// | ----------- | ------ |
    /// | off         | 0      |
    /// | fixed       | 1      |
    /// | color_shift | 2      |
    /// | color_pulse | 2      |
    /// | color_wave  | 2      |
    /// | visor       | 2      |
    /// | blink       | 2      |
    /// | marquee     | 1      |
    /// | sequential  | 1      |
    /// | rainbow     | 0      |
    /// | rainbow2    | 0      |
    ///
    /// # Errors
    /// Returns `InvalidMode` for an unknown mode, `UnknownChannel` for an
    /// unknown channel and `StagingOverflow` when more than eight effects
    /// would be staged; nothing is sent or stored in those cases.
    pub fn set_color(
        &mut self,
        channel: &str,
        mode: &str,
        colors: &[Rgb],
        options: &EffectOptions,
    ) -> Result<()> {
        let mode: LedMode = mode.parse()?;

        if mode == LedMode::Clear {
            self.session.set_saved_effects(None)?;
            return Ok(());
        }

        let leds = self.led_names.resolve(channel)?;

        // TODO: decide whether "off" should keep previously staged effects;
        // for now it resets them like "clear" but still programs the device.
        let mut effects = if mode == LedMode::Off {
            Vec::new()
        } else {
            self.session.saved_effects()?
        };

        for &led in &leds {
            effects.push(LightingEffect::new(led, mode, colors, options)?);
        }

        if effects.len() > MAX_STAGED_EFFECTS {
            tracing::warn!(
                staged = effects.len(),
                "too many lighting effects, run set_color with the 'clear' mode to reset them"
            );
            return Err(CommanderError::StagingOverflow {
                count: effects.len(),
                max: MAX_STAGED_EFFECTS,
            });
        }

        for &led in &leds {
            self.send_command(CMD_RESET_LED_CHANNEL, &[led])?;
            self.send_command(CMD_BEGIN_LED_EFFECT, &[led])?;
            self.send_command(CMD_SET_LED_CHANNEL_STATE, &[led, LED_PORT_STATE_HARDWARE])?;
        }

        if mode == LedMode::Off {
            self.session.set_saved_effects(None)?;
        } else {
            self.session.set_saved_effects(Some(effects.as_slice()))?;
        }

        for effect in &effects {
            self.send_command(CMD_LED_EFFECT, &effect.to_payload())?;
        }
        self.send_command(CMD_LED_COMMIT, &[0xff])?;

        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn unsupported(&self) -> CommanderError {
        CommanderError::UnsupportedOperation {
            device: self.variant.name,
        }
    }

    fn send_command(&mut self, command: u8, payload: &[u8]) -> Result<Vec<u8>> {
        let buf = build_command(command, payload);
        tracing::debug!("sending command {:#04x} ({} payload bytes)", command, payload.len());

        self.transport.clear_pending_reads()?;
        self.transport.write(&buf)?;
        self.transport.read(RESPONSE_LENGTH)
    }
}

impl<T: HidTransport, S: SessionStore> std::fmt::Debug for CommanderPro<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommanderPro")
            .field("variant", &self.variant.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::{
        COMMANDER_PRO_PID, CORSAIR_VID, FanMode, LIGHTING_NODE_CORE_PID, LIGHTING_NODE_PRO_PID,
        StatusValue,
    };
    use crate::storage::MemoryStore;
    use crate::storage::session::{KEY_FAN_MODES, KEY_TEMP_SENSORS_CONNECTED};

    /// Transport call, in the order the driver made it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Clear,
        Write(u8),
        Read,
    }

    /// Records written frames and answers reads through `responder`.
    struct MockTransport {
        writes: Vec<Vec<u8>>,
        clears: usize,
        events: Vec<Event>,
        /// Writes accepted before every further write fails.
        fail_after: Option<usize>,
        responder: fn(&[u8]) -> Vec<u8>,
    }

    impl MockTransport {
        fn new(responder: fn(&[u8]) -> Vec<u8>) -> Self {
            Self {
                writes: Vec::new(),
                clears: 0,
                events: Vec::new(),
                fail_after: None,
                responder,
            }
        }

        fn reset(&mut self) {
            self.writes.clear();
            self.events.clear();
            self.clears = 0;
        }

        fn commands(&self) -> Vec<u8> {
            self.writes.iter().map(|w| w[1]).collect()
        }
    }

    impl HidTransport for MockTransport {
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
                return Err(CommanderError::HidError(hidapi::HidError::HidApiError {
                    message: "device disconnected".into(),
                }));
            }
            self.events.push(Event::Write(buf[1]));
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn read(&mut self, length: usize) -> Result<Vec<u8>> {
            self.events.push(Event::Read);
            let last = self.writes.last().map(Vec::as_slice).unwrap_or(&[]);
            let mut res = (self.responder)(last);
            res.resize(length, 0);
            Ok(res)
        }

        fn clear_pending_reads(&mut self) -> Result<()> {
            self.clears += 1;
            self.events.push(Event::Clear);
            Ok(())
        }
    }

    fn silent(_: &[u8]) -> Vec<u8> {
        vec![0; 16]
    }

    /// Answers like a Commander Pro with fans 1 (PWM), 2 (DC), 3 and 5
    /// (disconnected), 4 and 6 (PWM) and probes 1 and 3 connected.
    fn commander_responses(frame: &[u8]) -> Vec<u8> {
        match frame[1] {
            CMD_GET_FIRMWARE => vec![0x00, 0x00, 0x09, 0xD4],
            CMD_GET_BOOTLOADER => vec![0x00, 0x00, 0x05],
            CMD_GET_TEMP_CONFIG => vec![0x00, 0x01, 0x00, 0x01, 0x00],
            CMD_GET_FAN_MODES => vec![0x00, 0x02, 0x01, 0x00, 0x02, 0x00, 0x02],
            // probe n -> 30.25 + n °C
            CMD_GET_TEMP => {
                let centi = 3025u16 + frame[2] as u16 * 100;
                let [hi, lo] = centi.to_be_bytes();
                vec![0x00, hi, lo]
            }
            CMD_GET_VOLTS => match frame[2] {
                RAIL_12V => vec![0x00, 0x2F, 0x48],
                RAIL_5V => vec![0x00, 0x13, 0x9C],
                _ => vec![0x00, 0x0C, 0xE4],
            },
            // fan n -> 1000 + n rpm
            CMD_GET_FAN_RPM => {
                let [hi, lo] = (1000u16 + frame[2] as u16).to_be_bytes();
                vec![0x00, hi, lo]
            }
            _ => vec![0; 16],
        }
    }

    fn variant(pid: u16) -> &'static DeviceVariant {
        DeviceVariant::find(CORSAIR_VID, pid).unwrap()
    }

    fn commander_pro() -> CommanderPro<MockTransport, MemoryStore> {
        CommanderPro::with_transport(
            MockTransport::new(commander_responses),
            variant(COMMANDER_PRO_PID),
            MemoryStore::new(),
        )
    }

    fn initialized_commander_pro() -> CommanderPro<MockTransport, MemoryStore> {
        let mut dev = commander_pro();
        dev.initialize().unwrap();
        dev.transport.writes.clear();
        dev
    }

    fn lighting_node(pid: u16) -> CommanderPro<MockTransport, MemoryStore> {
        CommanderPro::with_transport(MockTransport::new(silent), variant(pid), MemoryStore::new())
    }

    // -------------------------------------------------------------------------
    // Framing
    // -------------------------------------------------------------------------

    #[test]
    fn test_send_command_clears_then_writes() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let res = dev.send_command(CMD_GET_FIRMWARE, &[]).unwrap();

        assert_eq!(res.len(), RESPONSE_LENGTH);
        assert_eq!(
            dev.transport.events,
            vec![Event::Clear, Event::Write(CMD_GET_FIRMWARE), Event::Read]
        );
        assert_eq!(dev.transport.writes[0].len(), 65);
        assert_eq!(dev.transport.writes[0][0], 0x00);
        assert_eq!(dev.transport.writes[0][1], CMD_GET_FIRMWARE);
    }

    #[test]
    fn test_every_command_clears_before_writing() {
        let mut dev = initialized_commander_pro();
        dev.transport.reset();
        dev.set_fixed_speed("sync", 40).unwrap();

        let events = &dev.transport.events;
        assert_eq!(events.len(), 4 * 3);
        for frame in events.chunks(3) {
            assert_eq!(frame[0], Event::Clear);
            assert_eq!(frame[1], Event::Write(CMD_SET_FAN_DUTY));
            assert_eq!(frame[2], Event::Read);
        }
    }

    #[test]
    fn test_transport_failure_propagates() {
        let mut dev = commander_pro();
        dev.transport.fail_after = Some(2);

        let err = dev.initialize().unwrap_err();
        assert!(matches!(err, CommanderError::HidError(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
        // topology was never cached
        let store = dev.session().store();
        assert!(!store.contains(KEY_FAN_MODES));
        assert!(!store.contains(KEY_TEMP_SENSORS_CONNECTED));
    }

    // -------------------------------------------------------------------------
    // Initialize / Status
    // -------------------------------------------------------------------------

    #[test]
    fn test_initialize_caches_topology() {
        let mut dev = commander_pro();
        let status = dev.initialize().unwrap();

        assert_eq!(status[0], StatusEntry::text("Firmware version", "0.9.212"));
        assert_eq!(status[1], StatusEntry::text("Bootloader version", "0.5"));
        assert_eq!(status[2], StatusEntry::text("Temp sensor 1", "Connected"));
        assert_eq!(status[3], StatusEntry::text("Temp sensor 2", "Not Connected"));
        assert_eq!(status[6], StatusEntry::text("Fan 1 Mode", "PWM"));
        assert_eq!(status[8], StatusEntry::text("Fan 3 Mode", "Auto/Disconnected"));
        assert_eq!(status.len(), 2 + 4 + 6);

        assert_eq!(
            dev.session().temp_sensors_connected().unwrap(),
            vec![true, false, true, false]
        );
        assert_eq!(
            dev.session().fan_modes().unwrap(),
            vec![
                FanMode::Pwm,
                FanMode::Dc,
                FanMode::Disconnected,
                FanMode::Pwm,
                FanMode::Disconnected,
                FanMode::Pwm,
            ]
        );
    }

    #[test]
    fn test_initialize_lighting_node() {
        let mut dev = lighting_node(LIGHTING_NODE_CORE_PID);
        let status = dev.initialize().unwrap();

        assert_eq!(status.len(), 2);
        assert_eq!(
            dev.transport.commands(),
            vec![CMD_GET_FIRMWARE, CMD_GET_BOOTLOADER]
        );
    }

    #[test]
    fn test_get_status() {
        let mut dev = initialized_commander_pro();
        let status = dev.get_status().unwrap();

        assert_eq!(status.len(), 3 + 4 + 6);
        assert_eq!(status[0], StatusEntry::float("12 volt rail", 12.104, "V"));
        assert_eq!(status[1], StatusEntry::float("5 volt rail", 5.02, "V"));
        assert_eq!(status[2], StatusEntry::float("3.3 volt rail", 3.3, "V"));
        assert_eq!(status[3], StatusEntry::float("Temp sensor 1", 30.25, "°C"));
        assert_eq!(status[4].value, StatusValue::Float(0.0));
        assert_eq!(status[5], StatusEntry::float("Temp sensor 3", 32.25, "°C"));
        assert_eq!(status[7], StatusEntry::integer("Fan 1 speed", 1000, "rpm"));
        assert_eq!(status[9].value, StatusValue::Integer(0));
        assert_eq!(status[12], StatusEntry::integer("Fan 6 speed", 1005, "rpm"));

        // 2 probes, 3 rails, 4 connected fans
        assert_eq!(dev.transport.writes.len(), 2 + 3 + 4);
    }

    #[test]
    fn test_get_status_without_telemetry() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        assert!(dev.get_status().unwrap().is_empty());
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_read_indices() {
        let mut dev = commander_pro();
        assert_eq!(
            dev.read_temperature(4).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(dev.read_fan_rpm(6).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(dev.read_fan_rpm(5).unwrap(), 1005);

        let mut node = lighting_node(LIGHTING_NODE_PRO_PID);
        assert_eq!(
            node.read_temperature(0).unwrap_err().kind(),
            ErrorKind::UnsupportedOperation
        );
    }

    // -------------------------------------------------------------------------
    // Fans
    // -------------------------------------------------------------------------

    #[test]
    fn test_fixed_speed_skips_disconnected() {
        let mut dev = initialized_commander_pro();
        dev.set_fixed_speed("sync", 150).unwrap();

        let frames: Vec<&[u8]> = dev.transport.writes.iter().map(|w| &w[1..4]).collect();
        assert_eq!(
            frames,
            vec![
                &[CMD_SET_FAN_DUTY, 0, 100][..],
                &[CMD_SET_FAN_DUTY, 1, 100][..],
                &[CMD_SET_FAN_DUTY, 3, 100][..],
                &[CMD_SET_FAN_DUTY, 5, 100][..],
            ]
        );
    }

    #[test]
    fn test_fixed_speed_disconnected_fan() {
        let mut dev = initialized_commander_pro();
        dev.set_fixed_speed("fan3", 50).unwrap();
        assert!(dev.transport.writes.is_empty());

        dev.set_fixed_speed("fan2", 50).unwrap();
        assert_eq!(&dev.transport.writes[0][1..4], &[CMD_SET_FAN_DUTY, 1, 50]);
    }

    #[test]
    fn test_fixed_speed_before_initialize() {
        let mut dev = commander_pro();
        dev.set_fixed_speed("sync", 50).unwrap();
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_fixed_speed_unknown_channel() {
        let mut dev = initialized_commander_pro();
        let err = dev.set_fixed_speed("pump", 50).unwrap_err();
        assert!(matches!(err, CommanderError::UnknownChannel { .. }));
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_fixed_speed_unsupported() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let err = dev.set_fixed_speed("fan1", 50).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_speed_profile_payload() {
        let mut dev = initialized_commander_pro();
        let profile = [(20, 1000), (30, 2000), (40, 3000), (50, 4000)];
        dev.set_speed_profile("fan4", &profile, 3, false).unwrap();

        assert_eq!(dev.transport.writes.len(), 1);
        let frame = &dev.transport.writes[0];
        assert_eq!(frame[1], CMD_SET_FAN_PROFILE);
        let payload = &frame[2..28];
        assert_eq!(payload[0], 3);
        assert_eq!(payload[1], 2);
        // temperatures: 20, 30, 40, 50, 60, 60 °C
        assert_eq!(
            &payload[2..14],
            &[0x07, 0xD0, 0x0B, 0xB8, 0x0F, 0xA0, 0x13, 0x88, 0x17, 0x70, 0x17, 0x70]
        );
        // values: 1000, 2000, 3000, 4000, 5000, 5000
        assert_eq!(
            &payload[14..26],
            &[0x03, 0xE8, 0x07, 0xD0, 0x0B, 0xB8, 0x0F, 0xA0, 0x13, 0x88, 0x13, 0x88]
        );
        assert!(frame[28..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_speed_profile_sync_sets_fan_index() {
        let mut dev = initialized_commander_pro();
        dev.set_speed_profile("sync", &[(30, 1500)], 1, false).unwrap();

        let fans: Vec<u8> = dev.transport.writes.iter().map(|w| w[2]).collect();
        assert_eq!(fans, vec![0, 1, 3, 5]);
    }

    #[test]
    fn test_speed_profile_high_temperature() {
        let mut dev = initialized_commander_pro();
        dev.set_speed_profile("fan1", &[(70, 2000)], 1, true).unwrap();

        let payload = &dev.transport.writes[0][2..28];
        // 100 °C -> 10000 -> 0x2710
        assert_eq!(&payload[4..6], &[0x27, 0x10]);
    }

    #[test]
    fn test_speed_profile_sensor_not_connected() {
        let mut dev = initialized_commander_pro();
        let err = dev.set_speed_profile("fan1", &[(30, 1500)], 2, false).unwrap_err();
        assert!(matches!(err, CommanderError::SensorNotConnected(2)));
        assert_eq!(err.kind(), ErrorKind::DeviceStateConflict);
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_speed_profile_sensor_is_clamped() {
        let mut dev = initialized_commander_pro();
        // sensor 9 clamps to 4, which is not connected
        let err = dev.set_speed_profile("fan1", &[(30, 1500)], 9, false).unwrap_err();
        assert!(matches!(err, CommanderError::SensorNotConnected(4)));

        // sensor 0 clamps to 1, which is connected
        dev.set_speed_profile("fan1", &[(30, 1500)], 0, false).unwrap();
        assert_eq!(dev.transport.writes[0][3], 0);
    }

    #[test]
    fn test_speed_profile_too_many_points() {
        let mut dev = initialized_commander_pro();
        let profile = [
            (20, 500),
            (25, 1000),
            (30, 1500),
            (35, 2000),
            (40, 2500),
            (45, 3000),
            (50, 3500),
        ];
        let err = dev.set_speed_profile("fan1", &profile, 1, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(dev.transport.writes.is_empty());
    }

    // -------------------------------------------------------------------------
    // Lighting
    // -------------------------------------------------------------------------

    #[test]
    fn test_set_color_frame_sequence() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        dev.set_color("led2", "fixed", &[[0xAA, 0xBB, 0xCC]], &EffectOptions::default())
            .unwrap();

        assert_eq!(
            dev.transport.commands(),
            vec![
                CMD_RESET_LED_CHANNEL,
                CMD_BEGIN_LED_EFFECT,
                CMD_SET_LED_CHANNEL_STATE,
                CMD_LED_EFFECT,
                CMD_LED_COMMIT,
            ]
        );

        let writes = &dev.transport.writes;
        assert_eq!(writes[0][2], 1);
        assert_eq!(&writes[2][2..4], &[1, LED_PORT_STATE_HARDWARE]);
        assert_eq!(
            &writes[3][2..13],
            &[1, 0, 1, 0x04, 0x01, 0x01, 0x00, 0xff, 0xAA, 0xBB, 0xCC]
        );
        assert_eq!(writes[4][2], 0xff);

        assert_eq!(dev.session().saved_effects().unwrap().len(), 1);
    }

    #[test]
    fn test_set_color_replays_staged_effects() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();
        dev.set_color("led1", "rainbow", &[], &options).unwrap();
        dev.transport.writes.clear();

        dev.set_color("led2", "fixed", &[[1, 2, 3]], &options).unwrap();

        let effects: Vec<&Vec<u8>> = dev
            .transport
            .writes
            .iter()
            .filter(|w| w[1] == CMD_LED_EFFECT)
            .collect();
        assert_eq!(effects.len(), 2);
        // insertion order, with random colors for the color-less rainbow
        assert_eq!(&effects[0][2..10], &[0, 0, 1, 0x00, 0x01, 0x01, 0x01, 0xff]);
        assert_eq!(effects[1][2], 1);
        assert_eq!(dev.transport.writes.last().unwrap()[1], CMD_LED_COMMIT);
    }

    #[test]
    fn test_set_color_sync() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        dev.set_color("sync", "color_wave", &[[1, 1, 1], [2, 2, 2]], &EffectOptions::default())
            .unwrap();

        assert_eq!(dev.transport.writes.len(), 3 * 2 + 2 + 1);
        let effects = dev.session().saved_effects().unwrap();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].channel, 0);
        assert_eq!(effects[1].channel, 1);
    }

    #[test]
    fn test_set_color_staging_overflow() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();

        for i in 0..8 {
            let channel = if i % 2 == 0 { "led1" } else { "led2" };
            dev.set_color(channel, "fixed", &[[i, i, i]], &options).unwrap();
        }
        let staged = dev.session().saved_effects().unwrap();
        assert_eq!(staged.len(), 8);
        dev.transport.writes.clear();

        let err = dev.set_color("led1", "fixed", &[[9, 9, 9]], &options).unwrap_err();
        assert!(matches!(err, CommanderError::StagingOverflow { count: 9, max: 8 }));
        assert_eq!(err.kind(), ErrorKind::StagingOverflow);
        assert!(dev.transport.writes.is_empty());
        assert_eq!(dev.session().saved_effects().unwrap(), staged);
    }

    #[test]
    fn test_set_color_sync_overflow_sends_nothing() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();
        for _ in 0..7 {
            dev.set_color("led1", "fixed", &[[1, 2, 3]], &options).unwrap();
        }
        dev.transport.writes.clear();

        let err = dev.set_color("sync", "fixed", &[[1, 2, 3]], &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StagingOverflow);
        assert!(dev.transport.writes.is_empty());
        assert_eq!(dev.session().saved_effects().unwrap().len(), 7);
    }

    #[test]
    fn test_set_color_transport_failure_keeps_staged_effects() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();
        dev.set_color("led1", "fixed", &[[1, 2, 3]], &options).unwrap();
        let staged = dev.session().saved_effects().unwrap();
        dev.transport.reset();

        // fail on the first init frame of the second channel
        dev.transport.fail_after = Some(3);
        let err = dev
            .set_color("sync", "color_pulse", &[[4, 5, 6], [7, 8, 9]], &options)
            .unwrap_err();

        assert!(matches!(err, CommanderError::HidError(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(dev.session().saved_effects().unwrap(), staged);
        assert_eq!(
            dev.transport.commands(),
            vec![
                CMD_RESET_LED_CHANNEL,
                CMD_BEGIN_LED_EFFECT,
                CMD_SET_LED_CHANNEL_STATE,
            ]
        );
    }

    #[test]
    fn test_set_color_clear() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();
        dev.set_color("led1", "fixed", &[[1, 2, 3]], &options).unwrap();
        dev.set_color("led2", "blink", &[[1, 2, 3], [4, 5, 6]], &options).unwrap();
        dev.transport.writes.clear();
        dev.transport.clears = 0;

        dev.set_color("sync", "clear", &[], &options).unwrap();
        assert!(dev.transport.writes.is_empty());
        assert_eq!(dev.transport.clears, 0);
        assert!(dev.session().saved_effects().unwrap().is_empty());

        // clearing an empty program is fine too
        dev.set_color("led1", "clear", &[], &options).unwrap();
        assert!(dev.session().saved_effects().unwrap().is_empty());
    }

    #[test]
    fn test_set_color_off_resets_staged_effects() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let options = EffectOptions::default();
        dev.set_color("led1", "fixed", &[[1, 2, 3]], &options).unwrap();
        dev.set_color("led2", "fixed", &[[1, 2, 3]], &options).unwrap();
        dev.transport.writes.clear();

        dev.set_color("led1", "off", &[], &options).unwrap();

        let effects: Vec<&Vec<u8>> = dev
            .transport
            .writes
            .iter()
            .filter(|w| w[1] == CMD_LED_EFFECT)
            .collect();
        assert_eq!(effects.len(), 1);
        // off: fixed mode code without random colors
        assert_eq!(&effects[0][2..10], &[0, 0, 1, 0x04, 0x01, 0x01, 0x00, 0xff]);
        assert!(dev.session().saved_effects().unwrap().is_empty());
    }

    #[test]
    fn test_set_color_invalid_mode() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let err = dev
            .set_color("led1", "strobe", &[], &EffectOptions::default())
            .unwrap_err();
        assert!(matches!(err, CommanderError::InvalidMode(_)));
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_set_color_unknown_channel() {
        let mut dev = lighting_node(LIGHTING_NODE_PRO_PID);
        let err = dev
            .set_color("led", "fixed", &[], &EffectOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown channel, should be one of: 'sync', 'led1', 'led2'"
        );
        assert!(dev.transport.writes.is_empty());
    }

    #[test]
    fn test_set_color_single_channel_device() {
        let mut dev = lighting_node(LIGHTING_NODE_CORE_PID);
        dev.set_color("led", "fixed", &[[1, 2, 3]], &EffectOptions::default())
            .unwrap();
        assert_eq!(dev.session().saved_effects().unwrap()[0].channel, 0);

        // unknown names resolve to nothing: the staged program is replayed
        dev.transport.writes.clear();
        dev.set_color("led1", "fixed", &[[1, 2, 3]], &EffectOptions::default())
            .unwrap();
        assert_eq!(
            dev.transport.commands(),
            vec![CMD_LED_EFFECT, CMD_LED_COMMIT]
        );
        assert_eq!(dev.session().saved_effects().unwrap().len(), 1);
    }
}
