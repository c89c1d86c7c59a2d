//! CPAL output device discovery.
//!
//! # Example: List and Select a Device
//!
//! ```no_run
//! use strom::{AudioEngine, CpalDevice};
//!
//! let devices = CpalDevice::list_outputs();
//! for (i, device) in devices.iter().enumerate() {
//!     println!("[{}] {} ({} Hz, {} ch)",
//!         i, device.name(), device.sample_rate(), device.channels());
//! }
//!
//! let device = devices.into_iter().next().expect("no output device");
//! let mut engine = AudioEngine::with_device(device).unwrap();
//! engine.start().unwrap();
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use cpal::traits::{DeviceTrait, HostTrait};

/// A discovered audio output device and its default stream configuration.
///
/// Use [`CpalDevice::default_output`] to get the system default, or
/// [`CpalDevice::list_outputs`] to enumerate every output the host offers.
/// Hand the device to [`AudioEngine::with_device`](crate::AudioEngine::with_device)
/// to play a graph through it.
pub struct CpalDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    name: String,
}

impl CpalDevice {
    fn probe(device: cpal::Device) -> Option<Self> {
        let config = match device.default_output_config() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "skipping output device without a default config");
                return None;
            }
        };
        let name = device.name().unwrap_or_else(|_| "Unknown".into());
        Some(Self { device, config, name })
    }

    /// The system's default output device, or `None` if there is none.
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        Self::probe(host.default_output_device()?)
    }

    /// Every output device with a usable default configuration.
    ///
    /// Empty if enumeration fails.
    pub fn list_outputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.output_devices()
            .map(|devices| devices.filter_map(Self::probe).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device's default sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    /// The device's default number of output channels.
    pub fn channels(&self) -> u16 {
        self.config.channels()
    }

    pub(crate) fn device(&self) -> &cpal::Device {
        &self.device
    }

    pub(crate) fn config(&self) -> &cpal::SupportedStreamConfig {
        &self.config
    }
}

impl core::fmt::Debug for CpalDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CpalDevice")
            .field("name", &self.name)
            .field("sample_rate", &self.sample_rate())
            .field("channels", &self.channels())
            .finish()
    }
}
