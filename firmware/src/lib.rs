//! RP2040 bindings for the animatronic controller and puppet.
//!
//! Each module implements one of the `animatronic-core` seams on top of
//! embassy-rp; the two binaries under `src/bin` wire them to a node.

#![no_std]

pub use animatronic_core::{
    Controller, ControllerConfig, LinkHealth, Pca9685, Puppet, PuppetConfig, PuppetEvent,
    SafetyState, TickReport,
};

pub mod clock;
pub mod flash_store;
pub mod radio;
pub mod sampler;
pub mod status;

pub use clock::EmbassyClock;
pub use flash_store::FlashStore;
pub use radio::{radio_config, UartRadio};
pub use sampler::StickSampler;
pub use status::{drive_led, LinkStatus};
