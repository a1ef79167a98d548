//! Platform-agnostic controller and puppet logic for the animatronic link.
//!
//! This crate holds both node state machines without any platform-specific
//! dependencies. It runs in embedded `no_std` firmware and on host for
//! testing; hardware comes in through traits.
//!
//! # Overview
//!
//! - [`controller`]: gesture detection, sequencing, and resend ([`Controller`])
//! - [`puppet`]: watchdog, lock/unlock safety, and animation ([`Puppet`])
//! - [`animation`]: non-blocking blink, wave, and jaw timers
//! - [`heartbeat`]: heartbeat pacing and the link watchdog
//! - [`gesture`], [`debounce`], [`mapping`]: controller input handling
//! - [`sender`]: sequenced sending with a one-frame resend slot
//! - Seams: [`InputSampler`], [`Transport`], [`ActuatorDriver`], [`StateStore`], [`Clock`]
//! - [`pca9685`]: PWM driver over `embedded-hal` I2C
//!
//! # Example
//!
//! ```rust
//! use animatronic_core::{Actuators, Angle, Channel};
//! use animatronic_core::{ActuatorDriver, ActuatorError};
//!
//! struct Console;
//!
//! impl ActuatorDriver for Console {
//!     fn init(&mut self) -> Result<(), ActuatorError> {
//!         Ok(())
//!     }
//!
//!     fn set_channel_angle(&mut self, _: Channel, _: Angle) -> Result<(), ActuatorError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut actuators = Actuators::new(Console);
//! actuators.set_degrees(Channel::Jaw, 400).unwrap();
//! assert_eq!(actuators.angle(Channel::Jaw), Angle::MAX);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt and derive `defmt::Format` (for embedded targets)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Declared first: the log macros are textually scoped.
mod fmt;

pub mod actuator;
pub mod animation;
pub mod controller;
pub mod debounce;
pub mod gesture;
pub mod heartbeat;
pub mod input;
pub mod mapping;
pub mod pca9685;
pub mod puppet;
pub mod sender;
pub mod store;
pub mod time;
pub mod transport;
pub mod types;

pub use actuator::{ActuatorDriver, ActuatorError, Actuators};
pub use controller::{Controller, ControllerConfig, Emitted, TickReport};
pub use input::{Axis, Button, InputSampler, SamplerError};
pub use mapping::{AxisBinding, AxisMapping, ControlMapping, DEFAULT_AXIS_MAPPING, DEFAULT_CONTROL_MAPPING};
pub use pca9685::Pca9685;
pub use puppet::{
    HardwareInitError, LinkStats, LockReason, Puppet, PuppetConfig, PuppetEvent, SafetyState,
};
pub use sender::{LinkHealth, ReliableSender};
pub use store::{StateStore, StoreError, VolatileStore};
pub use time::{Clock, Duration, Instant};
pub use transport::{Transport, TransportError};
pub use types::{Angle, Channel, CHANNEL_COUNT};
