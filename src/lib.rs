//! # Oneshot SAR ADC driver for NXP Vybrid / i.MX6ULL
//!
//! ## Overview
//!
//! Driver for the successive-approximation ADC block found on vf610 and
//! i.MX6ULL parts. It translates a declarative [`Config`] into register
//! state, runs the one-shot hardware self-calibration, and services
//! single-channel, interrupt-synchronous conversions with a fixed timeout.
//!
//! The platform glue stays outside this crate: mapping the register window,
//! enabling the input clock and reference regulator, and routing the
//! interrupt line into [`Adc::on_interrupt`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use vf610_adc::{Adc, AdcRegisters, Config};
//!
//! # async fn example() {
//! // Register window, clock rate and reference voltage come from the
//! // platform; ADC0 sits at 0x4003_b000 on the vf610.
//! let regs = unsafe { &*(0x4003_b000 as *const AdcRegisters) };
//! let adc = Adc::new(
//!     regs,
//!     fugit::HertzU32::from_raw(66_000_000),
//!     3_300_000,
//!     Config::default(),
//! );
//!
//! // Route the converter's interrupt line to `adc.on_interrupt()`, then:
//! if adc.calibrate().await.is_err() {
//!     // Non-fatal; the converter runs uncalibrated.
//! }
//! let raw = adc.sample(1).await.unwrap();
//! let (millivolts, bits) = adc.scale();
//! let uv = raw as u64 * millivolts as u64 * 1000 >> bits;
//! # let _ = uv;
//! # }
//! ```
//!
//! ## Features
#![doc = document_features::document_features!()]
#![no_std]

// MUST be the first module
mod fmt;

mod config;
mod driver;
mod regs;

pub use config::{Averaging, ClockDivider, ClockSource, Config, Reference, Resolution};
pub use driver::Adc;
pub use regs::AdcRegisters;

/// Conversion and calibration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The completion interrupt did not arrive within the protocol
    /// timeout. No value was read; the caller may simply retry.
    Timeout,
    /// The wait was cancelled through [`Adc::abort`] before completion.
    Interrupted,
    /// The hardware self-calibration reported failure.
    CalibrationFailed,
    /// The self-calibration handshake did not complete within the protocol
    /// timeout.
    CalibrationTimeout,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Timeout => write!(f, "conversion timed out"),
            Error::Interrupted => write!(f, "conversion wait was interrupted"),
            Error::CalibrationFailed => write!(f, "self-calibration failed"),
            Error::CalibrationTimeout => write!(f, "self-calibration timed out"),
        }
    }
}

impl core::error::Error for Error {}

/// Configuration faults.
///
/// Non-fatal: the translator logs the fault, leaves the offending field at
/// its cleared value and applies the rest of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum ConfigError {
    /// [`ClockDivider::Div16`] is only reachable from the bus clock.
    Divider16RequiresBusClock,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Divider16RequiresBusClock => {
                write!(f, "divide-by-16 requires the bus clock source")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
