//! Sampling configuration and the derived sample-rate table.

use fugit::HertzU32;

/// Conversion clock source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// The peripheral bus clock.
    #[default]
    Bus,
    /// The alternate clock input (ALTCLK).
    Alternate,
    /// The asynchronous self-clocked oscillator (ADACK).
    AsyncClock,
}

/// Voltage reference selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reference {
    /// The external VREFH/VREFL pin pair.
    #[default]
    External,
    /// The alternate reference pair (VALTH/VALTL).
    Alternate,
    /// The internal bandgap reference.
    Bandgap,
}

/// Divider applied to the input clock to derive the conversion clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivider {
    Div1,
    Div2,
    Div4,
    Div8,
    /// Only reachable from the bus clock, via its divide-by-two tap
    /// combined with the divide-by-8 prescaler.
    Div16,
}

impl ClockDivider {
    /// The division ratio.
    pub const fn ratio(self) -> u32 {
        match self {
            ClockDivider::Div1 => 1,
            ClockDivider::Div2 => 2,
            ClockDivider::Div4 => 4,
            ClockDivider::Div8 => 8,
            ClockDivider::Div16 => 16,
        }
    }
}

/// The sampling/readout resolution of the ADC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 8-bit resolution
    Bits8,
    /// 10-bit resolution
    Bits10,
    /// 12-bit resolution
    #[default]
    Bits12,
}

impl Resolution {
    /// Number of result bits.
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits8 => 8,
            Resolution::Bits10 => 10,
            Resolution::Bits12 => 12,
        }
    }

    /// Mask applied to the result register.
    pub const fn mask(self) -> u16 {
        match self {
            Resolution::Bits8 => 0xff,
            Resolution::Bits10 => 0x3ff,
            Resolution::Bits12 => 0xfff,
        }
    }
}

/// Hardware averaging depth.
///
/// The peripheral accumulates this many back-to-back samples and reports a
/// single averaged result, trading sample rate for noise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Averaging {
    /// Hardware averaging off; every conversion reports one sample.
    #[default]
    Disabled,
    Samples4,
    Samples8,
    Samples16,
    Samples32,
}

impl Averaging {
    /// Samples accumulated per reported result.
    pub const fn samples(self) -> u32 {
        match self {
            Averaging::Disabled => 1,
            Averaging::Samples4 => 4,
            Averaging::Samples8 => 8,
            Averaging::Samples16 => 16,
            Averaging::Samples32 => 32,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Averaging::Disabled => 0,
            Averaging::Samples4 => 1,
            Averaging::Samples8 => 2,
            Averaging::Samples16 => 3,
            Averaging::Samples32 => 4,
        }
    }
}

/// All averaging depths, in sample-rate table order.
pub(crate) const AVERAGING_MODES: [Averaging; 5] = [
    Averaging::Disabled,
    Averaging::Samples4,
    Averaging::Samples8,
    Averaging::Samples16,
    Averaging::Samples32,
];

/// Declarative sampling configuration, translated to register state by
/// [`Adc::configure`](crate::Adc::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Conversion clock source.
    pub clock_source: ClockSource,
    /// Voltage reference.
    pub reference: Reference,
    /// Input clock divider. `Div16` is only legal with
    /// [`ClockSource::Bus`].
    pub clock_divider: ClockDivider,
    /// Result resolution.
    pub resolution: Resolution,
    /// Hardware averaging depth.
    pub averaging: Averaging,
    /// Keep the converter in its low-power configuration between
    /// conversions.
    pub low_power: bool,
    /// Run the one-shot self-calibration during bring-up.
    pub calibrate: bool,
    /// Let a new result overwrite a pending unread one.
    pub overwrite: bool,
}

impl Default for Config {
    /// The original bring-up defaults: 12-bit, bus clock divided by 8,
    /// averaging off, low power, overwrite on, calibration requested.
    fn default() -> Self {
        Self {
            clock_source: ClockSource::Bus,
            reference: Reference::External,
            clock_divider: ClockDivider::Div8,
            resolution: Resolution::Bits12,
            averaging: Averaging::Disabled,
            low_power: true,
            calibrate: true,
            overwrite: true,
        }
    }
}

// Per-conversion cycle counts on the conversion clock, 12-bit short-sample
// mode: a fixed setup overhead plus 25 sampling and 3 conversion cycles for
// every accumulated sample.
const SETUP_CYCLES: u32 = 6;
const CYCLES_PER_SAMPLE: u32 = 25 + 3;

/// Achievable sample frequency per averaging depth, indexed in
/// [`AVERAGING_MODES`] order.
pub(crate) fn sample_rates(input_clock: HertzU32, divider: ClockDivider) -> [HertzU32; 5] {
    let conversion_clock = input_clock.to_Hz() / divider.ratio();

    let mut rates = [HertzU32::from_raw(0); 5];
    for (rate, mode) in rates.iter_mut().zip(AVERAGING_MODES) {
        *rate = HertzU32::from_raw(
            conversion_clock / (SETUP_CYCLES + mode.samples() * CYCLES_PER_SAMPLE),
        );
    }
    rates
}
