//! The oneshot conversion driver.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex, signal::Signal};
use embassy_time::{with_timeout, Duration};
use fugit::HertzU32;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::{
    config::{sample_rates, Averaging, ClockDivider, ClockSource, Config, Reference, Resolution},
    regs::{AdcRegisters, CFG, GC, GS, HC, HS, R},
    ConfigError, Error,
};

/// Both the calibration handshake and a single conversion must complete
/// within this window.
const PROTOCOL_TIMEOUT: Duration = Duration::from_millis(100);

// Which protocol is awaiting the completion interrupt. Written before the
// trigger, read from interrupt context.
const IDLE: u8 = 0;
const CONVERSION: u8 = 1;
const CALIBRATION: u8 = 2;

/// Oneshot SAR ADC driver.
///
/// One instance exclusively owns one converter's register window. Normal
/// context drives [`configure`](Self::configure),
/// [`calibrate`](Self::calibrate) and [`sample`](Self::sample); the
/// platform's interrupt handler calls [`on_interrupt`](Self::on_interrupt).
pub struct Adc<'d> {
    regs: &'d AdcRegisters,
    config: Config,
    input_clock: HertzU32,
    reference_uv: u32,
    rates: [HertzU32; 5],

    needs_calibration: AtomicBool,
    waiting: AtomicU8,
    // Serializes logical protocols (conversion or calibration); register
    // words themselves are single 32-bit volatile accesses.
    lock: Mutex<CriticalSectionRawMutex, ()>,
    conversion: Signal<CriticalSectionRawMutex, u16>,
    calibration: Signal<CriticalSectionRawMutex, ()>,
    aborted: Signal<CriticalSectionRawMutex, ()>,
}

// The register block is a shared volatile window; every logical protocol on
// it is serialized by `lock`, and the interrupt handler only reads status
// and result words.
unsafe impl Send for Adc<'_> {}
unsafe impl Sync for Adc<'_> {}

impl<'d> Adc<'d> {
    /// Create a driver over an already-mapped register window and apply
    /// `config`.
    ///
    /// `input_clock` is the rate of the clock feeding the converter and
    /// `reference_uv` the regulator's reference voltage in microvolts; both
    /// are acquired (and kept enabled) by the platform. A configuration
    /// fault is logged and leaves the affected field at its reset value,
    /// see [`configure`](Self::configure).
    pub fn new(
        regs: &'d AdcRegisters,
        input_clock: HertzU32,
        reference_uv: u32,
        config: Config,
    ) -> Self {
        let mut adc = Self {
            regs,
            config,
            input_clock,
            reference_uv,
            rates: [HertzU32::from_raw(0); 5],
            needs_calibration: AtomicBool::new(false),
            waiting: AtomicU8::new(IDLE),
            lock: Mutex::new(()),
            conversion: Signal::new(),
            calibration: Signal::new(),
            aborted: Signal::new(),
        };
        if adc.configure(config).is_err() {
            // Already logged; the divider falls back to its reset value.
        }
        adc
    }

    /// Translate `config` into register state.
    ///
    /// Runs the first two translation passes (clock/reference selection,
    /// then resolution/divider/averaging) and recomputes the sample-rate
    /// table. The third pass runs after calibration, from
    /// [`calibrate`](Self::calibrate).
    ///
    /// A fault is reported but not fatal: the offending field keeps its
    /// cleared value and every other field is still applied.
    pub fn configure(&mut self, config: Config) -> Result<(), ConfigError> {
        self.config = config;
        self.rates = sample_rates(self.input_clock, config.clock_divider);
        self.needs_calibration
            .store(config.calibrate, Ordering::SeqCst);

        self.cfg_post_set();
        self.sample_set()
    }

    /// First pass: clock source and reference selection.
    ///
    /// Low-power and high-speed conversion are forced on here so the
    /// upcoming self-calibration runs in that configuration; the final
    /// pass restores them for normal operation.
    fn cfg_post_set(&self) {
        match self.config.clock_source {
            ClockSource::Bus => {
                self.regs.cfg.modify(CFG::ADICLK::Bus);
                self.regs.gc.modify(GC::ADACKEN::CLEAR);
            }
            ClockSource::Alternate => {
                self.regs.cfg.modify(CFG::ADICLK::Alternate);
                self.regs.gc.modify(GC::ADACKEN::CLEAR);
            }
            ClockSource::AsyncClock => {
                // Keep the self-clocked oscillator running between
                // conversions so triggers do not wait for its startup.
                self.regs.cfg.modify(CFG::ADICLK::Adack);
                self.regs.gc.modify(GC::ADACKEN::SET);
            }
        }

        self.regs.cfg.modify(CFG::ADLPC::SET + CFG::ADHSC::SET);

        match self.config.reference {
            Reference::External => self.regs.cfg.modify(CFG::REFSEL::Vref),
            Reference::Alternate => self.regs.cfg.modify(CFG::REFSEL::Valt),
            Reference::Bandgap => self.regs.cfg.modify(CFG::REFSEL::Vbg),
        }

        self.regs
            .cfg
            .modify(CFG::OVWREN.val(self.config.overwrite as u32));
    }

    /// Second pass: resolution, divider, sample time and averaging.
    fn sample_set(&self) -> Result<(), ConfigError> {
        let mut result = Ok(());

        match self.config.resolution {
            Resolution::Bits8 => self.regs.cfg.modify(CFG::MODE::Bits8),
            Resolution::Bits10 => self.regs.cfg.modify(CFG::MODE::Bits10),
            Resolution::Bits12 => self.regs.cfg.modify(CFG::MODE::Bits12),
        }

        match self.config.clock_divider {
            ClockDivider::Div1 => self.regs.cfg.modify(CFG::ADIV::Div1),
            ClockDivider::Div2 => self.regs.cfg.modify(CFG::ADIV::Div2),
            ClockDivider::Div4 => self.regs.cfg.modify(CFG::ADIV::Div4),
            ClockDivider::Div8 => self.regs.cfg.modify(CFG::ADIV::Div8),
            ClockDivider::Div16 => {
                if self.config.clock_source == ClockSource::Bus {
                    // The bus clock's divide-by-two tap together with the
                    // divide-by-8 prescaler.
                    self.regs.cfg.modify(CFG::ADIV::Div8 + CFG::ADICLK::BusHalf);
                } else {
                    error!("divide-by-16 requires the bus clock");
                    self.regs.cfg.modify(CFG::ADIV::Div1);
                    result = Err(ConfigError::Divider16RequiresBusClock);
                }
            }
        }

        // Short sample time: no long-sample extension cycles.
        self.regs.cfg.modify(CFG::ADLSMP::CLEAR + CFG::ADSTS.val(0));

        match self.config.averaging {
            Averaging::Disabled => {
                self.regs.cfg.modify(CFG::AVGS::Samples4);
                self.regs.gc.modify(GC::AVGE::CLEAR);
            }
            Averaging::Samples4 => {
                // AVGS 0b00 encodes 4 samples; only AVGE distinguishes
                // 4-sample averaging from averaging off. The width field is
                // deliberately left cleared here.
                self.regs.cfg.modify(CFG::AVGS::Samples4);
                self.regs.gc.modify(GC::AVGE::SET);
            }
            Averaging::Samples8 => {
                self.regs.cfg.modify(CFG::AVGS::Samples8);
                self.regs.gc.modify(GC::AVGE::SET);
            }
            Averaging::Samples16 => {
                self.regs.cfg.modify(CFG::AVGS::Samples16);
                self.regs.gc.modify(GC::AVGE::SET);
            }
            Averaging::Samples32 => {
                self.regs.cfg.modify(CFG::AVGS::Samples32);
                self.regs.gc.modify(GC::AVGE::SET);
            }
        }

        result
    }

    /// Third pass: restore the calibration-time clocking bits for normal
    /// operation.
    fn cfg_set(&self) {
        self.regs
            .cfg
            .modify(CFG::ADLPC.val(self.config.low_power as u32));
        self.regs.cfg.modify(CFG::ADHSC::CLEAR);
    }

    /// Run the one-shot hardware self-calibration, then apply the final
    /// configuration pass.
    ///
    /// Only the first call after a [`configure`](Self::configure) with
    /// [`Config::calibrate`] set actually runs the handshake; it never
    /// re-runs, regardless of outcome. A failed or timed-out calibration is
    /// reported but leaves the driver fully usable (uncalibrated).
    pub async fn calibrate(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().await;

        let result = if self.needs_calibration.swap(false, Ordering::SeqCst) {
            self.run_calibration().await
        } else {
            Ok(())
        };

        self.cfg_set();
        result
    }

    async fn run_calibration(&self) -> Result<(), Error> {
        self.calibration.reset();
        self.waiting.store(CALIBRATION, Ordering::SeqCst);

        // Completion interrupt on, conversion parked: this trigger slot
        // state is what lets the handler tell calibration from a sample.
        self.regs.hc0.write(HC::AIEN::SET + HC::ADCH::Disabled);
        self.regs.gc.modify(GC::CAL::SET);

        let waited = with_timeout(PROTOCOL_TIMEOUT, self.calibration.wait()).await;
        self.waiting.store(IDLE, Ordering::SeqCst);

        if waited.is_err() {
            warn!("calibration timed out");
            return Err(Error::CalibrationTimeout);
        }

        if self.regs.gs.is_set(GS::CALF) {
            warn!("calibration failed");
            return Err(Error::CalibrationFailed);
        }

        debug!("calibration passed");
        Ok(())
    }

    /// Sample `channel` once and return the raw converted value, masked to
    /// the configured resolution.
    ///
    /// At most one conversion is in flight per device; concurrent callers
    /// wait their turn. The conversion is interrupt-signaled, bounded by a
    /// 100 ms timeout, and cancellable through [`abort`](Self::abort).
    ///
    /// # Panics
    ///
    /// If `channel` does not fit the 5-bit channel-select field (0x1f is
    /// the reserved disable value).
    pub async fn sample(&self, channel: u8) -> Result<u16, Error> {
        assert!(channel < 0x1f, "invalid ADC channel {}", channel);

        let _guard = self.lock.lock().await;

        // A previous conversion may have timed out after its interrupt
        // fired; never let that stale completion satisfy this request.
        self.conversion.reset();
        self.aborted.reset();
        self.waiting.store(CONVERSION, Ordering::SeqCst);

        self.regs
            .hc0
            .write(HC::AIEN::SET + HC::ADCH.val(channel as u32));

        let waited = with_timeout(
            PROTOCOL_TIMEOUT,
            select(self.conversion.wait(), self.aborted.wait()),
        )
        .await;
        self.waiting.store(IDLE, Ordering::SeqCst);

        match waited {
            Ok(Either::First(value)) => Ok(value),
            Ok(Either::Second(())) => Err(Error::Interrupted),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Cancel the wait of an in-flight [`sample`](Self::sample) call, which
    /// then returns [`Error::Interrupted`].
    ///
    /// Callable from any context. A no-op when nothing is waiting.
    pub fn abort(&self) {
        self.aborted.signal(());
    }

    /// The conversion scale as `(millivolts, resolution_bits)`.
    ///
    /// Fractional-log2 reading: one LSB is `millivolts / 2^resolution_bits`
    /// mV, kept as a (numerator, exponent) pair so the reporting path stays
    /// integer-only.
    pub fn scale(&self) -> (u32, u8) {
        (self.reference_uv / 1000, self.config.resolution.bits())
    }

    /// The achievable sample frequency under the configured divider and
    /// averaging depth.
    pub fn sample_frequency(&self) -> HertzU32 {
        self.rates[self.config.averaging.index()]
    }

    /// Completion interrupt entry point.
    ///
    /// The platform's handler for the converter's interrupt line calls this
    /// on every edge. Never blocks and never takes the device lock; safe to
    /// call when no conversion is outstanding.
    pub fn on_interrupt(&self) {
        if !self.regs.hs.is_set(HS::COCO0) {
            return;
        }

        // Reading R0 acknowledges COCO0 in hardware.
        let value = self.regs.r0.read(R::D) as u16 & self.config.resolution.mask();

        match self.waiting.load(Ordering::SeqCst) {
            CONVERSION => self.conversion.signal(value),
            CALIBRATION => self.calibration.signal(()),
            _ => trace!("spurious completion, value {}", value),
        }
    }
}
