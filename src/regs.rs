//! Register model of the vf610/i.MX6ULL SAR ADC block.
//!
//! All peripheral access goes through the typed fields below; nothing else
//! in the crate does address arithmetic.

use tock_registers::{
    register_bitfields,
    registers::{ReadOnly, ReadWrite},
};

register_bitfields![u32,
    /// Hardware trigger/channel select (HC0, HC1).
    pub HC [
        /// Input channel select. Writing a valid channel starts a
        /// conversion; `Disabled` parks the trigger slot.
        ADCH OFFSET(0) NUMBITS(5) [
            Disabled = 0x1f
        ],
        /// Conversion-complete interrupt enable.
        AIEN OFFSET(7) NUMBITS(1) []
    ],

    /// Hardware status.
    pub HS [
        /// Conversion complete for trigger slot 0. Cleared by reading R0.
        COCO0 OFFSET(0) NUMBITS(1) [],
        COCO1 OFFSET(1) NUMBITS(1) []
    ],

    /// Conversion result (R0, R1).
    pub R [
        D OFFSET(0) NUMBITS(12) []
    ],

    /// Configuration.
    pub CFG [
        /// Input clock select.
        ADICLK OFFSET(0) NUMBITS(2) [
            Bus = 0,
            /// Bus clock divided by two. Combined with `ADIV::Div8` this is
            /// the only way to reach an overall divide-by-16.
            BusHalf = 1,
            Alternate = 2,
            /// Asynchronous self-clocked mode (ADACK).
            Adack = 3
        ],
        /// Conversion resolution.
        MODE OFFSET(2) NUMBITS(2) [
            Bits8 = 0,
            Bits10 = 1,
            Bits12 = 2
        ],
        /// Long sample time enable.
        ADLSMP OFFSET(4) NUMBITS(1) [],
        /// Clock divide select.
        ADIV OFFSET(5) NUMBITS(2) [
            Div1 = 0,
            Div2 = 1,
            Div4 = 2,
            Div8 = 3
        ],
        /// Low-power configuration.
        ADLPC OFFSET(7) NUMBITS(1) [],
        /// Additional sample-time cycles when `ADLSMP` is set.
        ADSTS OFFSET(8) NUMBITS(2) [],
        /// High-speed conversion enable.
        ADHSC OFFSET(10) NUMBITS(1) [],
        /// Voltage reference select.
        REFSEL OFFSET(11) NUMBITS(2) [
            Vref = 0,
            Valt = 1,
            Vbg = 2
        ],
        /// Trigger select (software vs. hardware).
        ADTRG OFFSET(13) NUMBITS(1) [],
        /// Hardware average width select. Only meaningful while `GC::AVGE`
        /// is set; 0b00 encodes 4 samples.
        AVGS OFFSET(14) NUMBITS(2) [
            Samples4 = 0,
            Samples8 = 1,
            Samples16 = 2,
            Samples32 = 3
        ],
        /// Overwrite a pending, unread result with a new one.
        OVWREN OFFSET(16) NUMBITS(1) []
    ],

    /// General control.
    pub GC [
        /// Asynchronous clock output enable (keeps ADACK running).
        ADACKEN OFFSET(3) NUMBITS(1) [],
        /// Hardware average enable.
        AVGE OFFSET(5) NUMBITS(1) [],
        /// Continuous conversion enable.
        ADCO OFFSET(6) NUMBITS(1) [],
        /// Start of self-calibration. Cleared by hardware on completion.
        CAL OFFSET(7) NUMBITS(1) []
    ],

    /// General status.
    pub GS [
        /// A conversion (or calibration) is in progress.
        ADACT OFFSET(0) NUMBITS(1) [],
        /// The last self-calibration failed.
        CALF OFFSET(1) NUMBITS(1) [],
        AWKST OFFSET(2) NUMBITS(1) []
    ],
];

/// The ADC register window.
///
/// The platform maps this at the peripheral base address (for example
/// `0x4003_b000` for ADC0 on the vf610) and hands the driver a reference:
///
/// ```rust,ignore
/// let regs = unsafe { &*(0x4003_b000 as *const AdcRegisters) };
/// ```
#[repr(C)]
pub struct AdcRegisters {
    /// 0x00: trigger slot 0 control.
    pub hc0: ReadWrite<u32, HC::Register>,
    /// 0x04: trigger slot 1 control (unused by this driver).
    pub hc1: ReadWrite<u32, HC::Register>,
    /// 0x08: status.
    pub hs: ReadOnly<u32, HS::Register>,
    /// 0x0c: trigger slot 0 result.
    pub r0: ReadOnly<u32, R::Register>,
    /// 0x10: trigger slot 1 result (unused by this driver).
    pub r1: ReadOnly<u32, R::Register>,
    /// 0x14: configuration.
    pub cfg: ReadWrite<u32, CFG::Register>,
    /// 0x18: general control.
    pub gc: ReadWrite<u32, GC::Register>,
    /// 0x1c: general status.
    pub gs: ReadOnly<u32, GS::Register>,
    /// 0x20: compare value (compare function is not driven by this crate).
    pub cv: ReadWrite<u32>,
    /// 0x24: offset correction.
    pub ofs: ReadWrite<u32>,
    /// 0x28: calibration value.
    pub cal: ReadWrite<u32>,
}
