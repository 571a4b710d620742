//! In-memory stand-in for the ADC register window plus threads playing the
//! part of the hardware and its interrupt line.

#![allow(dead_code)]

use core::cell::UnsafeCell;
use core::ptr;
use std::thread;
use std::time::{Duration, Instant};

use vf610_adc::{Adc, AdcRegisters};

// Register word indices inside the window.
pub const HC0: usize = 0;
pub const HS: usize = 2;
pub const R0: usize = 3;
pub const CFG: usize = 5;
pub const GC: usize = 6;
pub const GS: usize = 7;

// Bits the fake hardware cares about.
pub const HC_AIEN: u32 = 1 << 7;
pub const HC_ADCH_MASK: u32 = 0x1f;
pub const HC_ADCH_DISABLED: u32 = 0x1f;
pub const HS_COCO0: u32 = 1;
pub const GC_CAL: u32 = 1 << 7;
pub const GS_CALF: u32 = 1 << 1;

// CFG bits, for asserting translation results.
pub const CFG_ADICLK_MASK: u32 = 0x3;
pub const CFG_ADICLK_BUS_HALF: u32 = 1;
pub const CFG_ADICLK_ALT: u32 = 2;
pub const CFG_ADICLK_ADACK: u32 = 3;
pub const CFG_MODE_MASK: u32 = 0x3 << 2;
pub const CFG_MODE_BITS12: u32 = 2 << 2;
pub const CFG_ADLSMP: u32 = 1 << 4;
pub const CFG_ADIV_MASK: u32 = 0x3 << 5;
pub const CFG_ADIV_DIV8: u32 = 3 << 5;
pub const CFG_ADLPC: u32 = 1 << 7;
pub const CFG_ADSTS_MASK: u32 = 0x3 << 8;
pub const CFG_ADHSC: u32 = 1 << 10;
pub const CFG_REFSEL_MASK: u32 = 0x3 << 11;
pub const CFG_REFSEL_VBG: u32 = 2 << 11;
pub const CFG_AVGS_MASK: u32 = 0x3 << 14;
pub const CFG_AVGS_32: u32 = 3 << 14;
pub const CFG_OVWREN: u32 = 1 << 16;
pub const GC_ADACKEN: u32 = 1 << 3;
pub const GC_AVGE: u32 = 1 << 5;

const WINDOW_WORDS: usize = 11;
const TRIGGER_DEADLINE: Duration = Duration::from_secs(2);
const POLL: Duration = Duration::from_micros(500);

/// Backing memory for one [`AdcRegisters`] window.
pub struct FakeAdc {
    mem: [UnsafeCell<u32>; WINDOW_WORDS],
}

// Accessed from the driver (volatile, via the register types) and from the
// fake-hardware threads (volatile, via `peek`/`poke`).
unsafe impl Sync for FakeAdc {}

impl FakeAdc {
    pub fn new() -> Self {
        Self {
            mem: [const { UnsafeCell::new(0) }; WINDOW_WORDS],
        }
    }

    pub fn regs(&self) -> &AdcRegisters {
        unsafe { &*(self.mem.as_ptr() as *const AdcRegisters) }
    }

    pub fn peek(&self, reg: usize) -> u32 {
        unsafe { ptr::read_volatile(self.mem[reg].get()) }
    }

    pub fn poke(&self, reg: usize, value: u32) {
        unsafe { ptr::write_volatile(self.mem[reg].get(), value) }
    }

    /// Busy-wait until a conversion trigger lands in HC0, then consume it.
    /// Returns the triggered channel.
    pub fn wait_trigger(&self) -> u32 {
        let deadline = Instant::now() + TRIGGER_DEADLINE;
        loop {
            let hc0 = self.peek(HC0);
            if hc0 & HC_AIEN != 0 && hc0 & HC_ADCH_MASK != HC_ADCH_DISABLED {
                self.poke(HC0, HC_ADCH_DISABLED);
                return hc0 & HC_ADCH_MASK;
            }
            assert!(Instant::now() < deadline, "no conversion trigger arrived");
            thread::sleep(POLL);
        }
    }

    /// Complete the outstanding conversion with `value` and raise the
    /// interrupt line.
    pub fn complete_conversion(&self, adc: &Adc<'_>, value: u32) {
        self.poke(R0, value);
        self.poke(HS, HS_COCO0);
        adc.on_interrupt();
        self.poke(HS, 0);
    }

    /// Serve `values` to successive conversion triggers, in order.
    pub fn serve_conversions(&self, adc: &Adc<'_>, values: &[u32]) {
        for &value in values {
            self.wait_trigger();
            self.complete_conversion(adc, value);
        }
    }

    /// Wait for the calibration-start bit, run the handshake and raise the
    /// interrupt line. `fail` sets the calibration-failed status flag.
    pub fn serve_calibration(&self, adc: &Adc<'_>, fail: bool) {
        let deadline = Instant::now() + TRIGGER_DEADLINE;
        while self.peek(GC) & GC_CAL == 0 {
            assert!(Instant::now() < deadline, "calibration was never started");
            thread::sleep(POLL);
        }

        self.poke(GS, if fail { GS_CALF } else { 0 });
        self.poke(GC, self.peek(GC) & !GC_CAL);
        self.poke(HS, HS_COCO0);
        adc.on_interrupt();
        self.poke(HS, 0);
    }
}
