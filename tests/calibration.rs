//! The one-shot self-calibration handshake and its failure modes.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::*;
use embassy_futures::block_on;
use fugit::HertzU32;
use vf610_adc::{Adc, Config, Error};

const INPUT_CLOCK: HertzU32 = HertzU32::from_raw(66_000_000);
const VREF_UV: u32 = 3_300_000;

fn adc<'d>(hw: &'d FakeAdc, calibrate: bool) -> Adc<'d> {
    Adc::new(
        hw.regs(),
        INPUT_CLOCK,
        VREF_UV,
        Config {
            calibrate,
            ..Config::default()
        },
    )
}

#[test]
fn calibration_passes_and_applies_the_final_pass() {
    let hw = FakeAdc::new();
    let adc = adc(&hw, true);

    thread::scope(|s| {
        s.spawn(|| hw.serve_calibration(&adc, false));
        assert_eq!(block_on(adc.calibrate()), Ok(()));
    });

    // Normal-operation clocking restored: low power per config, high-speed
    // calibration bit cleared.
    let cfg = hw.peek(CFG);
    assert_ne!(cfg & CFG_ADLPC, 0);
    assert_eq!(cfg & CFG_ADHSC, 0);

    // One-shot: a second call must not wait for the hardware again.
    assert_eq!(block_on(adc.calibrate()), Ok(()));
}

#[test]
fn calibration_failure_is_reported_and_nonfatal() {
    let hw = FakeAdc::new();
    let adc = adc(&hw, true);

    thread::scope(|s| {
        s.spawn(|| hw.serve_calibration(&adc, true));
        assert_eq!(block_on(adc.calibrate()), Err(Error::CalibrationFailed));
    });

    // The flag is cleared regardless of outcome.
    assert_eq!(block_on(adc.calibrate()), Ok(()));

    // The device proceeds uncalibrated; sampling still works.
    thread::scope(|s| {
        s.spawn(|| hw.serve_conversions(&adc, &[0x456]));
        assert_eq!(block_on(adc.sample(1)), Ok(0x456));
    });
}

#[test]
fn calibration_times_out_without_interrupt() {
    let hw = FakeAdc::new();
    let adc = adc(&hw, true);

    let started = Instant::now();
    assert_eq!(block_on(adc.calibrate()), Err(Error::CalibrationTimeout));
    assert!(started.elapsed() >= Duration::from_millis(90));

    // Cleared on timeout too: no second handshake.
    assert_eq!(block_on(adc.calibrate()), Ok(()));
}

#[test]
fn calibration_skipped_when_not_requested() {
    let hw = FakeAdc::new();
    let adc = adc(&hw, false);

    let started = Instant::now();
    assert_eq!(block_on(adc.calibrate()), Ok(()));
    assert!(started.elapsed() < Duration::from_millis(90));

    // The final configuration pass still runs.
    assert_eq!(hw.peek(CFG) & CFG_ADHSC, 0);
}
