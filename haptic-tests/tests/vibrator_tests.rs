//! Integration Tests für die Aktor-Zustandsmaschine
//!
//! Diese Tests laufen auf dem Host (x86_64) und prüfen mit einem
//! aufzeichnenden Mock-Backend, dass der Vibrator die Hardware in der
//! richtigen Reihenfolge programmiert.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use haptic_core::{DriveError, EnablePin, PwmChannel, Vibrator, VibratorConfig};

// ============================================================================
// Recording Hardware Mocks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Configure { high_ns: u64, period_ns: u64 },
    Enable,
    Disable,
    Line(bool),
}

/// Gemeinsames Protokoll beider Backends, damit die Reihenfolge
/// über PWM- und GPIO-Aufrufe hinweg sichtbar bleibt
#[derive(Default)]
pub struct HwLog {
    calls: RefCell<Vec<HwCall>>,
    pub fail_configure: Cell<bool>,
    pub fail_enable: Cell<bool>,
}

impl HwLog {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

pub struct RecordingPwm(pub Rc<HwLog>);

impl PwmChannel for RecordingPwm {
    fn configure(&mut self, high_ns: u64, period_ns: u64) -> Result<(), DriveError> {
        if self.0.fail_configure.get() {
            return Err(DriveError::PwmConfigFailed);
        }
        self.0
            .calls
            .borrow_mut()
            .push(HwCall::Configure { high_ns, period_ns });
        Ok(())
    }

    fn enable(&mut self) -> Result<(), DriveError> {
        if self.0.fail_enable.get() {
            return Err(DriveError::PwmEnableFailed);
        }
        self.0.calls.borrow_mut().push(HwCall::Enable);
        Ok(())
    }

    fn disable(&mut self) {
        self.0.calls.borrow_mut().push(HwCall::Disable);
    }
}

pub struct RecordingPin(pub Rc<HwLog>);

impl EnablePin for RecordingPin {
    fn set_enabled(&mut self, enabled: bool) {
        self.0.calls.borrow_mut().push(HwCall::Line(enabled));
    }
}

fn vibrator_with_log() -> (Vibrator<RecordingPwm, RecordingPin>, Rc<HwLog>) {
    let log = HwLog::new();
    let vibrator = Vibrator::new(
        RecordingPwm(log.clone()),
        RecordingPin(log.clone()),
        VibratorConfig::default(),
    );
    (vibrator, log)
}

// ============================================================================
// Tests: Einschalt-Reihenfolge und PWM-Timing
// ============================================================================

#[test]
fn test_drive_on_configures_before_enable_line() {
    let (mut vibrator, log) = vibrator_with_log();

    vibrator.apply_speed(80).unwrap();

    assert_eq!(
        log.calls(),
        vec![
            HwCall::Configure {
                high_ns: 32_000,
                period_ns: 40_000
            },
            HwCall::Enable,
            HwCall::Line(true),
        ]
    );
}

#[test]
fn test_period_math_at_25_khz() {
    // Szenario A: speed 70 → duty 70, High-Zeit = 70% der 40 µs Periode
    let (mut vibrator, log) = vibrator_with_log();

    vibrator.apply_speed(70).unwrap();

    assert_eq!(
        log.calls()[0],
        HwCall::Configure {
            high_ns: 28_000,
            period_ns: 40_000
        }
    );
}

#[test]
fn test_period_math_follows_configured_frequency() {
    let log = HwLog::new();
    let mut vibrator = Vibrator::new(
        RecordingPwm(log.clone()),
        RecordingPin(log.clone()),
        VibratorConfig {
            frequency_hz: 20_000,
            duty_percent: 80,
        },
    );

    vibrator.apply_speed(100).unwrap();

    assert_eq!(
        log.calls()[0],
        HwCall::Configure {
            high_ns: 50_000,
            period_ns: 50_000
        }
    );
}

#[test]
fn test_zero_frequency_config_drives_at_default_period() {
    // Frequenz 0 in der Config darf nicht bis in die Perioden-Division
    // durchschlagen; der Vibrator fällt auf 25 kHz zurück
    let log = HwLog::new();
    let mut vibrator = Vibrator::new(
        RecordingPwm(log.clone()),
        RecordingPin(log.clone()),
        VibratorConfig {
            frequency_hz: 0,
            duty_percent: 80,
        },
    );

    vibrator.apply_speed(100).unwrap();

    assert_eq!(
        log.calls()[0],
        HwCall::Configure {
            high_ns: 40_000,
            period_ns: 40_000
        }
    );
}

#[test]
fn test_initial_duty_used_before_first_effect() {
    // drive(true) ohne vorherigen Effekt nutzt den Anfangs-Duty (80%)
    let (mut vibrator, log) = vibrator_with_log();

    vibrator.drive(true).unwrap();

    assert_eq!(
        log.calls()[0],
        HwCall::Configure {
            high_ns: 32_000,
            period_ns: 40_000
        }
    );
}

// ============================================================================
// Tests: Abschalt-Reihenfolge und Idempotenz
// ============================================================================

#[test]
fn test_drive_off_deasserts_line_before_pwm_disable() {
    let (mut vibrator, log) = vibrator_with_log();
    vibrator.apply_speed(80).unwrap();
    log.clear();

    vibrator.apply_speed(0).unwrap();

    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
    assert!(!vibrator.is_active());
    assert_eq!(vibrator.duty_percent(), 50);
}

#[test]
fn test_turn_off_skips_hardware_when_inactive() {
    let (mut vibrator, log) = vibrator_with_log();

    vibrator.turn_off();

    assert!(log.calls().is_empty());
    assert!(!vibrator.is_active());
}

#[test]
fn test_force_off_is_idempotent() {
    let (mut vibrator, log) = vibrator_with_log();
    vibrator.apply_speed(90).unwrap();
    log.clear();

    vibrator.force_off();
    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
    assert!(!vibrator.is_active());

    // Doppeltes Abschalten ist harmlos und läuft vollständig durch
    log.clear();
    vibrator.force_off();
    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
}

// ============================================================================
// Tests: Fehlerinjektion
// ============================================================================

#[test]
fn test_configure_failure_keeps_enable_line_down() {
    let (mut vibrator, log) = vibrator_with_log();
    log.fail_configure.set(true);

    let result = vibrator.apply_speed(75);

    assert_eq!(result, Err(DriveError::PwmConfigFailed));
    assert!(!log.calls().contains(&HwCall::Line(true)));
    // Optimistische Buchführung: der Soll-Zustand bleibt stehen
    assert!(vibrator.is_active());
    assert_eq!(vibrator.duty_percent(), 75);
}

#[test]
fn test_enable_failure_keeps_enable_line_down() {
    let (mut vibrator, log) = vibrator_with_log();
    log.fail_enable.set(true);

    let result = vibrator.apply_speed(75);

    assert_eq!(result, Err(DriveError::PwmEnableFailed));
    // configure lief durch, aber die Leitung blieb unten
    assert!(
        log.calls()
            .iter()
            .any(|c| matches!(c, HwCall::Configure { .. }))
    );
    assert!(!log.calls().contains(&HwCall::Line(true)));
}

#[test]
fn test_next_effect_retries_after_failure() {
    let (mut vibrator, log) = vibrator_with_log();
    log.fail_configure.set(true);
    assert!(vibrator.apply_speed(75).is_err());

    // Fehler behoben: der nächste Effekt programmiert die Hardware normal
    log.fail_configure.set(false);
    log.clear();
    vibrator.apply_speed(75).unwrap();

    assert_eq!(
        log.calls(),
        vec![
            HwCall::Configure {
                high_ns: 30_000,
                period_ns: 40_000
            },
            HwCall::Enable,
            HwCall::Line(true),
        ]
    );
}
