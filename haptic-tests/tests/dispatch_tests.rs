//! Integration Tests für Effekt-Annahme und Single-Flight-Dispatch
//!
//! Diese Tests laufen auf dem Host (x86_64) und treiben den asynchronen
//! Worker deterministisch: `block_on` für Einheiten, die sofort fertig
//! werden, manuelles Polling für die Handshakes von Close und Standby.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::{Pin, pin};
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

use haptic_core::{
    DriveError, EnablePin, HapticMotor, MotorEvent, MotorWorker, PwmChannel, RumbleRequest,
    Vibrator, VibratorConfig,
};

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

#[derive(Default)]
pub struct HwLog {
    calls: RefCell<Vec<HwCall>>,
    pub fail_configure: Cell<bool>,
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

    pub fn configure_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, HwCall::Configure { .. }))
            .count()
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

// ============================================================================
// Test-Aufbau
// ============================================================================

type TestMotor = HapticMotor<NoopRawMutex>;

fn test_setup() -> (TestMotor, Vibrator<RecordingPwm, RecordingPin>, Rc<HwLog>) {
    let log = HwLog::new();
    let vibrator = Vibrator::new(
        RecordingPwm(log.clone()),
        RecordingPin(log.clone()),
        VibratorConfig::default(),
    );
    (TestMotor::new(), vibrator, log)
}

/// Pollt ein Future genau einmal, ohne echten Executor
fn poll_step<F: Future>(fut: &mut Pin<&mut F>) -> Poll<F::Output> {
    fut.as_mut().poll(&mut Context::from_waker(Waker::noop()))
}

// ============================================================================
// Tests: Single-Flight und Last-Write-Wins
// ============================================================================

#[test]
fn test_rapid_submits_yield_one_unit_with_last_speed() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    // Drei Anforderungen, bevor der Worker überhaupt läuft
    motor.submit(RumbleRequest::new(0x2000, 0)); // speed 32
    motor.submit(RumbleRequest::new(0x5500, 0)); // speed 85
    motor.submit(RumbleRequest::new(0x6400, 0)); // speed 100

    let event = block_on(worker.run_once());
    match event {
        MotorEvent::Applied(status) => {
            assert_eq!(status.speed, 100);
            assert_eq!(status.duty_percent, 100);
            assert!(status.active);
        }
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }

    // Genau ein Hardware-Durchlauf, nicht drei
    assert_eq!(log.configure_count(), 1);

    // Keine weitere Einheit ausstehend
    let mut next = pin!(worker.run_once());
    assert!(poll_step(&mut next).is_pending());
}

#[test]
fn test_submit_never_blocks_without_worker() {
    let (motor, _vibrator, _log) = test_setup();

    // Niemand konsumiert; die Annahme darf trotzdem nicht hängen
    for speed in 0..50u16 {
        motor.submit(RumbleRequest::new(speed << 8, 0));
    }
    assert!(motor.has_pending());
}

// ============================================================================
// Tests: Close-Pfad
// ============================================================================

#[test]
fn test_close_waits_for_worker_and_quiesces_device() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    // Aktor anwerfen
    motor.submit(RumbleRequest::new(0x5A00, 0)); // speed 90
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));

    // Eine weitere Anforderung bleibt unverarbeitet liegen
    motor.submit(RumbleRequest::new(0x6400, 0));
    log.clear();

    // close() kehrt erst zurück, wenn der Worker abgeschaltet hat
    {
        let mut close_fut = pin!(motor.close());
        assert!(poll_step(&mut close_fut).is_pending());

        let event = block_on(worker.run_once());
        assert!(matches!(event, MotorEvent::Closed(_)));
        assert!(poll_step(&mut close_fut).is_ready());
    }

    // Abschalt-Sequenz lief, die verworfene Anforderung nicht
    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
    assert!(!motor.has_pending());

    // Nach close(): kein Hardware-Zugriff mehr bis zum nächsten Effekt
    log.clear();
    {
        let mut idle = pin!(worker.run_once());
        assert!(poll_step(&mut idle).is_pending());
    }
    assert!(log.calls().is_empty());

    // Ein neuer Effekt weckt das Gerät wieder
    motor.submit(RumbleRequest::new(0x4600, 0));
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));
    assert_eq!(log.configure_count(), 1);
}

#[test]
fn test_close_on_inactive_device_is_silent() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    let mut close_fut = pin!(motor.close());
    assert!(poll_step(&mut close_fut).is_pending());
    assert!(matches!(block_on(worker.run_once()), MotorEvent::Closed(_)));
    assert!(poll_step(&mut close_fut).is_ready());

    // Inaktiv geschlossen: keine Hardware-Zugriffe
    assert!(log.calls().is_empty());
}

// ============================================================================
// Tests: Standby-Pfad (Szenario D)
// ============================================================================

#[test]
fn test_standby_forces_hardware_off_while_active() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    motor.submit(RumbleRequest::new(0x5A00, 0)); // speed 90
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));
    log.clear();

    let mut suspend_fut = pin!(motor.suspend());
    assert!(poll_step(&mut suspend_fut).is_pending());
    let event = block_on(worker.run_once());
    assert!(poll_step(&mut suspend_fut).is_ready());

    match event {
        MotorEvent::Standby(status) => assert!(!status.active),
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }
    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
}

#[test]
fn test_standby_keeps_pending_request() {
    // Dokumentiertes Rennen des Originals: eine vor dem Standby
    // angenommene Anforderung überlebt und wirft den Aktor wieder an.
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    motor.submit(RumbleRequest::new(0x5A00, 0)); // speed 90
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));

    // Neue Anforderung liegt an, dann kommt der Standby
    motor.submit(RumbleRequest::new(0x5000, 0)); // speed 80

    let mut suspend_fut = pin!(motor.suspend());
    assert!(poll_step(&mut suspend_fut).is_pending());
    // Lebenszyklus hat Vorrang: der Worker verarbeitet den Standby zuerst
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Standby(_)
    ));
    assert!(poll_step(&mut suspend_fut).is_ready());

    // Die Anforderung wurde nicht verworfen
    assert!(motor.has_pending());

    // ... und reaktiviert den Aktor in der nächsten Einheit
    log.clear();
    match block_on(worker.run_once()) {
        MotorEvent::Applied(status) => {
            assert!(status.active);
            assert_eq!(status.speed, 80);
        }
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }
    assert!(log.calls().contains(&HwCall::Line(true)));
}

#[test]
fn test_standby_on_inactive_device_still_drives_off() {
    // suspend() prüft active absichtlich nicht: die Abschalt-Sequenz
    // läuft auch auf einem inaktiven Gerät vollständig durch
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    let mut suspend_fut = pin!(motor.suspend());
    assert!(poll_step(&mut suspend_fut).is_pending());
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Standby(_)
    ));
    assert!(poll_step(&mut suspend_fut).is_ready());

    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
}

// ============================================================================
// Tests: Szenarien A-C
// ============================================================================

#[test]
fn test_scenario_a_boundary_speed_70() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    motor.submit(RumbleRequest::new(0x4600, 0)); // speed 0x46 = 70

    match block_on(worker.run_once()) {
        MotorEvent::Applied(status) => {
            assert_eq!(status.speed, 70);
            assert_eq!(status.duty_percent, 70);
            assert!(status.active);
        }
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }
    assert_eq!(
        log.calls()[0],
        HwCall::Configure {
            high_ns: 28_000,
            period_ns: 40_000
        }
    );
}

#[test]
fn test_scenario_b_zero_effect_parks_idle() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    motor.submit(RumbleRequest::new(0x5A00, 0));
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));
    log.clear();

    motor.submit(RumbleRequest::new(0, 0));
    match block_on(worker.run_once()) {
        MotorEvent::Applied(status) => {
            assert!(!status.active);
            assert_eq!(status.duty_percent, 50);
        }
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }
    assert_eq!(log.calls(), vec![HwCall::Line(false), HwCall::Disable]);
}

#[test]
fn test_scenario_c_overspeed_clamps_to_100() {
    let (motor, vibrator, _log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);

    motor.submit(RumbleRequest::new(0x8000, 0)); // speed 128

    match block_on(worker.run_once()) {
        MotorEvent::Applied(status) => {
            assert_eq!(status.speed, 128);
            assert_eq!(status.duty_percent, 100);
            assert!(status.active);
        }
        other => panic!("unerwartetes Ergebnis: {:?}", other),
    }
}

#[test]
fn test_worker_reports_failure_and_recovers() {
    let (motor, vibrator, log) = test_setup();
    let mut worker = MotorWorker::new(&motor, vibrator);
    log.fail_configure.set(true);

    motor.submit(RumbleRequest::new(0x5A00, 0));
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Failed(DriveError::PwmConfigFailed)
    ));
    assert!(!log.calls().contains(&HwCall::Line(true)));

    // Der nächste Effekt versucht es implizit erneut
    log.fail_configure.set(false);
    motor.submit(RumbleRequest::new(0x5A00, 0));
    assert!(matches!(
        block_on(worker.run_once()),
        MotorEvent::Applied(_)
    ));
    assert!(log.calls().contains(&HwCall::Line(true)));
}

// ============================================================================
// Tests: Kommando-Payload ("<stark>,<schwach>")
// ============================================================================

#[test]
fn test_rumble_payload_with_both_magnitudes() {
    let request = RumbleRequest::try_from("17920,0").unwrap();
    assert_eq!(request.strong_magnitude, 17920);
    assert_eq!(request.weak_magnitude, 0);
    assert_eq!(request.speed(), 70);
}

#[test]
fn test_rumble_payload_weak_optional() {
    let request = RumbleRequest::try_from("256").unwrap();
    assert_eq!(request.strong_magnitude, 256);
    assert_eq!(request.weak_magnitude, 0);
    assert_eq!(request.speed(), 1);
}

#[test]
fn test_rumble_payload_tolerates_whitespace() {
    let request = RumbleRequest::try_from(" 17920 , 512 ").unwrap();
    assert_eq!(request.strong_magnitude, 17920);
    assert_eq!(request.weak_magnitude, 512);
}

#[test]
fn test_rumble_payload_zero_stops() {
    let request = RumbleRequest::try_from("0,0").unwrap();
    assert_eq!(request.speed(), 0);
}

#[test]
fn test_rumble_payload_rejects_garbage() {
    assert!(RumbleRequest::try_from("").is_err());
    assert!(RumbleRequest::try_from("volle Kraft").is_err());
    assert!(RumbleRequest::try_from("70000,0").is_err());
    assert!(RumbleRequest::try_from("1,2,3").is_err());
}
