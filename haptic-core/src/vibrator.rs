//! Aktor-Zustandsmaschine und Hardware-Ansteuerung
//!
//! Der `Vibrator` besitzt die beiden Hardware-Backends (PWM-Kanal und
//! Enable-Leitung) und führt Buch über den Soll-Zustand des Aktors.
//! Er kennt keine Nebenläufigkeit; die Serialisierung der Zugriffe
//! übernimmt der `HapticMotor`.

use crate::logic;
use crate::traits::{DriveError, EnablePin, PwmChannel};
use crate::types::{HapticStatus, VibratorConfig};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Zustandsmaschine des Haptik-Aktors
///
/// Pro physischem Gerät existiert genau eine Instanz; die Komposition
/// (main bzw. Testaufbau) stellt das sicher.
pub struct Vibrator<P, E> {
    pwm: P,
    enable_pin: E,
    frequency_hz: u32,
    duty_percent: u8,
    speed: u8,
    active: bool,
}

impl<P: PwmChannel, E: EnablePin> Vibrator<P, E> {
    /// Erstellt den Vibrator im Zustand "inaktiv"
    ///
    /// Die Konfiguration wird nur hier gelesen; Frequenz und
    /// Anfangs-Duty sind danach fest. Frequenz 0 würde in `drive`
    /// durch Null teilen und fällt deshalb auf den Referenzwert
    /// zurück; die Config-Felder sind öffentlich.
    pub fn new(pwm: P, enable_pin: E, config: VibratorConfig) -> Self {
        let frequency_hz = if config.frequency_hz == 0 {
            VibratorConfig::default().frequency_hz
        } else {
            config.frequency_hz
        };
        Self {
            pwm,
            enable_pin,
            frequency_hz,
            duty_percent: config.duty_percent,
            speed: 0,
            active: false,
        }
    }

    /// Programmiert die Hardware auf den gewünschten Zustand
    ///
    /// `on = true`: PWM-Timing aus Frequenz und Duty berechnen,
    /// konfigurieren, einschalten, erst danach die Enable-Leitung
    /// setzen. Schlägt ein PWM-Schritt fehl, bleibt die Enable-Leitung
    /// unten und der Fehler geht an den Aufrufer.
    ///
    /// `on = false`: Enable-Leitung zuerst weg, dann PWM aus. Dieser
    /// Pfad hat keinen Fehlerfall und läuft immer vollständig durch.
    ///
    /// Verändert `active` nicht; die Buchführung macht der Aufrufer.
    pub fn drive(&mut self, on: bool) -> Result<(), DriveError> {
        if on {
            let period_ns = NANOS_PER_SEC / u64::from(self.frequency_hz);
            let high_ns = period_ns * u64::from(self.duty_percent) / 100;
            self.pwm.configure(high_ns, period_ns)?;
            self.pwm.enable()?;
            self.enable_pin.set_enabled(true);
        } else {
            self.enable_pin.set_enabled(false);
            self.pwm.disable();
        }
        Ok(())
    }

    /// Verarbeitet einen angeforderten Geschwindigkeitswert
    ///
    /// Die Felder werden VOR dem Hardware-Zugriff auf den Soll-Zustand
    /// gesetzt. Schlägt der Zugriff fehl, bleibt der Soll-Zustand
    /// stehen und der nächste Effekt versucht es implizit erneut;
    /// Wiederholungen gibt es nicht.
    pub fn apply_speed(&mut self, speed: u8) -> Result<(), DriveError> {
        let (duty_percent, active) = logic::duty_for_speed(speed);
        self.speed = speed;
        self.duty_percent = duty_percent;
        self.active = active;
        self.drive(active)
    }

    /// Schaltet den Aktor ab, falls er aktiv ist (Close-Pfad)
    pub fn turn_off(&mut self) {
        if self.active {
            let _ = self.drive(false);
            self.active = false;
        }
    }

    /// Schaltet den Aktor bedingungslos ab (Standby-Pfad)
    ///
    /// Prüft `active` absichtlich nicht: doppeltes Abschalten ist
    /// harmlos, ein unterlassenes nicht.
    pub fn force_off(&mut self) {
        let _ = self.drive(false);
        self.active = false;
    }

    /// Momentaufnahme des aktuellen Zustands
    pub fn status(&self) -> HapticStatus {
        HapticStatus {
            speed: self.speed,
            duty_percent: self.duty_percent,
            active: self.active,
        }
    }

    /// true wenn der Aktor gerade angesteuert wird
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Aktueller Duty-Cycle in Prozent
    pub fn duty_percent(&self) -> u8 {
        self.duty_percent
    }

    /// Zuletzt verarbeiteter Geschwindigkeitswert
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Konfigurierte PWM-Frequenz in Hertz
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPwm {
        fail_configure: bool,
        fail_enable: bool,
    }

    impl TestPwm {
        fn working() -> Self {
            Self {
                fail_configure: false,
                fail_enable: false,
            }
        }
    }

    impl PwmChannel for TestPwm {
        fn configure(&mut self, _high_ns: u64, _period_ns: u64) -> Result<(), DriveError> {
            if self.fail_configure {
                Err(DriveError::PwmConfigFailed)
            } else {
                Ok(())
            }
        }

        fn enable(&mut self) -> Result<(), DriveError> {
            if self.fail_enable {
                Err(DriveError::PwmEnableFailed)
            } else {
                Ok(())
            }
        }

        fn disable(&mut self) {}
    }

    struct TestPin;

    impl EnablePin for TestPin {
        fn set_enabled(&mut self, _enabled: bool) {}
    }

    fn test_vibrator(pwm: TestPwm) -> Vibrator<TestPwm, TestPin> {
        Vibrator::new(pwm, TestPin, VibratorConfig::default())
    }

    #[test]
    fn test_new_starts_inactive_with_default_duty() {
        let vibrator = test_vibrator(TestPwm::working());
        assert!(!vibrator.is_active());
        assert_eq!(vibrator.duty_percent(), 80);
        assert_eq!(vibrator.speed(), 0);
        assert_eq!(vibrator.frequency_hz(), 25_000);
    }

    #[test]
    fn test_zero_frequency_falls_back_to_default() {
        let vibrator = Vibrator::new(
            TestPwm::working(),
            TestPin,
            VibratorConfig {
                frequency_hz: 0,
                duty_percent: 80,
            },
        );
        assert_eq!(vibrator.frequency_hz(), 25_000);
    }

    #[test]
    fn test_apply_speed_updates_state() {
        let mut vibrator = test_vibrator(TestPwm::working());
        assert_eq!(vibrator.apply_speed(85), Ok(()));
        assert!(vibrator.is_active());
        assert_eq!(vibrator.duty_percent(), 85);
        assert_eq!(vibrator.speed(), 85);
    }

    #[test]
    fn test_apply_speed_zero_parks_idle_duty() {
        let mut vibrator = test_vibrator(TestPwm::working());
        vibrator.apply_speed(90).unwrap();
        assert_eq!(vibrator.apply_speed(0), Ok(()));
        assert!(!vibrator.is_active());
        assert_eq!(vibrator.duty_percent(), logic::IDLE_DUTY_PERCENT);
    }

    #[test]
    fn test_configure_failure_keeps_desired_state() {
        let mut vibrator = test_vibrator(TestPwm {
            fail_configure: true,
            fail_enable: false,
        });
        assert_eq!(vibrator.apply_speed(10), Err(DriveError::PwmConfigFailed));
        // Soll-Zustand bleibt stehen, der nächste Effekt versucht es erneut
        assert!(vibrator.is_active());
        assert_eq!(vibrator.duty_percent(), logic::MIN_EFFECTIVE_DUTY_PERCENT);
    }

    #[test]
    fn test_enable_failure_reports_enable_error() {
        let mut vibrator = test_vibrator(TestPwm {
            fail_configure: false,
            fail_enable: true,
        });
        assert_eq!(vibrator.apply_speed(75), Err(DriveError::PwmEnableFailed));
    }

    #[test]
    fn test_turn_off_is_noop_when_inactive() {
        let mut vibrator = test_vibrator(TestPwm::working());
        vibrator.turn_off();
        assert!(!vibrator.is_active());
    }

    #[test]
    fn test_force_off_clears_active_flag() {
        let mut vibrator = test_vibrator(TestPwm::working());
        vibrator.apply_speed(100).unwrap();
        vibrator.force_off();
        assert!(!vibrator.is_active());
    }
}
