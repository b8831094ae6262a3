//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Hardware-Zugriff
//! ohne konkrete Implementierung.

/// Fehler-Typ für die Aktor-Ansteuerung
///
/// Beide Varianten stammen aus dem PWM-Backend und sind für den
/// Treiberkern nicht fatal: der Worker loggt und macht weiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveError {
    /// High-Zeit/Periode konnten nicht programmiert werden
    PwmConfigFailed,
    /// PWM-Ausgang konnte nicht eingeschaltet werden
    PwmEnableFailed,
}

/// Trait für den PWM-Kanal, der den Treiber-Chip taktet
///
/// Timing wird in Nanosekunden übergeben; die Umrechnung auf
/// Hardware-Register ist Sache der Implementierung.
///
/// # Implementierungen
/// - **Production:** LedcPwm (ESP32 LEDC Peripheral)
/// - **Testing:** RecordingPwm (in-memory Mock)
pub trait PwmChannel {
    /// Programmiert High-Zeit und Periode in Nanosekunden
    ///
    /// # Fehlerbehandlung
    /// Gibt `DriveError::PwmConfigFailed` zurück wenn das Backend
    /// das Timing nicht übernehmen kann
    fn configure(&mut self, high_ns: u64, period_ns: u64) -> Result<(), DriveError>;

    /// Schaltet den PWM-Ausgang ein
    ///
    /// # Fehlerbehandlung
    /// Gibt `DriveError::PwmEnableFailed` zurück wenn das Backend
    /// den Ausgang nicht aktivieren kann
    fn enable(&mut self) -> Result<(), DriveError>;

    /// Schaltet den PWM-Ausgang aus
    ///
    /// Kein Fehlerpfad: Abschalten muss immer durchlaufen.
    fn disable(&mut self);
}

/// Trait für die Enable-Leitung des Treiber-Chips
///
/// Ein digitaler Ausgang, der die Endstufe des ISA1000 freischaltet.
/// Write-only, kein Read-back nötig.
pub trait EnablePin {
    /// Setzt die Enable-Leitung (true = Endstufe aktiv)
    fn set_enabled(&mut self, enabled: bool);
}

// ============================================================
// defmt Support (optional)
// ============================================================

#[cfg(feature = "defmt")]
impl defmt::Format for DriveError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DriveError::PwmConfigFailed => defmt::write!(fmt, "PwmConfigFailed"),
            DriveError::PwmEnableFailed => defmt::write!(fmt, "PwmEnableFailed"),
        }
    }
}
