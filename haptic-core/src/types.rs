//! Core Types für die Aktor-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use crate::logic;

/// Rumble-Effekt aus Sicht des Aufrufers
///
/// Zwei 16-Bit-Magnituden wie im Force-Feedback-Modell: der starke
/// Motorkanal dominiert, der schwache dient als Rückfallwert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RumbleRequest {
    pub strong_magnitude: u16,
    pub weak_magnitude: u16,
}

impl RumbleRequest {
    /// Erstellt einen Rumble-Effekt aus beiden Magnituden
    pub fn new(strong_magnitude: u16, weak_magnitude: u16) -> Self {
        Self {
            strong_magnitude,
            weak_magnitude,
        }
    }

    /// Der Geschwindigkeitswert, den der Effekt anfordert
    pub fn speed(&self) -> u8 {
        logic::rumble_speed(self.strong_magnitude, self.weak_magnitude)
    }
}

impl core::convert::TryFrom<&str> for RumbleRequest {
    type Error = ();

    /// Parst ein Kommando-Payload der Form `"<stark>,<schwach>"`
    ///
    /// Beide Werte dezimal; die schwache Magnitude darf fehlen und
    /// gilt dann als 0. `"0,0"` bzw. `"0"` stoppt den Aktor.
    fn try_from(payload: &str) -> Result<Self, Self::Error> {
        let payload = payload.trim();
        let (strong, weak) = match payload.split_once(',') {
            Some((s, w)) => (s, Some(w)),
            None => (payload, None),
        };

        let strong_magnitude = strong.trim().parse::<u16>().map_err(|_| ())?;
        let weak_magnitude = match weak {
            Some(w) => w.trim().parse::<u16>().map_err(|_| ())?,
            None => 0,
        };

        Ok(Self {
            strong_magnitude,
            weak_magnitude,
        })
    }
}

/// Momentaufnahme des Aktor-Zustands nach einem Worker-Durchlauf
///
/// Wird vom Vibrations-Task an alle Status-Abonnenten verteilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HapticStatus {
    pub speed: u8,
    pub duty_percent: u8,
    pub active: bool,
}

/// Konfiguration des Vibrators
///
/// Wird nur bei der Initialisierung gelesen, danach unveränderlich.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibratorConfig {
    /// PWM-Frequenz in Hertz
    pub frequency_hz: u32,
    /// Anfänglicher Duty-Cycle in Prozent
    pub duty_percent: u8,
}

impl Default for VibratorConfig {
    /// Referenzwerte des ISA1000-Designs: 25 kHz, 80 Prozent
    fn default() -> Self {
        Self {
            frequency_hz: 25_000,
            duty_percent: 80,
        }
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for RumbleRequest {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "RumbleRequest {{ strong: {=u16}, weak: {=u16} }}",
            self.strong_magnitude,
            self.weak_magnitude
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HapticStatus {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "HapticStatus {{ speed: {=u8}, duty: {=u8}%, active: {=bool} }}",
            self.speed,
            self.duty_percent,
            self.active
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VibratorConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "VibratorConfig {{ frequency: {=u32} Hz, duty: {=u8}% }}",
            self.frequency_hz,
            self.duty_percent
        )
    }
}
