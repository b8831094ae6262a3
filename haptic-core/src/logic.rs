//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

/// Duty-Cycle im Leerlauf; wird gespeichert, aber nie ausgegeben,
/// weil der Aktor dabei abgeschaltet ist
pub const IDLE_DUTY_PERCENT: u8 = 50;

/// Untergrenze, unter der die Schwungmasse nicht sicher anläuft
pub const MIN_EFFECTIVE_DUTY_PERCENT: u8 = 70;

/// Obergrenze des Duty-Cycle
pub const MAX_DUTY_PERCENT: u8 = 100;

/// Extrahiert den Geschwindigkeitswert aus einem Rumble-Effekt
///
/// Die starke Magnitude dominiert. Liefert sie 0, wird auf die
/// schwache Magnitude ausgewichen, die nur mit halber Gewichtung
/// eingeht.
///
/// # Beispiele
///
/// ```
/// # use haptic_core::rumble_speed;
/// assert_eq!(rumble_speed(0x4600, 0), 70);
/// assert_eq!(rumble_speed(0, 0x2000), 16);
/// ```
pub fn rumble_speed(strong_magnitude: u16, weak_magnitude: u16) -> u8 {
    let speed = (strong_magnitude >> 8) as u8;
    if speed != 0 {
        speed
    } else {
        (weak_magnitude >> 9) as u8
    }
}

/// Bildet einen Geschwindigkeitswert auf Duty-Cycle und Soll-Zustand ab
///
/// Totale Funktion, jeder Eingabewert hat ein definiertes Ergebnis:
/// - `0`: Leerlauf-Duty, Aktor aus
/// - `1..70`: auf die Mindest-Duty angehoben, Aktor an
/// - `70..=100`: unverändert übernommen, Aktor an
/// - `> 100`: auf das Maximum begrenzt, Aktor an
///
/// # Beispiele
///
/// ```
/// # use haptic_core::duty_for_speed;
/// assert_eq!(duty_for_speed(0), (50, false));  // Leerlauf
/// assert_eq!(duty_for_speed(30), (70, true));  // angehoben
/// assert_eq!(duty_for_speed(85), (85, true));  // übernommen
/// assert_eq!(duty_for_speed(200), (100, true)); // begrenzt
/// ```
pub fn duty_for_speed(speed: u8) -> (u8, bool) {
    if speed == 0 {
        (IDLE_DUTY_PERCENT, false)
    } else if speed > MAX_DUTY_PERCENT {
        (MAX_DUTY_PERCENT, true)
    } else if speed < MIN_EFFECTIVE_DUTY_PERCENT {
        (MIN_EFFECTIVE_DUTY_PERCENT, true)
    } else {
        (speed, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_zero_is_idle() {
        assert_eq!(duty_for_speed(0), (IDLE_DUTY_PERCENT, false));
    }

    #[test]
    fn test_low_speed_raised_to_minimum() {
        assert_eq!(duty_for_speed(1), (70, true));
        assert_eq!(duty_for_speed(42), (70, true));
        assert_eq!(duty_for_speed(69), (70, true));
    }

    #[test]
    fn test_mid_range_passes_through() {
        assert_eq!(duty_for_speed(70), (70, true));
        assert_eq!(duty_for_speed(85), (85, true));
        assert_eq!(duty_for_speed(100), (100, true));
    }

    #[test]
    fn test_high_speed_clamped_to_maximum() {
        assert_eq!(duty_for_speed(101), (100, true));
        assert_eq!(duty_for_speed(128), (100, true));
        assert_eq!(duty_for_speed(255), (100, true));
    }

    #[test]
    fn test_mapping_is_total_and_in_range() {
        for speed in 0..=255u16 {
            let (duty, active) = duty_for_speed(speed as u8);
            assert!(duty <= MAX_DUTY_PERCENT);
            assert_eq!(active, speed != 0);
        }
    }

    #[test]
    fn test_strong_magnitude_dominates() {
        assert_eq!(rumble_speed(0x4600, 0xFFFF), 0x46);
    }

    #[test]
    fn test_weak_magnitude_as_fallback() {
        // Obere 8 Bit der starken Magnitude sind 0 -> schwache zählt
        assert_eq!(rumble_speed(0x00FF, 0x2000), 16);
        assert_eq!(rumble_speed(0, 0xFFFF), 127);
    }

    #[test]
    fn test_zero_effect_gives_zero_speed() {
        assert_eq!(rumble_speed(0, 0), 0);
    }
}
