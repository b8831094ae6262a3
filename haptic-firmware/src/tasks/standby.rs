// Standby-Task - BOOT-Taste als Power-Management-Hook
use defmt::info;
use embassy_time::{Duration, Timer};
use esp_hal::gpio::{Input, InputConfig, Pull};

use crate::Motor;
use crate::config::STANDBY_DEBOUNCE_MS;

/// Standby-Task - schaltet den Aktor auf Tastendruck bedingungslos ab
///
/// Die BOOT-Taste (GPIO9) übernimmt die Rolle des Suspend-Hooks: ein
/// Druck legt den Aktor still, egal ob er gerade läuft. Eine noch nicht
/// verarbeitete Effekt-Anforderung bleibt dabei absichtlich bestehen und
/// kann den Aktor danach wieder anwerfen; der nächste Effekt beendet den
/// Standby ohnehin.
///
/// `suspend()` kehrt erst zurück, wenn der Worker die Hardware wirklich
/// abgeschaltet hat.
///
/// # Parameter
/// - `pin`: GPIO9 Peripheral (BOOT-Taste, aktiv Low)
/// - `motor`: geteilte Annahmestelle
#[embassy_executor::task]
pub async fn standby_task(pin: esp_hal::peripherals::GPIO9<'static>, motor: &'static Motor) {
    let mut button = Input::new(pin, InputConfig::default().with_pull(Pull::Up));

    info!("Standby: Taste aktiv (BOOT/GPIO9)");

    loop {
        button.wait_for_falling_edge().await;

        // Entprellen: nur echte Tastendrücke zählen
        Timer::after(Duration::from_millis(STANDBY_DEBOUNCE_MS)).await;
        if button.is_low() {
            info!("Standby: Taste gedrückt, Aktor wird abgeschaltet");
            motor.suspend().await;
            info!("Standby: Aktor ist aus");
        }

        button.wait_for_rising_edge().await;
    }
}
