// Vibrations-Task - Worker-Kontext des Haptik-Aktors
use defmt::{error, info};

use haptic_core::{MotorEvent, MotorWorker, Vibrator};

use crate::hal::{EnableGpio, LedcPwm};
use crate::{HapticStatusPublisher, Motor};

/// Vibrations-Task - der einzige Kontext, der Hardware anfasst
///
/// Nimmt Arbeitseinheiten aus der Annahmestelle entgegen und verarbeitet
/// sie nacheinander (Single-Flight):
/// - Effekt: Geschwindigkeit → Duty-Cycle abbilden, PWM programmieren,
///   Enable-Leitung setzen
/// - Close/Standby: Aktor abschalten und den wartenden Aufrufer quittieren
///
/// Nach jeder abgeschlossenen Einheit wird der neue Zustand an alle
/// Status-Abonnenten (MQTT, WebSockets) verteilt. Hardware-Fehler werden
/// geloggt; der nächste Effekt versucht es implizit erneut.
///
/// # Parameter
/// - `motor`: geteilte Annahmestelle (StaticCell in main)
/// - `vibrator`: fertig verdrahtete Zustandsmaschine mit LEDC- und GPIO-Backend
/// - `status_publisher`: PubSub Publisher für Status-Broadcasts
#[embassy_executor::task]
pub async fn vibration_task(
    motor: &'static Motor,
    vibrator: Vibrator<LedcPwm<'static>, EnableGpio<'static>>,
    status_publisher: HapticStatusPublisher,
) {
    info!("Vibration: Worker gestartet");

    let mut worker = MotorWorker::new(motor, vibrator);

    loop {
        match worker.run_once().await {
            MotorEvent::Applied(status) => {
                info!("Vibration: Effekt angewendet: {}", status);
                status_publisher.publish_immediate(status);
            }
            MotorEvent::Failed(e) => {
                // Soll-Zustand bleibt stehen, kein Retry
                error!("Vibration: Hardware-Fehler: {}", e);
            }
            MotorEvent::Closed(status) => {
                info!("Vibration: Gerät stillgelegt");
                status_publisher.publish_immediate(status);
            }
            MotorEvent::Standby(status) => {
                info!("Vibration: Standby, Aktor aus");
                status_publisher.publish_immediate(status);
            }
        }
    }
}
