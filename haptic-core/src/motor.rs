//! Effekt-Annahme und Single-Flight-Dispatch
//!
//! Entkoppelt die Annahme von Effekten (darf nie blockieren) von der
//! Hardware-Programmierung (darf warten). Pro Gerät ist höchstens eine
//! Arbeitseinheit ausstehend; eine neue Anforderung überschreibt die
//! alte, bevor sie verarbeitet wurde (last-write-wins, keine Queue).
//!
//! Aufteilung in zwei Hälften:
//! - `HapticMotor` ist die geteilte Annahmestelle. Sie enthält nur
//!   Signale und einen Kommando-Kanal und kann damit in einer
//!   StaticCell liegen und von allen Tasks referenziert werden.
//! - `MotorWorker` gehört exklusiv dem Worker-Task und besitzt den
//!   `Vibrator` mitsamt Hardware-Backends. Nur hier wird Hardware
//!   angefasst.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::traits::{DriveError, EnablePin, PwmChannel};
use crate::types::{HapticStatus, RumbleRequest};
use crate::vibrator::Vibrator;

/// Lebenszyklus-Kommandos an den Worker
///
/// Close und Standby laufen über einen eigenen Kanal, damit sie eine
/// ausstehende Rumble-Anforderung nicht verdrängen und umgekehrt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Gerät stilllegen: ausstehende Arbeit verwerfen, abschalten
    Close,
    /// Aktor bedingungslos abschalten, ausstehende Arbeit bleibt
    Standby,
}

/// Ergebnis einer verarbeiteten Arbeitseinheit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorEvent {
    /// Effekt angewendet, Hardware programmiert
    Applied(HapticStatus),
    /// Hardware-Fehler; der Soll-Zustand bleibt stehen und der
    /// nächste Effekt versucht es implizit erneut
    Failed(DriveError),
    /// Close verarbeitet, Aktor aus
    Closed(HapticStatus),
    /// Standby verarbeitet, Aktor aus
    Standby(HapticStatus),
}

/// Geteilte Annahmestelle des Motors
///
/// `submit` läuft synchron im Aufrufer-Kontext und fasst keine
/// Hardware an. `close` und `suspend` kehren erst zurück, wenn der
/// Worker das Kommando ausgeführt hat, die Hardware also wirklich
/// aus ist.
pub struct HapticMotor<M: RawMutex> {
    requested_speed: Signal<M, u8>,
    lifecycle: Channel<M, LifecycleCommand, 2>,
    closed_ack: Signal<M, ()>,
    standby_ack: Signal<M, ()>,
}

impl<M: RawMutex> HapticMotor<M> {
    /// Erstellt die Annahmestelle ohne ausstehende Arbeit
    pub const fn new() -> Self {
        Self {
            requested_speed: Signal::new(),
            lifecycle: Channel::new(),
            closed_ack: Signal::new(),
            standby_ack: Signal::new(),
        }
    }

    /// Nimmt einen Effekt an, ohne zu blockieren
    ///
    /// Extrahiert den Geschwindigkeitswert, überschreibt einen noch
    /// nicht verarbeiteten Wert und weckt den Worker. Schlägt nie fehl.
    pub fn submit(&self, effect: RumbleRequest) {
        self.requested_speed.signal(effect.speed());
    }

    /// Close-Pfad: Gerät stilllegen
    ///
    /// Der Worker verwirft eine ausstehende Arbeitseinheit, beendet
    /// eine laufende und schaltet dann ab, falls der Aktor aktiv ist.
    /// Nach der Rückkehr findet kein Hardware-Zugriff mehr statt, bis
    /// ein neuer Effekt angenommen wird.
    pub async fn close(&self) {
        self.closed_ack.reset();
        self.lifecycle.send(LifecycleCommand::Close).await;
        self.closed_ack.wait().await;
    }

    /// Standby-Pfad: Aktor bedingungslos abschalten
    ///
    /// Eine ausstehende Arbeitseinheit bleibt absichtlich bestehen und
    /// kann den Aktor nach dem Standby wieder anwerfen; das Verhalten
    /// des ursprünglichen Treibers wird hier beibehalten.
    pub async fn suspend(&self) {
        self.standby_ack.reset();
        self.lifecycle.send(LifecycleCommand::Standby).await;
        self.standby_ack.wait().await;
    }

    /// true wenn eine Arbeitseinheit aussteht
    pub fn has_pending(&self) -> bool {
        self.requested_speed.signaled()
    }
}

impl<M: RawMutex> Default for HapticMotor<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker-Hälfte des Motors
///
/// Gehört exklusiv dem Worker-Task; eine Arbeitseinheit läuft von der
/// Entnahme bis zum Abschluss ohne Unterbrechung durch. Damit ist der
/// gesamte hardwarenahe Zustand auf genau einen Ausführungskontext
/// beschränkt.
pub struct MotorWorker<'a, M: RawMutex, P, E> {
    motor: &'a HapticMotor<M>,
    vibrator: Vibrator<P, E>,
}

impl<'a, M: RawMutex, P: PwmChannel, E: EnablePin> MotorWorker<'a, M, P, E> {
    /// Verbindet die Annahmestelle mit dem fertig konstruierten Vibrator
    pub fn new(motor: &'a HapticMotor<M>, vibrator: Vibrator<P, E>) -> Self {
        Self { motor, vibrator }
    }

    /// Verarbeitet genau eine Arbeitseinheit
    ///
    /// Wartet auf das nächste Kommando; Lebenszyklus-Kommandos haben
    /// Vorrang vor einem ausstehenden Effekt. Eine Standby-Einheit
    /// lässt einen ausstehenden Effekt unangetastet, er wird in der
    /// nächsten Einheit verarbeitet.
    pub async fn run_once(&mut self) -> MotorEvent {
        match select(
            self.motor.lifecycle.receive(),
            self.motor.requested_speed.wait(),
        )
        .await
        {
            Either::First(command) => self.handle_lifecycle(command),
            Either::Second(speed) => match self.vibrator.apply_speed(speed) {
                Ok(()) => MotorEvent::Applied(self.vibrator.status()),
                Err(e) => MotorEvent::Failed(e),
            },
        }
    }

    fn handle_lifecycle(&mut self, command: LifecycleCommand) -> MotorEvent {
        match command {
            LifecycleCommand::Close => {
                // Ausstehende Anforderung verwerfen, bevor quittiert wird
                self.motor.requested_speed.reset();
                self.vibrator.turn_off();
                let status = self.vibrator.status();
                self.motor.closed_ack.signal(());
                MotorEvent::Closed(status)
            }
            LifecycleCommand::Standby => {
                self.vibrator.force_off();
                let status = self.vibrator.status();
                self.motor.standby_ack.signal(());
                MotorEvent::Standby(status)
            }
        }
    }

    /// Momentaufnahme des aktuellen Zustands
    pub fn status(&self) -> HapticStatus {
        self.vibrator.status()
    }
}
