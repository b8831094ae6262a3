// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von haptic-core
pub use haptic_core::{
    DriveError, HapticMotor, HapticStatus, MotorEvent, MotorWorker, RumbleRequest, Vibrator,
    VibratorConfig,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

// ============================================================================
// Type-Aliase für Motor- und Channel-Typen
// ============================================================================
//
// Diese Type-Aliase vereinfachen die Lesbarkeit der Funktionssignaturen.
// Statt:  HapticMotor<NoopRawMutex>
// Nutze:  Motor

/// Die eine Annahmestelle des Geräts für Effekte und Lebenszyklus
///
/// NoopRawMutex genügt, weil alle Tasks auf demselben Executor laufen.
/// Die Hardware-Hälfte (MotorWorker mit LedcPwm und EnableGpio) gehört
/// dem Vibrations-Task und braucht keinen Alias.
pub type Motor = HapticMotor<NoopRawMutex>;

/// PubSubChannel für Status-Broadcasts des Aktors
/// - 2: Nachrichten-Kapazität im Queue
/// - 10: Maximale Anzahl Subscribers (1 MQTT + bis zu 9 WebSockets)
/// - 1: Publish WaitResult Slots
pub type HapticStatusChannel = PubSubChannel<NoopRawMutex, HapticStatus, 2, 10, 1>;

/// Publisher für Status-Broadcasts
/// Erzeugt aus HapticStatusChannel
pub type HapticStatusPublisher = Publisher<'static, NoopRawMutex, HapticStatus, 2, 10, 1>;

/// Subscriber für Status-Broadcasts
/// Empfängt Broadcasts von HapticStatusPublisher
pub type HapticStatusSubscriber = Subscriber<'static, NoopRawMutex, HapticStatus, 2, 10, 1>;

// ============================================================================
// Testing-Strategie für Embedded no_std Crates
// ============================================================================
//
// Dieses Crate kompiliert nur für riscv32imac-unknown-none-elf; Host-Tests
// mit #[test] sind hier nicht möglich (esp-hal baut nicht für x86_64).
// Deshalb:
//
// 1. Mapping, Zustandsmaschine und Dispatch liegen in haptic-core
//    (no_std, ohne Hardware-Dependencies, auf dem Host testbar).
// 2. Die Module hier sind dünne Adapter: LEDC/GPIO-Anbindung, Tasks,
//    Netzwerk-Plumbing.
// 3. Host-Tests mit Mock-Implementierungen der Core-Traits liegen in
//    haptic-tests.
