//! Haptic Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, Pure Functions und die Ablaufsteuerung des
//! Haptik-Aktors (Zustandsmaschine + Single-Flight-Dispatch).

#![no_std]

pub mod logic;
pub mod motor;
pub mod traits;
pub mod types;
pub mod vibrator;

// Re-exports für einfachen Zugriff
pub use logic::{duty_for_speed, rumble_speed};
pub use motor::{HapticMotor, LifecycleCommand, MotorEvent, MotorWorker};
pub use traits::{DriveError, EnablePin, PwmChannel};
pub use types::{HapticStatus, RumbleRequest, VibratorConfig};
pub use vibrator::Vibrator;
