// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul bindet die Hardware-Traits aus haptic-core an die
// ESP32-C6 Peripherie: LEDC für das PWM-Signal, GPIO für die
// Enable-Leitung des Treiber-Chips.

pub mod pwm;

pub use pwm::{EnableGpio, LedcPwm};
