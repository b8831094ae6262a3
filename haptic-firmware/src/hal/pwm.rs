// PWM- und GPIO-Anbindung des Aktor-Treibers
//
// Implementiert die Hardware-Traits aus haptic-core über das LEDC
// Peripheral (PWM-Signal) und einen GPIO-Ausgang (Enable-Leitung).

use esp_hal::gpio::{DriveMode, Output};
use esp_hal::ledc::channel::ChannelIFace;
use esp_hal::ledc::timer::TimerIFace;
use esp_hal::ledc::{Ledc, LowSpeed, channel, timer};
use esp_hal::time::Rate;

use haptic_core::{DriveError, EnablePin, PwmChannel};

/// LEDC-Auflösung für den Duty-Cycle
/// Bei 25 kHz aus dem 80-MHz-APB-Takt stehen 3200 Takte pro Periode
/// zur Verfügung; 11 Bit (2048 Stufen) ist die höchste Auflösung,
/// die dort hineinpasst.
const DUTY_RESOLUTION: timer::config::Duty = timer::config::Duty::Duty11Bit;

/// PWM-Backend über einen LEDC Low-Speed-Kanal
///
/// Die Periode ist durch den LEDC-Timer fest vorgegeben; aus dem
/// ns-Paar von `configure` wird nur das Tastverhältnis übernommen.
/// `enable` schreibt das gemerkte Tastverhältnis in den Kanal,
/// `disable` zwingt den Ausgang auf 0 Prozent.
pub struct LedcPwm<'a> {
    channel: channel::Channel<'a, LowSpeed>,
    duty_percent: u8,
}

impl<'a> LedcPwm<'a> {
    /// Erstellt das PWM-Backend
    ///
    /// # Parameter
    /// - `ledc`: initialisierte LEDC-Einheit (StaticCell in main)
    /// - `timer`: Low-Speed-Timer, wird hier konfiguriert (StaticCell in main)
    /// - `pin`: GPIO5, führt das PWM-Signal zum ISA1000
    /// - `frequency_hz`: PWM-Frequenz in Hertz (z.B. 25000)
    pub fn new(
        ledc: &'a Ledc<'a>,
        timer: &'a mut timer::Timer<'a, LowSpeed>,
        pin: esp_hal::peripherals::GPIO5<'a>,
        frequency_hz: u32,
    ) -> Self {
        timer
            .configure(timer::config::Config {
                duty: DUTY_RESOLUTION,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_hz(frequency_hz),
            })
            .unwrap();
        let timer: &'a timer::Timer<'a, LowSpeed> = timer;

        let mut channel = ledc.channel(channel::Number::Channel0, pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .unwrap();

        Self {
            channel,
            duty_percent: 0,
        }
    }
}

impl PwmChannel for LedcPwm<'_> {
    fn configure(&mut self, high_ns: u64, period_ns: u64) -> Result<(), DriveError> {
        // Nur übernehmen; geschrieben wird erst beim Einschalten
        let duty = high_ns
            .checked_mul(100)
            .and_then(|h| h.checked_div(period_ns))
            .ok_or(DriveError::PwmConfigFailed)?;
        if duty > 100 {
            return Err(DriveError::PwmConfigFailed);
        }
        self.duty_percent = duty as u8;
        Ok(())
    }

    fn enable(&mut self) -> Result<(), DriveError> {
        self.channel
            .set_duty(self.duty_percent)
            .map_err(|_| DriveError::PwmEnableFailed)
    }

    fn disable(&mut self) {
        // 0 Prozent ist immer ein gültiger Duty-Wert
        let _ = self.channel.set_duty(0);
    }
}

/// Enable-Leitung über einen GPIO-Ausgang
///
/// Der Pin wird in main mit Initialpegel Low angelegt; der Aktor ist
/// nach dem Start also aus.
pub struct EnableGpio<'a> {
    pin: Output<'a>,
}

impl<'a> EnableGpio<'a> {
    /// Übernimmt den fertig konfigurierten Ausgang
    pub fn new(pin: Output<'a>) -> Self {
        Self { pin }
    }
}

impl EnablePin for EnableGpio<'_> {
    fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}
