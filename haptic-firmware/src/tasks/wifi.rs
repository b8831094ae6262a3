// WiFi Tasks - Netzanbindung der Haptik-Steuerung
//
// Der Aktor selbst hängt nicht am WLAN: Vibrations-Worker und
// Standby-Taster laufen auch ohne Netz. Diese Tasks liefern nur die
// Kommandokanäle (MQTT, WebSocket) und die Status-Publikation nach.
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};

use crate::config::{WIFI_PASSWORD, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// Hält die Station-Verbindung zum Access Point
///
/// Ein Durchlauf: Controller konfigurieren und starten (falls nötig),
/// verbinden, auf Disconnect warten. Jeder Fehlerpfad mündet nach
/// `WIFI_RETRY_DELAY_SECS` wieder oben im Loop.
#[embassy_executor::task]
pub async fn wifi_connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Verbindungs-Task gestartet, Ziel-SSID '{}'", WIFI_SSID);
    let mut attempt: u32 = 0;

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            let station = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(WIFI_SSID.into())
                    .with_password(WIFI_PASSWORD.into()),
            );

            if let Err(e) = controller.set_config(&station) {
                error!("WiFi: Konfiguration fehlgeschlagen: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }

            if let Err(e) = controller.start_async().await {
                error!("WiFi: Start fehlgeschlagen: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
        }

        attempt += 1;
        info!("WiFi: Verbindungsversuch {} zu '{}'", attempt, WIFI_SSID);
        match controller.connect_async().await {
            Ok(_) => {
                info!("WiFi: Verbunden");
                attempt = 0;
            }
            Err(e) => {
                error!("WiFi: Verbindung fehlgeschlagen: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
        }

        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        warn!("WiFi: Vom AP getrennt, neuer Versuch folgt");
        Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
    }
}

/// Treibt den embassy-net Stack (Paketverarbeitung, läuft für immer)
#[embassy_executor::task]
pub async fn net_stack_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// Meldet die per DHCP bezogene Netzwerk-Konfiguration im Log
///
/// Reine Diagnose: erst wenn hier die IP erscheint, sind MQTT-Broker
/// und Weboberfläche der Haptik-Steuerung erreichbar.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    super::wait_for_network(stack).await;

    if let Some(config) = stack.config_v4() {
        info!("WiFi: DHCP-Konfiguration erhalten");
        info!("  IP:      {}", Debug2Format(&config.address.address()));
        info!("  Gateway: {}", Debug2Format(&config.gateway));
        info!("  DNS:     {}", Debug2Format(&config.dns_servers));
    }
}
