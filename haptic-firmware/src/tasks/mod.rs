// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (Worker → MQTT/HTTP)
// und über die Annahmestelle des Motors (HTTP/MQTT/Taster → Worker).

use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use crate::config::NETWORK_POLL_INTERVAL_MS;

pub mod http;
pub mod mdns;
pub mod mqtt;
pub mod standby;
pub mod vibration;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use mdns::mdns_responder_task;
pub use mqtt::mqtt_task;
pub use standby::standby_task;
pub use vibration::vibration_task;
pub use wifi::{dhcp_task, net_stack_task, wifi_connection_task};

/// Blockiert bis WLAN-Link und DHCP-Konfiguration stehen
///
/// Gemeinsamer Vorlauf aller Netzwerk-Tasks (MQTT, mDNS, DHCP-Log),
/// gepollt im `NETWORK_POLL_INTERVAL_MS`-Takt.
pub(crate) async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(NETWORK_POLL_INTERVAL_MS)).await;
    }
}
