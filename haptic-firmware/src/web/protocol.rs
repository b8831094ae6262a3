// WebSocket-Protokoll-Definitionen
// Definiert die JSON-Nachrichten für Client ↔ Server Kommunikation

use serde::{Deserialize, Serialize};

/// Client → Server Nachrichten
/// Kommandos vom Browser an den ESP32
///
/// Hinweis: Verwendet eine flache Struktur für serde-json-core
/// Kompatibilität; die Magnituden sind nur bei `rumble` gesetzt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WsClientMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default)]
    pub strong: Option<u16>,
    #[serde(default)]
    pub weak: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Rumble-Effekt mit starker/schwacher Magnitude anfordern
    Rumble,
    /// Aktor stoppen (entspricht Rumble mit Magnitude 0)
    Stop,
    /// Aktor bedingungslos abschalten (Suspend-Hook)
    Standby,
}

/// Server → Client Nachrichten
/// Status-Updates und Fehler vom ESP32 an den Browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum WsServerMessage {
    #[serde(rename = "status")]
    Status {
        active: bool,
        duty_percent: u8,
        speed: u8,
        timestamp_ms: u64,
    },
    #[serde(rename = "error")]
    Error { message: &'static str },
}
