// HTTP Server Task - Serviert HTML und WebSocket
use core::future::pending;
use core::sync::atomic::{AtomicU32, Ordering};

use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::{Duration, Instant};
use picoserve::{io::embedded_io_async, response::IntoResponse, response::ws, routing::get};

use haptic_core::{HapticStatus, RumbleRequest};

use crate::config::*;
use crate::web::{
    INDEX_HTML,
    protocol::{MessageType, WsClientMessage, WsServerMessage},
};
use crate::{HapticStatusChannel, HapticStatusSubscriber, Motor};
use serde_json_core;

/// Anzahl aktuell verbundener WebSocket-Clients
///
/// Trennt sich der letzte Client, gilt das logische Gerät als
/// geschlossen und der Aktor wird stillgelegt (Close-Hook).
static WS_CLIENTS: AtomicU32 = AtomicU32::new(0);

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<WebSocketHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                picoserve::response::Response::new(
                    picoserve::response::StatusCode::new(503),
                    "Service Unavailable: Too many WebSocket connections (max 10)",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Dieser Task stellt den HTTP-Server bereit:
/// - Serviert index.html auf GET /
/// - WebSocket-Endpoint auf /ws für bidirektionale Kommunikation
/// - Empfängt Rumble/Stop/Standby-Kommandos vom Browser
/// - Sendet Status-Frames nach jedem Worker-Durchlauf
///
/// **Task Pool:** Diese Task wird 4x gespawnt für concurrent connections:
/// - Ermöglicht gleichzeitiges Laden von HTML + WebSocket-Verbindungen
/// - Verhindert Blockierung wenn eine Connection aktiv ist
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz (0..3)
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `status_channel`: PubSub Channel für Status-Broadcasts (Handler erstellt Subscriber)
/// - `motor`: Annahmestelle für Effekt- und Lebenszyklus-Kommandos
#[embassy_executor::task(pool_size = 4)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    status_channel: &'static HapticStatusChannel,
    motor: &'static Motor,
) {
    info!("HTTP: Server task {} starting on port 80...", task_id);

    // Router-Konfiguration
    // WebSocket-Route mit async block
    let app = picoserve::Router::new().route("/", get(serve_html)).route(
        "/ws",
        get(
            |upgrade: picoserve::response::WebSocketUpgrade| async move {
                info!("HTTP: WebSocket upgrade requested");

                // Erstelle Subscriber für diese WebSocket-Connection
                // Mit 10 max. Subscribers (PubSubChannel<..., 2, 10, 1>) und 4 HTTP-Tasks
                // kann bei > 10 gleichzeitigen WebSocket-Clients die Subscriber-Allokation
                // fehlschlagen. Statt Panic senden wir HTTP 503 an den Client.
                match status_channel.subscriber() {
                    Ok(status_subscriber) => {
                        info!("HTTP: Subscriber created, upgrading to WebSocket");
                        let handler = WebSocketHandler {
                            motor,
                            status_subscriber,
                        };
                        WebSocketResponse::Upgrade(upgrade.on_upgrade(handler))
                    }
                    Err(_) => {
                        info!(
                            "HTTP: No subscriber slots available (10/10 in use), sending HTTP 503"
                        );
                        WebSocketResponse::ServiceUnavailable
                    }
                }
            },
        ),
    );

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    // Server erstellen
    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    // Server starten (lauscht auf Port 80)
    // task_id ermöglicht mehrere concurrent Server-Instanzen
    let _ = server
        .listen_and_serve(task_id, *stack, 80, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert die HTML-Hauptseite
async fn serve_html() -> impl IntoResponse {
    picoserve::response::Response::new(picoserve::response::StatusCode::OK, INDEX_HTML)
        .with_header("Content-Type", "text/html; charset=utf-8")
}

/// WebSocket-Handler State
/// Hält Motor-Referenz und Status-Subscriber für bidirektionale Kommunikation
struct WebSocketHandler {
    motor: &'static Motor,
    status_subscriber: HapticStatusSubscriber,
}

impl ws::WebSocketCallback for WebSocketHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        mut self,
        rx: ws::SocketRx<R>,
        tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        let clients = WS_CLIENTS.fetch_add(1, Ordering::Relaxed) + 1;
        info!("HTTP: WebSocket connection established ({} clients)", clients);

        let result = self.serve(rx, tx).await;

        // Trennt sich der letzte Client, ist das Gerät logisch geschlossen:
        // ausstehende Arbeit verwerfen und den Aktor abschalten
        let remaining = WS_CLIENTS.fetch_sub(1, Ordering::Relaxed) - 1;
        info!("HTTP: WebSocket connection closed ({} clients left)", remaining);
        if remaining == 0 {
            self.motor.close().await;
        }

        result
    }
}

impl WebSocketHandler {
    /// Bedient eine WebSocket-Verbindung bis zum Close
    async fn serve<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        &mut self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        // Buffer für eingehende WebSocket-Nachrichten
        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        // Sende initiales Status-Update wenn Subscriber Messages hat
        if let Some(status) = self.status_subscriber.try_next_message_pure() {
            Self::send_status_update(&mut tx, &status).await.ok();
        }

        let close_reason = loop {
            // Gleichzeitig auf zwei Events lauschen mit embassy_futures::select:
            // 1. WebSocket-Messages vom Browser
            // 2. Status-Broadcasts vom PubSubChannel
            //
            // Dies ist effizienter als Polling mit Timer, da beide Futures
            // gleichzeitig awaited werden und nur bei tatsächlichen Events aufwachen.
            match select(
                rx.next_message(&mut buffer, pending()),
                self.status_subscriber.next_message_pure(),
            )
            .await
            {
                // WebSocket-Nachricht vom Browser empfangen
                Either::First(ws_result) => {
                    let ws_result = ws_result?.ignore_never_b();

                    match ws_result {
                        Ok(ws::Message::Text(data)) => {
                            info!("HTTP: Received text message: {} bytes", data.len());

                            // Parse JSON-Nachricht (konvertiere &str zu &[u8])
                            match serde_json_core::from_slice::<WsClientMessage>(data.as_bytes()) {
                                Ok((msg, _)) => self.handle_command(msg).await,
                                Err(_) => {
                                    info!("HTTP: JSON parse error");
                                    // Sende Error-Response
                                    let error = WsServerMessage::Error {
                                        message: "JSON parse error",
                                    };
                                    let mut json_buffer = [0u8; JSON_ERROR_BUFFER_SIZE];
                                    if let Ok(n) =
                                        serde_json_core::to_slice(&error, &mut json_buffer)
                                    {
                                        if let Ok(json_str) =
                                            core::str::from_utf8(&json_buffer[..n])
                                        {
                                            let _ = tx.send_text(json_str).await;
                                        }
                                    }
                                }
                            }
                        }
                        Ok(ws::Message::Binary(data)) => {
                            info!(
                                "HTTP: Received binary message: {} bytes (ignored)",
                                data.len()
                            );
                        }
                        Ok(ws::Message::Ping(data)) => {
                            tx.send_pong(data).await?;
                        }
                        Ok(ws::Message::Pong(_)) => {}
                        Ok(ws::Message::Close(_reason)) => {
                            info!("HTTP: WebSocket close received");
                            break None;
                        }
                        Err(error) => {
                            info!("HTTP: WebSocket error");
                            break Some((error.code(), "WebSocket Error"));
                        }
                    }
                }
                // Status-Update vom Worker: an den Browser weiterreichen
                Either::Second(status) => {
                    Self::send_status_update(&mut tx, &status).await.ok();
                }
            }
        };

        tx.close(close_reason).await
    }

    /// Führt ein Kommando vom Browser aus
    async fn handle_command(&self, msg: WsClientMessage) {
        match msg.msg_type {
            MessageType::Rumble => {
                let request = RumbleRequest::new(
                    msg.strong.unwrap_or(0),
                    msg.weak.unwrap_or(0),
                );
                info!("HTTP: Rumble command: {}", request);
                self.motor.submit(request);
            }
            MessageType::Stop => {
                info!("HTTP: Stop command");
                self.motor.submit(RumbleRequest::new(0, 0));
            }
            MessageType::Standby => {
                info!("HTTP: Standby command");
                self.motor.suspend().await;
            }
        }
    }

    /// Sendet Status-Update an WebSocket-Client
    async fn send_status_update<W: embedded_io_async::Write>(
        tx: &mut ws::SocketTx<W>,
        status: &HapticStatus,
    ) -> Result<(), W::Error> {
        let frame = WsServerMessage::Status {
            active: status.active,
            duty_percent: status.duty_percent,
            speed: status.speed,
            timestamp_ms: Instant::now().as_millis(),
        };

        // Serialisiere und sende
        let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
        if let Ok(n) = serde_json_core::to_slice(&frame, &mut json_buffer) {
            if let Ok(json_str) = core::str::from_utf8(&json_buffer[..n]) {
                tx.send_text(json_str).await?;
            }
        }

        Ok(())
    }
}
