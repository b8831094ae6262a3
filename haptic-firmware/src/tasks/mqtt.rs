// MQTT Task - Published Aktor-Status und empfängt Rumble-Kommandos
use core::fmt::Write;

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use haptic_core::RumbleRequest;

use crate::config::*;
use crate::{HapticStatusSubscriber, Motor};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Dieser Task übernimmt die MQTT-Anbindung des Aktors:
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit MQTT Broker
/// - Published Zustand und Duty-Cycle **sofort** nach jedem Worker-Durchlauf
/// - Empfängt Rumble-Kommandos auf dem Kommando-Topic
/// - Automatisches Reconnect bei Fehlern
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `status_subscriber`: PubSub Subscriber für Status-Broadcasts
/// - `motor`: Annahmestelle für eingehende Rumble-Kommandos
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    mut status_subscriber: HapticStatusSubscriber,
    motor: &'static Motor,
) {
    info!("MQTT: Task started, waiting for network...");
    super::wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_session(stack, &mut status_subscriber, motor).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Verbindet mit MQTT Broker, published Status und empfängt Kommandos
///
/// Diese Funktion übernimmt den kompletten MQTT-Lifecycle:
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen
/// 3. MQTT CONNECT senden, Kommando-Topic abonnieren
/// 4. Status-Updates publishen und eingehende Pakete verarbeiten
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet automatisch einen Reconnect-Versuch.
async fn mqtt_session(
    stack: &'static Stack<'static>,
    status_subscriber: &mut HapticStatusSubscriber,
    motor: &'static Motor,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; 4096];
    let mut tx_buffer = [0u8; 4096];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(10)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = 30;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    // MQTT Client erstellen
    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker");

    // Kommando-Topic abonnieren (Payload: "<stark>,<schwach>")
    client
        .subscribe_to_topic(MQTT_TOPIC_RUMBLE)
        .await
        .map_err(|_| MqttError::SubscribeFailed)?;
    info!("MQTT: Subscribed to '{}'", MQTT_TOPIC_RUMBLE);

    // Session-Loop - Event-basiert
    // Wartet gleichzeitig auf eingehende Pakete vom Broker und auf
    // Status-Broadcasts des Vibrations-Tasks. Eingehende Pakete werden
    // komplett im Match-Arm verarbeitet (der Payload borgt den
    // Client-Buffer); das Publishen passiert danach.
    loop {
        let status = match select(
            client.receive_message(),
            status_subscriber.next_message_pure(),
        )
        .await
        {
            // Eingehendes Paket: Rumble-Kommando
            Either::First(packet) => {
                let (topic, payload) = packet.map_err(|_| MqttError::ReceiveFailed)?;
                if topic == MQTT_TOPIC_RUMBLE {
                    match core::str::from_utf8(payload)
                        .ok()
                        .and_then(|s| RumbleRequest::try_from(s).ok())
                    {
                        Some(request) => {
                            info!("MQTT: Rumble-Kommando: {}", request);
                            motor.submit(request);
                        }
                        None => warn!("MQTT: Kommando-Payload nicht lesbar, ignoriert"),
                    }
                }
                continue;
            }
            // Status-Update vom Worker: unten publishen
            Either::Second(status) => status,
        };

        let state_str = if status.active { "aktiv" } else { "aus" };

        client
            .send_message(
                MQTT_TOPIC_STATE,
                state_str.as_bytes(),
                QualityOfService::QoS0,
                false,
            )
            .await
            .map_err(|_| MqttError::PublishFailed)?;

        // Duty-Cycle dezimal formatieren (max. "100")
        let mut duty_str: heapless::String<8> = heapless::String::new();
        write!(duty_str, "{}", status.duty_percent).map_err(|_| MqttError::PublishFailed)?;

        client
            .send_message(
                MQTT_TOPIC_DUTY,
                duty_str.as_bytes(),
                QualityOfService::QoS0,
                false,
            )
            .await
            .map_err(|_| MqttError::PublishFailed)?;

        info!(
            "MQTT: Published state='{}' duty='{}'",
            state_str,
            duty_str.as_str()
        );
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            for addr in addrs {
                if let IpAddress::Ipv4(ipv4) = addr {
                    return Ok(ipv4);
                }
            }
            Err(MqttError::DnsResolutionFailed)
        }
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
///
/// Alle möglichen Fehler die während MQTT-Operationen auftreten können.
#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PublishFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
        }
    }
}
