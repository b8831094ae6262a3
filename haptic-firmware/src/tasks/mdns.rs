// mDNS Responder - macht die Haptik-Steuerung als <hostname>.local auffindbar
//
// Schlanker RFC-6762-Responder auf Basis von edge-mdns: beantwortet
// A-Record-Queries auf 224.0.0.251:5353 mit der eigenen DHCP-Adresse.
// Browser und MQTT-Clients erreichen das Gerät damit ohne feste IP,
// z.B. unter `http://haptik.local/`.

use defmt::{Debug2Format, error, info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use core::net::{Ipv4Addr, SocketAddr};
use core::sync::atomic::{AtomicU32, Ordering};

use edge_mdns::{HostAnswersMdnsHandler, buf::VecBufAccess, domain::base::Ttl, host::Host, io};
use edge_nal::{MulticastV4, UdpBind, UdpSplit};
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;

use crate::config::{
    MDNS_HOSTNAME, MDNS_MULTICAST_ADDR, MDNS_PACKET_BUFFER_SIZE, MDNS_PORT,
    MDNS_RECONNECT_DELAY_SECS, MDNS_TTL_SECS, MDNS_UDP_BUFFER_SIZE,
};

/// Zähler für die mDNS Transaction-IDs
///
/// Eindeutigkeit reicht hier; kryptographische Zufälligkeit braucht
/// das Protokoll nicht.
static TXID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Füllt `buf` mit Bytes aus dem laufenden Zähler (edge-mdns RNG-Hook)
fn fill_random(buf: &mut [u8]) {
    let mut counter = TXID_COUNTER.fetch_add(1, Ordering::Relaxed);
    for chunk in buf.chunks_mut(4) {
        let bytes = counter.to_le_bytes();
        let len = chunk.len().min(4);
        chunk[..len].copy_from_slice(&bytes[..len]);
        counter = counter.wrapping_add(1);
    }
}

/// mDNS Responder Task
///
/// Wartet auf das Netz und hält danach den Responder am Laufen; nach
/// einem Fehler wird er nach `MDNS_RECONNECT_DELAY_SECS` neu
/// aufgesetzt. Hostname, TTL und Buffer-Größen stehen in
/// `src/config.rs`.
#[embassy_executor::task]
pub async fn mdns_responder_task(stack: &'static Stack<'static>) {
    info!("mDNS: Task gestartet, warte auf Netzwerk...");
    super::wait_for_network(stack).await;
    info!("mDNS: Netzwerk bereit");

    loop {
        match advertise_hostname(stack).await {
            Ok(_) => warn!("mDNS: Responder beendet"),
            Err(e) => error!("mDNS: Fehler: {}", e),
        }
        info!("mDNS: Neustart in {}s...", MDNS_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MDNS_RECONNECT_DELAY_SECS)).await;
    }
}

/// Baut Socket und Responder auf und beantwortet Queries bis zum Fehler
///
/// Die UDP-Buffer liegen in einer StaticCell; `init_with` gibt beim
/// Neuaufbau nach einem Fehler die vorhandene Referenz zurück statt
/// zu panicen.
async fn advertise_hostname(stack: &'static Stack<'static>) -> Result<(), MdnsError> {
    // Die DHCP-Adresse kann zwischen wait_for_network und hier wieder
    // verschwinden (Link-Verlust); dann zurück in den Task-Loop
    let our_ip = stack
        .config_v4()
        .ok_or(MdnsError::NoIpv4Config)?
        .address
        .address();

    static UDP_BUFFERS: static_cell::StaticCell<
        UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>,
    > = static_cell::StaticCell::new();
    let udp_buffers = UDP_BUFFERS.init_with(UdpBuffers::new);
    let udp_stack = Udp::new(*stack, udp_buffers);

    let mut socket = udp_stack
        .bind(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), MDNS_PORT))
        .await
        .map_err(|_| MdnsError::SocketBindFailed)?;

    socket
        .join_v4(Ipv4Addr::from(MDNS_MULTICAST_ADDR), Ipv4Addr::UNSPECIFIED)
        .await
        .map_err(|_| MdnsError::MulticastJoinFailed)?;

    let (recv, send) = socket.split();

    // Nur A-Records: Hostname → IPv4. Kein IPv6 (smoltcp ohne
    // proto-ipv6), kein Service-Discovery
    let host = Host {
        hostname: MDNS_HOSTNAME,
        ipv4: our_ip.into(),
        ipv6: [0u8; 16].into(),
        ttl: Ttl::from_secs(MDNS_TTL_SECS),
    };

    let recv_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    let send_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();

    // Von der edge-mdns API verlangt, hier ungenutzt (keine aktiven
    // Broadcasts, wir antworten nur)
    let signal = Signal::<NoopRawMutex, ()>::new();

    let mdns = io::Mdns::new(
        Some(our_ip),
        None,
        recv,
        send,
        recv_buf,
        send_buf,
        fill_random,
        &signal,
    );

    info!(
        "mDNS: Haptik-Steuerung erreichbar als '{}.local' ({})",
        MDNS_HOSTNAME,
        Debug2Format(&our_ip)
    );

    mdns.run(HostAnswersMdnsHandler::new(&host))
        .await
        .map_err(|_| MdnsError::ResponderFailed)
}

/// mDNS Fehler-Typen; jeder führt zum Neuaufbau im Task-Loop
#[derive(Debug)]
enum MdnsError {
    NoIpv4Config,
    SocketBindFailed,
    MulticastJoinFailed,
    ResponderFailed,
}

impl defmt::Format for MdnsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MdnsError::NoIpv4Config => defmt::write!(fmt, "No IPv4 config"),
            MdnsError::SocketBindFailed => defmt::write!(fmt, "Socket bind failed"),
            MdnsError::MulticastJoinFailed => defmt::write!(fmt, "Multicast join failed"),
            MdnsError::ResponderFailed => defmt::write!(fmt, "Responder failed"),
        }
    }
}
