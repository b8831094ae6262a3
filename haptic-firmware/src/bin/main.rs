// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed, timer};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_haptik_steuerung::config::{
    EXTRA_HEAP_SIZE, PWM_DUTY_DEFAULT_PERCENT, PWM_FREQUENCY_HZ, WIFI_HEAP_SIZE,
};
use esp_haptik_steuerung::hal::{EnableGpio, LedcPwm};
use esp_haptik_steuerung::tasks::{
    dhcp_task, http_server_task, mdns_responder_task, mqtt_task, net_stack_task, standby_task,
    vibration_task, wifi_connection_task,
};
use esp_haptik_steuerung::{HapticStatusChannel, Motor};
use haptic_core::{Vibrator, VibratorConfig};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi, startet Embassy Runtime und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // Versorgungs-Freigabe der Haptik-Stufe: einmal High, bleibt High.
    // Nur die Enable-Leitung (GPIO4) wird pro Effekt geschaltet.
    let _haptic_power = Output::new(peripherals.GPIO3, Level::High, OutputConfig::default());

    // LEDC Peripheral für das PWM-Signal zum ISA1000
    // StaticCell: LedcPwm borgt Ledc und Timer für die gesamte Laufzeit
    static LEDC: static_cell::StaticCell<Ledc<'static>> = static_cell::StaticCell::new();
    let ledc = LEDC.init(Ledc::new(peripherals.LEDC));
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc: &'static Ledc<'static> = ledc;

    static LSTIMER: static_cell::StaticCell<timer::Timer<'static, LowSpeed>> =
        static_cell::StaticCell::new();
    let lstimer = LSTIMER.init(ledc.timer(timer::Number::Timer0));

    let pwm = LedcPwm::new(ledc, lstimer, peripherals.GPIO5, PWM_FREQUENCY_HZ);

    // Enable-Leitung des ISA1000: startet Low, Aktor ist aus
    let enable_pin = EnableGpio::new(Output::new(
        peripherals.GPIO4,
        Level::Low,
        OutputConfig::default(),
    ));

    // Zustandsmaschine des Aktors: genau eine Instanz pro Gerät
    let vibrator = Vibrator::new(
        pwm,
        enable_pin,
        VibratorConfig {
            frequency_hz: PWM_FREQUENCY_HZ,
            duty_percent: PWM_DUTY_DEFAULT_PERCENT,
        },
    );

    // Annahmestelle des Motors (geteilt zwischen allen Tasks)
    static MOTOR: static_cell::StaticCell<Motor> = static_cell::StaticCell::new();
    let motor = &*MOTOR.init(Motor::new());

    // Status-Channel erstellen (Worker → MQTT + HTTP Kommunikation)
    // PubSubChannel für Broadcast: alle Subscribers bekommen jede Nachricht
    // Params: <Mutex, Message, Capacity, MaxSubscribers, MaxPublishers>
    // 10 Subscribers: 1 MQTT + bis zu 9 WebSocket-Connections (mehr als genug)
    static STATUS_CHANNEL: static_cell::StaticCell<HapticStatusChannel> =
        static_cell::StaticCell::new();
    let status_channel = &*STATUS_CHANNEL.init(HapticStatusChannel::new());
    let status_publisher = status_channel.publisher().unwrap();

    // Spawn Vibrations-Worker (einziger Task mit Hardware-Zugriff)
    spawner
        .spawn(vibration_task(motor, vibrator, status_publisher))
        .unwrap();

    // Spawn Standby-Taster (BOOT-Taste als Suspend-Hook)
    spawner
        .spawn(standby_task(peripherals.GPIO9, motor))
        .unwrap();

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Netzwerk-Stack erstellen
    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Static resources für embassy-net
    // Erhöht auf 12 Sockets: MQTT (1) + HTTP-Listener (1) + ~10 WebSocket-Clients
    static RESOURCES: static_cell::StaticCell<StackResources<12>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // embassy-net erstellt Stack + Runner (nutzt STA interface für Client-Modus)
    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    // Stack muss 'static sein für Tasks
    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Spawn WiFi Tasks
    spawner.spawn(wifi_connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_stack_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    // Spawn MQTT Task (mit Subscriber für Status-Updates und Motor für Kommandos)
    let mqtt_subscriber = status_channel.subscriber().unwrap();
    spawner
        .spawn(mqtt_task(stack, mqtt_subscriber, motor))
        .unwrap();

    // Spawn HTTP Server Tasks (4x für concurrent connections)
    // Jede Task-Instanz kann eine Connection gleichzeitig handeln
    // Jede bekommt Referenz zum Status-Channel um Subscribers zu erstellen
    for task_id in 0..4 {
        spawner
            .spawn(http_server_task(task_id, stack, status_channel, motor))
            .unwrap();
    }

    // Spawn mDNS Responder Task (für haptik.local Hostname)
    spawner.spawn(mdns_responder_task(stack)).unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
