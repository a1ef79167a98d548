#![no_std]
#![no_main]

use animatronic_core::Clock;
use animatronic_firmware::{
    drive_led, radio_config, EmbassyClock, LinkStatus, Pca9685, Puppet, PuppetConfig, PuppetEvent,
    UartRadio,
};
use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::Uart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Delay, Duration, Timer};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Upper bound on one receive wait, so the watchdog and animations keep
/// running through silence.
const RECEIVE_WINDOW: Duration = Duration::from_millis(10);

const I2C_FREQUENCY: u32 = 400_000;

/// Latest link status for the LED task.
static STATUS_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, LinkStatus>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("animatronic puppet starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let signal = STATUS_SIGNAL.init(Signal::new());

    let led = Output::new(p.PIN_25, Level::Low);
    spawner.spawn(status_task(led, signal).unwrap());

    // --- Radio ---
    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        radio_config(),
    );
    let radio = UartRadio::new(uart, RECEIVE_WINDOW);

    // --- Servo driver on I2C0 ---
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_blocking(
        p.I2C0,
        p.PIN_5, // SCL
        p.PIN_4, // SDA
        i2c_config,
    );
    let driver = Pca9685::new(i2c, Delay);

    let clock = EmbassyClock;
    let mut puppet = Puppet::new(radio, driver, PuppetConfig::DEFAULT, clock.now());

    if let Err(e) = puppet.start(&clock).await {
        error!("{}; halting", e);
        signal.signal(LinkStatus::Fault);
        loop {
            Timer::after_secs(60).await;
        }
    }

    info!("puppet initialized, locked until unlock");

    let mut shown = LinkStatus::Locked;
    loop {
        match puppet.process_one(&clock).await {
            Some(PuppetEvent::LinkLost) => warn!("link lost: {}", puppet.stats()),
            Some(PuppetEvent::EmergencyStop) => warn!("emergency stop"),
            _ => {}
        }

        let status = LinkStatus::from_safety(puppet.state());
        if status != shown {
            signal.signal(status);
            shown = status;
        }
    }
}

#[embassy_executor::task]
async fn status_task(
    led: Output<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, LinkStatus>,
) {
    drive_led(led, signal).await
}
