#![no_std]
#![no_main]

use animatronic_core::Clock;
use animatronic_firmware::{
    drive_led, radio_config, Controller, ControllerConfig, EmbassyClock, FlashStore, LinkStatus,
    StickSampler, UartRadio,
};
use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::Uart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
});

/// The controller only drains stray bytes; it never waits on the radio.
const RECEIVE_WINDOW: Duration = Duration::from_millis(1);

/// Latest link status for the LED task.
static STATUS_SIGNAL: StaticCell<Signal<CriticalSectionRawMutex, LinkStatus>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("animatronic controller starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());
    let signal = STATUS_SIGNAL.init(Signal::new());

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

    // --- Sticks and buttons ---
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let sampler = StickSampler::new(
        adc,
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        AdcChannel::new_pin(p.PIN_28, Pull::None),
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
    );

    // --- Toggle record ---
    let store = FlashStore::new(Flash::new_blocking(p.FLASH));

    let led = Output::new(p.PIN_25, Level::Low);
    spawner.spawn(status_task(led, signal).unwrap());

    let config = ControllerConfig::DEFAULT;
    let mut controller = Controller::new(sampler, radio, store, config);
    let clock = EmbassyClock;

    info!("controller initialized, locked until unlock gesture");

    loop {
        let report = controller.tick(clock.now()).await;
        if report.emitted.is_some() {
            debug!("tick: {}", report);
        }
        signal.signal(LinkStatus::from_report(&report));
        clock.delay(config.poll_interval).await;
    }
}

#[embassy_executor::task]
async fn status_task(
    led: Output<'static>,
    signal: &'static Signal<CriticalSectionRawMutex, LinkStatus>,
) {
    drive_led(led, signal).await
}
