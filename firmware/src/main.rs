//! Ambient sound monitor for the BitDogLab (Raspberry Pi Pico, RP2040).
//!
//! The microphone on GPIO28 is sampled at 500 kHz into the ADC FIFO. DMA
//! channel 0 moves 79-sample windows into RAM and raises `DMA_IRQ_0`, where
//! each window is classified and, every 75 ms, drawn on the LED matrix. The
//! idle loop runs the silence alert and the 3 s console report. Buttons A,
//! B and the joystick toggle capture, alert tone and reporting.
//!
//! Task layout:
//! ```text
//!   DMA_IRQ_0     (prio 2)  dma_complete: classify, rearm, push frame
//!   IO_IRQ_BANK0  (prio 1)  button: debounce, toggle, capture side effects
//!   idle          (prio 0)  Supervisor: alert state machine, reports
//! ```

#![no_std]
#![no_main]

mod board;

use defmt_rtt as _;
use panic_probe as _;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

const XOSC_FREQ_HZ: u32 = 12_000_000;

#[rtic::app(device = rp2040_hal::pac, peripherals = true)]
mod app {
    use rp2040_hal::adc::{Adc, AdcPin};
    use rp2040_hal::clocks::init_clocks_and_plls;
    use rp2040_hal::dma::DMAExt;
    use rp2040_hal::fugit::RateExtU32;
    use rp2040_hal::gpio::Pins;
    use rp2040_hal::pio::PIOExt;
    use rp2040_hal::pwm::Slices;
    use rp2040_hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};
    use rp2040_hal::{Clock, Sio, Timer, Watchdog, I2C};
    use rtic::mutex_prelude::*;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};
    use ws2812_pio::Ws2812Direct;

    use sound_monitor::classifier::Classifier;
    use sound_monitor::constants::{TONE_FREQUENCY_HZ, WINDOW_SAMPLES};
    use sound_monitor::io::{CaptureControl, TransferEngine};
    use sound_monitor::mode::{apply_capture, Button, ModeController};
    use sound_monitor::monitor::{CaptureHandler, Supervisor};
    use sound_monitor::render::{pwm_top, PwmTone};
    use sound_monitor::state::SharedState;

    use crate::board::{
        now_ms, take_edge, AdcWindow, Buttons, Console, LockedConsole, Matrix, MicFifo, Screen,
    };
    use crate::XOSC_FREQ_HZ;

    type Buzzers = PwmTone<
        rp2040_hal::pwm::Channel<
            rp2040_hal::pwm::Slice<rp2040_hal::pwm::Pwm2, rp2040_hal::pwm::FreeRunning>,
            rp2040_hal::pwm::B,
        >,
        rp2040_hal::pwm::Channel<
            rp2040_hal::pwm::Slice<rp2040_hal::pwm::Pwm5, rp2040_hal::pwm::FreeRunning>,
            rp2040_hal::pwm::A,
        >,
    >;

    static SHARED: SharedState = SharedState::new();

    #[shared]
    struct Shared {
        capture: CaptureHandler<AdcWindow, MicFifo>,
        matrix: Matrix,
        console: Console,
    }

    #[local]
    struct Local {
        dma_timer: Timer,
        button_timer: Timer,
        idle_timer: Timer,
        buttons: Buttons,
        modes: ModeController,
        supervisor: Supervisor,
        screen: Screen,
        buzzers: Buzzers,
    }

    #[init(local = [
        adc_slot: Option<Adc> = None,
        window: [u16; WINDOW_SAMPLES] = [0; WINDOW_SAMPLES],
    ])]
    fn init(cx: init::Context) -> (Shared, Local) {
        let mut pac = cx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let Ok(clocks) = init_clocks_and_plls(
            XOSC_FREQ_HZ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        ) else {
            panic!("clock init failed");
        };

        let sio = Sio::new(pac.SIO);
        let pins = Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );
        let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        // ── Console on UART0 ────────────────────────────────────────
        let Ok(console) = UartPeripheral::new(
            pac.UART0,
            (pins.gpio0.into_function(), pins.gpio1.into_function()),
            &mut pac.RESETS,
        )
        .enable(
            UartConfig::new(115_200.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        ) else {
            panic!("UART0 enable failed");
        };

        // ── LED matrix on PIO0 ──────────────────────────────────────
        let (mut pio0, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
        let mut matrix = Matrix(Ws2812Direct::new(
            pins.gpio7.into_function(),
            &mut pio0,
            sm0,
            clocks.peripheral_clock.freq(),
        ));

        // ── SSD1306 on I2C1 ─────────────────────────────────────────
        let i2c = I2C::i2c1(
            pac.I2C1,
            pins.gpio14.reconfigure(),
            pins.gpio15.reconfigure(),
            400.kHz(),
            &mut pac.RESETS,
            &clocks.system_clock,
        );
        let mut oled = Ssd1306::new(
            I2CDisplayInterface::new(i2c),
            DisplaySize128x64,
            DisplayRotation::Rotate0,
        )
        .into_buffered_graphics_mode();
        oled.init().expect("SSD1306 init");
        let mut screen = Screen(oled);

        // ── Buzzers: one slice each, same 2 kHz period ──────────────
        let slices = Slices::new(pac.PWM, &mut pac.RESETS);
        let top = pwm_top(clocks.system_clock.freq().to_Hz(), 1, TONE_FREQUENCY_HZ);
        let mut pwm2 = slices.pwm2;
        pwm2.set_div_int(1);
        pwm2.set_top(top);
        pwm2.enable();
        let mut buzzer_a = pwm2.channel_b;
        buzzer_a.output_to(pins.gpio21);
        let mut pwm5 = slices.pwm5;
        pwm5.set_div_int(1);
        pwm5.set_top(top);
        pwm5.enable();
        let mut buzzer_b = pwm5.channel_a;
        buzzer_b.output_to(pins.gpio10);
        let buzzers = PwmTone::new(buzzer_a, buzzer_b).unwrap_or_else(|e| match e {});

        // ── Buttons ─────────────────────────────────────────────────
        let mut buttons = Buttons {
            capture: pins.gpio5.into_pull_up_input(),
            tone: pins.gpio6.into_pull_up_input(),
            reporting: pins.gpio22.into_pull_up_input(),
        };
        buttons.listen();

        // ── ADC FIFO + DMA window ───────────────────────────────────
        let adc = cx.local.adc_slot.insert(Adc::new(pac.ADC, &mut pac.RESETS));
        let Ok(mut mic_pin) = AdcPin::new(pins.gpio28.into_floating_input()) else {
            panic!("GPIO28 is not an ADC input");
        };
        let config = sound_monitor::io::AdcFifoConfig::microphone();
        let fifo = adc
            .build_fifo()
            .clock_divider(config.divider_int, config.divider_frac)
            .set_channel(&mut mic_pin)
            .enable_dma()
            .start_paused();
        let mic = MicFifo::new(fifo);
        let dma = pac.DMA.split(&mut pac.RESETS);
        let window = AdcWindow::new(dma.ch0, mic.read_target(), cx.local.window);

        let mut capture = CaptureHandler::new(TransferEngine::new(window, mic), Classifier::new());

        // ── Start ───────────────────────────────────────────────────
        let mut supervisor = Supervisor::new();
        supervisor
            .start(now_ms(&timer), &mut screen)
            .expect("idle screen");
        // Blank the matrix until the first render.
        let _ = sound_monitor::control::LedMatrix::write_frame(
            &mut matrix,
            &sound_monitor::render::Frame::off(),
        );
        capture.resume();

        defmt::info!(
            "sound monitor up: {} Hz sampling, {}-sample windows",
            config.sample_rate_hz(),
            WINDOW_SAMPLES
        );

        (
            Shared {
                capture,
                matrix,
                console,
            },
            Local {
                dma_timer: timer,
                button_timer: timer,
                idle_timer: timer,
                buttons,
                modes: ModeController::new(),
                supervisor,
                screen,
                buzzers,
            },
        )
    }

    // ── DMA ISR: classify the window, rearm, draw ───────────────────────

    #[task(binds = DMA_IRQ_0, priority = 2, shared = [capture, matrix], local = [dma_timer])]
    fn dma_complete(cx: dma_complete::Context) {
        let now = now_ms(cx.local.dma_timer);
        (cx.shared.capture, cx.shared.matrix).lock(|capture, matrix| {
            // A dropped frame is replaced by the next render.
            let _ = capture.on_completion(now, &SHARED, matrix);
        });
    }

    // ── GPIO ISR: buttons ───────────────────────────────────────────────

    #[task(
        binds = IO_IRQ_BANK0,
        priority = 1,
        shared = [capture, matrix, console],
        local = [button_timer, buttons, modes]
    )]
    fn button(cx: button::Context) {
        let now = now_ms(cx.local.button_timer);
        let buttons = cx.local.buttons;
        let modes = cx.local.modes;
        let mut capture = cx.shared.capture;
        let mut matrix = cx.shared.matrix;
        let mut console = cx.shared.console;

        let edges = [
            (Button::Capture, take_edge(&mut buttons.capture)),
            (Button::Tone, take_edge(&mut buttons.tone)),
            (Button::Reporting, take_edge(&mut buttons.reporting)),
        ];

        for (button, fired) in edges {
            if !fired {
                continue;
            }
            let Some(change) = modes.on_edge(button, now, &SHARED) else {
                continue;
            };
            defmt::info!("{} at {} ms", change, now);
            (&mut capture, &mut matrix).lock(|capture, matrix| {
                let _ = apply_capture(change, capture, matrix);
            });
            console.lock(|console| {
                let _ = change.announce(&SHARED, console);
            });
        }
    }

    // ── Idle: alert and reports ─────────────────────────────────────────

    #[idle(shared = [console], local = [idle_timer, supervisor, screen, buzzers])]
    fn idle(cx: idle::Context) -> ! {
        let timer = cx.local.idle_timer;
        let supervisor = cx.local.supervisor;
        let screen = cx.local.screen;
        let buzzers = cx.local.buzzers;
        let mut console = cx.shared.console;

        loop {
            let now = now_ms(timer);
            if let Err(e) = supervisor.poll(
                now,
                &SHARED,
                screen,
                buzzers,
                &mut LockedConsole(&mut console),
            ) {
                defmt::warn!("output error: {}", defmt::Debug2Format(&e));
            }
        }
    }
}
