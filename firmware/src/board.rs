//! BitDogLab peripherals behind the `sound-monitor` traits.
//!
//! | Peripheral | Pins | Trait |
//! |------------|------|-------|
//! | ADC2 FIFO | GPIO28 | [`SampleSource`] |
//! | DMA CH0 | DREQ_ADC → window buffer | [`TransferChannel`] |
//! | WS2812 5×5 via PIO0 SM0 | GPIO7 | [`LedMatrix`] |
//! | SSD1306 128×64 on I2C1 @ 400 kHz | SDA 14, SCL 15 | [`MonoDisplay`] |
//! | Buttons A, B, joystick | GPIO5, 6, 22 (pull-up, falling edge) | `IO_IRQ_BANK0` |
//! | Console UART0 @ 115 200 | TX 0, RX 1 | `core::fmt::Write` |

use core::fmt;
use core::fmt::Write as _;

use display_interface::DisplayError;
use embedded_graphics::mono_font::ascii::FONT_8X13;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use rp2040_hal::adc::{AdcFifo, DmaReadTarget};
use rp2040_hal::dma::{single_buffer, Channel, SingleChannel, CH0};
use rp2040_hal::gpio::bank0::{Gpio0, Gpio1, Gpio14, Gpio15, Gpio22, Gpio5, Gpio6, Gpio7};
use rp2040_hal::gpio::{
    FunctionI2C, FunctionPio0, FunctionSioInput, FunctionUart, Interrupt, Pin, PinId, PullDown,
    PullUp,
};
use rp2040_hal::pac::{I2C1, PIO0, UART0};
use rp2040_hal::pio::SM0;
use rp2040_hal::uart::{Enabled, UartPeripheral};
use rp2040_hal::{Timer, I2C};
use rtic::Mutex;
use smart_leds_trait::{SmartLedsWrite, RGB8};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::Ssd1306;
use ws2812_pio::Ws2812Direct;

use sound_monitor::constants::WINDOW_SAMPLES;
use sound_monitor::control::{LedMatrix, MonoDisplay};
use sound_monitor::io::{SampleSource, TransferChannel};
use sound_monitor::render::{Frame, Rgb};

/// Milliseconds since boot from the 1 MHz timer, truncated to `u32`.
pub fn now_ms(timer: &Timer) -> u32 {
    (timer.get_counter().ticks() / 1_000) as u32
}

// ── ADC FIFO ───────────────────────────────────────────────────────────────

/// Microphone conversions on ADC2, paused until the engine starts them.
pub struct MicFifo {
    fifo: AdcFifo<'static, u16>,
    running: bool,
}

impl MicFifo {
    pub fn new(fifo: AdcFifo<'static, u16>) -> Self {
        MicFifo {
            fifo,
            running: false,
        }
    }

    pub fn read_target(&self) -> DmaReadTarget<u16> {
        self.fifo.dma_read_target()
    }
}

impl SampleSource for MicFifo {
    fn start(&mut self) {
        // Conversions left from before the pause are stale.
        self.fifo.clear();
        self.fifo.resume();
        self.running = true;
    }

    fn stop(&mut self) {
        self.fifo.pause();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

// ── DMA window ─────────────────────────────────────────────────────────────

type WindowBuf = &'static mut [u16; WINDOW_SAMPLES];
type WindowTransfer = single_buffer::Transfer<Channel<CH0>, DmaReadTarget<u16>, WindowBuf>;

enum Slot {
    /// Channel and buffer are ours; the buffer holds the last window.
    Ready(Channel<CH0>, DmaReadTarget<u16>, WindowBuf),
    InFlight(WindowTransfer),
    /// Only observed while a method is swapping the slot.
    Moving,
}

/// DMA channel 0 reading the ADC FIFO into one static window buffer.
///
/// The HAL moves the channel and buffer into the transfer while it runs, so
/// the interrupt mask is remembered and applied whenever the channel is back.
pub struct AdcWindow {
    slot: Slot,
    irq_enabled: bool,
}

impl AdcWindow {
    pub fn new(channel: Channel<CH0>, from: DmaReadTarget<u16>, buffer: WindowBuf) -> Self {
        AdcWindow {
            slot: Slot::Ready(channel, from, buffer),
            irq_enabled: false,
        }
    }

    fn apply_irq(channel: &mut Channel<CH0>, enabled: bool) {
        if enabled {
            channel.enable_irq0();
        } else {
            channel.disable_irq0();
        }
    }
}

impl TransferChannel for AdcWindow {
    fn arm(&mut self) {
        self.slot = match core::mem::replace(&mut self.slot, Slot::Moving) {
            Slot::Ready(mut channel, from, buffer) => {
                Self::apply_irq(&mut channel, self.irq_enabled);
                Slot::InFlight(single_buffer::Config::new(channel, from, buffer).start())
            }
            other => other,
        };
    }

    fn disarm(&mut self) {
        self.slot = match core::mem::replace(&mut self.slot, Slot::Moving) {
            Slot::InFlight(transfer) => {
                let (mut channel, from, buffer) = transfer.abort();
                Self::apply_irq(&mut channel, self.irq_enabled);
                Slot::Ready(channel, from, buffer)
            }
            other => other,
        };
    }

    fn take_completion(&mut self) -> bool {
        let (slot, fired) = match core::mem::replace(&mut self.slot, Slot::Moving) {
            Slot::InFlight(mut transfer) => {
                if transfer.check_irq0() && transfer.is_done() {
                    let (channel, from, buffer) = transfer.wait();
                    (Slot::Ready(channel, from, buffer), true)
                } else {
                    (Slot::InFlight(transfer), false)
                }
            }
            Slot::Ready(mut channel, from, buffer) => {
                let fired = channel.check_irq0();
                (Slot::Ready(channel, from, buffer), fired)
            }
            Slot::Moving => (Slot::Moving, false),
        };
        self.slot = slot;
        fired
    }

    fn set_completion_interrupt(&mut self, enabled: bool) {
        self.irq_enabled = enabled;
        if let Slot::Ready(channel, _, _) = &mut self.slot {
            Self::apply_irq(channel, enabled);
        }
    }

    fn window(&self) -> Option<&[u16]> {
        match &self.slot {
            Slot::Ready(_, _, buffer) => Some(&buffer[..]),
            _ => None,
        }
    }
}

// ── LED matrix ─────────────────────────────────────────────────────────────

pub type MatrixPin = Pin<Gpio7, FunctionPio0, PullDown>;

/// 25 WS2812 pixels on one PIO state machine.
pub struct Matrix(pub Ws2812Direct<PIO0, SM0, MatrixPin>);

fn rgb8(color: Rgb) -> RGB8 {
    RGB8::new(color.r, color.g, color.b)
}

impl LedMatrix for Matrix {
    type Error = ();

    fn push(&mut self, color: Rgb) -> Result<(), ()> {
        self.0.write(core::iter::once(rgb8(color)))
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), ()> {
        self.0.write(frame.cells().iter().map(|&c| rgb8(c)))
    }
}

// ── Display ────────────────────────────────────────────────────────────────

pub type OledI2c = I2C<
    I2C1,
    (
        Pin<Gpio14, FunctionI2C, PullUp>,
        Pin<Gpio15, FunctionI2C, PullUp>,
    ),
>;

pub type Oled =
    Ssd1306<I2CInterface<OledI2c>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// SSD1306 in buffered mode, drawn with `embedded-graphics`.
pub struct Screen(pub Oled);

fn color(on: bool) -> BinaryColor {
    if on {
        BinaryColor::On
    } else {
        BinaryColor::Off
    }
}

impl MonoDisplay for Screen {
    type Error = DisplayError;

    fn fill(&mut self, on: bool) -> Result<(), DisplayError> {
        DrawTarget::clear(&mut self.0, color(on))
    }

    fn draw_rect(
        &mut self,
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        on: bool,
        filled: bool,
    ) -> Result<(), DisplayError> {
        let style = if filled {
            PrimitiveStyle::with_fill(color(on))
        } else {
            PrimitiveStyle::with_stroke(color(on), 1)
        };
        Rectangle::new(
            Point::new(x.into(), y.into()),
            Size::new(width.into(), height.into()),
        )
        .into_styled(style)
        .draw(&mut self.0)
    }

    fn draw_string(&mut self, text: &str, x: u8, y: u8) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_8X13, BinaryColor::On);
        Text::with_baseline(text, Point::new(x.into(), y.into()), style, Baseline::Top)
            .draw(&mut self.0)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.0.flush()
    }
}

// ── Buttons ────────────────────────────────────────────────────────────────

pub type ButtonPin<I> = Pin<I, FunctionSioInput, PullUp>;

pub struct Buttons {
    pub capture: ButtonPin<Gpio5>,
    pub tone: ButtonPin<Gpio6>,
    pub reporting: ButtonPin<Gpio22>,
}

impl Buttons {
    /// Enable falling-edge interrupts on all three.
    pub fn listen(&mut self) {
        self.capture.set_interrupt_enabled(Interrupt::EdgeLow, true);
        self.tone.set_interrupt_enabled(Interrupt::EdgeLow, true);
        self.reporting.set_interrupt_enabled(Interrupt::EdgeLow, true);
    }
}

/// Check and acknowledge a pending falling edge.
pub fn take_edge<I: PinId>(pin: &mut ButtonPin<I>) -> bool {
    let fired = pin.interrupt_status(Interrupt::EdgeLow);
    if fired {
        pin.clear_interrupt(Interrupt::EdgeLow);
    }
    fired
}

// ── Console ────────────────────────────────────────────────────────────────

pub type Console = UartPeripheral<
    Enabled,
    UART0,
    (
        Pin<Gpio0, FunctionUart, PullDown>,
        Pin<Gpio1, FunctionUart, PullDown>,
    ),
>;

/// Takes the console lock per write, so a long report never holds it across
/// display traffic.
pub struct LockedConsole<'a, M>(pub &'a mut M);

impl<M> fmt::Write for LockedConsole<'_, M>
where
    M: Mutex<T = Console>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.lock(|console| console.write_str(s))
    }
}
