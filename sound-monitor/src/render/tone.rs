//! PWM buzzer tone.
//!
//! [`PwmTone`] drives one or two passive buzzers from any
//! [`embedded_hal::pwm::SetDutyCycle`] channels: 50 % duty while the tone is
//! on, fully off otherwise. The PWM slice must already run at the tone
//! frequency; [`pwm_top`] computes the wrap value for that.
//!
//! ```ignore
//! let slice = &mut pwm_slices.pwm2;
//! slice.set_top(pwm_top(125_000_000, 1, TONE_FREQUENCY_HZ));
//! let mut tone = PwmTone::new(slice.channel_b, other.channel_a);
//! tone.tone_on()?;
//! ```

use embedded_hal::pwm::SetDutyCycle;

use crate::control::ToneOutput;

/// PWM counter wrap value so one period lasts `1 / tone_hz`.
///
/// The counter runs `top + 1` cycles of `clock_hz / divider` per period.
/// Saturates at `u16::MAX` for tones too low for the divider.
pub const fn pwm_top(clock_hz: u32, divider: u32, tone_hz: u32) -> u16 {
    let ticks = clock_hz / divider / tone_hz;
    if ticks == 0 {
        0
    } else if ticks - 1 > u16::MAX as u32 {
        u16::MAX
    } else {
        (ticks - 1) as u16
    }
}

/// Square-wave tone on a pair of PWM channels.
pub struct PwmTone<A, B> {
    a: A,
    b: B,
    on: bool,
}

impl<A, B> PwmTone<A, B>
where
    A: SetDutyCycle,
    B: SetDutyCycle<Error = A::Error>,
{
    /// Take both channels and silence them.
    pub fn new(mut a: A, mut b: B) -> Result<Self, A::Error> {
        a.set_duty_cycle_fully_off()?;
        b.set_duty_cycle_fully_off()?;
        Ok(PwmTone { a, b, on: false })
    }

    /// Whether the tone is currently sounding.
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Give the channels back.
    pub fn release(self) -> (A, B) {
        (self.a, self.b)
    }
}

impl<A, B> ToneOutput for PwmTone<A, B>
where
    A: SetDutyCycle,
    B: SetDutyCycle<Error = A::Error>,
{
    type Error = A::Error;

    fn tone_on(&mut self) -> Result<(), Self::Error> {
        self.a.set_duty_cycle_percent(50)?;
        self.b.set_duty_cycle_percent(50)?;
        self.on = true;
        Ok(())
    }

    fn tone_off(&mut self) -> Result<(), Self::Error> {
        self.a.set_duty_cycle_fully_off()?;
        self.b.set_duty_cycle_fully_off()?;
        self.on = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::pwm::{self, ErrorType};

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl pwm::Error for MockError {
        fn kind(&self) -> pwm::ErrorKind {
            pwm::ErrorKind::Other
        }
    }

    /// Mock PWM channel with a 62 500-count period.
    struct MockPwm {
        duty: u16,
        writes: u32,
    }

    impl MockPwm {
        fn new() -> Self {
            MockPwm {
                duty: 0xFFFF,
                writes: 0,
            }
        }
    }

    impl ErrorType for MockPwm {
        type Error = MockError;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            62_500
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn top_for_two_khz() {
        assert_eq!(pwm_top(125_000_000, 1, 2000), 62_499);
        assert_eq!(pwm_top(125_000_000, 1, 100), u16::MAX);
        assert_eq!(pwm_top(1000, 1, 2000), 0);
    }

    #[test]
    fn new_silences_both() {
        let tone = PwmTone::new(MockPwm::new(), MockPwm::new()).unwrap();
        assert!(!tone.is_on());
        let (a, b) = tone.release();
        assert_eq!(a.duty, 0);
        assert_eq!(b.duty, 0);
    }

    #[test]
    fn on_is_half_duty_off_is_zero() {
        let mut tone = PwmTone::new(MockPwm::new(), MockPwm::new()).unwrap();
        tone.tone_on().unwrap();
        assert!(tone.is_on());
        {
            let (a, b) = (&tone.a, &tone.b);
            assert_eq!(a.duty, 31_250);
            assert_eq!(b.duty, 31_250);
        }
        tone.tone_off().unwrap();
        let (a, b) = tone.release();
        assert_eq!(a.duty, 0);
        assert_eq!(b.duty, 0);
        assert_eq!(a.writes, 3);
    }
}
