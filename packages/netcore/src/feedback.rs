use core::net::Ipv4Addr;

use embassy_time::Duration;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// Semantic states rendered by the status pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusPhase {
    Idle,
    Scanning,
    Connecting,
    Connected,
    ErrorWifi,
    ErrorApp,
}

impl StatusPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::ErrorWifi => "error_wifi",
            Self::ErrorApp => "error_app",
        }
    }

    pub const fn color(self) -> Rgb888 {
        match self {
            Self::Idle => Rgb888::new(0, 0, 0),
            Self::Scanning => Rgb888::new(0, 0, 255),
            Self::Connecting => Rgb888::new(255, 165, 0),
            Self::Connected => Rgb888::new(0, 255, 0),
            Self::ErrorWifi => Rgb888::new(255, 0, 0),
            Self::ErrorApp => Rgb888::new(255, 0, 255),
        }
    }

    pub fn scaled(self, brightness: u8) -> Rgb888 {
        let color = self.color();
        Rgb888::new(
            scale_channel(color.r(), brightness),
            scale_channel(color.g(), brightness),
            scale_channel(color.b(), brightness),
        )
    }
}

/// Scales one channel the way NeoPixel brightness does: 255 keeps the value, 0 blanks it.
pub const fn scale_channel(value: u8, brightness: u8) -> u8 {
    ((value as u16 * (brightness as u16 + 1)) >> 8) as u8
}

/// WS2812 wire order.
pub fn grb_bytes(color: Rgb888, brightness: u8) -> [u8; 3] {
    [
        scale_channel(color.g(), brightness),
        scale_channel(color.r(), brightness),
        scale_channel(color.b(), brightness),
    ]
}

// WS2812 bit timings in RMT ticks at 80 MHz: one tick is 12.5 ns.
pub const WS2812_T0H_TICKS: u16 = 32;
pub const WS2812_T0L_TICKS: u16 = 68;
pub const WS2812_T1H_TICKS: u16 = 64;
pub const WS2812_T1L_TICKS: u16 = 36;
/// 24 data bits plus the end marker.
pub const WS2812_FRAME_PULSES: usize = 24 + 1;

/// One high-then-low pulse of a WS2812 frame. A zero-length pulse ends the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ws2812Pulse {
    pub high_ticks: u16,
    pub low_ticks: u16,
}

impl Ws2812Pulse {
    pub const ZERO: Self = Self {
        high_ticks: WS2812_T0H_TICKS,
        low_ticks: WS2812_T0L_TICKS,
    };
    pub const ONE: Self = Self {
        high_ticks: WS2812_T1H_TICKS,
        low_ticks: WS2812_T1L_TICKS,
    };
    pub const END: Self = Self {
        high_ticks: 0,
        low_ticks: 0,
    };

    pub const fn is_end(self) -> bool {
        self.high_ticks == 0 && self.low_ticks == 0
    }
}

/// Encodes GRB bytes most significant bit first, followed by the end marker.
pub fn encode_ws2812(grb: [u8; 3]) -> [Ws2812Pulse; WS2812_FRAME_PULSES] {
    let mut frame = [Ws2812Pulse::END; WS2812_FRAME_PULSES];
    let mut slot = 0;
    for byte in grb {
        for bit in (0..8).rev() {
            frame[slot] = if byte & (1 << bit) != 0 {
                Ws2812Pulse::ONE
            } else {
                Ws2812Pulse::ZERO
            };
            slot += 1;
        }
    }
    frame
}

/// Elapsed share of the global connect deadline, in `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Progress(f32);

impl Progress {
    pub const ZERO: Self = Self(0.0);
    pub const COMPLETE: Self = Self(1.0);
    // Largest f32 below 1.0.
    const NEARLY_COMPLETE: f32 = 1.0 - f32::EPSILON / 2.0;

    /// Only an elapsed time at or past `total` yields exactly 1.0.
    pub fn from_elapsed(elapsed: Duration, total: Duration) -> Self {
        if elapsed >= total {
            return Self::COMPLETE;
        }
        let fraction = elapsed.as_micros() as f32 / total.as_micros() as f32;
        Self(fraction.clamp(0.0, Self::NEARLY_COMPLETE))
    }

    pub fn new(fraction: f32) -> Self {
        if fraction.is_nan() {
            return Self::ZERO;
        }
        Self(fraction.clamp(0.0, 1.0))
    }

    pub const fn fraction(self) -> f32 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= 1.0
    }

    /// `width * fraction`, rounded down.
    pub fn scaled(self, width: u32) -> u32 {
        (width as f32 * self.0) as u32
    }

    pub fn percent(self) -> u8 {
        self.scaled(100) as u8
    }
}

pub trait StatusSignaler {
    fn set(&mut self, phase: StatusPhase);
}

pub trait ProgressReporter {
    /// `identifier` names the network being tried; `address` is known only once connected.
    fn report(&mut self, progress: Progress, identifier: &str, address: Option<Ipv4Addr>);
}

impl<T: StatusSignaler + ?Sized> StatusSignaler for &mut T {
    fn set(&mut self, phase: StatusPhase) {
        (**self).set(phase)
    }
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for &mut T {
    fn report(&mut self, progress: Progress, identifier: &str, address: Option<Ipv4Addr>) {
        (**self).report(progress, identifier, address)
    }
}

/// Signaler for boards without a status pixel.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStatus;

impl StatusSignaler for NoStatus {
    fn set(&mut self, _phase: StatusPhase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_colors_match_indicator_palette() {
        assert_eq!(StatusPhase::Idle.color(), Rgb888::BLACK);
        assert_eq!(StatusPhase::Scanning.color(), Rgb888::BLUE);
        assert_eq!(StatusPhase::Connecting.color(), Rgb888::new(255, 165, 0));
        assert_eq!(StatusPhase::Connected.color(), Rgb888::GREEN);
        assert_eq!(StatusPhase::ErrorWifi.color(), Rgb888::RED);
        assert_eq!(StatusPhase::ErrorApp.color(), Rgb888::MAGENTA);
    }

    #[test]
    fn brightness_scaling_matches_neopixel() {
        assert_eq!(scale_channel(255, 255), 255);
        assert_eq!(scale_channel(255, 0), 0);
        assert_eq!(scale_channel(255, 38), 38);
        assert_eq!(scale_channel(165, 38), 25);
        assert_eq!(grb_bytes(StatusPhase::Connecting.color(), 255), [165, 255, 0]);
        assert_eq!(grb_bytes(StatusPhase::Scanning.color(), 38), [0, 0, 38]);
        assert_eq!(StatusPhase::Connecting.scaled(38), Rgb888::new(38, 25, 0));
        assert_eq!(StatusPhase::Idle.scaled(255), Rgb888::BLACK);
    }

    #[test]
    fn ws2812_frame_is_grb_msb_first_with_end_marker() {
        let frame = encode_ws2812(grb_bytes(Rgb888::new(0x01, 0x80, 0x00), 255));

        // Green 0x80: only its first bit is set.
        assert_eq!(frame[0], Ws2812Pulse::ONE);
        assert!(frame[1..8].iter().all(|pulse| *pulse == Ws2812Pulse::ZERO));
        // Red 0x01: only its last bit is set.
        assert!(frame[8..15].iter().all(|pulse| *pulse == Ws2812Pulse::ZERO));
        assert_eq!(frame[15], Ws2812Pulse::ONE);
        assert!(frame[16..24].iter().all(|pulse| *pulse == Ws2812Pulse::ZERO));

        assert!(frame[24].is_end());
        assert!(frame[..24].iter().all(|pulse| !pulse.is_end()));
    }

    #[test]
    fn ws2812_pulses_last_one_bit_period() {
        // 1.25 us per bit at 12.5 ns ticks.
        for pulse in [Ws2812Pulse::ZERO, Ws2812Pulse::ONE] {
            assert_eq!(pulse.high_ticks + pulse.low_ticks, 100);
        }
        assert!(Ws2812Pulse::ONE.high_ticks > Ws2812Pulse::ZERO.high_ticks);
    }

    #[test]
    fn progress_is_clamped_and_only_complete_at_deadline() {
        let total = Duration::from_millis(20_000);
        assert_eq!(Progress::from_elapsed(Duration::from_millis(0), total), Progress::ZERO);
        assert_eq!(
            Progress::from_elapsed(Duration::from_millis(5_000), total).fraction(),
            0.25
        );
        let almost = Progress::from_elapsed(Duration::from_micros(19_999_999), total);
        assert!(almost.fraction() < 1.0);
        assert!(!almost.is_complete());
        assert!(Progress::from_elapsed(total, total).is_complete());
        assert!(Progress::from_elapsed(Duration::from_millis(25_000), total).is_complete());
        assert!(Progress::from_elapsed(Duration::from_millis(0), Duration::from_millis(0))
            .is_complete());
    }

    #[test]
    fn progress_new_rejects_out_of_range() {
        assert_eq!(Progress::new(-0.5), Progress::ZERO);
        assert_eq!(Progress::new(1.5), Progress::COMPLETE);
        assert_eq!(Progress::new(f32::NAN), Progress::ZERO);
        assert_eq!(Progress::new(0.5).scaled(128), 64);
        assert_eq!(Progress::new(0.999).percent(), 99);
    }
}
