use core::{convert::Infallible, fmt::Debug};

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

pub const FRAME_WIDTH: usize = 128;
pub const FRAME_HEIGHT: usize = 64;
pub const FRAME_PAGES: usize = FRAME_HEIGHT / 8;
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_PAGES;

/// Monochrome display that can be drawn into and then pushed to the glass.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    type FlushError: Debug;

    fn flush(&mut self) -> Result<(), Self::FlushError>;
}

/// 128x64 1-bpp framebuffer in SSD1306 page order: byte `x + (y / 8) * 128`, bit `y % 8`.
#[derive(Clone)]
pub struct MonoFrame {
    buffer: [u8; FRAME_BYTES],
}

impl MonoFrame {
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAME_BYTES],
        }
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_BYTES] {
        &self.buffer
    }

    pub fn page(&self, page: usize) -> &[u8] {
        let start = page * FRAME_WIDTH;
        &self.buffer[start..start + FRAME_WIDTH]
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return false;
        }
        self.buffer[x + (y / 8) * FRAME_WIDTH] & (1 << (y % 8)) != 0
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return;
        }
        let byte = &mut self.buffer[x + (y / 8) * FRAME_WIDTH];
        let mask = 1 << (y % 8);
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Lit pixels inside the given rectangle.
    pub fn count_lit(&self, left: usize, top: usize, width: usize, height: usize) -> usize {
        let mut lit = 0;
        for y in top..top + height {
            for x in left..left + width {
                if self.pixel(x, y) {
                    lit += 1;
                }
            }
        }
        lit
    }
}

impl Default for MonoFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for MonoFrame {
    fn size(&self) -> Size {
        Size::new(FRAME_WIDTH as u32, FRAME_HEIGHT as u32)
    }
}

impl DrawTarget for MonoFrame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as usize, point.y as usize, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(match color {
            BinaryColor::Off => 0x00,
            BinaryColor::On => 0xFF,
        });
        Ok(())
    }
}

/// A bare frame has nothing to push to.
impl Panel for MonoFrame {
    type FlushError = Infallible;

    fn flush(&mut self) -> Result<(), Self::FlushError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    use super::*;

    #[test]
    fn pixels_land_in_page_layout() {
        let mut frame = MonoFrame::new();
        let _ = Pixel(Point::new(3, 10), BinaryColor::On).draw(&mut frame);
        assert_eq!(frame.as_bytes()[3 + FRAME_WIDTH], 0b0000_0100);
        assert!(frame.pixel(3, 10));
        assert_eq!(frame.page(1)[3], 0b0000_0100);
    }

    #[test]
    fn out_of_bounds_pixels_are_dropped() {
        let mut frame = MonoFrame::new();
        let _ = Pixel(Point::new(-1, 0), BinaryColor::On).draw(&mut frame);
        let _ = Pixel(Point::new(128, 0), BinaryColor::On).draw(&mut frame);
        let _ = Pixel(Point::new(0, 64), BinaryColor::On).draw(&mut frame);
        assert!(frame.as_bytes().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn clear_and_fill_cover_whole_frame() {
        let mut frame = MonoFrame::new();
        let _ = frame.clear(BinaryColor::On);
        assert_eq!(frame.count_lit(0, 0, FRAME_WIDTH, FRAME_HEIGHT), FRAME_WIDTH * FRAME_HEIGHT);
        let _ = frame.clear(BinaryColor::Off);
        let _ = Rectangle::new(Point::new(2, 2), Size::new(4, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut frame);
        assert_eq!(frame.count_lit(0, 0, FRAME_WIDTH, FRAME_HEIGHT), 12);
    }
}
