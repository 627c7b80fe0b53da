//! Minimal SSD1306 (128x64, I2C, internal charge pump) driver over [`MonoFrame`].

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use embedded_hal::i2c::I2c;

use crate::frame::{MonoFrame, Panel, FRAME_HEIGHT, FRAME_PAGES, FRAME_WIDTH};

pub const SSD1306_ADDRESS: u8 = 0x3C;
pub const DATA_CHUNK: usize = 16;

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, (FRAME_HEIGHT - 1) as u8, // multiplex
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4, // resume from RAM
    0xA6, // normal, not inverted
    0x2E, // scroll off
    0xAF, // display on
];

pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    frame: MonoFrame,
}

impl<I2C: I2c> Ssd1306<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            frame: MonoFrame::new(),
        }
    }

    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.command(INIT_SEQUENCE)?;
        self.frame = MonoFrame::new();
        self.flush_frame()
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, commands: &[u8]) -> Result<(), I2C::Error> {
        for command in commands.chunks(DATA_CHUNK) {
            let mut packet = [0u8; DATA_CHUNK + 1];
            packet[0] = CONTROL_COMMAND;
            packet[1..=command.len()].copy_from_slice(command);
            self.i2c.write(self.address, &packet[..=command.len()])?;
        }
        Ok(())
    }

    fn flush_frame(&mut self) -> Result<(), I2C::Error> {
        self.command(&[
            0x21,
            0x00,
            (FRAME_WIDTH - 1) as u8,
            0x22,
            0x00,
            (FRAME_PAGES - 1) as u8,
        ])?;
        let mut packet = [0u8; DATA_CHUNK + 1];
        packet[0] = CONTROL_DATA;
        for chunk in self.frame.as_bytes().chunks(DATA_CHUNK) {
            packet[1..].copy_from_slice(chunk);
            self.i2c.write(self.address, &packet)?;
        }
        Ok(())
    }
}

impl<I2C> OriginDimensions for Ssd1306<I2C> {
    fn size(&self) -> Size {
        self.frame.size()
    }
}

impl<I2C> DrawTarget for Ssd1306<I2C> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.frame.clear(color)
    }
}

impl<I2C: I2c> Panel for Ssd1306<I2C> {
    type FlushError = I2C::Error;

    fn flush(&mut self) -> Result<(), Self::FlushError> {
        self.flush_frame()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::{vec, vec::Vec};

    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;
    use crate::frame::FRAME_BYTES;

    #[derive(Default)]
    struct RecordingBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail_after: Option<usize>,
    }

    impl ErrorType for RecordingBus {
        type Error = ErrorKind;
    }

    impl I2c for RecordingBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for operation in operations {
                if self.fail_after == Some(self.writes.len()) {
                    return Err(ErrorKind::Other);
                }
                match operation {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buffer) => buffer.fill(0),
                }
            }
            Ok(())
        }
    }

    fn data_payload(bus: &RecordingBus) -> Vec<u8> {
        bus.writes
            .iter()
            .filter(|(_, bytes)| bytes[0] == CONTROL_DATA)
            .flat_map(|(_, bytes)| bytes[1..].iter().copied())
            .collect()
    }

    #[test]
    fn init_turns_panel_on_and_blanks_it() {
        let mut display = Ssd1306::new(RecordingBus::default(), SSD1306_ADDRESS);
        display.init().unwrap();
        let bus = display.release();

        let commands: Vec<u8> = bus
            .writes
            .iter()
            .filter(|(_, bytes)| bytes[0] == CONTROL_COMMAND)
            .flat_map(|(_, bytes)| bytes[1..].iter().copied())
            .collect();
        assert_eq!(commands[0], 0xAE);
        assert!(commands.windows(2).any(|pair| pair == [0x8D, 0x14]));
        assert!(commands.contains(&0xAF));
        assert!(bus.writes.iter().all(|(address, _)| *address == SSD1306_ADDRESS));
        assert_eq!(data_payload(&bus), vec![0u8; FRAME_BYTES]);
    }

    #[test]
    fn flush_sends_frame_in_sixteen_byte_chunks() {
        let mut display = Ssd1306::new(RecordingBus::default(), SSD1306_ADDRESS);
        let _ = Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut display);
        let _ = Pixel(Point::new(127, 63), BinaryColor::On).draw(&mut display);
        display.flush().unwrap();
        let bus = display.release();

        let data: Vec<&Vec<u8>> = bus
            .writes
            .iter()
            .map(|(_, bytes)| bytes)
            .filter(|bytes| bytes[0] == CONTROL_DATA)
            .collect();
        assert_eq!(data.len(), FRAME_BYTES / DATA_CHUNK);
        assert!(data.iter().all(|bytes| bytes.len() == DATA_CHUNK + 1));
        let payload = data_payload(&bus);
        assert_eq!(payload[0], 0x01);
        assert_eq!(payload[FRAME_BYTES - 1], 0x80);
    }

    #[test]
    fn bus_errors_propagate() {
        let bus = RecordingBus {
            fail_after: Some(3),
            ..RecordingBus::default()
        };
        let mut display = Ssd1306::new(bus, SSD1306_ADDRESS);
        assert_eq!(display.init(), Err(ErrorKind::Other));
    }
}
