//! Boot screens for the 128x64 status panel.

use core::{fmt::Write, net::Ipv4Addr};

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use log::warn;
use u8g2_fonts::{
    fonts,
    types::{FontColor, HorizontalAlignment, VerticalPosition},
    FontRenderer,
};

use crate::{
    feedback::{Progress, ProgressReporter},
    frame::Panel,
    state::NetworkIdentity,
    ProjectInfo,
};

pub const SCREEN_WIDTH: i32 = 128;
pub const LINE_HEIGHT: i32 = 8;
pub const BAR_X: i32 = 0;
pub const BAR_Y: i32 = 24;
pub const BAR_WIDTH: u32 = 128;
pub const BAR_HEIGHT: u32 = 10;
const STATUS_Y: i32 = 40;
const IDENTIFIER_Y: i32 = 52;
const SSID_Y: i32 = 24;
const ADDRESS_Y: i32 = 36;

const TEXT_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_5x8_tf>();
const TITLE_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_6x10_tf>();

/// Which boot stage gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootFault {
    Wifi,
    App,
}

impl BootFault {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::App => "app",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Wifi => "WiFi error",
            Self::App => "App error",
        }
    }
}

/// Inner fill of the progress bar: the scaled width minus the two outline columns.
pub fn bar_fill_width(progress: Progress) -> u32 {
    progress.scaled(BAR_WIDTH).saturating_sub(2)
}

pub fn draw_splash<T>(display: &mut T, project: ProjectInfo)
where
    T: DrawTarget<Color = BinaryColor>,
{
    let _ = display.clear(BinaryColor::Off);
    let _ = TITLE_FONT.render_aligned(
        project.name,
        Point::new(SCREEN_WIDTH / 2, 22),
        VerticalPosition::Center,
        HorizontalAlignment::Center,
        FontColor::Transparent(BinaryColor::On),
        display,
    );
    draw_line(display, "Starting...", 34);
}

pub fn draw_progress<T>(display: &mut T, project: ProjectInfo, progress: Progress, identifier: &str)
where
    T: DrawTarget<Color = BinaryColor>,
{
    let _ = display.clear(BinaryColor::Off);
    draw_header(display, project);

    let _ = Rectangle::new(Point::new(BAR_X, BAR_Y), Size::new(BAR_WIDTH, BAR_HEIGHT))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display);
    let fill = bar_fill_width(progress);
    if fill > 0 {
        let _ = Rectangle::new(
            Point::new(BAR_X + 1, BAR_Y + 1),
            Size::new(fill, BAR_HEIGHT - 2),
        )
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(display);
    }

    draw_line(display, "Connecting WiFi...", STATUS_Y);
    draw_line(display, identifier, IDENTIFIER_Y);
}

pub fn draw_main<T>(display: &mut T, project: ProjectInfo, identity: &NetworkIdentity)
where
    T: DrawTarget<Color = BinaryColor>,
{
    let _ = display.clear(BinaryColor::Off);
    draw_header(display, project);
    draw_line(display, format_ssid_line(identity.ssid()).as_str(), SSID_Y);
    draw_line(display, format_address_line(identity.address()).as_str(), ADDRESS_Y);
}

pub fn draw_error<T>(display: &mut T, fault: BootFault)
where
    T: DrawTarget<Color = BinaryColor>,
{
    let _ = display.clear(BinaryColor::Off);
    draw_line(display, fault.headline(), 0);
}

pub fn format_ssid_line(ssid: &str) -> heapless::String<40> {
    let mut out = heapless::String::<40>::new();
    let _ = write!(&mut out, "SSID: {ssid}");
    out
}

pub fn format_address_line(address: Ipv4Addr) -> heapless::String<24> {
    let mut out = heapless::String::<24>::new();
    let _ = write!(&mut out, "IP: {address}");
    out
}

fn draw_header<T>(display: &mut T, project: ProjectInfo)
where
    T: DrawTarget<Color = BinaryColor>,
{
    draw_line(display, project.name, 0);
    draw_line(display, project.version, LINE_HEIGHT);
}

fn draw_line<T>(display: &mut T, text: &str, top: i32)
where
    T: DrawTarget<Color = BinaryColor>,
{
    let _ = TEXT_FONT.render(
        text,
        Point::new(0, top),
        VerticalPosition::Top,
        FontColor::Transparent(BinaryColor::On),
        display,
    );
}

/// Owns the panel for the whole boot sequence and renders connect progress into it.
pub struct ProgressScreen<P: Panel> {
    panel: P,
    project: ProjectInfo,
}

impl<P: Panel> ProgressScreen<P> {
    pub fn new(panel: P, project: ProjectInfo) -> Self {
        Self { panel, project }
    }

    pub fn splash(&mut self) {
        draw_splash(&mut self.panel, self.project);
        self.flush();
    }

    pub fn main(&mut self, identity: &NetworkIdentity) {
        draw_main(&mut self.panel, self.project, identity);
        self.flush();
    }

    pub fn error(&mut self, fault: BootFault) {
        draw_error(&mut self.panel, fault);
        self.flush();
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    fn flush(&mut self) {
        if let Err(err) = self.panel.flush() {
            warn!("screen: flush failed err={:?}", err);
        }
    }
}

impl<P: Panel> ProgressReporter for ProgressScreen<P> {
    fn report(&mut self, progress: Progress, identifier: &str, _address: Option<Ipv4Addr>) {
        draw_progress(&mut self.panel, self.project, progress, identifier);
        self.flush();
    }
}
