use core::fmt::{self, Write};

use crate::{state::NetworkIdentity, ProjectInfo};

pub const INFO_PAGE_MAX: usize = 2048;

const PAGE_STYLE: &str = "body{font-family:system-ui,Arial,sans-serif;background:#111;color:#eee;margin:0}\
header{background:#222;padding:1rem;text-align:center}\
h1{margin:0;font-size:1.4rem}\
main{padding:1rem;max-width:800px;margin:0 auto}\
.card{background:#1e1e1e;border-radius:8px;padding:1rem;margin-bottom:1rem}\
table{width:100%;border-collapse:collapse;font-size:0.9rem}\
td{padding:0.3rem 0.5rem;vertical-align:top}\
td.label{color:#aaa;width:35%}";

/// Runtime facts about the board, sampled per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardInfo {
    pub chip: &'static str,
    /// `major * 100 + minor`, the eFuse wafer version encoding.
    pub chip_revision: u16,
    pub flash_bytes: usize,
    /// Zero when PSRAM is not mapped.
    pub psram_bytes: usize,
    pub heap_free_bytes: usize,
    pub heap_used_bytes: usize,
}

pub fn render_info_page(
    project: ProjectInfo,
    identity: Option<&NetworkIdentity>,
    board: BoardInfo,
) -> Result<heapless::String<INFO_PAGE_MAX>, fmt::Error> {
    let mut out = heapless::String::new();
    write_info_page(&mut out, project, identity, board)?;
    Ok(out)
}

pub fn write_info_page<W: Write>(
    out: &mut W,
    project: ProjectInfo,
    identity: Option<&NetworkIdentity>,
    board: BoardInfo,
) -> fmt::Result {
    out.write_str("<!DOCTYPE html><html><head><meta charset='utf-8'>")?;
    out.write_str("<meta name='viewport' content='width=device-width,initial-scale=1'>")?;
    out.write_str("<title>")?;
    write_escaped(out, project.name)?;
    write!(out, "</title><style>{PAGE_STYLE}</style></head><body><header><h1>")?;
    write_escaped(out, project.name)?;
    out.write_str("</h1></header><main>")?;

    open_card(out, "Project")?;
    row(out, "Name", |out| write_escaped(out, project.name))?;
    row(out, "Version", |out| write_escaped(out, project.version))?;
    close_card(out)?;

    open_card(out, "Connection")?;
    match identity {
        Some(identity) => {
            row(out, "SSID", |out| write_escaped(out, identity.ssid()))?;
            row(out, "IP address", |out| write!(out, "{}", identity.address()))?;
        }
        None => row(out, "Status", |out| out.write_str("not connected"))?,
    }
    close_card(out)?;

    open_card(out, "Board")?;
    row(out, "Chip", |out| write_escaped(out, board.chip))?;
    row(out, "Chip revision", |out| {
        write!(out, "v{}.{}", board.chip_revision / 100, board.chip_revision % 100)
    })?;
    row(out, "Flash", |out| write!(out, "{} MB", board.flash_bytes / (1024 * 1024)))?;
    row(out, "PSRAM", |out| match board.psram_bytes {
        0 => out.write_str("n/a"),
        bytes => write!(out, "{} KB", bytes / 1024),
    })?;
    row(out, "Free heap", |out| write!(out, "{} KB", board.heap_free_bytes / 1024))?;
    row(out, "Used heap", |out| write!(out, "{} KB", board.heap_used_bytes / 1024))?;
    close_card(out)?;

    out.write_str("</main></body></html>")
}

fn open_card<W: Write>(out: &mut W, title: &str) -> fmt::Result {
    write!(out, "<div class='card'><h2>{title}</h2><table>")
}

fn close_card<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str("</table></div>")
}

fn row<W, F>(out: &mut W, label: &str, value: F) -> fmt::Result
where
    W: Write,
    F: FnOnce(&mut W) -> fmt::Result,
{
    write!(out, "<tr><td class='label'>{label}</td><td>")?;
    value(out)?;
    out.write_str("</td></tr>")
}

fn write_escaped<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            '\'' => out.write_str("&#39;")?,
            _ => out.write_char(ch)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::net::Ipv4Addr;

    use super::*;

    const PROJECT: ProjectInfo = ProjectInfo {
        name: "netboot",
        version: "0.1.0",
    };

    const BOARD: BoardInfo = BoardInfo {
        chip: "esp32s3",
        chip_revision: 2,
        flash_bytes: 16 * 1024 * 1024,
        psram_bytes: 8 * 1024 * 1024,
        heap_free_bytes: 40 * 1024,
        heap_used_bytes: 32 * 1024,
    };

    #[test]
    fn page_lists_connection_and_board() {
        let identity = NetworkIdentity::new("home", Ipv4Addr::new(192, 168, 1, 20));
        let page = render_info_page(PROJECT, Some(&identity), BOARD).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.ends_with("</html>"));
        assert!(page.contains("<td>home</td>"));
        assert!(page.contains("<td>192.168.1.20</td>"));
        assert!(page.contains("<td>0.1.0</td>"));
        assert!(page.contains("<td>40 KB</td>"));
        assert!(page.contains("<td class='label'>Flash</td><td>16 MB</td>"));
        assert!(page.contains("<td class='label'>PSRAM</td><td>8192 KB</td>"));
        assert!(page.contains("<td class='label'>Chip revision</td><td>v0.2</td>"));
        assert!(page.contains("<td class='label'>Free heap</td><td>40 KB</td>"));
        assert!(!page.contains("not connected"));
    }

    #[test]
    fn board_without_psram_says_so() {
        let board = BoardInfo {
            psram_bytes: 0,
            chip_revision: 102,
            ..BOARD
        };
        let page = render_info_page(PROJECT, None, board).unwrap();
        assert!(page.contains("<td class='label'>PSRAM</td><td>n/a</td>"));
        assert!(page.contains("<td>v1.2</td>"));
    }

    #[test]
    fn page_without_identity_says_not_connected() {
        let page = render_info_page(PROJECT, None, BOARD).unwrap();
        assert!(page.contains("<td>not connected</td>"));
        assert!(!page.contains("IP address"));
    }

    #[test]
    fn network_names_are_escaped() {
        let identity = NetworkIdentity::new("<b>&'cafe\"", Ipv4Addr::LOCALHOST);
        let page = render_info_page(PROJECT, Some(&identity), BOARD).unwrap();
        assert!(page.contains("&lt;b&gt;&amp;&#39;cafe&quot;"));
        assert!(!page.contains("<b>"));
    }

    #[test]
    fn page_fits_the_response_buffer() {
        let long = [b'w'; 32];
        let identity =
            NetworkIdentity::new(core::str::from_utf8(&long).unwrap(), Ipv4Addr::BROADCAST);
        assert!(render_info_page(PROJECT, Some(&identity), BOARD).is_ok());
    }
}
