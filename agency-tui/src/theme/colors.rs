use ratatui::style::Color;

/// `0xRRGGBB` to a terminal RGB color.
pub fn hex_to_color(hex: u32) -> Color {
    let r = ((hex >> 16) & 0xFF) as u8;
    let g = ((hex >> 8) & 0xFF) as u8;
    let b = (hex & 0xFF) as u8;
    Color::Rgb(r, g, b)
}
