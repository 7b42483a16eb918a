use super::Palette;

pub const NORD: Palette = Palette {
    name: "Nord",
    background: 0x2e3440,
    foreground: 0xeceff4,
    foreground_dim: 0x4c566a,
    surface: 0x3b4252,
    border: 0x434c5e,
    accent: 0x88c0d0,
    accent_secondary: 0x81a1c1,
    success: 0xa3be8c,
    warning: 0xebcb8b,
    error: 0xbf616a,
    info: 0x5e81ac,
};
