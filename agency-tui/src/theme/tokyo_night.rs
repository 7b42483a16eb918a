use super::Palette;

pub const TOKYO_NIGHT: Palette = Palette {
    name: "Tokyo Night",
    background: 0x1a1b26,
    foreground: 0xc0caf5,
    foreground_dim: 0x565f89,
    surface: 0x24283b,
    border: 0x414868,
    accent: 0x7aa2f7,
    accent_secondary: 0xbb9af7,
    success: 0x9ece6a,
    warning: 0xe0af68,
    error: 0xf7768e,
    info: 0x7dcfff,
};
