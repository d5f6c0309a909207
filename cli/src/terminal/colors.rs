use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::BrightCyan;
pub const IPV4_PREFIX: Color = Color::Cyan;
pub const IPV6_ADDR: Color = Color::BrightMagenta;
pub const PORT: Color = Color::BrightBlue;
