use std::str::FromStr;

use color::{DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate.
/// This provides convenience methods for working with CSS color strings such
/// as export background colors.
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(format!("Invalid color '{color_str}': {err}")),
        }
    }

    /// Get the color as 8-bit sRGB components, for bitmap fills.
    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        (rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("white").unwrap()
    }
}

// For compatibility with callers that carry colors as strings
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}
