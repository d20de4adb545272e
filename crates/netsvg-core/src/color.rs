//! Color handling for NetSvg documents
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors are parsed from CSS strings, blended for
//! edge coloring, darkened for outlines, and written back out as hex.

use std::{fmt, str::FromStr};

use color::{AlphaColor, DynamicColor, Srgb};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use netsvg_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str.trim()) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    fn srgb(self) -> AlphaColor<Srgb> {
        self.color.to_alpha_color::<Srgb>()
    }

    fn from_srgb(color: AlphaColor<Srgb>) -> Self {
        Self {
            color: DynamicColor::from_alpha_color(color),
        }
    }

    /// Linearly interpolates between two colors in sRGB space.
    ///
    /// `t = 0.0` yields `self`, `t = 1.0` yields `other`, `t = 0.5` is the
    /// midpoint blend used for average edge colors.
    ///
    /// # Examples
    ///
    /// ```
    /// use netsvg_core::color::Color;
    ///
    /// let black = Color::new("#000000").unwrap();
    /// let white = Color::new("#ffffff").unwrap();
    /// assert_eq!(black.mix(white, 0.5).to_hex(), "#808080");
    /// ```
    pub fn mix(self, other: Color, t: f32) -> Self {
        let a = self.srgb().components;
        let b = other.srgb().components;
        let mut mixed = [0.0f32; 4];
        for (slot, (from, to)) in mixed.iter_mut().zip(a.iter().zip(b.iter())) {
            *slot = from + (to - from) * t;
        }
        Self::from_srgb(AlphaColor::new(mixed))
    }

    /// Scales the RGB channels by `factor`, truncating to 8-bit values.
    ///
    /// # Examples
    ///
    /// ```
    /// use netsvg_core::color::Color;
    ///
    /// let fill = Color::new("#4C78A8").unwrap();
    /// assert_eq!(fill.darker(0.7).to_hex(), "#355475");
    /// ```
    pub fn darker(self, factor: f32) -> Self {
        let rgba = self.srgb().to_rgba8();
        let scale = |channel: u8| (channel as f32 * factor).clamp(0.0, 255.0).trunc() / 255.0;
        Self::from_srgb(AlphaColor::new([
            scale(rgba.r),
            scale(rgba.g),
            scale(rgba.b),
            rgba.a as f32 / 255.0,
        ]))
    }

    /// Formats the color as a `#rrggbb` hex string, ignoring alpha.
    pub fn to_hex(self) -> String {
        let rgba = self.srgb().to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}

/// Darkens a CSS color string, returning it unchanged when it cannot be parsed.
///
/// Outline and label stroke defaults derive from fill values that may be
/// anything a user stored on the graph (`url(#pattern)`, `none`, ...).
pub fn darken_or_keep(value: &str, factor: f32) -> String {
    match Color::new(value) {
        Ok(color) => color.darker(factor).to_hex(),
        Err(_) => value.to_string(),
    }
}
