//! Configuration types for NetSvg diagram rendering.
//!
//! This module provides configuration structures that control how network
//! diagrams are sized, laid out, styled and exported. All types implement
//! [`serde::Deserialize`] for loading from TOML files.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`CanvasConfig`] - Canvas size and background.
//! - [`LayoutConfig`] - Fit-to-view and curved edge settings.
//! - [`StyleConfig`] - Label font, edge coloring and extra CSS.
//! - [`ExportConfig`] - Serialization options.
//!
//! # Example
//!
//! ```
//! # use netsvg::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r##"
//!     [canvas]
//!     width = 400
//!     background = "#fafafa"
//!
//!     [layout]
//!     fit_to_view = true
//!     fit_margin = [10, 30]
//!     "##,
//! )
//! .unwrap();
//!
//! assert_eq!(config.canvas().width(), 400.0);
//! assert_eq!(config.canvas().height(), 600.0);
//! assert!(config.layout().fit_to_view());
//! ```

use serde::Deserialize;

use netsvg_core::color::Color;

use crate::{
    error::NetSvgError,
    layout::{FitMargin, validate_curve_factor},
    network::{EdgeColorMode, ExportOptions},
};

/// The font stack injected for labels unless configured otherwise.
pub const DEFAULT_LABEL_FONT_FAMILY: &str = "Roboto, Helvetica, Arial, sans-serif";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Canvas configuration section.
    #[serde(default)]
    canvas: CanvasConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(canvas: CanvasConfig, layout: LayoutConfig, style: StyleConfig, export: ExportConfig) -> Self {
        Self {
            canvas,
            layout,
            style,
            export,
        }
    }

    /// Returns the canvas configuration.
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}

/// Canvas size and background.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    width: f64,
    height: f64,
    background: Option<String>,
}

impl CanvasConfig {
    /// Creates a new [`CanvasConfig`].
    pub fn new(width: f64, height: f64, background: Option<String>) -> Self {
        Self {
            width,
            height,
            background,
        }
    }

    /// Returns the canvas width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the canvas height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the validated background color string, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::InvalidOption`] if the color cannot be parsed.
    pub fn background(&self) -> Result<Option<&str>, NetSvgError> {
        match &self.background {
            Some(color) => {
                Color::new(color).map_err(|err| NetSvgError::invalid_option("canvas.background", err))?;
                Ok(Some(color.as_str()))
            }
            None => Ok(None),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: None,
        }
    }
}

/// Fit-to-view and curved edge settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    fit_to_view: bool,
    fit_margin: FitMargin,
    directed_curves: bool,
    directed_curve_factor: f32,
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    pub fn new(fit_to_view: bool, fit_margin: FitMargin, directed_curves: bool, directed_curve_factor: f32) -> Self {
        Self {
            fit_to_view,
            fit_margin,
            directed_curves,
            directed_curve_factor,
        }
    }

    /// Returns whether positions are fitted into the canvas.
    pub fn fit_to_view(&self) -> bool {
        self.fit_to_view
    }

    /// Returns the margin kept free when fitting.
    pub fn fit_margin(&self) -> FitMargin {
        self.fit_margin
    }

    /// Returns whether edges of directed graphs are drawn as arcs.
    pub fn directed_curves(&self) -> bool {
        self.directed_curves
    }

    /// Returns the validated curve factor.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::InvalidOption`] unless the factor is finite and
    /// greater than zero.
    pub fn directed_curve_factor(&self) -> Result<f32, NetSvgError> {
        validate_curve_factor(self.directed_curve_factor)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fit_to_view: false,
            fit_margin: FitMargin::default(),
            directed_curves: false,
            directed_curve_factor: 1.0,
        }
    }
}

/// Label font, edge coloring and extra CSS.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    label_font_family: String,
    edge_color_mode: EdgeColorMode,
    css: Option<String>,
}

impl StyleConfig {
    /// Creates a new [`StyleConfig`].
    pub fn new(label_font_family: impl Into<String>, edge_color_mode: EdgeColorMode, css: Option<String>) -> Self {
        Self {
            label_font_family: label_font_family.into(),
            edge_color_mode,
            css,
        }
    }

    /// Returns the label font stack, or `None` when injection is disabled.
    pub fn label_font_family(&self) -> Option<&str> {
        let family = self.label_font_family.trim();
        (!family.is_empty()).then_some(family)
    }

    /// Returns the edge coloring mode.
    pub fn edge_color_mode(&self) -> EdgeColorMode {
        self.edge_color_mode
    }

    /// Returns extra CSS rules for the document style node.
    pub fn css(&self) -> Option<&str> {
        self.css.as_deref()
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            label_font_family: DEFAULT_LABEL_FONT_FAMILY.to_string(),
            edge_color_mode: EdgeColorMode::default(),
            css: None,
        }
    }
}

/// Serialization options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pretty: bool,
    illustrator_safe: bool,
}

impl ExportConfig {
    /// Creates a new [`ExportConfig`].
    pub fn new(pretty: bool, illustrator_safe: bool) -> Self {
        Self {
            pretty,
            illustrator_safe,
        }
    }

    /// Returns the [`ExportOptions`] described by this section.
    pub fn options(&self) -> ExportOptions {
        ExportOptions::new(self.pretty, self.illustrator_safe)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            illustrator_safe: true,
        }
    }
}
