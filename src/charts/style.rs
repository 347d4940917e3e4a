//! Plot Presets
//! Figure sizes, font sizes and line widths for screen, file and report output.

use super::ChartError;
use plotters::style::{RGBColor, BLACK, WHITE};
use std::str::FromStr;

/// Default tab10-like colour cycle.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// What a plot is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotType {
    /// Full-screen display.
    Screen,
    /// An electronic file.
    File,
    /// Compromise between screen visibility and report readability.
    #[default]
    Both,
    Square,
}

impl PlotType {
    /// Default figure size in hectopixels.
    pub fn size(self) -> (f64, f64) {
        match self {
            PlotType::Screen => (19.2, 10.8),
            PlotType::File => (12.5, 7.0),
            PlotType::Both => (15.8, 8.5),
            PlotType::Square => (8.5, 8.5),
        }
    }

    pub fn font_size(self) -> u32 {
        match self {
            PlotType::Screen | PlotType::File => 14,
            PlotType::Both | PlotType::Square => 16,
        }
    }

    pub fn line_width(self) -> u32 {
        match self {
            PlotType::File | PlotType::Both => 2,
            PlotType::Screen | PlotType::Square => 1,
        }
    }
}

impl FromStr for PlotType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "screen" => Ok(PlotType::Screen),
            "file" => Ok(PlotType::File),
            "both" => Ok(PlotType::Both),
            "square" => Ok(PlotType::Square),
            _ => Err(ChartError::UnknownPlotType(s.to_string())),
        }
    }
}

/// Resolved figure settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotStyle {
    /// Horizontal size (hectopixels).
    pub hsize: f64,
    /// Vertical size (hectopixels).
    pub vsize: f64,
    pub font_size: u32,
    pub line_width: u32,
    pub dark_bg: bool,
}

impl PlotStyle {
    pub fn new(ptype: PlotType) -> Self {
        let (hsize, vsize) = ptype.size();
        Self {
            hsize,
            vsize,
            font_size: ptype.font_size(),
            line_width: ptype.line_width(),
            dark_bg: false,
        }
    }

    pub fn with_size(mut self, hsize: f64, vsize: f64) -> Self {
        self.hsize = hsize;
        self.vsize = vsize;
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_dark_bg(mut self, dark_bg: bool) -> Self {
        self.dark_bg = dark_bg;
        self
    }

    /// Image size in pixels.
    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.hsize * 100.0).round() as u32,
            (self.vsize * 100.0).round() as u32,
        )
    }

    pub fn background(&self) -> RGBColor {
        if self.dark_bg {
            BLACK
        } else {
            WHITE
        }
    }

    pub fn foreground(&self) -> RGBColor {
        if self.dark_bg {
            WHITE
        } else {
            BLACK
        }
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self::new(PlotType::default())
    }
}
