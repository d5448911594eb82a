//! Plotting metadata carried by every indicator.
//!
//! Nothing here renders; an external charting collaborator reads the bundle
//! (draw mode, panel row, line and marker style) alongside the values.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Lines,
    Markers,
    LinesMarkers,
    Text,
    LinesText,
    MarkersText,
    LinesMarkersText,
}

impl DrawMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawMode::Lines => "lines",
            DrawMode::Markers => "markers",
            DrawMode::LinesMarkers => "lines+markers",
            DrawMode::Text => "text",
            DrawMode::LinesText => "lines+text",
            DrawMode::MarkersText => "markers+text",
            DrawMode::LinesMarkersText => "lines+markers+text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lines" => Some(DrawMode::Lines),
            "markers" => Some(DrawMode::Markers),
            "lines+markers" => Some(DrawMode::LinesMarkers),
            "text" => Some(DrawMode::Text),
            "lines+text" => Some(DrawMode::LinesText),
            "markers+text" => Some(DrawMode::MarkersText),
            "lines+markers+text" => Some(DrawMode::LinesMarkersText),
            _ => None,
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub size: f64,
    pub color: String,
    pub symbol: String,
}

/// Row 1 is the price panel; oscillators go below it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub mode: DrawMode,
    pub row: u32,
    pub line: LineStyle,
    pub marker: MarkerStyle,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            mode: DrawMode::Lines,
            row: 1,
            line: LineStyle {
                color: "blue".into(),
                width: 2.0,
            },
            marker: MarkerStyle {
                size: 5.0,
                color: "blue".into(),
                symbol: "circle".into(),
            },
        }
    }
}

impl PlotStyle {
    /// Default style placed in the first panel below the price chart.
    pub fn lower_panel() -> Self {
        PlotStyle {
            row: 2,
            ..PlotStyle::default()
        }
    }

    /// Thin grey reference line in the oscillator panel.
    pub fn reference_line() -> Self {
        PlotStyle {
            row: 2,
            line: LineStyle {
                color: "grey".into(),
                width: 1.0,
            },
            ..PlotStyle::default()
        }
    }
}

impl fmt::Display for PlotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} row={} line={}/{} marker={}/{}/{}",
            self.mode,
            self.row,
            self.line.color,
            self.line.width,
            self.marker.symbol,
            self.marker.color,
            self.marker.size
        )
    }
}
