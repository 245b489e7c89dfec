//! Animated presentation state of a node.
//!
//! Positions are relative to the parent item (global for the root). The
//! geometry group carries the item's shape, label, icon and sectors and is
//! transformed as one unit.

use palette::Srgba;
use radian::Point;

/// Icon opacity while the label is displayed on top of it.
pub const ICON_BG_OPACITY: f64 = 0.4;

/// Labels wider than this share of the geometry are shrunk to fit.
pub const TEXT_OVERFLOW_SCALE: f64 = 0.8;

fn white() -> Srgba<f64> {
    Srgba::new(1.0, 1.0, 1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryVisual {
    pub offset: Point,
    pub scaling: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub visible: bool,
    /// Opacity of the shape alone, not of the whole group.
    pub opacity: f64,
    pub fill: Srgba<f64>,
    /// Secondary fill, the child indicator of a ribbon slider.
    pub accent: Srgba<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconVisual {
    pub visible: bool,
    pub opacity: f64,
    pub color: Srgba<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelVisual {
    pub visible: bool,
    pub content: String,
    /// Degrees, counter-rotates a rotated geometry group.
    pub rotation: f64,
    pub color: Srgba<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArcsVisual {
    pub visible: bool,
    pub opacity: f64,
    /// One highlight opacity per sector.
    pub sectors: Vec<f64>,
    pub strokes_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorVisual {
    pub visible: bool,
    pub end: Point,
    pub width: f64,
    pub color: Srgba<f64>,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visuals {
    pub position: Point,
    /// Only ever cleared on the root, hides the whole tree.
    pub visible: bool,
    pub geometry: GeometryVisual,
    pub icon: IconVisual,
    pub label: LabelVisual,
    pub arcs: ArcsVisual,
    pub connector: ConnectorVisual,
    pub selection_radius: bool,
}

impl Visuals {
    pub fn new(text: &str) -> Self {
        Self {
            position: Point::ZERO,
            visible: true,
            geometry: GeometryVisual {
                offset: Point::ZERO,
                scaling: 1.0,
                rotation: 0.0,
                visible: true,
                opacity: 1.0,
                fill: white(),
                accent: white(),
            },
            icon: IconVisual {
                visible: true,
                opacity: 1.0,
                color: white(),
            },
            label: LabelVisual {
                visible: false,
                content: text.to_string(),
                rotation: 0.0,
                color: white(),
            },
            arcs: ArcsVisual::default(),
            connector: ConnectorVisual {
                visible: false,
                end: Point::ZERO,
                width: 1.0,
                color: white(),
                opacity: 1.0,
            },
            selection_radius: false,
        }
    }

    /// Drops every sector highlight.
    pub fn clear_sectors(&mut self) {
        self.arcs.sectors.iter_mut().for_each(|s| *s = 0.0);
    }
}
