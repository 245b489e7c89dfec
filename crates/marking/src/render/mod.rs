//! Paints the animated state of a [`Menu`] onto a [`Canvas`].
//!
//! Drawing is a depth-first walk from the root. Every primitive receives fully
//! resolved screen coordinates and colors, so a canvas only has to rasterize.

#[cfg(feature = "cairo")]
pub mod cairo;

use crate::config::Settings;
use crate::menu::{
    IconName, ItemState, LinearState, Menu, MenuError, MenuItem, NodeId, NodeKind,
    TEXT_OVERFLOW_SCALE, ThemeColors,
};
use palette::Srgba;
use radian::color::{self, Fill};
use radian::{ArcDefinition, Point, angle};
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

/// Label size at a geometry scaling of one.
pub const LABEL_FONT_SIZE: f64 = 14.0;

/// Edge length of the icon glyphs the icon scales refer to.
pub const ICON_GLYPH_SIZE: f64 = 512.0;

const GRAB_DOT_RADIUS: f64 = 2.0;
const DIAL_INDICATOR_RADIUS: f64 = 4.0;
const SELECTION_RADIUS_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Srgba<f64>,
    pub width: f64,
}

/// A surface the menu can be painted on.
pub trait Canvas {
    type Error;

    fn circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), Self::Error>;

    fn rounded_square(
        &mut self,
        center: Point,
        size: f64,
        corner_radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), Self::Error>;

    /// `fill` gradients run from the center outwards when `radial` is set,
    /// along the sector's sweep otherwise.
    fn sector(
        &mut self,
        center: Point,
        radius: f64,
        arc: &ArcDefinition,
        fill: &Fill,
        radial: bool,
        opacity: f64,
    ) -> Result<(), Self::Error>;

    fn line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    fn ring(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    /// Centered text, shrunk when wider than `max_width`.
    fn text(
        &mut self,
        center: Point,
        content: &str,
        size: f64,
        max_width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    fn icon(
        &mut self,
        center: Point,
        name: &IconName,
        size: f64,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum RenderError<E> {
    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error("canvas failed: {0}")]
    Canvas(E),
}

/// Draws the whole tree. A hidden menu draws nothing.
pub fn draw<C: Canvas>(menu: &Menu, canvas: &mut C) -> Result<(), RenderError<C::Error>> {
    let root = menu.root();
    let Some(node) = menu.node(root) else {
        return Ok(());
    };
    if !node.visuals().visible || matches!(node.state(), ItemState::None | ItemState::Hidden) {
        return Ok(());
    }

    let painter = Painter {
        menu,
        settings: menu.settings(root)?,
        theme: menu.theme(root)?,
    };
    painter.node(canvas, root).map_err(RenderError::Canvas)
}

struct Painter<'a> {
    menu: &'a Menu,
    settings: Rc<Settings>,
    theme: Rc<ThemeColors>,
}

impl Painter<'_> {
    fn node<C: Canvas>(&self, canvas: &mut C, id: NodeId) -> Result<(), C::Error> {
        let node = &self.menu.nodes()[id];
        if node.state() == ItemState::Hidden {
            return Ok(());
        }
        let center = self.menu.global_position(id);
        let visuals = node.visuals();

        if visuals.connector.visible && self.settings.connector.enabled {
            let connector = &visuals.connector;
            let color = fade(connector.color, connector.opacity);
            canvas.line(center, center + connector.end, connector.width, color)?;
        }

        if visuals.selection_radius {
            canvas.ring(
                center,
                self.settings.radii.max_click_radius,
                SELECTION_RADIUS_WIDTH,
                self.theme.selection_radius,
            )?;
        }

        let geometry_center = center + visuals.geometry.offset;
        if visuals.arcs.visible && self.settings.arc.enabled {
            self.arcs(canvas, node, geometry_center)?;
        }

        let front = node.front_child();
        for &child in node.children() {
            if Some(child) != front {
                self.node(canvas, child)?;
            }
        }

        if visuals.geometry.visible {
            self.geometry(canvas, node, geometry_center)?;
        }

        if let Some(front) = front {
            self.node(canvas, front)?;
        }
        Ok(())
    }

    fn arcs<C: Canvas>(
        &self,
        canvas: &mut C,
        node: &MenuItem,
        center: Point,
    ) -> Result<(), C::Error> {
        let arcs = &node.visuals().arcs;
        for (arc, highlight) in node.arcs().iter().zip(&arcs.sectors) {
            let opacity = highlight * arcs.opacity;
            if opacity > 0.0 {
                canvas.sector(
                    center,
                    self.settings.radii.arc,
                    arc,
                    &self.theme.arc,
                    self.settings.arc.radial,
                    opacity,
                )?;
            }
        }

        if arcs.strokes_visible
            && let Some(color) = self.theme.arc_stroke
        {
            for arc in node.arcs() {
                let edge = center + angle::to_point(arc.from, self.settings.radii.arc);
                canvas.line(center, edge, self.settings.arc.stroke.width, color)?;
            }
        }
        Ok(())
    }

    fn geometry<C: Canvas>(
        &self,
        canvas: &mut C,
        node: &MenuItem,
        center: Point,
    ) -> Result<(), C::Error> {
        let visuals = node.visuals();
        let geometry = &visuals.geometry;
        let radius = self.settings.geometry.size * geometry.scaling;
        let fill = fade(geometry.fill, geometry.opacity);
        let stroke = self.theme.geometry_stroke.map(|color| Stroke {
            color: fade(color, geometry.opacity),
            width: self.settings.geometry.stroke.width * geometry.scaling,
        });

        if let NodeKind::Linear(linear) = node.kind()
            && linear.gradient_visible
        {
            self.ribbon(canvas, linear, center, geometry.scaling)?;
        }

        let square = match node.kind() {
            NodeKind::Toggle { .. } => true,
            NodeKind::Action => self.settings.geometry.use_action_shape && node.is_leaf(),
            _ => false,
        };
        if square {
            let corner = self.settings.checkbox.corner_radius * geometry.scaling;
            canvas.rounded_square(center, radius * 2.0, corner, fill, stroke)?;
        } else {
            canvas.circle(center, radius, fill, stroke)?;
        }

        match node.kind() {
            NodeKind::Rotary(rotary) if rotary.dial_visible => {
                let at = angle::to_point(angle::from_direction(rotary.rotation), rotary.indicator_distance);
                canvas.circle(center + at, DIAL_INDICATOR_RADIUS, self.theme.grab_dot, None)?;
            }
            NodeKind::Linear(linear) if linear.indicator_visible => {
                canvas.circle(center, radius / 2.0, geometry.accent, None)?;
            }
            _ => {}
        }

        if let Some(icon) = node.icon()
            && visuals.icon.visible
            && visuals.icon.opacity > 0.0
        {
            let scales = &self.settings.scales.icon;
            let mut size = ICON_GLYPH_SIZE * scales.base * geometry.scaling;
            if !visuals.label.visible {
                size *= scales.solo;
            }
            if node.state() == ItemState::Child {
                size *= scales.child;
            }
            canvas.icon(center, icon, size, fade(visuals.icon.color, visuals.icon.opacity))?;
        }

        if visuals.label.visible && !visuals.label.content.is_empty() {
            canvas.text(
                center,
                &visuals.label.content,
                LABEL_FONT_SIZE * geometry.scaling,
                radius * 2.0 * TEXT_OVERFLOW_SCALE,
                visuals.label.color,
            )?;
        }
        Ok(())
    }

    /// The value strip behind an active ribbon slider, clipped to the
    /// gradient length on either side of the center.
    fn ribbon<C: Canvas>(
        &self,
        canvas: &mut C,
        linear: &LinearState,
        center: Point,
        scaling: f64,
    ) -> Result<(), C::Error> {
        let ribbon = &self.settings.ribbon_slider;
        let axis = if linear.vertical {
            Point::new(0.0, 1.0)
        } else {
            Point::new(1.0, 0.0)
        };
        let half = ribbon.gradient_length;

        canvas.line(
            center - axis * half,
            center + axis * half,
            ribbon.ribbon_height * scaling,
            self.theme.ribbon_gradient.sample(0.5),
        )?;

        for (at, value) in linear.visible_marks(half) {
            let distance = at + linear.offset;
            if distance.abs() > half {
                continue;
            }
            let position = center + axis * distance;
            // fade towards the ribbon ends
            let t = 0.5 + distance / (2.0 * half);
            let alpha = self.theme.ribbon_mask.sample(t).alpha;
            match value {
                Some(value) => canvas.text(
                    position,
                    &value.to_string(),
                    LABEL_FONT_SIZE * scaling,
                    linear.config.step_dist,
                    fade(self.theme.text, alpha),
                )?,
                None => canvas.circle(
                    position,
                    GRAB_DOT_RADIUS,
                    fade(self.theme.grab_dot, alpha),
                    None,
                )?,
            }
        }
        Ok(())
    }
}

fn fade(color: Srgba<f64>, opacity: f64) -> Srgba<f64> {
    color::with_alpha(color, color.alpha * opacity)
}

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Point,
        radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    },
    RoundedSquare {
        center: Point,
        size: f64,
        corner_radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    },
    Sector {
        center: Point,
        radius: f64,
        arc: ArcDefinition,
        opacity: f64,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Srgba<f64>,
    },
    Ring {
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    },
    Text {
        center: Point,
        content: String,
        size: f64,
    },
    Icon {
        center: Point,
        name: IconName,
        size: f64,
    },
}

/// Canvas that records what would have been drawn.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    type Error = Infallible;

    fn circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
        Ok(())
    }

    fn rounded_square(
        &mut self,
        center: Point,
        size: f64,
        corner_radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::RoundedSquare {
            center,
            size,
            corner_radius,
            fill,
            stroke,
        });
        Ok(())
    }

    fn sector(
        &mut self,
        center: Point,
        radius: f64,
        arc: &ArcDefinition,
        _fill: &Fill,
        _radial: bool,
        opacity: f64,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Sector {
            center,
            radius,
            arc: *arc,
            opacity,
        });
        Ok(())
    }

    fn line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
        Ok(())
    }

    fn ring(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Ring {
            center,
            radius,
            width,
            color,
        });
        Ok(())
    }

    fn text(
        &mut self,
        center: Point,
        content: &str,
        size: f64,
        _max_width: f64,
        _color: Srgba<f64>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Text {
            center,
            content: content.to_string(),
            size,
        });
        Ok(())
    }

    fn icon(
        &mut self,
        center: Point,
        name: &IconName,
        size: f64,
        _color: Srgba<f64>,
    ) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Icon {
            center,
            name: name.clone(),
            size,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::fixtures::Harness;
    use serde_json::json;

    fn render(menu: &Menu) -> DisplayList {
        let mut list = DisplayList::new();
        match draw(menu, &mut list) {
            Ok(()) => list,
            Err(e) => panic!("drawing failed: {e}"),
        }
    }

    fn has_shape_at(list: &DisplayList, at: Point) -> bool {
        list.commands.iter().any(|c| match c {
            DrawCommand::Circle { center, .. } | DrawCommand::RoundedSquare { center, .. } => {
                center.distance(at) < 1e-6
            }
            _ => false,
        })
    }

    #[test]
    fn closed_menu_draws_nothing() {
        let mut harness = Harness::compass();
        assert!(render(&harness.menu).commands.is_empty());

        harness.show(Point::new(300.0, 300.0));
        assert!(!render(&harness.menu).commands.is_empty());

        harness.menu.hide().unwrap();
        harness.settle();
        assert!(render(&harness.menu).commands.is_empty());
    }

    #[test]
    fn open_menu_draws_every_visible_item() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        let list = render(&harness.menu);

        for item in ["root", "a", "b", "c", "d", "b1", "b2"] {
            let at = harness.menu.global_position(harness.id(item));
            assert!(has_shape_at(&list, at), "{item} at {at}");
        }
        assert!(list.texts().any(|t| t == "Root"));
        assert!(list.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Ring { radius, .. } if *radius == 450.0
        )));
    }

    #[test]
    fn hovered_sector_is_painted() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        let sectors = |list: &DisplayList| {
            list.commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Sector { .. }))
                .count()
        };
        assert_eq!(sectors(&render(&harness.menu)), 0);

        harness.move_to(300.0, 150.0);
        harness.settle();
        assert_eq!(sectors(&render(&harness.menu)), 1);
    }

    #[test]
    fn checkboxes_are_squares() {
        let mut harness = Harness::new(json!({
            "id": "root", "direction": 0,
            "children": [{"id": "grid", "type": "checkbox", "direction": 90}]
        }));
        harness.show(Point::new(200.0, 200.0));
        let list = render(&harness.menu);
        let grid = harness.menu.global_position(harness.id("grid"));
        assert!(list.commands.iter().any(|c| matches!(
            c,
            DrawCommand::RoundedSquare { center, .. } if center.distance(grid) < 1e-6
        )));
    }

    #[test]
    fn active_ribbon_shows_its_values() {
        let mut harness = Harness::new(json!({
            "id": "root", "direction": 0,
            "children": [{"id": "zoom", "type": "slider", "direction": 0,
                          "data": {"min": 0, "max": 10, "initial": 5}}]
        }));
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(300.0, 150.0);
        harness.menu.click(crate::events::ClickState::Left).unwrap();
        harness.settle();

        let list = render(&harness.menu);
        assert!(list.texts().any(|t| t == "5"));
    }
}
