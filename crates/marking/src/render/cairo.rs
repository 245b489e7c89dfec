//! [`Canvas`] on a cairo context.

use super::{Canvas, Stroke};
use crate::menu::IconName;
use cairo::{Context, LinearGradient, RadialGradient};
use palette::Srgba;
use radian::color::Fill;
use radian::{ArcDefinition, Point, angle};
use std::f64::consts::{FRAC_PI_2, PI};

/// Font the icon names are looked up in.
pub const ICON_FONT: &str = "Material Icons";
const LABEL_FONT: &str = "Sans";

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Menu angles start north and run clockwise, cairo's start east.
fn to_cairo(angle: f64) -> f64 {
    angle - FRAC_PI_2
}

fn fill_and_stroke(cr: &Context, fill: Srgba<f64>, stroke: Option<Stroke>) -> Result<(), cairo::Error> {
    set_color(cr, fill);
    match stroke {
        Some(stroke) => {
            cr.fill_preserve()?;
            set_color(cr, stroke.color);
            cr.set_line_width(stroke.width);
            cr.stroke()
        }
        None => cr.fill(),
    }
}

impl Canvas for Context {
    type Error = cairo::Error;

    fn circle(
        &mut self,
        center: Point,
        radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), cairo::Error> {
        self.new_path();
        self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        fill_and_stroke(self, fill, stroke)
    }

    fn rounded_square(
        &mut self,
        center: Point,
        size: f64,
        corner_radius: f64,
        fill: Srgba<f64>,
        stroke: Option<Stroke>,
    ) -> Result<(), cairo::Error> {
        let half = size / 2.0;
        let r = corner_radius.clamp(0.0, half);
        let (left, top) = (center.x - half, center.y - half);
        let (right, bottom) = (center.x + half, center.y + half);

        self.new_path();
        self.arc(right - r, top + r, r, -FRAC_PI_2, 0.0);
        self.arc(right - r, bottom - r, r, 0.0, FRAC_PI_2);
        self.arc(left + r, bottom - r, r, FRAC_PI_2, PI);
        self.arc(left + r, top + r, r, PI, 3.0 * FRAC_PI_2);
        self.close_path();
        fill_and_stroke(self, fill, stroke)
    }

    fn sector(
        &mut self,
        center: Point,
        radius: f64,
        arc: &ArcDefinition,
        fill: &Fill,
        radial: bool,
        opacity: f64,
    ) -> Result<(), cairo::Error> {
        let start = to_cairo(arc.from);
        let end = start + arc.sweep();

        self.save()?;
        self.new_path();
        self.move_to(center.x, center.y);
        self.arc(center.x, center.y, radius, start, end);
        self.close_path();
        self.clip();

        match fill {
            Fill::Solid(color) => set_color(self, *color),
            Fill::Gradient(gradient) if radial => {
                let pattern = RadialGradient::new(center.x, center.y, 0.0, center.x, center.y, radius);
                for stop in &gradient.stops {
                    let (r, g, b, a) = stop.color.into_components();
                    pattern.add_color_stop_rgba(stop.offset, r, g, b, a);
                }
                self.set_source(&pattern)?;
            }
            Fill::Gradient(gradient) => {
                let from = center + angle::to_point(arc.from, radius);
                let to = center + angle::to_point(arc.to, radius);
                let pattern = LinearGradient::new(from.x, from.y, to.x, to.y);
                for stop in &gradient.stops {
                    let (r, g, b, a) = stop.color.into_components();
                    pattern.add_color_stop_rgba(stop.offset, r, g, b, a);
                }
                self.set_source(&pattern)?;
            }
        }
        self.paint_with_alpha(opacity)?;
        self.restore()
    }

    fn line(
        &mut self,
        from: Point,
        to: Point,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        self.new_path();
        set_color(self, color);
        self.set_line_width(width);
        self.set_line_cap(cairo::LineCap::Round);
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.stroke()
    }

    fn ring(
        &mut self,
        center: Point,
        radius: f64,
        width: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        self.new_path();
        set_color(self, color);
        self.set_line_width(width);
        self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        self.stroke()
    }

    fn text(
        &mut self,
        center: Point,
        content: &str,
        size: f64,
        max_width: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        show_centered(self, LABEL_FONT, cairo::FontWeight::Bold, center, content, size, max_width, color)
    }

    fn icon(
        &mut self,
        center: Point,
        name: &IconName,
        size: f64,
        color: Srgba<f64>,
    ) -> Result<(), cairo::Error> {
        show_centered(self, ICON_FONT, cairo::FontWeight::Normal, center, name.as_str(), size, size, color)
    }
}

#[allow(clippy::too_many_arguments)]
fn show_centered(
    cr: &Context,
    family: &str,
    weight: cairo::FontWeight,
    center: Point,
    content: &str,
    size: f64,
    max_width: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    set_color(cr, color);
    cr.select_font_face(family, cairo::FontSlant::Normal, weight);
    cr.set_font_size(size);

    let mut ext = cr.text_extents(content)?;
    if ext.width() > max_width && ext.width() > 0.0 {
        cr.set_font_size(size * max_width / ext.width());
        ext = cr.text_extents(content)?;
    }
    cr.move_to(
        center.x - ext.width() / 2.0 - ext.x_bearing(),
        center.y - ext.height() / 2.0 - ext.y_bearing(),
    );
    cr.show_text(content)
}

#[cfg(test)]
mod tests {
    use crate::menu::fixtures::Harness;
    use crate::render::draw;
    use cairo::{Context, Format, ImageSurface};
    use radian::Point;

    #[test]
    fn open_menu_paints_pixels() {
        let mut harness = Harness::compass();
        let mut surface = ImageSurface::create(Format::ARgb32, 600, 600).unwrap();

        let mut cr = Context::new(&surface).unwrap();
        draw(&harness.menu, &mut cr).unwrap();
        drop(cr);
        surface.flush();
        assert!(surface.data().unwrap().iter().all(|&b| b == 0));

        harness.show(Point::new(300.0, 300.0));
        let mut cr = Context::new(&surface).unwrap();
        draw(&harness.menu, &mut cr).unwrap();
        drop(cr);
        surface.flush();
        assert!(surface.data().unwrap().iter().any(|&b| b != 0));
    }
}
