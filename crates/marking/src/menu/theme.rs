use super::item::NodeKind;
use crate::config::Settings;
use palette::Srgba;
use radian::color::{
    self, ColorError, ColorSpec, Fill, Gradient, GradientStop, StopSpec, StopValue,
};

/// Connector style of a parent whose child took over the focus.
pub const CONNECTOR_DIMMED: &str = "rgba(57, 58, 60, 0.2)";
pub const CONNECTOR_DIMMED_WIDTH: f64 = 2.0;

/// Opacity of the items left behind when a submenu opens.
pub const BACKGROUND_OPACITY: f64 = 0.25;

/// Settings colors, parsed once when the settings are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeColors {
    pub geometry: Srgba<f64>,
    pub geometry_selected: Srgba<f64>,
    pub geometry_stroke: Option<Srgba<f64>>,
    pub text: Srgba<f64>,
    pub text_selected: Srgba<f64>,
    pub icon: Srgba<f64>,
    pub icon_selected: Srgba<f64>,
    pub toggle_selected: Srgba<f64>,
    pub toggle_hovered: Srgba<f64>,
    pub connector: Srgba<f64>,
    pub connector_dimmed: Srgba<f64>,
    pub selection_radius: Srgba<f64>,
    pub arc: Fill,
    pub arc_stroke: Option<Srgba<f64>>,
    pub ribbon_gradient: Gradient,
    pub ribbon_mask: Gradient,
    pub grab_dot: Srgba<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Default,
    /// Final selection.
    Selected,
    /// Selected but the user can still navigate back.
    ActiveSelected,
    Hovered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemColors {
    /// `None` keeps the current geometry fill.
    pub geometry: Option<Srgba<f64>>,
    pub accent: Option<Srgba<f64>>,
    pub text: Srgba<f64>,
    pub icon: Srgba<f64>,
}

fn stops(values: &[(&str, Option<f64>)]) -> ColorSpec {
    ColorSpec::Stops(
        values
            .iter()
            .map(|(c, offset)| match offset {
                Some(o) => StopSpec::Pair(vec![
                    StopValue::Color(c.to_string()),
                    StopValue::Offset(*o),
                ]),
                None => StopSpec::Color(c.to_string()),
            })
            .collect(),
    )
}

fn gradient(spec: &ColorSpec) -> Result<Gradient, ColorError> {
    Ok(match spec.resolve()? {
        Fill::Gradient(g) => g,
        Fill::Solid(color) => Gradient {
            stops: vec![
                GradientStop { color, offset: 0.0 },
                GradientStop { color, offset: 1.0 },
            ],
        },
    })
}

impl ThemeColors {
    pub fn from_settings(settings: &Settings) -> Result<Self, ColorError> {
        let geometry = &settings.geometry;
        let ribbon = &settings.ribbon_slider;

        let geometry_color = color::parse_color(&geometry.color)?;
        let toggle_selected = color::parse_color(&settings.checkbox.selection_color)?;
        let geometry_stroke = match (&geometry.stroke.color, geometry.stroke.enabled) {
            (Some(c), true) => Some(color::parse_color(c)?),
            _ => None,
        };
        let arc = settings.arc.color.resolve()?;
        let arc_stroke = match (&settings.arc.stroke.color, settings.arc.stroke.enabled) {
            (_, false) => None,
            (Some(c), true) => Some(color::parse_color(c)?),
            (None, true) => Some(arc.primary()),
        };

        Ok(Self {
            geometry: geometry_color,
            geometry_selected: color::parse_color(&geometry.selection_color)?,
            geometry_stroke,
            text: color::parse_color(&geometry.text.color)?,
            text_selected: color::parse_color(&geometry.text.selection_color)?,
            icon: color::parse_color(&geometry.icon.color)?,
            icon_selected: color::parse_color(&geometry.icon.selection_color)?,
            toggle_selected,
            toggle_hovered: color::desaturate(toggle_selected, 0.25),
            connector: color::parse_color(&settings.connector.color)?,
            connector_dimmed: color::parse_color(CONNECTOR_DIMMED)?,
            selection_radius: color::with_alpha(geometry_color, 0.25),
            arc,
            arc_stroke,
            ribbon_gradient: gradient(&stops(&[
                (ribbon.gradient_color_sides.as_str(), None),
                (ribbon.gradient_color.as_str(), Some(0.3)),
                (ribbon.gradient_color.as_str(), Some(0.7)),
                (ribbon.gradient_color_sides.as_str(), None),
            ]))?,
            ribbon_mask: gradient(&stops(&[
                ("rgba(0, 0, 0, 0)", None),
                ("#000", Some(ribbon.mask_start)),
                ("#000", Some(1.0 - ribbon.mask_start)),
                ("rgba(0, 0, 0, 0)", None),
            ]))?,
            grab_dot: geometry_stroke.unwrap_or(geometry_color),
        })
    }

    /// Fill, label and icon colors of an item of `kind` in `role`.
    pub fn item_colors(&self, kind: &NodeKind, role: ColorRole) -> ItemColors {
        let (text, icon) = match role {
            ColorRole::Default => (self.text, self.icon),
            _ => (self.text_selected, self.icon_selected),
        };
        let (geometry, accent) = match kind {
            NodeKind::Toggle { selected } => (Some(self.toggle_fill(*selected, role)), None),
            NodeKind::Linear(_) => match role {
                ColorRole::Default => (Some(self.geometry), Some(self.geometry)),
                _ => (None, Some(self.geometry_selected)),
            },
            _ => match role {
                ColorRole::Default => (Some(self.geometry), None),
                _ => (Some(self.geometry_selected), None),
            },
        };
        ItemColors {
            geometry,
            accent,
            text,
            icon,
        }
    }

    fn toggle_fill(&self, selected: bool, role: ColorRole) -> Srgba<f64> {
        match (role, selected) {
            (ColorRole::Default | ColorRole::Selected, true) => self.toggle_selected,
            (ColorRole::Default | ColorRole::Selected, false) => self.geometry,
            (ColorRole::ActiveSelected, true) => self.geometry,
            (ColorRole::ActiveSelected, false) => self.toggle_selected,
            (ColorRole::Hovered, true) => self.toggle_hovered,
            (ColorRole::Hovered, false) => self.geometry_selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> ThemeColors {
        ThemeColors::from_settings(&Settings::default()).unwrap()
    }

    #[test]
    fn defaults_resolve() {
        let theme = theme();
        assert_eq!(theme.geometry, color::parse_color("#575859").unwrap());
        assert_eq!(theme.connector_dimmed.alpha, 0.2);
        assert_eq!(theme.selection_radius.alpha, 0.25);
        assert!(matches!(theme.arc, Fill::Gradient(ref g) if g.stops.len() == 4));
        assert_eq!(theme.arc_stroke, Some(theme.arc.primary()));
        assert_eq!(theme.ribbon_gradient.stops[1].offset, 0.3);
        assert_eq!(theme.ribbon_mask.stops[2].offset, 0.9);
    }

    #[test]
    fn invalid_color_is_reported() {
        let mut settings = Settings::default();
        settings.connector.color = "#zz".into();
        assert_eq!(
            ThemeColors::from_settings(&settings),
            Err(ColorError::Invalid("#zz".into()))
        );
    }

    #[test]
    fn action_roles() {
        let theme = theme();
        let default = theme.item_colors(&NodeKind::Action, ColorRole::Default);
        assert_eq!(default.geometry, Some(theme.geometry));
        assert_eq!(default.text, theme.text);
        for role in [
            ColorRole::Selected,
            ColorRole::ActiveSelected,
            ColorRole::Hovered,
        ] {
            let colors = theme.item_colors(&NodeKind::Action, role);
            assert_eq!(colors.geometry, Some(theme.geometry_selected));
            assert_eq!(colors.icon, theme.icon_selected);
        }
    }

    #[test]
    fn toggle_roles_follow_the_flag() {
        let theme = theme();
        let on = NodeKind::Toggle { selected: true };
        let off = NodeKind::Toggle { selected: false };

        let fill = |kind: &NodeKind, role| theme.item_colors(kind, role).geometry.unwrap();
        assert_eq!(fill(&on, ColorRole::Default), theme.toggle_selected);
        assert_eq!(fill(&off, ColorRole::Default), theme.geometry);
        assert_eq!(fill(&on, ColorRole::ActiveSelected), theme.geometry);
        assert_eq!(fill(&off, ColorRole::ActiveSelected), theme.toggle_selected);
        assert_eq!(fill(&on, ColorRole::Hovered), theme.toggle_hovered);
        assert_eq!(fill(&off, ColorRole::Hovered), theme.geometry_selected);
        assert_ne!(theme.toggle_hovered, theme.toggle_selected);
    }
}
