//! Builds a [`Menu`] from its JSON definition.

use super::item::{IconName, ItemId, MenuItem, NodeId, NodeKind};
use super::slider::{LinearState, RotaryState, SliderConfig, SliderConfigError};
use super::{Menu, MenuError};
use radian::angle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use strum::EnumString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemDefinition {
    pub id: ItemId,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconName>,
    /// Degrees clockwise from north.
    #[serde(default)]
    pub direction: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItemDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ItemType {
    #[strum(serialize = "action")]
    Action,
    #[strum(serialize = "crankslider", serialize = "rotary")]
    Rotary,
    #[strum(serialize = "ribbonslider", serialize = "slider")]
    Linear,
    #[strum(serialize = "checkbox")]
    Checkbox,
    #[strum(serialize = "radiogroup", serialize = "radio-group")]
    RadioGroup,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("'{id}' has unknown type '{kind}'")]
    UnknownType { id: ItemId, kind: String },

    #[error("invalid slider configuration on '{id}': {source}")]
    Slider {
        id: ItemId,
        source: SliderConfigError,
    },

    #[error("'{0}' needs a slider configuration in 'data'")]
    MissingConfiguration(ItemId),

    #[error("'{0}' is a control and cannot have children")]
    ChildrenNotAllowed(ItemId),

    #[error("'data.selected' of '{0}' has the wrong type")]
    InvalidToggleData(ItemId),

    #[error("radio group '{id}' has no child '{child}'")]
    UnknownRadioChild { id: ItemId, child: String },

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error("malformed menu definition: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError::Json(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Items at this depth or deeper are checked for directions that point
    /// into their parent's back sector. The root is depth 0.
    pub collision_check_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            collision_check_depth: 2,
        }
    }
}

/// An item pointing exactly where its parent came from.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleCollision {
    pub item: ItemId,
    /// Degrees.
    pub angle: f64,
    pub parent: ItemId,
    pub parent_angle: f64,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub menu: Menu,
    pub duplicate_ids: Vec<ItemId>,
    pub collisions: Vec<AngleCollision>,
}

impl ParseOutcome {
    pub fn has_duplicate_ids(&self) -> bool {
        !self.duplicate_ids.is_empty()
    }
}

pub fn parse(definition: &MenuItemDefinition) -> Result<ParseOutcome, ParseError> {
    parse_with(definition, ParseOptions::default())
}

pub fn parse_str(json: &str) -> Result<ParseOutcome, ParseError> {
    let definition: MenuItemDefinition = serde_json::from_str(json)?;
    parse(&definition)
}

/// The root is always a plain action, whatever its `type` says.
pub fn parse_with(
    definition: &MenuItemDefinition,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    let root = MenuItem::new(
        definition.id.clone(),
        definition.direction,
        definition.text.clone(),
        definition.icon.clone(),
        true,
        NodeKind::Action,
    );

    let mut builder = Builder {
        menu: Menu::new(root),
        options,
        seen: HashSet::from([definition.id.clone()]),
        duplicate_ids: Vec::new(),
        collisions: Vec::new(),
    };
    for child in &definition.children {
        builder.build(NodeId::ROOT, child, 1, false)?;
    }

    let Builder {
        menu,
        duplicate_ids,
        collisions,
        ..
    } = builder;

    for id in &duplicate_ids {
        log::warn!("duplicate item id '{id}'");
    }
    for collision in &collisions {
        log::error!(
            "'{}' at {}° points into the back sector of '{}' at {}°",
            collision.item,
            collision.angle,
            collision.parent,
            collision.parent_angle
        );
    }
    log::debug!("parsed menu with {} items", menu.len());

    Ok(ParseOutcome {
        menu,
        duplicate_ids,
        collisions,
    })
}

struct Builder {
    menu: Menu,
    options: ParseOptions,
    seen: HashSet<ItemId>,
    duplicate_ids: Vec<ItemId>,
    collisions: Vec<AngleCollision>,
}

impl Builder {
    fn build(
        &mut self,
        parent: NodeId,
        definition: &MenuItemDefinition,
        depth: usize,
        in_radio_group: bool,
    ) -> Result<(), ParseError> {
        let id = &definition.id;
        let kind = if in_radio_group {
            NodeKind::Toggle { selected: false }
        } else {
            node_kind(definition)?
        };
        if kind.is_control() && !definition.children.is_empty() {
            return Err(ParseError::ChildrenNotAllowed(id.clone()));
        }
        let is_radio_group = matches!(kind, NodeKind::RadioGroup);

        if !self.seen.insert(id.clone()) && !self.duplicate_ids.contains(id) {
            self.duplicate_ids.push(id.clone());
        }

        let item = MenuItem::new(
            id.clone(),
            definition.direction,
            definition.text.clone(),
            definition.icon.clone(),
            false,
            kind,
        );
        let node = self.menu.attach(parent, item)?;
        if depth >= self.options.collision_check_depth {
            self.check_collision(node, parent);
        }

        for child in &definition.children {
            self.build(node, child, depth + 1, is_radio_group)?;
        }

        if let Some(data) = &definition.data {
            self.apply_data(node, id, data)?;
        }
        Ok(())
    }

    fn check_collision(&mut self, node: NodeId, parent: NodeId) {
        let nodes = self.menu.nodes();
        let (item, parent) = (&nodes[node], &nodes[parent]);
        if angle::difference(parent.angle(), angle::opposite(item.angle())) < angle::EPSILON {
            self.collisions.push(AngleCollision {
                item: item.item_id().clone(),
                angle: angle::to_deg(item.angle()),
                parent: parent.item_id().clone(),
                parent_angle: angle::to_deg(parent.angle()),
            });
        }
    }

    fn apply_data(&mut self, node: NodeId, id: &ItemId, data: &Value) -> Result<(), ParseError> {
        let Some(selected) = data.get("selected") else {
            return Ok(());
        };
        let kind = self.menu.nodes()[node].kind();
        let (is_toggle, is_radio_group) = (kind.is_toggle(), matches!(kind, NodeKind::RadioGroup));

        match selected {
            Value::Bool(selected) if is_toggle => {
                if *selected {
                    self.menu.select(node)?;
                }
            }
            Value::String(child) if is_radio_group => {
                self.menu
                    .select_in_group(node, child)
                    .map_err(|e| match e {
                        MenuError::UnknownItem(child) => ParseError::UnknownRadioChild {
                            id: id.clone(),
                            child,
                        },
                        other => other.into(),
                    })?;
            }
            _ if is_toggle || is_radio_group => {
                return Err(ParseError::InvalidToggleData(id.clone()));
            }
            _ => {}
        }
        Ok(())
    }
}

fn node_kind(definition: &MenuItemDefinition) -> Result<NodeKind, ParseError> {
    let id = &definition.id;
    let item_type = match definition.item_type.as_deref() {
        None | Some("") => ItemType::Action,
        Some(kind) => kind.parse().map_err(|_| ParseError::UnknownType {
            id: id.clone(),
            kind: kind.to_string(),
        })?,
    };
    let slider = |data: &Value| {
        SliderConfig::from_value(data).map_err(|source| ParseError::Slider {
            id: id.clone(),
            source,
        })
    };

    Ok(match item_type {
        ItemType::Action => NodeKind::Action,
        ItemType::Checkbox => NodeKind::Toggle { selected: false },
        ItemType::RadioGroup => NodeKind::RadioGroup,
        ItemType::Rotary => {
            let config = match &definition.data {
                Some(data) => slider(data)?,
                None => SliderConfig::default(),
            };
            NodeKind::Rotary(RotaryState::new(config))
        }
        ItemType::Linear => {
            let data = definition
                .data
                .as_ref()
                .ok_or_else(|| ParseError::MissingConfiguration(id.clone()))?;
            NodeKind::Linear(LinearState::new(
                slider(data)?,
                angle::from_direction(definition.direction),
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(value: Value) -> MenuItemDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn shared_ids_are_reported() {
        let outcome = parse(&definition(json!({
            "id": "root",
            "children": [
                {"id": "copy", "direction": 0},
                {"id": "paste", "direction": 90, "children": [
                    {"id": "copy", "direction": 0},
                    {"id": "copy", "direction": 180},
                ]},
            ]
        })))
        .unwrap();

        assert!(outcome.has_duplicate_ids());
        assert_eq!(outcome.duplicate_ids, vec![ItemId::new("copy")]);
        assert_eq!(outcome.menu.len(), 5);
    }

    #[test]
    fn unique_ids_are_not_reported() {
        let outcome = parse_str(r#"{"id": "root", "children": [{"id": "a"}, {"id": "b", "direction": 180}]}"#)
            .unwrap();
        assert!(!outcome.has_duplicate_ids());
        assert!(outcome.collisions.is_empty());
    }

    #[test]
    fn root_type_is_ignored() {
        let outcome = parse(&definition(json!({"id": "root", "type": "checkbox"}))).unwrap();
        let root = outcome.menu.node(NodeId::ROOT).unwrap();
        assert!(matches!(root.kind(), NodeKind::Action));
        assert!(root.is_root());
    }

    #[test]
    fn type_names() {
        let types = [
            ("crankslider", ItemType::Rotary),
            ("RibbonSlider", ItemType::Linear),
            ("slider", ItemType::Linear),
            ("CHECKBOX", ItemType::Checkbox),
            ("radio-group", ItemType::RadioGroup),
            ("radiogroup", ItemType::RadioGroup),
        ];
        for (name, expected) in types {
            assert_eq!(name.parse::<ItemType>(), Ok(expected), "{name}");
        }
    }

    #[test]
    fn unknown_type_fails() {
        let result = parse(&definition(json!({
            "id": "root", "children": [{"id": "x", "type": "dropdown"}]
        })));
        assert_eq!(
            result.err(),
            Some(ParseError::UnknownType {
                id: ItemId::new("x"),
                kind: "dropdown".into()
            })
        );
    }

    #[test]
    fn ribbon_needs_configuration() {
        let result = parse(&definition(json!({
            "id": "root", "children": [{"id": "volume", "type": "slider"}]
        })));
        assert_eq!(
            result.err(),
            Some(ParseError::MissingConfiguration(ItemId::new("volume")))
        );

        let result = parse(&definition(json!({
            "id": "root", "children": [
                {"id": "volume", "type": "slider", "data": {"min": 3, "max": 1}}
            ]
        })));
        assert!(matches!(
            result.err(),
            Some(ParseError::Slider { source: SliderConfigError::EmptyRange { .. }, .. })
        ));
    }

    #[test]
    fn controls_reject_children() {
        let result = parse(&definition(json!({
            "id": "root", "children": [
                {"id": "dial", "type": "crankslider", "children": [{"id": "a"}]}
            ]
        })));
        assert_eq!(
            result.err(),
            Some(ParseError::ChildrenNotAllowed(ItemId::new("dial")))
        );
    }

    #[test]
    fn dial_without_data_spans_a_full_turn() {
        let outcome = parse(&definition(json!({
            "id": "root", "children": [{"id": "dial", "type": "crankslider"}]
        })))
        .unwrap();
        let dial = outcome.menu.find("dial").unwrap();
        let NodeKind::Rotary(rotary) = outcome.menu.node(dial).unwrap().kind() else {
            panic!("dial is rotary");
        };
        assert_eq!(rotary.config, SliderConfig::default());
        assert_eq!(rotary.value, 0.0);
    }

    #[test]
    fn toggle_data_is_validated() {
        let result = parse(&definition(json!({
            "id": "root", "children": [
                {"id": "grid", "type": "checkbox", "data": {"selected": "yes"}}
            ]
        })));
        assert_eq!(
            result.err(),
            Some(ParseError::InvalidToggleData(ItemId::new("grid")))
        );

        let result = parse(&definition(json!({
            "id": "root", "children": [
                {"id": "mode", "type": "radiogroup", "data": {"selected": "turbo"},
                 "children": [{"id": "eco"}]}
            ]
        })));
        assert_eq!(
            result.err(),
            Some(ParseError::UnknownRadioChild {
                id: ItemId::new("mode"),
                child: "turbo".into()
            })
        );
    }

    #[test]
    fn collisions_below_the_first_level() {
        let menu = json!({
            "id": "root",
            "children": [
                {"id": "east", "direction": 90, "children": [
                    {"id": "west", "direction": 270},
                    {"id": "north", "direction": 0, "children": [
                        {"id": "south", "direction": 180},
                    ]},
                ]},
                {"id": "top", "direction": 180},
            ]
        });

        let outcome = parse(&definition(menu.clone())).unwrap();
        let items: Vec<_> = outcome
            .collisions
            .iter()
            .map(|c| c.item.to_string())
            .collect();
        assert_eq!(items, vec!["west", "south"]);
        assert!((outcome.collisions[0].parent_angle - 90.0).abs() < 1e-9);

        // top level items are checked once the depth is lowered
        let outcome = parse_with(
            &definition(json!({"id": "root", "direction": 0, "children": [{"id": "s", "direction": 180}]})),
            ParseOptions {
                collision_check_depth: 1,
            },
        )
        .unwrap();
        assert_eq!(outcome.collisions.len(), 1);
    }

    #[test]
    fn definitions_serialize_compactly() {
        let def = definition(json!({"id": "a", "text": "A", "direction": 45}));
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({"id": "a", "text": "A", "direction": 45.0})
        );
    }
}
