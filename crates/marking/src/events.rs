use crate::menu::ItemId;
use radian::Point;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MenuEventType {
    Selection,
    SubmenuNavigation,
    BackNavigation,
    BackHover,
    ItemHover,
    ItemHoverSelection,
    SliderChanging,
    SliderFinal,
}

/// Identifies an item in an event: its id and its direction in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_id: ItemId,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl EventData {
    pub fn selected(selected: bool) -> Self {
        Self {
            selected: Some(selected),
            value: None,
        }
    }

    pub fn value(value: f64) -> Self {
        Self {
            selected: None,
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEvent {
    #[serde(rename = "type")]
    pub kind: MenuEventType,
    pub source: ItemRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ClickState {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DragState {
    Dragging,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub state: DragState,
    pub position: Point,
}

/// Raw host input, one per line of a replay script.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Show(Point),
    Hide,
    Move(Point),
    Press(ClickState),
    Release(ClickState),
    Wheel(f64),
    Wait(Duration),
}

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{command}' expects {expected}")]
    Arguments {
        command: String,
        expected: &'static str,
    },
}

impl FromStr for HostEvent {
    type Err = ScriptError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let bad = |expected: &'static str| ScriptError::Arguments {
            command: command.clone(),
            expected,
        };
        let point = || -> Result<Point, ScriptError> {
            match args.as_slice() {
                [x, y] => match (x.parse(), y.parse()) {
                    (Ok(x), Ok(y)) => Ok(Point::new(x, y)),
                    _ => Err(bad("two numbers")),
                },
                _ => Err(bad("two numbers")),
            }
        };
        let button = || -> Result<ClickState, ScriptError> {
            match args.as_slice() {
                [b] => b.parse().map_err(|_| bad("left or right")),
                _ => Err(bad("left or right")),
            }
        };
        let number = || -> Result<f64, ScriptError> {
            match args.as_slice() {
                [n] => n.parse().map_err(|_| bad("a number")),
                _ => Err(bad("a number")),
            }
        };

        match command.as_str() {
            "show" => point().map(HostEvent::Show),
            "hide" => Ok(HostEvent::Hide),
            "move" => point().map(HostEvent::Move),
            "press" => button().map(HostEvent::Press),
            "release" => button().map(HostEvent::Release),
            "wheel" => number().map(HostEvent::Wheel),
            "wait" => number().map(|ms| HostEvent::Wait(Duration::from_secs_f64(ms.max(0.0) / 1000.0))),
            other => Err(ScriptError::UnknownCommand(other.to_string())),
        }
    }
}
