use super::slider::{LinearState, RotaryState};
use super::theme::ThemeColors;
use super::visuals::Visuals;
use crate::config::Settings;
use crate::events::MenuEvent;
use derive_more::{AsRef, Deref, Display, From, Into};
use radian::{ArcDefinition, Point, angle};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use strum::{Display as StrumDisplay, EnumString};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

radian::impl_string_newtype!(ItemId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconName(String);

radian::impl_string_newtype!(IconName);

/// Handle of a node inside its [`Menu`](super::Menu). The root is always `#0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{_0}")]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ItemState {
    #[default]
    None,
    Active,
    Child,
    Parent,
    Dot,
    Hidden,
    Back,
    BackChild,
    Submenu,
    Selected,
    #[strum(serialize = "activeSelected")]
    ActiveSelection,
}

impl ItemState {
    /// State handed down to every direct child when a node enters `self`.
    pub fn child_state(self) -> Option<ItemState> {
        match self {
            ItemState::Hidden => Some(ItemState::Hidden),
            ItemState::Active => Some(ItemState::Child),
            ItemState::Child => Some(ItemState::Dot),
            ItemState::Dot => Some(ItemState::Hidden),
            ItemState::Back => Some(ItemState::BackChild),
            ItemState::BackChild => Some(ItemState::Hidden),
            ItemState::Submenu => Some(ItemState::Dot),
            ItemState::None
            | ItemState::Parent
            | ItemState::Selected
            | ItemState::ActiveSelection => None,
        }
    }

    /// States in which a node listens to pointer input.
    pub fn is_interactive(self) -> bool {
        matches!(self, ItemState::Active | ItemState::ActiveSelection)
    }
}

/// What a node does, resolved once when the tree is built.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Action,
    Toggle { selected: bool },
    RadioGroup,
    Rotary(RotaryState),
    Linear(LinearState),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Action => "action",
            NodeKind::Toggle { .. } => "checkbox",
            NodeKind::RadioGroup => "radio group",
            NodeKind::Rotary(_) => "rotary slider",
            NodeKind::Linear(_) => "ribbon slider",
        }
    }

    /// Controls own their interaction and never take children.
    pub fn is_control(&self) -> bool {
        matches!(self, NodeKind::Rotary(_) | NodeKind::Linear(_))
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self, NodeKind::Toggle { .. })
    }
}

/// Shared state owned by the root and looked up through the parent chain.
#[derive(Debug, Clone, Default)]
pub struct RootContext {
    pub(crate) settings: Option<Rc<Settings>>,
    pub(crate) theme: Option<Rc<ThemeColors>>,
    pub(crate) events: Option<async_channel::Sender<MenuEvent>>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub(crate) item_id: ItemId,
    pub(crate) text: String,
    pub(crate) icon: Option<IconName>,
    pub(crate) angle: f64,
    pub(crate) is_root: bool,
    pub(crate) kind: NodeKind,
    pub(crate) state: ItemState,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Only present on the root.
    pub(crate) context: Option<RootContext>,
    /// Set by every state change, cleared once the state animation was built.
    /// Only written from the transition and redraw paths.
    pub(crate) dirty: bool,
    pub(crate) ready: bool,
    pub(crate) in_back_sector: bool,
    pub(crate) active_child: Option<NodeId>,
    pub(crate) hovered_child: Option<NodeId>,
    /// Child drawn above its siblings and this node's own geometry.
    pub(crate) front_child: Option<NodeId>,
    pub(crate) arcs: Vec<ArcDefinition>,
    pub(crate) back_arc: Option<ArcDefinition>,
    /// Last event this node emitted, for deduplication.
    pub(crate) prev_event: Option<MenuEvent>,
    pub(crate) position_child: Point,
    pub(crate) position_dot: Point,
    pub(crate) visuals: Visuals,
}

impl MenuItem {
    /// `direction` is in degrees clockwise from north and is canonicalized.
    pub fn new(
        item_id: ItemId,
        direction: f64,
        text: impl Into<String>,
        icon: Option<IconName>,
        is_root: bool,
        kind: NodeKind,
    ) -> Self {
        let text = text.into();
        Self {
            item_id,
            visuals: Visuals::new(&text),
            text,
            icon,
            angle: angle::from_direction(direction),
            is_root,
            kind,
            state: ItemState::None,
            parent: None,
            children: Vec::new(),
            context: is_root.then(RootContext::default),
            dirty: true,
            ready: false,
            in_back_sector: false,
            active_child: None,
            hovered_child: None,
            front_child: None,
            arcs: Vec::new(),
            back_arc: None,
            prev_event: None,
            position_child: Point::ZERO,
            position_dot: Point::ZERO,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn icon(&self) -> Option<&IconName> {
        self.icon.as_ref()
    }

    /// Direction on the parent in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        !self.kind.is_control() && self.children.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn arcs(&self) -> &[ArcDefinition] {
        &self.arcs
    }

    pub fn back_arc(&self) -> Option<&ArcDefinition> {
        self.back_arc.as_ref()
    }

    pub fn active_child(&self) -> Option<NodeId> {
        self.active_child
    }

    pub fn hovered_child(&self) -> Option<NodeId> {
        self.hovered_child
    }

    pub fn front_child(&self) -> Option<NodeId> {
        self.front_child
    }

    pub fn position_child(&self) -> Point {
        self.position_child
    }

    pub fn position_dot(&self) -> Point {
        self.position_dot
    }

    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    /// Selection flag of a toggle, `None` for other kinds.
    pub fn is_selected(&self) -> Option<bool> {
        match self.kind {
            NodeKind::Toggle { selected } => Some(selected),
            _ => None,
        }
    }

    /// Current value of a slider control.
    pub fn value(&self) -> Option<f64> {
        match &self.kind {
            NodeKind::Rotary(rotary) => Some(rotary.value),
            NodeKind::Linear(linear) => Some(linear.value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_table() {
        use ItemState as S;
        let table = [
            (S::Hidden, Some(S::Hidden)),
            (S::Active, Some(S::Child)),
            (S::Child, Some(S::Dot)),
            (S::Dot, Some(S::Hidden)),
            (S::Back, Some(S::BackChild)),
            (S::BackChild, Some(S::Hidden)),
            (S::Submenu, Some(S::Dot)),
            (S::Parent, None),
            (S::Selected, None),
            (S::ActiveSelection, None),
        ];
        for (state, child) in table {
            assert_eq!(state.child_state(), child, "{state}");
        }
    }

    #[test]
    fn state_names() {
        assert_eq!(ItemState::BackChild.to_string(), "backChild");
        assert_eq!(ItemState::ActiveSelection.to_string(), "activeSelected");
        assert_eq!("submenu".parse::<ItemState>().unwrap(), ItemState::Submenu);
    }

    #[test]
    fn direction_is_canonicalized() {
        let item = MenuItem::new(ItemId::new("a"), -90.0, "A", None, false, NodeKind::Action);
        assert!((item.angle() - angle::to_rad(270.0)).abs() < 1e-12);
        assert_eq!(item.state(), ItemState::None);
        assert!(item.is_leaf());
        assert_eq!(NodeId(3).to_string(), "#3");
    }
}
