//! The menu tree and its interaction engine.
//!
//! Nodes live in an arena owned by [`Menu`] and refer to each other through
//! [`NodeId`] handles: every node knows its parent, the root is found by
//! walking up. Settings, theme and the event sender are stored on the root.

mod animate;
mod controls;
mod input;
mod interaction;
mod item;
mod parser;
mod slider;
mod state;
mod theme;
mod toggle;
mod visuals;

pub use input::{Channel, Dispatcher, SubscriptionId};
pub use item::{IconName, ItemId, ItemState, MenuItem, NodeId, NodeKind, RootContext};
pub use parser::{
    AngleCollision, ItemType, MenuItemDefinition, ParseError, ParseOptions, ParseOutcome, parse,
    parse_str, parse_with,
};
pub use slider::{LinearState, RotaryState, SliderConfig, SliderConfigError};
pub use theme::{ColorRole, ItemColors, ThemeColors};
pub use visuals::{
    ArcsVisual, ConnectorVisual, GeometryVisual, ICON_BG_OPACITY, IconVisual, LabelVisual,
    TEXT_OVERFLOW_SCALE, Visuals,
};

use crate::animation::{Animation, AnimationGroup, Keyframe, Scene};
use crate::config::Settings;
use crate::events::{ClickState, DragEvent, MenuEvent};
use crate::pointer::PointerAction;
use radian::color::ColorError;
use radian::trace::Trace;
use radian::{Point, angle, arc};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MenuError {
    #[error("menu is not initialized")]
    NotInitialized,

    #[error("{0} can only be set on the root item")]
    NotRoot(&'static str),

    #[error("settings missing on root")]
    SettingsMissing,

    #[error("event channel missing on root")]
    EventChannelMissing,

    #[error("value {value} of '{id}' is out of range {min}..={max}")]
    ValueOutOfRange {
        id: ItemId,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("'{0}' has no active child")]
    MissingActiveChild(ItemId),

    #[error("unknown item '{0}'")]
    UnknownItem(String),

    #[error("'{0}' is not a {1}")]
    WrongKind(ItemId, &'static str),

    #[error("'{0}' cannot have children")]
    ChildrenNotAllowed(ItemId),

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Arena of nodes, indexed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct Nodes(Vec<MenuItem>);

impl Nodes {
    pub fn get(&self, id: NodeId) -> Option<&MenuItem> {
        self.0.get(id.index())
    }

    /// Like indexing, but an id from another menu is an error.
    pub fn try_get_mut(&mut self, id: NodeId) -> Result<&mut MenuItem, MenuError> {
        self.0
            .get_mut(id.index())
            .ok_or_else(|| MenuError::UnknownItem(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.0.len()).map(NodeId)
    }
}

impl Index<NodeId> for Nodes {
    type Output = MenuItem;

    fn index(&self, id: NodeId) -> &MenuItem {
        &self.0[id.index()]
    }
}

impl IndexMut<NodeId> for Nodes {
    fn index_mut(&mut self, id: NodeId) -> &mut MenuItem {
        &mut self.0[id.index()]
    }
}

/// Animated property group of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// Node position relative to its parent.
    Item,
    Geometry,
    Arcs,
    Sector(usize),
    Connector,
    Ribbon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub node: NodeId,
    pub part: Part,
}

impl Target {
    pub fn new(node: NodeId, part: Part) -> Self {
        Self { node, part }
    }
}

impl Scene<Target> for Nodes {
    fn snapshot(&self, target: &Target) -> Keyframe {
        let Some(node) = self.get(target.node) else {
            return Keyframe::default();
        };
        let visuals = &node.visuals;
        match target.part {
            Part::Item => Keyframe::position(visuals.position),
            Part::Geometry => {
                Keyframe::position(visuals.geometry.offset).with_scaling(visuals.geometry.scaling)
            }
            Part::Arcs => Keyframe::opacity(visuals.arcs.opacity),
            Part::Sector(i) => {
                Keyframe::opacity(visuals.arcs.sectors.get(i).copied().unwrap_or_default())
            }
            Part::Connector => Keyframe::position(visuals.connector.end),
            Part::Ribbon => match &node.kind {
                NodeKind::Linear(linear) => Keyframe::offset_x(linear.offset),
                _ => Keyframe::default(),
            },
        }
    }

    fn apply(&mut self, target: &Target, frame: &Keyframe) {
        let Some(node) = self.0.get_mut(target.node.index()) else {
            return;
        };
        let visuals = &mut node.visuals;
        match target.part {
            Part::Item => {
                if let Some(position) = frame.position {
                    visuals.position = position;
                }
            }
            Part::Geometry => {
                if let Some(offset) = frame.position {
                    visuals.geometry.offset = offset;
                }
                if let Some(scaling) = frame.scaling {
                    visuals.geometry.scaling = scaling;
                }
            }
            Part::Arcs => {
                if let Some(opacity) = frame.opacity {
                    visuals.arcs.opacity = opacity;
                }
            }
            Part::Sector(i) => {
                if let (Some(opacity), Some(sector)) = (frame.opacity, visuals.arcs.sectors.get_mut(i))
                {
                    *sector = opacity;
                }
            }
            Part::Connector => {
                if let Some(end) = frame.position {
                    visuals.connector.end = end;
                }
            }
            Part::Ribbon => {
                if let (Some(offset), NodeKind::Linear(linear)) = (frame.offset_x, &mut node.kind) {
                    linear.offset = offset;
                }
            }
        }
    }
}

/// Deferred work attached to a node's animation group.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Fades in the node's sectors.
    FadeInArcs(NodeId),
    /// Closes the whole menu.
    HideTree,
    SettleConnector { node: NodeId, end: Point },
    /// Puts the connector back to its default style, optionally hiding it.
    RestoreConnector { node: NodeId, hide: bool },
}

#[derive(Debug, Clone, Copy)]
struct InputState {
    position: Point,
    marking_mode: bool,
    now: Instant,
}

/// A menu tree plus everything that drives it.
#[derive(Debug)]
pub struct Menu {
    nodes: Nodes,
    /// One animation group per node, index aligned with `nodes`.
    groups: Vec<AnimationGroup<Target, FollowUp>>,
    /// Free running animations outside of any group.
    effects: Vec<Animation<Target>>,
    dispatcher: Dispatcher,
    trace: Trace,
    input: InputState,
    index: HashMap<ItemId, NodeId>,
}

impl Menu {
    /// Creates a menu with `root` as its only node.
    pub fn new(mut root: MenuItem) -> Self {
        root.is_root = true;
        root.parent = None;
        root.context.get_or_insert_with(RootContext::default);

        let mut index = HashMap::new();
        index.insert(root.item_id.clone(), NodeId::ROOT);

        Self {
            nodes: Nodes(vec![root]),
            groups: vec![AnimationGroup::default()],
            effects: Vec::new(),
            dispatcher: Dispatcher::default(),
            trace: Trace::default(),
            input: InputState {
                position: Point::ZERO,
                marking_mode: false,
                now: Instant::now(),
            },
            index,
        }
    }

    /// Appends `item` as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, mut item: MenuItem) -> Result<NodeId, MenuError> {
        let parent_node = self
            .nodes
            .get(parent)
            .ok_or_else(|| MenuError::UnknownItem(parent.to_string()))?;
        if parent_node.kind.is_control() {
            return Err(MenuError::ChildrenNotAllowed(parent_node.item_id.clone()));
        }

        let id = NodeId(self.nodes.len());
        item.is_root = false;
        item.context = None;
        item.parent = Some(parent);

        if let Some(previous) = self.index.insert(item.item_id.clone(), id) {
            log::debug!("{} now refers to {id} instead of {previous}", item.item_id);
        }
        self.nodes.0.push(item);
        self.groups.push(AnimationGroup::default());
        self.nodes[parent].children.push(id);

        if self.nodes[parent].ready {
            self.setup(id)?;
            self.create_arcs(parent)?;
        }
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Walks the parent chain up to the root.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) {
            current = parent;
        }
        current
    }

    pub fn node(&self, id: NodeId) -> Option<&MenuItem> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(MenuItem::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(MenuItem::children).unwrap_or_default()
    }

    /// Looks up a node by item id. With duplicate ids the last one wins.
    pub fn find(&self, item_id: &str) -> Option<NodeId> {
        self.index.get(&ItemId::new(item_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of descendants of `id`.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| 1 + self.child_count(child))
            .sum()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn input_position(&self) -> Point {
        self.input.position
    }

    pub fn marking_mode(&self) -> bool {
        self.input.marking_mode
    }

    /// True while any node or effect is animating.
    pub fn is_animating(&self) -> bool {
        self.groups.iter().any(AnimationGroup::running) || self.effects.iter().any(Animation::running)
    }

    fn context(&self, id: NodeId) -> Option<&RootContext> {
        self.nodes.get(self.root_of(id))?.context.as_ref()
    }

    fn root_context_mut(&mut self, id: NodeId) -> Result<&mut RootContext, MenuError> {
        let node = self.nodes.try_get_mut(id)?;
        if !node.is_root {
            return Err(MenuError::NotRoot("settings and events"));
        }
        Ok(node.context.get_or_insert_with(RootContext::default))
    }

    /// Attaches settings to the root and resolves their colors.
    pub fn set_settings(&mut self, id: NodeId, settings: Settings) -> Result<(), MenuError> {
        if !self.nodes.get(id).is_some_and(MenuItem::is_root) {
            return Err(MenuError::NotRoot("settings"));
        }
        let theme = ThemeColors::from_settings(&settings)?;
        let context = self.root_context_mut(id)?;
        context.settings = Some(Rc::new(settings));
        context.theme = Some(Rc::new(theme));
        Ok(())
    }

    pub fn set_event_channel(
        &mut self,
        id: NodeId,
        sender: async_channel::Sender<MenuEvent>,
    ) -> Result<(), MenuError> {
        if !self.nodes.get(id).is_some_and(MenuItem::is_root) {
            return Err(MenuError::NotRoot("event channel"));
        }
        self.root_context_mut(id)?.events = Some(sender);
        Ok(())
    }

    /// Settings of the tree `id` belongs to.
    pub fn settings(&self, id: NodeId) -> Result<Rc<Settings>, MenuError> {
        self.context(id)
            .and_then(|c| c.settings.clone())
            .ok_or(MenuError::SettingsMissing)
    }

    pub fn theme(&self, id: NodeId) -> Result<Rc<ThemeColors>, MenuError> {
        self.context(id)
            .and_then(|c| c.theme.clone())
            .ok_or(MenuError::SettingsMissing)
    }

    fn events(&self, id: NodeId) -> Result<async_channel::Sender<MenuEvent>, MenuError> {
        self.context(id)
            .and_then(|c| c.events.clone())
            .ok_or(MenuError::EventChannelMissing)
    }

    /// Sets up geometry and sectors of every node. Requires settings and an
    /// event channel on the root. Calling it again is a no-op.
    pub fn init(&mut self) -> Result<(), MenuError> {
        let root = self.root();
        let settings = self.settings(root)?;
        self.events(root)?;
        if self.nodes[root].ready {
            return Ok(());
        }

        self.trace = Trace::new(settings.main.min_trace_distance);
        self.setup(root)
    }

    /// Root-to-leaf setup of `id` and its subtree.
    fn setup(&mut self, id: NodeId) -> Result<(), MenuError> {
        if self.nodes[id].ready {
            return Ok(());
        }
        let settings = self.settings(id)?;

        let node = &mut self.nodes[id];
        node.position_child = angle::to_point(node.angle, settings.radii.child).floor();
        node.position_dot = angle::to_point(node.angle, settings.radii.dot).floor();
        node.visuals.connector.width = settings.connector.width;
        self.groups[id.index()].set_duration(settings.main.animation_duration);
        self.set_color(id, ColorRole::Default)?;

        for child in self.nodes[id].children.clone() {
            self.setup(child)?;
        }

        self.create_arcs(id)?;
        self.node_ready(id)
    }

    fn node_ready(&mut self, id: NodeId) -> Result<(), MenuError> {
        let theme = self.theme(id)?;
        let node = &mut self.nodes[id];
        node.visuals.connector.color = theme.connector;
        if let NodeKind::Linear(linear) = &mut node.kind {
            linear.offset = linear.offset_for(linear.value);
            node.visuals.label.content = format_value(linear.value);
        }
        if let NodeKind::Rotary(rotary) = &node.kind {
            node.visuals.geometry.rotation = rotary.rotation;
            node.visuals.label.rotation = -rotary.rotation;
        }
        node.ready = true;
        Ok(())
    }

    /// Partitions the circle around `id` into one sector per child plus the
    /// reserved back sector.
    fn create_arcs(&mut self, id: NodeId) -> Result<(), MenuError> {
        let node = &self.nodes[id];

        let (angles, back) = match &node.kind {
            NodeKind::Linear(_) => {
                let (back, forward) = LinearState::axis_angles(node.angle);
                (vec![back, forward], Some(back))
            }
            _ => {
                let back = (!node.is_root).then(|| angle::opposite(node.angle));
                let mut angles: Vec<f64> = back.into_iter().collect();
                angles.extend(node.children.iter().map(|&c| self.nodes[c].angle));
                (angles, back)
            }
        };

        let arcs = if angles.is_empty() {
            Vec::new()
        } else {
            arc::from_angles(&angles)
        };
        let back_arc = back.and_then(|b| arc::find(&arcs, b).copied());

        let node = &mut self.nodes[id];
        node.visuals.arcs.sectors = vec![0.0; arcs.len()];
        node.arcs = arcs;
        node.back_arc = back_arc;
        Ok(())
    }

    /// Opens the menu centered on `at`.
    pub fn show(&mut self, at: Point) -> Result<(), MenuError> {
        let root = self.root();
        if !self.nodes[root].ready {
            return Err(MenuError::NotInitialized);
        }
        log::debug!("showing menu at {at}");

        self.trace.reset();
        self.input.position = at;
        let node = &mut self.nodes[root];
        node.visuals.position = at;
        node.visuals.visible = true;
        self.set_state(root, ItemState::Active)?;
        self.redraw(root)
    }

    pub fn hide(&mut self) -> Result<(), MenuError> {
        let root = self.root();
        self.set_state(root, ItemState::Hidden)?;
        self.redraw(root)
    }

    /// Advances the clock: animations, stutter detection and coalesced labels.
    pub fn tick(&mut self, now: Instant) -> Result<(), MenuError> {
        self.input.now = now;

        for i in 0..self.groups.len() {
            let follow_ups = self.groups[i].advance(&mut self.nodes, now);
            for follow_up in follow_ups {
                self.run_follow_up(follow_up)?;
            }
        }

        for effect in &mut self.effects {
            effect.advance(&mut self.nodes, now);
        }
        self.effects.retain(Animation::running);

        if self.input.marking_mode
            && let Some(decision) = self.trace.poll(now)
        {
            self.decision_point(decision.position)?;
        }

        self.flush_labels(now);
        Ok(())
    }

    pub(crate) fn run_follow_up(&mut self, follow_up: FollowUp) -> Result<(), MenuError> {
        log::trace!("follow-up {follow_up:?}");
        match follow_up {
            FollowUp::FadeInArcs(node) => {
                let duration = self.settings(node)?.main.animation_duration;
                self.start_effect(
                    Animation::between(
                        Target::new(node, Part::Arcs),
                        Keyframe::opacity(0.0),
                        Keyframe::opacity(1.0),
                    )
                    .with_duration(duration),
                );
            }
            FollowUp::HideTree => {
                let root = self.root();
                self.set_state(root, ItemState::Hidden)?;
                self.nodes[root].visuals.visible = false;
            }
            FollowUp::SettleConnector { node, end } => {
                self.nodes[node].visuals.connector.end = end;
            }
            FollowUp::RestoreConnector { node, hide } => {
                self.restore_connector(node)?;
                if hide {
                    self.nodes[node].visuals.connector.visible = false;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn start_effect(&mut self, mut animation: Animation<Target>) {
        animation.start(&mut self.nodes);
        self.effects.push(animation);
    }

    /// Snaps every running effect on `target` to its end.
    pub(crate) fn stop_effects(&mut self, target: Target) {
        for effect in self.effects.iter_mut().filter(|e| *e.target() == target) {
            effect.stop(&mut self.nodes);
        }
    }

    pub(crate) fn effect_running(&self, target: Target) -> bool {
        self.effects
            .iter()
            .any(|e| *e.target() == target && e.running())
    }

    /// Default connector width and color.
    pub(crate) fn restore_connector(&mut self, id: NodeId) -> Result<(), MenuError> {
        let width = self.settings(id)?.connector.width;
        let color = self.theme(id)?.connector;
        let connector = &mut self.nodes[id].visuals.connector;
        connector.end = Point::ZERO;
        connector.width = width;
        connector.color = color;
        Ok(())
    }

    /// Feeds one classified pointer action.
    pub fn apply(&mut self, action: PointerAction, now: Instant) -> Result<(), MenuError> {
        match action {
            PointerAction::Moved(position) => self.pointer_moved(position, now),
            PointerAction::Click(state) => self.click(state),
            PointerAction::Drag(drag) => self.drag(drag),
            PointerAction::MarkingMode(on) => {
                self.set_marking_mode(on);
                Ok(())
            }
        }
    }

    pub fn pointer_moved(&mut self, position: Point, now: Instant) -> Result<(), MenuError> {
        self.input.position = position;
        self.input.now = now;

        for (subscription, node) in self.dispatcher.subscribers(Channel::Angle) {
            if !self.dispatcher.is_live(subscription) {
                continue;
            }
            let angle = self.angle_to_reference(node, position);
            if self.dispatcher.angle_changed(subscription, angle) {
                self.selection_logic(node, angle)?;
            }
        }

        if self.input.marking_mode
            && let Some(decision) = self.trace.update(position, now)
        {
            self.decision_point(decision.position)?;
        }
        Ok(())
    }

    pub fn click(&mut self, state: ClickState) -> Result<(), MenuError> {
        for (subscription, node) in self.dispatcher.subscribers(Channel::Click) {
            if self.dispatcher.is_live(subscription) {
                self.click_logic(node, state)?;
            }
        }
        Ok(())
    }

    pub fn drag(&mut self, drag: DragEvent) -> Result<(), MenuError> {
        self.input.position = drag.position;
        for (subscription, node) in self.dispatcher.subscribers(Channel::Drag) {
            if self.dispatcher.is_live(subscription) {
                self.drag_logic(node, drag)?;
            }
        }
        Ok(())
    }

    /// Scroll wheel, turns an active dial by one degree per notch.
    pub fn wheel(&mut self, delta: f64) -> Result<(), MenuError> {
        for (subscription, node) in self.dispatcher.subscribers(Channel::Click) {
            if self.dispatcher.is_live(subscription) {
                self.wheel_logic(node, delta)?;
            }
        }
        Ok(())
    }

    fn decision_point(&mut self, position: Point) -> Result<(), MenuError> {
        for (subscription, node) in self.dispatcher.subscribers(Channel::Trace) {
            if self.dispatcher.is_live(subscription) {
                self.trace_logic(node, position)?;
            }
        }
        Ok(())
    }

    /// Marking mode is on while the primary button is held. Leaving it drops
    /// the current stroke.
    pub fn set_marking_mode(&mut self, on: bool) {
        self.input.marking_mode = on;
        if !on {
            self.trace.reset();
        }
    }

    /// Position of `id` in screen space.
    pub fn global_position(&self, id: NodeId) -> Point {
        let mut position = Point::ZERO;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c)) {
            position += node.visuals.position;
            current = node.parent;
        }
        position
    }

    /// Converts a screen point into the coordinate space of `id`.
    pub fn to_local(&self, id: NodeId, point: Point) -> Point {
        point - self.global_position(id)
    }

    /// Direction of `point` seen from `id`, in radians.
    pub fn angle_to_reference(&self, id: NodeId, point: Point) -> f64 {
        angle::of_vector(self.to_local(id, point))
    }

    pub fn display(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { menu: self, id }
    }
}

/// One-line summary of a node.
pub struct NodeDisplay<'a> {
    menu: &'a Menu,
    id: NodeId,
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = self.menu.node(self.id) else {
            return write!(f, "{} (detached)", self.id);
        };
        let parent = node
            .parent
            .and_then(|p| self.menu.node(p))
            .map_or("None", |p| p.item_id.as_str());
        write!(
            f,
            "{} ({}°) | Parent: {} | Root: {} | Pos: {} | State: {} | Children: {}",
            node.item_id,
            angle::to_deg(node.angle),
            parent,
            node.is_root,
            node.visuals.position,
            node.state,
            node.children.len()
        )
    }
}

pub(crate) fn format_value(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::events::MenuEvent;
    use serde_json::json;
    use std::time::Duration;

    pub struct Harness {
        pub menu: Menu,
        pub events: async_channel::Receiver<MenuEvent>,
        pub now: Instant,
    }

    impl Harness {
        pub fn new(definition: serde_json::Value) -> Self {
            let definition: MenuItemDefinition = serde_json::from_value(definition).unwrap();
            let mut menu = parse(&definition).unwrap().menu;
            let (tx, rx) = async_channel::unbounded();
            menu.set_settings(NodeId::ROOT, Settings::default()).unwrap();
            menu.set_event_channel(NodeId::ROOT, tx).unwrap();
            menu.init().unwrap();
            Self {
                menu,
                events: rx,
                now: Instant::now(),
            }
        }

        /// Root with four children at the compass points; `b` has two children.
        pub fn compass() -> Self {
            Self::new(json!({
                "id": "root", "text": "Root", "direction": 0,
                "children": [
                    {"id": "a", "text": "A", "direction": 0},
                    {"id": "b", "text": "B", "direction": 90, "children": [
                        {"id": "b1", "text": "B1", "direction": 45},
                        {"id": "b2", "text": "B2", "direction": 135},
                    ]},
                    {"id": "c", "text": "C", "direction": 180},
                    {"id": "d", "text": "D", "direction": 270},
                ]
            }))
        }

        pub fn id(&self, item_id: &str) -> NodeId {
            self.menu.find(item_id).unwrap()
        }

        pub fn state(&self, item_id: &str) -> ItemState {
            self.menu.node(self.id(item_id)).unwrap().state()
        }

        pub fn show(&mut self, at: Point) {
            self.menu.show(at).unwrap();
            self.settle();
        }

        /// Runs the clock until every animation finished.
        pub fn settle(&mut self) {
            for _ in 0..100 {
                self.now += Duration::from_millis(16);
                self.menu.tick(self.now).unwrap();
            }
        }

        pub fn move_to(&mut self, x: f64, y: f64) {
            self.now += Duration::from_millis(16);
            self.menu.pointer_moved(Point::new(x, y), self.now).unwrap();
        }

        pub fn drain(&self) -> Vec<MenuEvent> {
            std::iter::from_fn(|| self.events.try_recv().ok()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::Harness;
    use super::*;

    fn item(id: &str, direction: f64) -> MenuItem {
        MenuItem::new(ItemId::new(id), direction, id, None, false, NodeKind::Action)
    }

    #[test]
    fn root_is_found_through_parents() {
        let mut menu = Menu::new(item("root", 0.0));
        let a = menu.attach(NodeId::ROOT, item("a", 0.0)).unwrap();
        let b = menu.attach(a, item("b", 90.0)).unwrap();

        assert_eq!(menu.root_of(b), NodeId::ROOT);
        assert_eq!(menu.parent(b), Some(a));
        assert_eq!(menu.child_count(NodeId::ROOT), 2);
        assert_eq!(menu.find("b"), Some(b));
        assert!(menu.node(NodeId::ROOT).unwrap().is_root());
        assert!(!menu.node(a).unwrap().is_root());
    }

    #[test]
    fn settings_and_events_only_on_root() {
        let mut menu = Menu::new(item("root", 0.0));
        let a = menu.attach(NodeId::ROOT, item("a", 0.0)).unwrap();
        let (tx, _rx) = async_channel::unbounded();

        assert_eq!(
            menu.set_settings(a, Settings::default()),
            Err(MenuError::NotRoot("settings"))
        );
        assert_eq!(
            menu.set_event_channel(a, tx),
            Err(MenuError::NotRoot("event channel"))
        );
        assert_eq!(menu.settings(a), Err(MenuError::SettingsMissing));
    }

    #[test]
    fn init_requires_settings_and_channel() {
        let mut menu = Menu::new(item("root", 0.0));
        assert_eq!(menu.init(), Err(MenuError::SettingsMissing));

        menu.set_settings(NodeId::ROOT, Settings::default()).unwrap();
        assert_eq!(menu.init(), Err(MenuError::EventChannelMissing));
        assert_eq!(menu.show(Point::ZERO), Err(MenuError::NotInitialized));

        let (tx, _rx) = async_channel::unbounded();
        menu.set_event_channel(NodeId::ROOT, tx).unwrap();
        assert_eq!(menu.init(), Ok(()));
        assert!(menu.node(NodeId::ROOT).unwrap().is_ready());
    }

    #[test]
    fn init_positions_and_sectors() {
        let harness = Harness::compass();
        let menu = &harness.menu;
        let b = harness.id("b");

        let node = menu.node(b).unwrap();
        assert_eq!(node.position_child(), Point::new(100.0, 0.0));
        assert_eq!(node.position_dot(), Point::new(25.0, 0.0));

        // b: back sector at 270° plus two children
        assert_eq!(node.arcs().len(), 3);
        let back = node.back_arc().unwrap();
        assert!((angle::to_deg(back.orig_angle) - 270.0).abs() < 1e-9);
        assert_eq!(node.visuals().arcs.sectors.len(), 3);

        // the root has no back sector
        let root = menu.node(NodeId::ROOT).unwrap();
        assert_eq!(root.arcs().len(), 4);
        assert!(root.back_arc().is_none());
    }

    #[test]
    fn leaf_gets_an_opposite_sector() {
        let harness = Harness::compass();
        let a = harness.menu.node(harness.id("a")).unwrap();
        assert_eq!(a.arcs().len(), 2);
        assert!(a.back_arc().is_some());
    }

    #[test]
    fn display_line() {
        let harness = Harness::compass();
        let line = harness.menu.display(harness.id("b")).to_string();
        assert_eq!(
            line,
            "b (90°) | Parent: root | Root: false | Pos: { x: 0, y: 0 } | State: none | Children: 2"
        );
    }

    #[test]
    fn global_and_local_coordinates() {
        let mut harness = Harness::compass();
        harness.show(Point::new(500.0, 400.0));
        let b = harness.id("b");

        assert_eq!(harness.menu.global_position(b), Point::new(600.0, 400.0));
        assert_eq!(
            harness.menu.to_local(b, Point::new(600.0, 300.0)),
            Point::new(0.0, -100.0)
        );
        assert!(harness.menu.angle_to_reference(b, Point::new(600.0, 300.0)).abs() < 1e-9);
    }
}
