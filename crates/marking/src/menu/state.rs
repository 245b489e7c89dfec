//! State transitions, their cascade to children, and redraw.
//!
//! `dirty` and `prev_event` are only written from here and from the
//! animation routines `draw_item` runs, never from inside a running cascade
//! of the same node.

use super::theme::ColorRole;
use super::visuals::ICON_BG_OPACITY;
use super::{Menu, MenuError, NodeId, NodeKind, format_value};
use crate::events::{EventData, ItemRef, MenuEvent, MenuEventType};
use crate::menu::ItemState;
use radian::{Point, angle};
use std::time::Instant;

impl Menu {
    /// Moves `id` into `state` and cascades the derived state to its children.
    /// Setting the current state again does nothing.
    pub fn set_state(&mut self, id: NodeId, state: ItemState) -> Result<(), MenuError> {
        let node = self.nodes.try_get_mut(id)?;
        if node.state == state {
            return Ok(());
        }
        log::trace!("{} {} -> {state}", node.item_id, node.state);

        node.dirty = true;
        node.state = state;

        if state == ItemState::Selected {
            if let NodeKind::Toggle { selected } = &mut node.kind {
                *selected = !*selected;
            }
            self.selected_event(id)?;
        }

        if let Some(child_state) = state.child_state() {
            for child in self.nodes[id].children.clone() {
                self.set_state(child, child_state)?;
            }
        }

        self.state_changed(id)
    }

    fn selected_event(&mut self, id: NodeId) -> Result<(), MenuError> {
        let data = self.nodes[id].is_selected().map(EventData::selected);
        self.emit(id, MenuEventType::Selection, Some(id), data)
    }

    fn state_changed(&mut self, id: NodeId) -> Result<(), MenuError> {
        let state = self.nodes[id].state;
        self.set_color(id, ColorRole::Default)?;

        let node = &mut self.nodes[id];
        node.in_back_sector = false;

        let visuals = &mut node.visuals;
        visuals.geometry.offset = Point::ZERO;
        visuals.geometry.visible = true;
        visuals.icon.visible = true;
        visuals.icon.opacity = 1.0;
        visuals.arcs.visible = false;
        visuals.arcs.opacity = 0.0;
        visuals.arcs.strokes_visible = false;
        visuals.label.visible = false;
        visuals.connector.visible = false;
        visuals.selection_radius = false;

        if state.is_interactive() {
            self.dispatcher.subscribe(id);
            self.nodes[id].visuals.icon.opacity = ICON_BG_OPACITY;
            let text = self.nodes[id].text.clone();
            self.update_text(id, &text);
        } else {
            self.dispatcher.unsubscribe(id);
            self.nodes[id].visuals.clear_sectors();
        }

        self.set_groups_visibility(id)?;

        if state == ItemState::Hidden {
            if self.collapses_with_parent(id) {
                self.nodes[id].visuals.geometry.visible = false;
            }
            self.reset(id)?;
        }

        if state != ItemState::Submenu {
            let node = &mut self.nodes[id];
            node.visuals.connector.opacity = 1.0;
            node.visuals.geometry.opacity = 1.0;
            for child in node.children.clone() {
                self.nodes[child].visuals.geometry.opacity = 1.0;
            }
        }

        self.linear_state_changed(id)
    }

    /// A hidden node vanishes at once when its whole branch collapses.
    fn collapses_with_parent(&self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id].parent else {
            return false;
        };
        let parent = &self.nodes[parent];

        let parent_hidden_or_dot = matches!(parent.state, ItemState::Hidden | ItemState::Dot);
        let parent_is_parent = parent.active_child.is_some_and(|active| {
            matches!(
                self.nodes[active].state,
                ItemState::Parent | ItemState::Submenu
            )
        });
        let grandparent_back = parent
            .parent
            .is_some_and(|gp| self.nodes[gp].state == ItemState::Back);

        parent_hidden_or_dot || parent_is_parent || grandparent_back
    }

    /// Which parts of a node are shown in its current state.
    pub(crate) fn set_groups_visibility(&mut self, id: NodeId) -> Result<(), MenuError> {
        let max_click_radius = self.settings(id)?.main.enable_max_click_radius;
        let node = &mut self.nodes[id];
        let state = node.state;
        let visuals = &mut node.visuals;

        match state {
            ItemState::Active => {
                visuals.label.visible = true;
                visuals.arcs.visible = true;
                visuals.arcs.strokes_visible = true;
                visuals.selection_radius = max_click_radius;
            }
            ItemState::ActiveSelection => {
                visuals.label.visible = true;
                visuals.arcs.visible = true;
            }
            ItemState::Dot | ItemState::Hidden | ItemState::BackChild => {
                visuals.icon.visible = false;
            }
            ItemState::Parent => visuals.connector.visible = true,
            ItemState::Submenu => {
                visuals.connector.end = Point::ZERO;
                visuals.connector.visible = true;
            }
            ItemState::Selected => visuals.label.visible = true,
            ItemState::None | ItemState::Child | ItemState::Back => {}
        }

        match &mut node.kind {
            NodeKind::Rotary(rotary) => {
                visuals.arcs.strokes_visible = false;
                visuals.arcs.visible = false;
                visuals.label.visible = state != ItemState::Dot;
                visuals.icon.opacity = ICON_BG_OPACITY;
                rotary.dial_visible = state == ItemState::Active;
            }
            NodeKind::Linear(_) => {
                visuals.label.visible = state != ItemState::Dot;
                visuals.icon.opacity = 0.0;
            }
            _ => {}
        }
        Ok(())
    }

    /// Ribbon sliders show their ribbon only while active.
    fn linear_state_changed(&mut self, id: NodeId) -> Result<(), MenuError> {
        let node = &mut self.nodes[id];
        let state = node.state;
        let NodeKind::Linear(linear) = &mut node.kind else {
            return Ok(());
        };
        let value = linear.value;

        match state {
            ItemState::Active => {
                linear.mask_visible = true;
                linear.indicator_visible = false;
                linear.gradient_visible = true;
                self.update_text(id, &format_value(value));
                self.move_ribbon_to_value(id, value, false)?;
            }
            ItemState::Selected => {}
            _ => {
                linear.mask_visible = false;
                linear.indicator_visible = state != ItemState::Dot;
                linear.gradient_visible = false;
                self.update_text(id, &format_value(value));
            }
        }
        Ok(())
    }

    /// Clears transient state of `id` and its subtree.
    pub(crate) fn reset(&mut self, id: NodeId) -> Result<(), MenuError> {
        let node = &mut self.nodes[id];
        node.active_child = None;
        node.hovered_child = None;
        node.prev_event = None;
        node.visuals.geometry.offset = Point::ZERO;
        node.visuals.clear_sectors();
        node.visuals.connector.visible = false;
        self.restore_connector(id)?;

        for child in self.nodes[id].children.clone() {
            self.reset(child)?;
        }
        Ok(())
    }

    /// Applies the color rules of `role` to `id`.
    pub(crate) fn set_color(&mut self, id: NodeId, role: ColorRole) -> Result<(), MenuError> {
        let theme = self.theme(id)?;
        let node = &mut self.nodes[id];
        let colors = theme.item_colors(&node.kind, role);
        let visuals = &mut node.visuals;
        if let Some(fill) = colors.geometry {
            visuals.geometry.fill = fill;
        }
        if let Some(accent) = colors.accent {
            visuals.geometry.accent = accent;
        }
        visuals.label.color = colors.text;
        visuals.icon.color = colors.icon;
        Ok(())
    }

    /// Depth first, parents before children. Stops whatever the node was
    /// animating and runs the animation of its state if it changed.
    pub fn redraw(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.nodes.try_get_mut(id)?;
        self.stop_animations(id)?;

        if self.nodes[id].dirty {
            self.draw_item(id)?;
            self.nodes[id].dirty = false;
        }

        for child in self.nodes[id].children.clone() {
            self.redraw(child)?;
        }
        Ok(())
    }

    pub(crate) fn stop_animations(&mut self, id: NodeId) -> Result<(), MenuError> {
        let group = &mut self.groups[id.index()];
        let follow_ups = group.stop(&mut self.nodes);
        group.reset();
        for follow_up in follow_ups {
            self.run_follow_up(follow_up)?;
        }
        Ok(())
    }

    fn draw_item(&mut self, id: NodeId) -> Result<(), MenuError> {
        match self.nodes[id].state {
            ItemState::Hidden => self.animate_hidden(id)?,
            ItemState::Active => self.animate_active(id)?,
            ItemState::ActiveSelection => self.animate_active_selection(id)?,
            ItemState::Child => self.animate_child(id)?,
            ItemState::Parent => self.animate_parent(id)?,
            ItemState::Dot => self.animate_dot(id)?,
            ItemState::Back => self.animate_back(id)?,
            ItemState::BackChild => self.animate_back_child(id)?,
            ItemState::Submenu => self.animate_submenu(id)?,
            ItemState::Selected => self.animate_selected(id)?,
            ItemState::None => {}
        }
        self.groups[id.index()].start(&mut self.nodes);
        Ok(())
    }

    pub(crate) fn update_text(&mut self, id: NodeId, content: &str) {
        let label = &mut self.nodes[id].visuals.label;
        if label.content != content {
            label.content = content.to_string();
        }
    }

    /// Writes slider labels held back by their throttle once it allows.
    pub(crate) fn flush_labels(&mut self, now: Instant) {
        for id in self.nodes.ids().collect::<Vec<_>>() {
            let pending = match &mut self.nodes[id].kind {
                NodeKind::Linear(linear) => linear.label.flush(now),
                _ => None,
            };
            if let Some(text) = pending {
                self.update_text(id, &text);
            }
        }
    }

    pub(crate) fn item_ref(&self, id: NodeId) -> ItemRef {
        let node = &self.nodes[id];
        ItemRef {
            item_id: node.item_id.clone(),
            angle: angle::to_deg(node.angle),
        }
    }

    /// Sends an event from `source` on the root channel unless it equals the
    /// last event `source` sent.
    pub(crate) fn emit(
        &mut self,
        source: NodeId,
        kind: MenuEventType,
        target: Option<NodeId>,
        data: Option<EventData>,
    ) -> Result<(), MenuError> {
        let event = MenuEvent {
            kind,
            source: self.item_ref(source),
            target: target.map(|t| self.item_ref(t)),
            data,
        };

        if self.nodes[source].prev_event.as_ref() != Some(&event) {
            let sender = self.events(source)?;
            log::trace!("{} emits {kind}", event.source.item_id);
            if sender.try_send(event.clone()).is_err() {
                log::warn!("event channel closed, dropping {kind} from {}", event.source.item_id);
            }
        }

        self.nodes[source].prev_event = Some(event);
        Ok(())
    }
}
