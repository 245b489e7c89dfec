//! Reactions of an interactive node to pointer input: hovering sectors,
//! clicks, drags and gesture decision points.

use super::theme::ColorRole;
use super::{Menu, MenuError, NodeId, NodeKind, Part, Target};
use crate::events::{ClickState, DragEvent, DragState, MenuEventType};
use crate::menu::ItemState;
use radian::{Point, angle};

const BACK_LABEL: &str = "Back";

impl Menu {
    pub(crate) fn selection_logic(&mut self, id: NodeId, angle: f64) -> Result<(), MenuError> {
        match &self.nodes[id].kind {
            NodeKind::Rotary(_) => Ok(()),
            NodeKind::Linear(_) => self.linear_selection(id, angle),
            _ => self.base_selection(id, angle),
        }
    }

    pub(crate) fn base_selection(&mut self, id: NodeId, angle: f64) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let distance = self.to_local(id, self.input.position).length();

        let node = &mut self.nodes[id];
        if !node.is_root {
            node.in_back_sector = node.back_arc.is_some_and(|arc| arc.contains(angle));
        }

        if distance < settings.geometry.size_dead_zone {
            if !node.kind.is_control() {
                self.in_geometry(id)?;
            }
            return Ok(());
        }

        if self.nodes[id].in_back_sector {
            self.reset_active_hovered(id);
            self.back_hover(id)?;
        } else if matches!(self.nodes[id].kind, NodeKind::Linear(_)) {
            self.linear_hover(id);
        } else {
            if self.nodes[id].is_leaf() {
                return Ok(());
            }
            if let Some(nearest) = self.nearest_child(id, angle) {
                self.hover(id, nearest)?;
            }
        }

        self.animate_arcs(id, angle)
    }

    fn in_geometry(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.reset_active_hovered(id);
        self.clear_sectors(id);
        let text = self.nodes[id].text.clone();
        self.update_text(id, &text);
        self.reset_child_color(id)
    }

    fn back_hover(&mut self, id: NodeId) -> Result<(), MenuError> {
        if let NodeKind::Linear(linear) = &mut self.nodes[id].kind {
            if linear.dragging {
                return Ok(());
            }
            linear.done = false;
        }

        self.reset_child_color(id)?;
        let parent = self.nodes[id].parent;
        self.emit(id, MenuEventType::BackHover, parent, None)?;
        self.update_text(id, BACK_LABEL);
        Ok(())
    }

    fn hover(&mut self, id: NodeId, child: NodeId) -> Result<(), MenuError> {
        self.reset_child_color(id)?;
        self.nodes[id].hovered_child = Some(child);

        self.set_color(child, ColorRole::Hovered)?;
        for grandchild in self.nodes[child].children.clone() {
            self.set_color(grandchild, ColorRole::Hovered)?;
        }

        let kind = if self.nodes[child].is_leaf() {
            MenuEventType::ItemHoverSelection
        } else {
            MenuEventType::ItemHover
        };
        self.emit(id, kind, Some(child), None)?;

        let text = self.nodes[child].text.clone();
        self.update_text(id, &text);
        Ok(())
    }

    fn reset_child_color(&mut self, id: NodeId) -> Result<(), MenuError> {
        for child in self.nodes[id].children.clone() {
            self.set_color(child, ColorRole::Default)?;
            for grandchild in self.nodes[child].children.clone() {
                self.set_color(grandchild, ColorRole::Default)?;
            }
        }
        Ok(())
    }

    pub(crate) fn reset_active_hovered(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.active_child = None;
        node.hovered_child = None;
    }

    /// Stops every sector fade and hides all sectors.
    pub(crate) fn clear_sectors(&mut self, id: NodeId) {
        for sector in 0..self.nodes[id].arcs.len() {
            self.stop_effects(Target::new(id, Part::Sector(sector)));
        }
        self.nodes[id].visuals.clear_sectors();
    }

    /// Child whose direction is closest to `angle`. On a tie the earlier child wins.
    pub(crate) fn nearest_child(&self, id: NodeId, angle: f64) -> Option<NodeId> {
        let delta = |child: NodeId| angle::difference(self.nodes[child].angle, angle).abs();
        self.nodes[id]
            .children
            .iter()
            .copied()
            .reduce(|best, next| if delta(best) > delta(next) { next } else { best })
    }

    pub(crate) fn click_logic(&mut self, id: NodeId, state: ClickState) -> Result<(), MenuError> {
        match &self.nodes[id].kind {
            NodeKind::Rotary(_) => self.rotary_click(id, state),
            NodeKind::Linear(_) => self.linear_click(id, state),
            _ => self.base_click(id, state),
        }
    }

    pub(crate) fn base_click(&mut self, id: NodeId, state: ClickState) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let root = self.root_of(id);
        let distance = self.to_local(id, self.input.position).length();

        if settings.main.enable_max_click_radius && distance >= settings.radii.max_click_radius {
            log::debug!("click outside of the menu, closing");
            self.set_state(root, ItemState::Hidden)?;
            return self.redraw(root);
        }

        if state == ClickState::Right {
            if self.nodes[id].is_root {
                self.set_state(root, ItemState::Hidden)?;
                self.nodes[root].visuals.visible = false;
                return Ok(());
            }
            return self.navigate_back(id);
        }

        if self.nodes[id].in_back_sector && distance > settings.geometry.size_dead_zone {
            return self.navigate_back(id);
        }

        if self.nodes[id].hovered_child.is_some() {
            self.change_active(id)?;
        }
        Ok(())
    }

    /// Makes the parent of `id` active again.
    pub(crate) fn navigate_back(&mut self, id: NodeId) -> Result<(), MenuError> {
        let Some(parent) = self.nodes[id].parent else {
            return Ok(());
        };
        if matches!(self.nodes[id].kind, NodeKind::Rotary(_)) {
            self.restore_connector_style(parent)?;
        }

        self.trace.reset();
        self.reset_active_hovered(id);
        self.emit(id, MenuEventType::BackNavigation, Some(parent), None)?;

        self.set_state(parent, ItemState::Active)?;
        self.set_state(id, ItemState::Back)?;
        self.restore_connector_style(id)?;

        let root = self.root_of(id);
        self.redraw(root)
    }

    /// Enters the child nearest to the pointer: submenus open, leaves get
    /// selected, or only preselected while a gesture is being drawn.
    pub(crate) fn change_active(&mut self, id: NodeId) -> Result<(), MenuError> {
        let is_radio_group = matches!(self.nodes[id].kind, NodeKind::RadioGroup);
        if is_radio_group {
            if self.nodes[id].state != ItemState::Active {
                return Ok(());
            }
            self.deselect_children(id)?;
        }

        let angle = self.angle_to_reference(id, self.input.position);
        let Some(child) = self.nearest_child(id, angle) else {
            return Ok(());
        };
        self.nodes[id].active_child = Some(child);
        self.set_state(id, ItemState::Submenu)?;
        self.trace.reset();

        if self.nodes[child].is_leaf() {
            if self.input.marking_mode {
                self.set_state(child, ItemState::ActiveSelection)?;
                self.emit(id, MenuEventType::ItemHoverSelection, Some(child), None)?;
            } else {
                self.set_state(child, ItemState::Selected)?;
                if is_radio_group {
                    self.select(child)?;
                }
            }
        } else if !is_radio_group {
            self.set_state(child, ItemState::Active)?;
            self.emit(id, MenuEventType::SubmenuNavigation, Some(child), None)?;
        }

        let root = self.root_of(id);
        self.redraw(root)
    }

    pub(crate) fn drag_logic(&mut self, id: NodeId, drag: DragEvent) -> Result<(), MenuError> {
        match &self.nodes[id].kind {
            NodeKind::Rotary(_) => self.rotary_drag(id, drag),
            NodeKind::Linear(_) => self.linear_drag(id, drag),
            _ => self.base_drag(id, drag),
        }
    }

    /// While dragging past `min_trace_distance` the nearest child follows
    /// the pointer; releasing there enters it.
    fn base_drag(&mut self, id: NodeId, drag: DragEvent) -> Result<(), MenuError> {
        let min_trace = self.settings(id)?.main.min_trace_distance;
        self.nodes[id].visuals.connector.visible = false;
        let local = self.to_local(id, drag.position);

        if self.nodes[id].is_leaf() {
            if drag.state == DragState::End {
                self.trace.reset();
                self.set_state(id, ItemState::Selected)?;
                let root = self.root_of(id);
                self.redraw(root)?;
            }
            return Ok(());
        }
        if drag.state == DragState::End && local.length() > min_trace {
            return self.change_active(id);
        }

        let angle = self.angle_to_reference(id, drag.position);
        let Some(nearest) = self.nearest_child(id, angle) else {
            return Ok(());
        };

        if local.length() >= min_trace && !self.nodes[id].in_back_sector {
            self.stop_animations(nearest)?;
            self.nodes[nearest].visuals.position = local;
            let connector = &mut self.nodes[id].visuals.connector;
            connector.visible = true;
            connector.end = local;
        } else {
            let node = &mut self.nodes[nearest];
            node.visuals.position = node.position_child;
        }

        for child in self.nodes[id].children.clone() {
            if child != nearest {
                let node = &mut self.nodes[child];
                node.visuals.position = node.position_child;
            }
        }
        Ok(())
    }

    pub(crate) fn trace_logic(&mut self, id: NodeId, decision: Point) -> Result<(), MenuError> {
        if self.nodes[id].kind.is_control() {
            return Ok(());
        }
        let min_trace = self.settings(id)?.main.min_trace_distance;
        let local = self.to_local(id, decision);

        let node = &self.nodes[id];
        if !node.is_root && node.in_back_sector && local.length() >= min_trace {
            self.nodes[id].visuals.connector.visible = false;
            return self.navigate_back(id);
        }
        if node.is_leaf() {
            return Ok(());
        }

        let angle = self.angle_to_reference(id, decision);
        let Some(child) = self.nearest_child(id, angle) else {
            return Ok(());
        };
        self.nodes[id].hovered_child = Some(child);
        self.nodes[child].visuals.position = local;
        self.change_active(id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::Harness;
    use super::*;
    use crate::events::MenuEvent;
    use serde_json::json;
    use std::time::Duration;

    fn kinds(events: &[MenuEvent]) -> Vec<(MenuEventType, String)> {
        events
            .iter()
            .map(|e| {
                let target = e.target.as_ref().map(|t| t.item_id.to_string());
                (e.kind, target.unwrap_or_default())
            })
            .collect()
    }

    #[test]
    fn nearest_child_prefers_the_first_on_a_tie() {
        let harness = Harness::compass();
        let menu = &harness.menu;
        let (a, b) = (harness.id("a"), harness.id("b"));

        assert_eq!(menu.nearest_child(NodeId::ROOT, angle::to_rad(44.0)), Some(a));
        assert_eq!(menu.nearest_child(NodeId::ROOT, angle::to_rad(46.0)), Some(b));
        assert_eq!(menu.nearest_child(NodeId::ROOT, angle::to_rad(45.0)), Some(a));
        assert_eq!(menu.nearest_child(NodeId::ROOT, angle::to_rad(359.0)), Some(a));
        assert_eq!(menu.nearest_child(a, 0.0), None);
    }

    #[test]
    fn hovering_emits_once_per_child() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));

        harness.move_to(400.0, 300.0);
        harness.move_to(400.0, 305.0);
        harness.move_to(300.0, 420.0);

        assert_eq!(
            kinds(&harness.drain()),
            vec![
                (MenuEventType::ItemHover, "b".into()),
                (MenuEventType::ItemHoverSelection, "c".into()),
            ]
        );
        let root = harness.menu.node(NodeId::ROOT).unwrap();
        assert_eq!(root.hovered_child(), Some(harness.id("c")));
        assert_eq!(root.visuals().label.content, "C");
    }

    #[test]
    fn center_restores_the_label() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(400.0, 300.0);
        harness.move_to(305.0, 301.0);

        let root = harness.menu.node(NodeId::ROOT).unwrap();
        assert_eq!(root.visuals().label.content, "Root");
        assert_eq!(root.hovered_child(), None);
        assert!(root.visuals().arcs.sectors.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn clicking_a_leaf_selects_it_and_closes() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(300.0, 420.0);
        harness.drain();

        harness.menu.click(ClickState::Left).unwrap();
        assert_eq!(harness.state("c"), ItemState::Selected);
        assert_eq!(harness.state("root"), ItemState::Parent);

        let events = harness.drain();
        assert_eq!(kinds(&events), vec![(MenuEventType::Selection, "c".into())]);
        assert_eq!(events[0].source.item_id.as_str(), "c");

        harness.settle();
        assert_eq!(harness.state("root"), ItemState::Hidden);
        assert!(!harness.menu.node(NodeId::ROOT).unwrap().visuals().visible);
    }

    #[test]
    fn submenu_and_back() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(500.0, 300.0);
        harness.menu.click(ClickState::Left).unwrap();
        harness.settle();

        assert_eq!(harness.state("b"), ItemState::Active);
        assert_eq!(harness.state("b1"), ItemState::Child);
        assert_eq!(harness.state("a"), ItemState::Dot);
        assert!(harness.menu.dispatcher().is_subscribed(harness.id("b")));
        assert!(!harness.menu.dispatcher().is_subscribed(NodeId::ROOT));

        harness.menu.click(ClickState::Right).unwrap();
        harness.settle();

        assert_eq!(harness.state("root"), ItemState::Active);
        assert_eq!(harness.state("b"), ItemState::Child);
        assert_eq!(harness.state("b1"), ItemState::Dot);
        let b = harness.menu.node(harness.id("b")).unwrap();
        assert_eq!(b.visuals().position, b.position_child());
        let root = harness.menu.node(NodeId::ROOT).unwrap();
        assert!(!root.visuals().connector.visible);

        assert_eq!(
            kinds(&harness.drain()),
            vec![
                (MenuEventType::ItemHover, "b".into()),
                (MenuEventType::SubmenuNavigation, "b".into()),
                (MenuEventType::BackNavigation, "root".into()),
            ]
        );
    }

    #[test]
    fn back_sector_hover_and_click() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(500.0, 300.0);
        harness.menu.click(ClickState::Left).unwrap();
        harness.settle();
        harness.drain();

        // b sits at the pointer, its back sector points west
        harness.move_to(400.0, 300.0);
        let b = harness.id("b");
        let node = harness.menu.node(b).unwrap();
        assert_eq!(node.visuals().label.content, "Back");
        assert_eq!(
            kinds(&harness.drain()),
            vec![(MenuEventType::BackHover, "root".into())]
        );

        harness.menu.click(ClickState::Left).unwrap();
        assert_eq!(harness.state("root"), ItemState::Active);
    }

    #[test]
    fn right_click_on_root_closes_immediately() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.menu.click(ClickState::Right).unwrap();

        assert_eq!(harness.state("root"), ItemState::Hidden);
        assert!(!harness.menu.node(NodeId::ROOT).unwrap().visuals().visible);
        assert!(harness.drain().is_empty());
    }

    #[test]
    fn click_outside_max_radius_closes() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(300.0, 900.0);
        harness.menu.click(ClickState::Left).unwrap();

        assert_eq!(harness.state("root"), ItemState::Hidden);
        assert_eq!(harness.state("c"), ItemState::Hidden);
    }

    #[test]
    fn gesture_pause_preselects_a_leaf() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));
        harness.menu.set_marking_mode(true);

        for step in 0..=9 {
            harness.move_to(300.0, 300.0 + step as f64 * 25.0);
        }
        harness.now += Duration::from_millis(150);
        harness.menu.tick(harness.now).unwrap();

        assert_eq!(harness.state("c"), ItemState::ActiveSelection);
        assert_eq!(
            kinds(&harness.drain()),
            vec![(MenuEventType::ItemHoverSelection, "c".into())]
        );

        // releasing the button over the preselected leaf selects it
        harness.menu.set_marking_mode(false);
        harness
            .menu
            .drag(DragEvent {
                state: DragState::End,
                position: Point::new(300.0, 525.0),
            })
            .unwrap();
        assert_eq!(harness.state("c"), ItemState::Selected);
        assert_eq!(harness.drain()[0].kind, MenuEventType::Selection);
    }

    #[test]
    fn dragging_pulls_the_nearest_child() {
        let mut harness = Harness::compass();
        harness.show(Point::new(300.0, 300.0));

        let drag = |x, y| DragEvent {
            state: DragState::Dragging,
            position: Point::new(x, y),
        };
        harness.menu.drag(drag(300.0, 500.0)).unwrap();

        let c = harness.menu.node(harness.id("c")).unwrap();
        assert_eq!(c.visuals().position, Point::new(0.0, 200.0));
        let root = harness.menu.node(NodeId::ROOT).unwrap();
        assert!(root.visuals().connector.visible);
        assert_eq!(root.visuals().connector.end, Point::new(0.0, 200.0));

        harness.menu.drag(drag(300.0, 350.0)).unwrap();
        let c = harness.menu.node(harness.id("c")).unwrap();
        assert_eq!(c.visuals().position, c.position_child());
    }

    #[test]
    fn radio_group_selects_one_child() {
        let mut harness = Harness::new(json!({
            "id": "root", "direction": 0,
            "children": [{
                "id": "size", "text": "Size", "direction": 90, "type": "radiogroup",
                "data": {"selected": "small"},
                "children": [
                    {"id": "small", "direction": 0},
                    {"id": "large", "direction": 180, "type": "action"},
                ]
            }]
        }));
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(450.0, 300.0);
        harness.menu.click(ClickState::Left).unwrap();
        harness.settle();
        assert_eq!(harness.state("size"), ItemState::Active);

        let size = harness.id("size");
        let local_large = harness.menu.global_position(size) + Point::new(0.0, 120.0);
        harness.move_to(local_large.x, local_large.y);
        harness.drain();
        harness.menu.click(ClickState::Left).unwrap();

        let menu = &harness.menu;
        assert_eq!(menu.node(harness.id("large")).unwrap().is_selected(), Some(true));
        assert_eq!(menu.node(harness.id("small")).unwrap().is_selected(), Some(false));
        let selection = harness
            .drain()
            .into_iter()
            .find(|e| e.kind == MenuEventType::Selection)
            .unwrap();
        assert_eq!(selection.data.unwrap().selected, Some(true));
    }
}
