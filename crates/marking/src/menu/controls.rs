//! Rotary dials and ribbon sliders.

use super::theme::CONNECTOR_DIMMED_WIDTH;
use super::{Menu, MenuError, NodeId, NodeKind, Part, Target, format_value};
use crate::animation::{Animation, Easing, Keyframe};
use crate::events::{ClickState, DragEvent, DragState, EventData, MenuEventType};
use crate::menu::ItemState;
use radian::Point;
use radian::point::REFERENCE;

const DONE_LABEL: &str = "Done";

impl Menu {
    /// Sets the value of a slider control. Out of range values are rejected.
    pub fn set_slider_value(&mut self, id: NodeId, value: f64) -> Result<(), MenuError> {
        let node = self.nodes.try_get_mut(id)?;
        match &mut node.kind {
            NodeKind::Rotary(rotary) => {
                check_range(&node.item_id, rotary.config, value)?;
                rotary.set_value(value);
                node.visuals.geometry.rotation = rotary.rotation;
                node.visuals.label.rotation = -rotary.rotation;
                self.update_text(id, &format_value(value));
                Ok(())
            }
            NodeKind::Linear(linear) => {
                check_range(&node.item_id, linear.config, value)?;
                linear.value = value;
                self.update_text(id, &format_value(value));
                self.move_ribbon_to_value(id, value, false)
            }
            _ => Err(MenuError::WrongKind(node.item_id.clone(), "slider")),
        }
    }

    fn emit_value(&mut self, id: NodeId, kind: MenuEventType, value: f64) -> Result<(), MenuError> {
        self.emit(id, kind, Some(id), Some(EventData::value(value)))
    }

    /// Turns the dial towards `local` and shows the new value.
    fn rotate_dial(&mut self, id: NodeId, local: Point) -> f64 {
        let node = &mut self.nodes[id];
        let NodeKind::Rotary(rotary) = &mut node.kind else {
            return 0.0;
        };
        let rotation = REFERENCE.directed_angle(local);
        let value = rotary.rotate_to(rotation);

        node.visuals.geometry.rotation = rotation;
        node.visuals.label.rotation = -rotation;
        let connector = &mut node.visuals.connector;
        connector.end = local;
        connector.width = CONNECTOR_DIMMED_WIDTH;

        self.update_text(id, &format_value(value));
        value
    }

    pub(crate) fn rotary_drag(&mut self, id: NodeId, drag: DragEvent) -> Result<(), MenuError> {
        let size = self.settings(id)?.geometry.size;
        let local = self.to_local(id, drag.position);
        let value = self.rotate_dial(id, local);
        let end = drag.state == DragState::End;

        let node = &mut self.nodes[id];
        node.visuals.connector.visible = !end;
        if let NodeKind::Rotary(rotary) = &mut node.kind {
            rotary.indicator_distance = if end { size } else { local.length() };
        }

        let kind = if end {
            MenuEventType::SliderFinal
        } else {
            MenuEventType::SliderChanging
        };
        self.emit_value(id, kind, value)
    }

    /// A click outside the dial sets the value, inside it or with the right
    /// button the menu goes back.
    pub(crate) fn rotary_click(&mut self, id: NodeId, state: ClickState) -> Result<(), MenuError> {
        let size = self.settings(id)?.geometry.size;
        let local = self.to_local(id, self.input.position);

        if state == ClickState::Right || local.length() < size {
            return self.navigate_back(id);
        }

        let value = self.rotate_dial(id, local);
        self.emit_value(id, MenuEventType::SliderFinal, value)
    }

    pub(crate) fn wheel_logic(&mut self, id: NodeId, delta: f64) -> Result<(), MenuError> {
        let node = &mut self.nodes[id];
        if node.state != ItemState::Active || delta == 0.0 {
            return Ok(());
        }
        let NodeKind::Rotary(rotary) = &mut node.kind else {
            return Ok(());
        };

        let rotation = rotary.rotation + delta.signum();
        let value = rotary.rotate_to(rotation);
        node.visuals.geometry.rotation = rotation;
        node.visuals.label.rotation = -rotation;
        self.update_text(id, &format_value(value));
        self.emit_value(id, MenuEventType::SliderFinal, value)
    }

    /// Distance of the pointer from the ribbon axis.
    fn position_to_test(&self, id: NodeId) -> f64 {
        let local = self.to_local(id, self.input.position);
        match &self.nodes[id].kind {
            NodeKind::Linear(linear) if linear.vertical => local.x.abs(),
            _ => local.y.abs(),
        }
    }

    fn linear_value(&self, id: NodeId) -> Option<(f64, bool)> {
        match &self.nodes[id].kind {
            NodeKind::Linear(linear) => Some((linear.value, linear.dragging)),
            _ => None,
        }
    }

    pub(crate) fn linear_selection(&mut self, id: NodeId, angle: f64) -> Result<(), MenuError> {
        let Some((value, dragging)) = self.linear_value(id) else {
            return Ok(());
        };
        if dragging {
            return Ok(());
        }

        let dead_zone = self.settings(id)?.geometry.size_dead_zone;
        if self.position_to_test(id) > dead_zone {
            return self.base_selection(id, angle);
        }
        self.update_text(id, &format_value(value));
        self.clear_sectors(id);
        Ok(())
    }

    /// Pointer over the "Done" sector.
    pub(crate) fn linear_hover(&mut self, id: NodeId) {
        let NodeKind::Linear(linear) = &mut self.nodes[id].kind else {
            return;
        };
        if linear.dragging {
            return;
        }
        linear.done = true;
        self.update_text(id, DONE_LABEL);
    }

    pub(crate) fn linear_click(&mut self, id: NodeId, state: ClickState) -> Result<(), MenuError> {
        self.nodes[id].hovered_child = None;
        let dead_zone = self.settings(id)?.geometry.size_dead_zone;
        if self.position_to_test(id) <= dead_zone {
            return Ok(());
        }

        let done = matches!(&self.nodes[id].kind, NodeKind::Linear(linear) if linear.done);
        if done {
            self.set_state(id, ItemState::Selected)?;
            let root = self.root_of(id);
            return self.redraw(root);
        }
        self.base_click(id, state)
    }

    /// Dragging slides the ribbon under the window, releasing snaps it onto
    /// the value grid.
    pub(crate) fn linear_drag(&mut self, id: NodeId, drag: DragEvent) -> Result<(), MenuError> {
        let now = self.input.now;
        let node = &mut self.nodes[id];
        let NodeKind::Linear(linear) = &mut node.kind else {
            return Ok(());
        };

        if drag.state == DragState::End {
            let value = linear.value;
            self.move_ribbon_to_value(id, value, true)?;
            if let NodeKind::Linear(linear) = &mut self.nodes[id].kind {
                linear.prev_drag = None;
                linear.dragging = false;
                linear.ribbon_selected = false;
            }
            return self.emit_value(id, MenuEventType::SliderFinal, value);
        }

        linear.dragging = true;
        linear.ribbon_selected = true;
        let first = linear.prev_drag.is_none();
        let previous = *linear.prev_drag.get_or_insert(drag.position);

        let delta = if linear.vertical {
            previous.y - drag.position.y
        } else {
            drag.position.x - previous.x
        };
        linear.shift(delta);
        linear.prev_drag = Some(drag.position);

        let value = linear.value_at_offset();
        let changed = value != linear.value;
        linear.value = value;
        let label = if changed {
            linear.label.push(format_value(value), now)
        } else {
            None
        };

        if first {
            self.update_text(id, &format_value(value));
        }
        if let Some(label) = label {
            self.update_text(id, &label);
        }
        self.emit_value(id, MenuEventType::SliderChanging, value)
    }

    /// Places the ribbon so `value` sits under the window.
    pub(crate) fn move_ribbon_to_value(
        &mut self,
        id: NodeId,
        value: f64,
        animated: bool,
    ) -> Result<(), MenuError> {
        let duration = self.settings(id)?.main.animation_duration;
        let node = &mut self.nodes[id];
        let NodeKind::Linear(linear) = &mut node.kind else {
            return Ok(());
        };
        check_range(&node.item_id, linear.config, value)?;

        let offset = linear.offset_for(value);
        let dragging = linear.dragging;
        if animated {
            self.start_effect(
                Animation::to(Target::new(id, Part::Ribbon), Keyframe::offset_x(offset))
                    .with_duration(duration)
                    .with_easing(Easing::EaseInCubic),
            );
        } else {
            linear.offset = offset;
        }

        let kind = if dragging {
            MenuEventType::SliderChanging
        } else {
            MenuEventType::SliderFinal
        };
        self.emit_value(id, kind, value)
    }
}

fn check_range(
    id: &super::ItemId,
    config: super::SliderConfig,
    value: f64,
) -> Result<(), MenuError> {
    if config.contains(value) {
        return Ok(());
    }
    Err(MenuError::ValueOutOfRange {
        id: id.clone(),
        value,
        min: config.min,
        max: config.max,
    })
}
