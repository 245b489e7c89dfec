//! Animations built for each state when a dirty node is redrawn.

use super::theme::{BACKGROUND_OPACITY, CONNECTOR_DIMMED_WIDTH, ColorRole};
use super::visuals::ICON_BG_OPACITY;
use super::{FollowUp, Menu, MenuError, NodeId, NodeKind, Part, Target};
use crate::animation::{Animation, Easing, Keyframe};
use crate::menu::ItemState;
use radian::{Point, angle};

/// The selection pulse of a chosen leaf.
const SELECTED_PULSE: (f64, f64) = (0.9, 1.15);

impl Menu {
    fn push(&mut self, owner: NodeId, animation: Animation<Target>) {
        self.groups[owner.index()].push(animation);
    }

    pub(crate) fn animate_hidden(&mut self, id: NodeId) -> Result<(), MenuError> {
        let node = &self.nodes[id];
        let to = if node.is_root {
            Keyframe::scaling(0.0)
        } else {
            let dot = self.settings(id)?.scales.dot;
            let position = node.visuals.position;
            Keyframe::scaling(0.0).with_position(Point::ZERO - position + position * dot)
        };
        self.push(id, Animation::to(Target::new(id, Part::Geometry), to));
        Ok(())
    }

    pub(crate) fn animate_active(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.push(
            id,
            Animation::to(Target::new(id, Part::Geometry), Keyframe::scaling(1.0)),
        );
        self.groups[id.index()].on_finish(FollowUp::FadeInArcs(id));

        let theme = self.theme(id)?;
        let node = &self.nodes[id];
        match (&node.kind, node.parent) {
            (NodeKind::Rotary(_), Some(parent)) => {
                let connector = &mut self.nodes[parent].visuals.connector;
                connector.width = CONNECTOR_DIMMED_WIDTH;
                connector.color = theme.connector_dimmed;
            }
            (NodeKind::Linear(_), _) => self.nodes[id].visuals.geometry.fill = theme.geometry,
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn animate_child(&mut self, id: NodeId) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let node = &mut self.nodes[id];
        node.visuals.geometry.offset = Point::ZERO;
        let position = node.position_child;

        self.push(
            id,
            Animation::between(
                Target::new(id, Part::Item),
                Keyframe::position(position.normalize(settings.radii.dot)),
                Keyframe::position(position),
            ),
        );
        self.push(
            id,
            Animation::between(
                Target::new(id, Part::Geometry),
                Keyframe::scaling(settings.scales.dot),
                Keyframe::scaling(settings.scales.child),
            ),
        );
        Ok(())
    }

    pub(crate) fn animate_parent(&mut self, id: NodeId) -> Result<(), MenuError> {
        let scaling = self.settings(id)?.scales.parent;
        self.push(
            id,
            Animation::to(Target::new(id, Part::Geometry), Keyframe::scaling(scaling)),
        );
        Ok(())
    }

    pub(crate) fn animate_dot(&mut self, id: NodeId) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let node = &self.nodes[id];
        let position_dot = node.position_dot;
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let parent = &self.nodes[parent];

        if parent.state == ItemState::Parent {
            let from = node.visuals.position;
            self.push(
                id,
                Animation::between(
                    Target::new(id, Part::Item),
                    Keyframe::position(from),
                    Keyframe::position(position_dot),
                ),
            );
            self.push(
                id,
                Animation::to(
                    Target::new(id, Part::Geometry),
                    Keyframe::scaling(settings.scales.dot),
                ),
            );
            return Ok(());
        }

        let parent_position = parent.visuals.position;
        self.push(
            id,
            Animation::between(
                Target::new(id, Part::Item),
                Keyframe::position(parent_position),
                Keyframe::position(position_dot),
            ),
        );
        self.push(
            id,
            Animation::between(
                Target::new(id, Part::Geometry),
                Keyframe::position(Point::ZERO - parent_position).with_scaling(0.0),
                Keyframe::position(Point::ZERO).with_scaling(settings.scales.dot),
            ),
        );
        Ok(())
    }

    /// Returns from an active node to its parent: the node shrinks back into a
    /// child and the whole tree slides so the parent sits under the pointer.
    pub(crate) fn animate_back(&mut self, id: NodeId) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let root = self.root_of(id);
        let Some(parent) = self.nodes[id].parent else {
            return Ok(());
        };
        self.nodes[id].state = ItemState::Child;

        let mut root_position = self.input.position;
        if let Some(grandparent) = self.nodes[parent].parent {
            root_position = (self.nodes[root].visuals.position
                + self.to_local(parent, self.input.position))
            .floor();

            self.restore_connector_style(grandparent)?;
            self.nodes[grandparent].visuals.geometry.opacity = 1.0;
            for sibling in self.nodes[grandparent].children.clone() {
                self.nodes[sibling].visuals.geometry.opacity = 1.0;
            }
        }

        self.groups[id.index()].set_easing(Easing::EaseInCubic);
        let position_child = self.nodes[id].position_child;
        if !matches!(self.nodes[id].kind, NodeKind::Rotary(_)) {
            self.push(
                id,
                Animation::to(
                    Target::new(root, Part::Item),
                    Keyframe::position(root_position),
                ),
            );
        }
        self.push(
            id,
            Animation::to(Target::new(id, Part::Item), Keyframe::position(position_child)),
        );
        self.push(
            id,
            Animation::to(
                Target::new(parent, Part::Connector),
                Keyframe::position(Point::ZERO),
            ),
        );
        self.push(
            id,
            Animation::to(
                Target::new(id, Part::Geometry),
                Keyframe::scaling(settings.scales.child),
            ),
        );

        let group = &mut self.groups[id.index()];
        group.on_stop(FollowUp::RestoreConnector {
            node: parent,
            hide: false,
        });
        group.on_finish(FollowUp::RestoreConnector {
            node: parent,
            hide: true,
        });
        Ok(())
    }

    pub(crate) fn animate_back_child(&mut self, id: NodeId) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let node = &mut self.nodes[id];
        node.state = ItemState::Dot;
        let to = node.visuals.position.normalize(settings.radii.dot);

        self.push(id, Animation::to(Target::new(id, Part::Item), Keyframe::position(to)));
        self.push(
            id,
            Animation::to(
                Target::new(id, Part::Geometry),
                Keyframe::scaling(settings.scales.dot),
            ),
        );
        Ok(())
    }

    /// Opens the active child as a submenu. The child moves out along its
    /// direction as far as the pointer went, at least `min_distance`, and the
    /// tree shifts so the child ends up under the pointer.
    pub(crate) fn animate_submenu(&mut self, id: NodeId) -> Result<(), MenuError> {
        let settings = self.settings(id)?;
        let root = self.root_of(id);
        self.nodes[id].state = ItemState::Parent;

        let local = self.to_local(id, self.input.position).floor();
        let active = self.nodes[id]
            .active_child
            .ok_or_else(|| MenuError::MissingActiveChild(self.nodes[id].item_id.clone()))?;
        self.nodes[id].front_child = Some(active);

        let direction = self.nodes[active].angle;
        let unit = Point::new(snap_zero(direction.sin()), snap_zero(-direction.cos()));
        let length = local
            .multiply(unit)
            .length()
            .max(settings.main.min_distance);
        let item_position = unit.normalize(length);
        let delta = local - item_position;

        let root_position = (self.nodes[root].visuals.position + delta).floor();
        let active_position = self.nodes[active].visuals.position;

        self.push(
            id,
            Animation::to(Target::new(root, Part::Item), Keyframe::position(root_position)),
        );
        self.push(
            id,
            Animation::between(
                Target::new(active, Part::Item),
                Keyframe::position(active_position),
                Keyframe::position(item_position),
            ),
        );
        self.push(
            id,
            Animation::to(
                Target::new(id, Part::Connector),
                Keyframe::position(item_position),
            ),
        );
        self.push(
            id,
            Animation::to(
                Target::new(id, Part::Geometry),
                Keyframe::scaling(settings.scales.parent),
            ),
        );
        self.groups[id.index()].on_stop(FollowUp::SettleConnector {
            node: id,
            end: item_position,
        });

        if let Some(parent) = self.nodes[id].parent {
            let dimmed = self.theme(id)?.connector_dimmed;
            let parent_node = &mut self.nodes[parent];
            parent_node.visuals.connector.width = CONNECTOR_DIMMED_WIDTH;
            parent_node.visuals.connector.color = dimmed;
            parent_node.visuals.geometry.opacity = BACKGROUND_OPACITY;
            for sibling in parent_node.children.clone() {
                if sibling != id {
                    self.nodes[sibling].visuals.geometry.opacity = BACKGROUND_OPACITY;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn animate_selected(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.set_color(id, ColorRole::Selected)?;
        self.nodes[id].visuals.icon.opacity = ICON_BG_OPACITY;

        let (from, to) = SELECTED_PULSE;
        self.push(
            id,
            Animation::between(
                Target::new(id, Part::Geometry),
                Keyframe::scaling(from),
                Keyframe::scaling(to),
            ),
        );
        self.groups[id.index()].on_finish(FollowUp::HideTree);
        Ok(())
    }

    pub(crate) fn animate_active_selection(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.set_color(id, ColorRole::ActiveSelected)?;
        self.push(
            id,
            Animation::to(Target::new(id, Part::Geometry), Keyframe::scaling(1.0)),
        );
        self.groups[id.index()].on_finish(FollowUp::FadeInArcs(id));
        Ok(())
    }

    /// Fades in the sector under `angle` and clears the others.
    pub(crate) fn animate_arcs(&mut self, id: NodeId, angle: f64) -> Result<(), MenuError> {
        let Some(index) = self.nodes[id].arcs.iter().position(|arc| arc.contains(angle)) else {
            return Ok(());
        };
        let duration = self.settings(id)?.main.animation_duration;

        for other in 0..self.nodes[id].arcs.len() {
            if other != index {
                self.stop_effects(Target::new(id, Part::Sector(other)));
                if let Some(sector) = self.nodes[id].visuals.arcs.sectors.get_mut(other) {
                    *sector = 0.0;
                }
            }
        }

        let target = Target::new(id, Part::Sector(index));
        let opacity = self.nodes[id]
            .visuals
            .arcs
            .sectors
            .get(index)
            .copied()
            .unwrap_or_default();
        if opacity < 1.0 && !self.effect_running(target) {
            self.start_effect(
                Animation::to(target, Keyframe::opacity(1.0))
                    .with_duration(duration)
                    .with_easing(Easing::EaseInCubic),
            );
        }
        Ok(())
    }

    /// Connector width and color back to the defaults, keeping its end point.
    pub(crate) fn restore_connector_style(&mut self, id: NodeId) -> Result<(), MenuError> {
        let width = self.settings(id)?.connector.width;
        let color = self.theme(id)?.connector;
        let connector = &mut self.nodes[id].visuals.connector;
        connector.width = width;
        connector.color = color;
        Ok(())
    }
}

fn snap_zero(value: f64) -> f64 {
    if value.abs() < f64::EPSILON { 0.0 } else { value }
}
