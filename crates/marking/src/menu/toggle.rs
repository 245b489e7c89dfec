use super::theme::ColorRole;
use super::{Menu, MenuError, NodeId, NodeKind};

impl Menu {
    fn set_selected(&mut self, id: NodeId, value: bool) -> Result<(), MenuError> {
        let node = &mut self.nodes[id];
        let NodeKind::Toggle { selected } = &mut node.kind else {
            return Err(MenuError::WrongKind(node.item_id.clone(), "checkbox"));
        };
        *selected = value;

        // colors resolve once settings are attached
        if self.theme(id).is_ok() {
            self.set_color(id, ColorRole::Default)?;
        }
        Ok(())
    }

    pub fn select(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.set_selected(id, true)
    }

    pub fn deselect(&mut self, id: NodeId) -> Result<(), MenuError> {
        self.set_selected(id, false)
    }

    pub fn is_selected(&self, id: NodeId) -> Result<bool, MenuError> {
        let node = &self.nodes[id];
        node.is_selected()
            .ok_or_else(|| MenuError::WrongKind(node.item_id.clone(), "checkbox"))
    }

    pub(crate) fn deselect_children(&mut self, id: NodeId) -> Result<(), MenuError> {
        for child in self.nodes[id].children.clone() {
            if self.nodes[child].kind.is_toggle() {
                self.deselect(child)?;
            }
        }
        Ok(())
    }

    /// Selects the child `item_id` of a radio group and deselects the rest.
    pub fn select_in_group(&mut self, group: NodeId, item_id: &str) -> Result<(), MenuError> {
        let node = &self.nodes[group];
        if !matches!(node.kind, NodeKind::RadioGroup) {
            return Err(MenuError::WrongKind(node.item_id.clone(), "radio group"));
        }
        let child = node
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].item_id.as_str() == item_id)
            .ok_or_else(|| MenuError::UnknownItem(item_id.to_string()))?;

        self.deselect_children(group)?;
        self.select(child)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::Harness;
    use super::super::{ItemId, ItemState};
    use super::*;
    use crate::events::{ClickState, MenuEventType};
    use radian::Point;
    use serde_json::json;

    fn options() -> Harness {
        Harness::new(json!({
            "id": "root", "direction": 0,
            "children": [
                {"id": "grid", "text": "Grid", "direction": 90, "type": "checkbox",
                 "data": {"selected": true}},
                {"id": "mode", "direction": 270, "type": "radio-group", "children": [
                    {"id": "fast", "direction": 0},
                    {"id": "slow", "direction": 180},
                ]},
            ]
        }))
    }

    #[test]
    fn checkbox_data_sets_the_initial_flag() {
        let harness = options();
        assert_eq!(harness.menu.is_selected(harness.id("grid")), Ok(true));
        assert_eq!(harness.menu.is_selected(harness.id("fast")), Ok(false));
        assert_eq!(
            harness.menu.is_selected(NodeId::ROOT),
            Err(MenuError::WrongKind(ItemId::new("root"), "checkbox"))
        );
    }

    #[test]
    fn clicking_a_checkbox_flips_it() {
        let mut harness = options();
        harness.show(Point::new(300.0, 300.0));
        harness.move_to(420.0, 300.0);
        harness.drain();
        harness.menu.click(ClickState::Left).unwrap();

        let grid = harness.id("grid");
        assert_eq!(harness.state("grid"), ItemState::Selected);
        assert_eq!(harness.menu.is_selected(grid), Ok(false));

        let events = harness.drain();
        assert_eq!(events[0].kind, MenuEventType::Selection);
        assert_eq!(events[0].data.as_ref().unwrap().selected, Some(false));
    }

    #[test]
    fn radio_group_keeps_one_selected() {
        let mut harness = options();
        let mode = harness.id("mode");
        let (fast, slow) = (harness.id("fast"), harness.id("slow"));

        harness.menu.select_in_group(mode, "fast").unwrap();
        harness.menu.select_in_group(mode, "slow").unwrap();
        assert_eq!(harness.menu.is_selected(fast), Ok(false));
        assert_eq!(harness.menu.is_selected(slow), Ok(true));

        assert_eq!(
            harness.menu.select_in_group(mode, "medium"),
            Err(MenuError::UnknownItem("medium".into()))
        );
        assert!(matches!(
            harness.menu.select_in_group(fast, "slow"),
            Err(MenuError::WrongKind(_, "radio group"))
        ));
    }

    #[test]
    fn radio_children_are_toggles() {
        let harness = options();
        let fast = harness.menu.node(harness.id("fast")).unwrap();
        assert!(fast.kind().is_toggle());
    }
}
