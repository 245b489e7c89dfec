//! Fan-out of pointer input to the nodes currently listening.
//!
//! A node subscribes to every [`Channel`] when it becomes active and drops
//! all of them when it leaves that state. Dispatch works on a snapshot so a
//! handler may subscribe or unsubscribe nodes; a subscription dropped during
//! dispatch is skipped, one added during dispatch waits for the next input.

use super::item::NodeId;
use radian::angle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Pointer direction, relative to the subscriber.
    Angle,
    Click,
    /// Gesture decision points.
    Trace,
    Drag,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Angle, Channel::Click, Channel::Trace, Channel::Drag];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Subscription {
    id: SubscriptionId,
    node: NodeId,
    channel: Channel,
    /// Last rounded angle in degrees delivered on [`Channel::Angle`].
    last_angle: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    next: u64,
    subscriptions: Vec<Subscription>,
}

impl Dispatcher {
    /// Subscribes `node` to all channels. Existing subscriptions of the node
    /// are replaced, so the angle filter starts over.
    pub fn subscribe(&mut self, node: NodeId) {
        self.unsubscribe(node);
        for channel in Channel::ALL {
            self.next += 1;
            self.subscriptions.push(Subscription {
                id: SubscriptionId(self.next),
                node,
                channel,
                last_angle: None,
            });
        }
        log::trace!("{node} subscribed");
    }

    pub fn unsubscribe(&mut self, node: NodeId) {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.node != node);
        if self.subscriptions.len() != before {
            log::trace!("{node} unsubscribed");
        }
    }

    pub fn is_subscribed(&self, node: NodeId) -> bool {
        self.subscriptions.iter().any(|s| s.node == node)
    }

    /// Subscribers of `channel` in subscription order.
    pub fn subscribers(&self, channel: Channel) -> Vec<(SubscriptionId, NodeId)> {
        self.subscriptions
            .iter()
            .filter(|s| s.channel == channel)
            .map(|s| (s.id, s.node))
            .collect()
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|s| s.id == id)
    }

    /// Records `angle` (radians) for an angle subscription. Returns false when
    /// the rounded degree did not change since the last delivery.
    pub fn angle_changed(&mut self, id: SubscriptionId, angle: f64) -> bool {
        let rounded = angle::to_deg(angle).round() as i64;
        match self.subscriptions.iter_mut().find(|s| s.id == id) {
            Some(subscription) if subscription.last_angle != Some(rounded) => {
                subscription.last_angle = Some(rounded);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}
