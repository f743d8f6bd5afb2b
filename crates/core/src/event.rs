use serde::{Deserialize, Serialize};

/// Delivery channels, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    InApp,
    Push,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::InApp => write!(f, "in_app"),
            Channel::Push => write!(f, "push"),
            Channel::Sms => write!(f, "sms"),
        }
    }
}

/// Which channels a recipient is eligible for on one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSet {
    pub in_app: bool,
    pub push: bool,
    pub sms: bool,
}

impl ChannelSet {
    pub fn contains(&self, channel: Channel) -> bool {
        match channel {
            Channel::InApp => self.in_app,
            Channel::Push => self.push,
            Channel::Sms => self.sms,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.in_app && !self.push && !self.sms
    }
}

/// The kind of activity change driving a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CourseUpdated,
    QuizCreated,
    AssignmentCreated,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::CourseUpdated => write!(f, "course_updated"),
            EventKind::QuizCreated => write!(f, "quiz_created"),
            EventKind::AssignmentCreated => write!(f, "assignment_created"),
        }
    }
}

/// Per-event-type gating of the paid channels.
///
/// The source system gates push/SMS on active access for some activity
/// types but not others. That inconsistency is kept as explicit
/// configuration instead of being unified one way or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPolicy {
    pub requires_access_for_push: bool,
    pub requires_access_for_sms: bool,
}

impl EventKind {
    /// Default policy matching the source system's per-type behavior:
    /// quiz creation requires active access for push/SMS, course updates
    /// and assignment creation notify regardless.
    pub fn default_policy(self) -> EventPolicy {
        match self {
            EventKind::QuizCreated => EventPolicy {
                requires_access_for_push: true,
                requires_access_for_sms: true,
            },
            EventKind::CourseUpdated | EventKind::AssignmentCreated => EventPolicy {
                requires_access_for_push: false,
                requires_access_for_sms: false,
            },
        }
    }
}
