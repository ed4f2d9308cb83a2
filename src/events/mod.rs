use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::authz::{Action, AuthzMode, Resource, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent<T> {
    pub id: Uuid,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub payload: T,
}

impl<T> DomainEvent<T> {
    pub fn new(name: impl Into<String>, actor_id: Option<Uuid>, payload: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            occurred_at: Utc::now(),
            actor_id,
            payload,
        }
    }
}

pub type EventBus = broadcast::Sender<Value>;

pub fn init_event_bus() -> (EventBus, broadcast::Receiver<Value>) {
    broadcast::channel(1024)
}

/// Outcome of one enforced authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub resource: Resource,
    pub action: Action,
    /// What the policy said.
    pub allowed: bool,
    pub mode: AuthzMode,
    /// Whether the request was let through after applying the mode.
    pub permitted: bool,
}

impl AccessDecision {
    pub fn event_name(&self) -> &'static str {
        match (self.allowed, self.permitted) {
            (true, _) => "access.allowed",
            (false, true) => "access.denied_advisory",
            (false, false) => "access.denied",
        }
    }
}

/// Publishes a decision to the bus. Sending never blocks; with no
/// subscribers the event is dropped.
pub fn publish_decision(event_bus: &EventBus, actor_id: Option<Uuid>, decision: AccessDecision) {
    let event = DomainEvent::new(decision.event_name(), actor_id, decision);
    match serde_json::to_value(&event) {
        Ok(value) => {
            if event_bus.send(value).is_err() {
                tracing::trace!(event = %event.name, "no audit subscribers");
            }
        }
        Err(err) => tracing::error!(%err, "failed to serialize access decision"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(allowed: bool, permitted: bool) -> AccessDecision {
        AccessDecision {
            role: Some(Role::Employee),
            resource: Resource::Salaries,
            action: Action::Read,
            allowed,
            mode: AuthzMode::Advisory,
            permitted,
        }
    }

    #[test]
    fn event_names_reflect_outcome() {
        assert_eq!(decision(true, true).event_name(), "access.allowed");
        assert_eq!(decision(false, true).event_name(), "access.denied_advisory");
        assert_eq!(decision(false, false).event_name(), "access.denied");
    }

    #[tokio::test]
    async fn published_decision_reaches_subscriber() {
        let (bus, mut rx) = init_event_bus();
        let actor = Uuid::new_v4();
        publish_decision(&bus, Some(actor), decision(false, false));

        let value = rx.recv().await.unwrap();
        assert_eq!(value["name"], "access.denied");
        assert_eq!(value["actor_id"], actor.to_string());
        assert_eq!(value["payload"]["resource"], "salaries");
        assert_eq!(value["payload"]["mode"], "advisory");
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let (bus, rx) = init_event_bus();
        drop(rx);
        publish_decision(&bus, None, decision(true, true));
    }
}
