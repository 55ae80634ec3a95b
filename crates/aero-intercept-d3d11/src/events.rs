//! Connection between a proxy and the event registry.

use std::sync::Arc;

use aero_intercept_api::{Event, EventKind, EventRegistry, EventSource};

use crate::config::InterceptConfig;

/// The registry a proxy publishes to, or nothing when event dispatch is disabled.
#[derive(Clone, Debug, Default)]
pub struct EventSink {
    registry: Option<Arc<EventRegistry>>,
}

impl EventSink {
    pub fn new(registry: Option<Arc<EventRegistry>>, config: &InterceptConfig) -> Self {
        Self {
            registry: registry.filter(|_| config.dispatch_events),
        }
    }

    /// Whether anyone observes `kind`. Translation work for an event is skipped when this is
    /// false.
    #[inline]
    pub fn wants(&self, kind: EventKind) -> bool {
        self.registry
            .as_deref()
            .is_some_and(|registry| registry.is_registered(kind))
    }

    /// Publishes `event`. Returns `true` if the native call must be skipped.
    pub fn publish(&self, source: EventSource, event: &Event<'_>) -> bool {
        match &self.registry {
            Some(registry) => registry.publish(source, event),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_intercept_api::{ContextHandle, Verdict};

    #[test]
    fn disabled_config_drops_the_registry() {
        let registry = Arc::new(EventRegistry::new());
        registry.register(EventKind::Draw, |_: EventSource, _: &Event<'_>| Verdict::Suppress);

        let config = InterceptConfig {
            dispatch_events: false,
            ..Default::default()
        };
        let sink = EventSink::new(Some(Arc::clone(&registry)), &config);
        assert!(!sink.wants(EventKind::Draw));

        let sink = EventSink::new(Some(registry), &InterceptConfig::default());
        assert!(sink.wants(EventKind::Draw));
        let suppressed = sink.publish(
            EventSource::Context(ContextHandle(1)),
            &Event::Draw {
                vertex_count: 3,
                instance_count: 1,
                first_vertex: 0,
                first_instance: 0,
            },
        );
        assert!(suppressed);
    }
}
