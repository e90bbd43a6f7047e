use shuttersync_api::Characteristic;
use tokio::sync::broadcast;

/// Write side of the host framework's characteristic store.
///
/// Updates are fire and forget, a sink must never block or fail the caller.
pub trait CharacteristicSink: Send + Sync {
    fn update(&self, characteristic: Characteristic);
}

/// Broadcasts characteristic updates to every subscriber, e.g. the SSE stream.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Characteristic>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Characteristic> {
        self.sender.subscribe()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CharacteristicSink for EventBus {
    fn update(&self, characteristic: Characteristic) {
        // No subscribers is not an error
        let _ = self.sender.send(characteristic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let event_bus = EventBus::default();

        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.update(Characteristic::CurrentPosition(30));

        assert_eq!(
            receiver1.recv().await.unwrap(),
            Characteristic::CurrentPosition(30)
        );
        assert_eq!(
            receiver2.recv().await.unwrap(),
            Characteristic::CurrentPosition(30)
        );
    }

    #[tokio::test]
    async fn test_update_without_subscribers() {
        let event_bus = EventBus::default();

        assert!(!event_bus.has_subscribers());
        event_bus.update(Characteristic::On(true));

        let _receiver = event_bus.subscribe();
        assert!(event_bus.has_subscribers());
    }
}
