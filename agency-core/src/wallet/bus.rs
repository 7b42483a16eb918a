use tokio::sync::broadcast;
use tracing::{debug, warn};

const BUS_CAPACITY: usize = 16;

/// A wallet account became available to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub address: String,
}

/// Application-wide "wallet connected" notification.
#[derive(Debug, Clone)]
pub struct AuthBus {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthBus {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: AuthEvent) -> usize {
        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                debug!("Auth event published with no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event if one is queued. Never blocks.
    pub fn try_next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = AuthBus::new();
        assert_eq!(
            bus.publish(AuthEvent {
                address: "0xabc".to_string()
            }),
            0
        );
    }

    #[test]
    fn test_every_subscriber_sees_event() {
        let bus = AuthBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus.publish(AuthEvent {
            address: "0xabc".to_string(),
        });
        assert_eq!(delivered, 2);

        assert_eq!(first.try_next().map(|e| e.address), Some("0xabc".to_string()));
        assert_eq!(second.try_next().map(|e| e.address), Some("0xabc".to_string()));
        assert!(first.try_next().is_none());
    }

    #[tokio::test]
    async fn test_recv_waits_for_event() {
        let bus = AuthBus::new();
        let mut subscription = bus.subscribe();

        let publisher = bus.clone();
        tokio::spawn(async move {
            publisher.publish(AuthEvent {
                address: "0xdef".to_string(),
            });
        });

        let event = subscription.recv().await;
        assert_eq!(event.map(|e| e.address), Some("0xdef".to_string()));
    }
}
