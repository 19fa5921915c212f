use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

/// Change notification fanned out to stats subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEvent {
    Created(Uuid),
    Updated(Uuid),
}

impl ReportEvent {
    pub fn report_id(&self) -> Uuid {
        match self {
            ReportEvent::Created(id) | ReportEvent::Updated(id) => *id,
        }
    }
}

/// In-process channels for report lifecycle events.
///
/// Created reports are queued for dispatch on an unbounded channel with a
/// single consumer. Every change is also broadcast to any number of
/// subscribers; slow subscribers lag and skip events.
pub struct ReportEventBus {
    dispatch_tx: mpsc::UnboundedSender<Uuid>,
    changes_tx: broadcast::Sender<ReportEvent>,
}

impl ReportEventBus {
    /// Returns the bus and the receiving end of the dispatch queue
    pub fn new(change_capacity: usize) -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let (changes_tx, _) = broadcast::channel(change_capacity.max(1));

        (
            Self {
                dispatch_tx,
                changes_tx,
            },
            dispatch_rx,
        )
    }

    pub fn publish_created(&self, report_id: Uuid) {
        if self.dispatch_tx.send(report_id).is_err() {
            tracing::debug!("Dispatch queue closed; report {} not queued", report_id);
        }
        self.publish(ReportEvent::Created(report_id));
    }

    pub fn publish_updated(&self, report_id: Uuid) {
        self.publish(ReportEvent::Updated(report_id));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.changes_tx.subscribe()
    }

    fn publish(&self, event: ReportEvent) {
        // Err only means nobody is listening
        let _ = self.changes_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_event_reaches_dispatch_and_subscribers() {
        let (bus, mut dispatch_rx) = ReportEventBus::new(8);
        let mut changes = bus.subscribe();
        let id = Uuid::new_v4();

        bus.publish_created(id);

        assert_eq!(dispatch_rx.recv().await, Some(id));
        assert_eq!(changes.recv().await.unwrap(), ReportEvent::Created(id));
    }

    #[tokio::test]
    async fn test_updated_event_is_not_queued_for_dispatch() {
        let (bus, mut dispatch_rx) = ReportEventBus::new(8);
        let mut changes = bus.subscribe();
        let id = Uuid::new_v4();

        bus.publish_updated(id);

        assert_eq!(changes.recv().await.unwrap().report_id(), id);
        assert!(dispatch_rx.try_recv().is_err());
    }

    #[test]
    fn test_subscriber_waits_until_an_event_arrives() {
        let (bus, _dispatch_rx) = ReportEventBus::new(8);
        let mut changes = bus.subscribe();
        let mut next = tokio_test::task::spawn(changes.recv());

        tokio_test::assert_pending!(next.poll());

        let id = Uuid::new_v4();
        bus.publish_updated(id);

        assert!(next.is_woken());
        let event = tokio_test::assert_ready_ok!(next.poll());
        assert_eq!(event, ReportEvent::Updated(id));
    }

    #[test]
    fn test_publish_without_listeners_is_harmless() {
        let (bus, dispatch_rx) = ReportEventBus::new(1);
        drop(dispatch_rx);

        let mut changes = bus.subscribe();
        let id = Uuid::new_v4();
        bus.publish_created(id);
        assert_eq!(changes.try_recv().unwrap(), ReportEvent::Created(id));
    }
}
