use crossbeam_channel::{Receiver, Sender, unbounded};
use loam_world::ChunkPosition;

/// Completion notifications of streaming runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    /// The first run finished; the area around the observer is presentable.
    WorldReady,
    /// A later run finished; `created` lists newly presented chunks,
    /// nearest first.
    ChunksAppended { created: Vec<ChunkPosition> },
}

#[derive(Default)]
pub(crate) struct EventBus {
    subscribers: Vec<Sender<WorldEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Receiver<WorldEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers to every live subscriber; dropped receivers are forgotten.
    pub(crate) fn publish(&mut self, event: WorldEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
