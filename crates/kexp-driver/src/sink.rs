//! Where a build sends its status lines and pane contents.

use kexp_core::Pane;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Status text emitted once every stage succeeded.
pub const READY: &str = "Ready";

/// One message from a running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// Short phase name ("Compiling Kotlin…", ..., "Ready")
    Status(String),
    /// Filtered `dexdump` listing, or the raw output of a failed bytecode stage
    Bytecode(String),
    /// Filtered `oatdump` listing, or the raw output of a failed device stage
    NativeCode(String),
}

/// Receiver side of a build.
///
/// Implementations must not block: they are called from the pipeline task
/// between stages.
pub trait BuildSink: Send + Sync {
    fn status(&self, status: &str);
    fn bytecode(&self, text: String);
    fn native_code(&self, text: String);

    /// Route `text` to the sink method for `pane`.
    fn pane(&self, pane: Pane, text: String) {
        match pane {
            Pane::Bytecode => self.bytecode(text),
            Pane::NativeCode => self.native_code(text),
        }
    }
}

/// [`BuildSink`] that forwards [`BuildEvent`]s over an unbounded channel,
/// so the consumer handles them on its own task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<BuildEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<BuildEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: BuildEvent) {
        // A dropped receiver means nobody is watching anymore; the build
        // still runs to completion.
        let _ = self.tx.send(event);
    }
}

impl BuildSink for ChannelSink {
    fn status(&self, status: &str) {
        self.send(BuildEvent::Status(status.to_string()));
    }

    fn bytecode(&self, text: String) {
        self.send(BuildEvent::Bytecode(text));
    }

    fn native_code(&self, text: String) {
        self.send(BuildEvent::NativeCode(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.status("Compiling Kotlin…");
        sink.pane(Pane::Bytecode, "error: x".into());
        sink.pane(Pane::NativeCode, "class Foo".into());
        drop(sink);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                BuildEvent::Status("Compiling Kotlin…".into()),
                BuildEvent::Bytecode("error: x".into()),
                BuildEvent::NativeCode("class Foo".into()),
            ]
        );
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.status(READY);
    }
}
