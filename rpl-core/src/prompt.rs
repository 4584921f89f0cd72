use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::*;

#[derive(Debug, Default)]
struct Shared {
    active: Mutex<bool>,
    message: Mutex<Option<String>>,
}

/// Evaluator side of the prompt rendezvous. `prompt` publishes its
/// message, then blocks here until the front end answers.
#[derive(Debug)]
pub struct PromptPort {
    shared: Arc<Shared>,
    replies: Receiver<String>,
}

/// Front-end side of the prompt rendezvous. Cloneable and Send; the UI
/// thread checks `is_active` on Enter and routes the typed line through
/// `respond` instead of the command channel.
#[derive(Clone, Debug)]
pub struct PromptHandle {
    shared: Arc<Shared>,
    reply_tx: SyncSender<String>,
}

pub fn prompt_channel() -> (PromptPort, PromptHandle) {
    let shared = Arc::new(Shared::default());
    let (reply_tx, replies) = sync_channel(1);
    (
        PromptPort {
            shared: shared.clone(),
            replies,
        },
        PromptHandle { shared, reply_tx },
    )
}

impl PromptPort {
    /// Publish `message` and block until a line arrives. A disconnected
    /// front end reads as an interruption of the command.
    pub fn request(&self, message: String) -> Result<String> {
        *self.shared.active.lock() = true;
        *self.shared.message.lock() = Some(message);
        let line = self.replies.recv();
        *self.shared.active.lock() = false;
        line.map_err(|_| ErrorKind::Interrupted.into())
    }
}

impl PromptHandle {
    pub fn is_active(&self) -> bool {
        *self.shared.active.lock()
    }

    pub fn take_message(&self) -> Option<String> {
        self.shared.message.lock().take()
    }

    /// Deliver the typed line to the blocked evaluator.
    pub fn respond(&self, line: String) -> bool {
        self.reply_tx.send(line).is_ok()
    }
}
