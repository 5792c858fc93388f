use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace};

use super::Session;
use crate::backend::ModelBackend;
use crate::document::{Action, Effect};

/// Runs backend effects on a tokio runtime and reports each completion as an
/// [`Action`] on the sheet's channel.
pub struct Dispatcher<B> {
    session: Session<B>,
    handle: Handle,
    tx: UnboundedSender<Action>,
}

impl<B: ModelBackend> Dispatcher<B> {
    pub fn new(session: Session<B>, handle: Handle, tx: UnboundedSender<Action>) -> Self {
        Self {
            session,
            handle,
            tx,
        }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Start `effect` in the background. Requests are independent; there is
    /// no cancellation and completions arrive in whatever order they finish.
    pub fn spawn(&self, effect: Effect) {
        trace!(?effect, "dispatching effect");
        let session = self.session.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let Some(action) = session.run(effect).await else {
                return;
            };
            if tx.send(action).is_err() {
                debug!("sheet closed, dropping completion");
            }
        });
    }
}
