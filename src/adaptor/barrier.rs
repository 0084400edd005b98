use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BarrierError {
    #[error("initialization barrier already signaled")]
    AlreadySignaled,
}

/// One-shot "page is initialized" signal.
///
/// Set exactly once after session and role resolution; any number of reads
/// may wait on it.
#[derive(Debug)]
pub struct InitBarrier {
    tx: watch::Sender<bool>,
}

impl Default for InitBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl InitBarrier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> Result<(), BarrierError> {
        let mut first = false;
        self.tx.send_modify(|signaled| {
            if !*signaled {
                *signaled = true;
                first = true;
            }
        });

        if first {
            tracing::debug!("init barrier signaled");
            Ok(())
        } else {
            Err(BarrierError::AlreadySignaled)
        }
    }

    pub fn is_signaled(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|signaled| *signaled).await;
    }
}
