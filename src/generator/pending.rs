use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::kss::{KssError, Styleguide, Traversal, TraverseOptions};

use super::GeneratorError;

/// A style guide still being parsed on a background thread.
///
/// Consuming the handle with [`wait`](Self::wait) or [`then`](Self::then)
/// yields the traversal's single result.
#[derive(Debug)]
pub struct PendingStyleguide {
    rx: mpsc::Receiver<Result<Styleguide, KssError>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PendingStyleguide {
    pub fn spawn(
        traversal: Arc<dyn Traversal>,
        sources: Vec<PathBuf>,
        options: TraverseOptions,
    ) -> Result<Self, GeneratorError> {
        let (tx, rx) = mpsc::sync_channel(1);

        let worker = thread::Builder::new()
            .name("kss-traverse".into())
            .spawn(move || {
                let result = traversal.traverse(&sources, &options);
                if let Err(err) = &result {
                    tracing::error!("style guide traversal failed: {err}");
                }
                // Receiver gone means the caller dropped the handle.
                let _ = tx.send(result);
            })
            .map_err(GeneratorError::Spawn)?;

        Ok(Self {
            rx,
            worker: Some(worker),
        })
    }

    /// Already-finished parse, for generators that load sources themselves.
    pub fn ready(result: Result<Styleguide, KssError>) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let _ = tx.send(result);
        Self { rx, worker: None }
    }

    /// Block until the traversal reports.
    pub fn wait(mut self) -> Result<Styleguide, GeneratorError> {
        let received = self.rx.recv();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        match received {
            Ok(result) => Ok(result?),
            Err(_) => Err(GeneratorError::TraversalPanicked),
        }
    }

    /// Hand the style guide to `callback` once parsing succeeds. On failure
    /// the error is returned and `callback` is never called.
    pub fn then<F, R>(self, callback: F) -> Result<R, GeneratorError>
    where
        F: FnOnce(Styleguide) -> R,
    {
        let styleguide = self.wait()?;
        Ok(callback(styleguide))
    }
}
