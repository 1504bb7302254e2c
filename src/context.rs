//! Request context: cancellation and deadlines
//!
//! A [`Context`] is handed to every page fetch unchanged. It lets the caller
//! abort an in-flight listing, either explicitly through a [`CancelHandle`] or
//! by attaching a deadline.
//!
//! ```rust,ignore
//! let (ctx, cancel) = Context::with_cancel();
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     cancel.cancel();
//! });
//! pager.each_page(&ctx, |page| Ok(true)).await?;
//! ```

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation and deadline carrier for page fetches
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<(Instant, Duration)>,
}

/// Handle used to cancel every [`Context`] derived from it
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated contexts
    pub fn cancel(&self) {
        // send_replace never fails, even with no live receivers
        self.tx.send_replace(true);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Create a cancellable context
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancel: Some(rx),
            deadline: None,
        };
        (ctx, CancelHandle { tx })
    }

    /// Create a context that expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// Attach a deadline to this context, keeping any cancellation signal
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        // An earlier deadline always wins
        match self.deadline {
            Some((existing, _)) if existing <= deadline => {}
            _ => self.deadline = Some((deadline, timeout)),
        }
        self
    }

    /// Check if the context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Remaining time before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|(deadline, _)| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fail fast if the context is already cancelled or expired
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some((deadline, timeout)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(deadline_error(timeout));
            }
        }
        Ok(())
    }

    /// Run a future to completion unless the context is cancelled or expires first
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Sender dropped; nothing can cancel us anymore
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some((deadline, _)) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = fut => result,
            () = cancelled => Err(Error::Cancelled),
            () = expired => {
                let timeout = self.deadline.map(|(_, t)| t).unwrap_or_default();
                Err(deadline_error(timeout))
            }
        }
    }
}

fn deadline_error(timeout: Duration) -> Error {
    Error::DeadlineExceeded {
        timeout_ms: timeout.as_millis() as u64,
    }
}
