use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::{AppError, Result};
use crate::observer::{CallSite, FeedObserver};

/// Isolates external calls so no failure, panics included, escapes the layer.
#[derive(Clone)]
pub struct ErrorShield {
    observer: Arc<dyn FeedObserver>,
}

impl ErrorShield {
    pub fn new(observer: Arc<dyn FeedObserver>) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &Arc<dyn FeedObserver> {
        &self.observer
    }

    /// Run a call, turning a panic into `AppError::Panicked`. The error stays typed.
    pub async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(AppError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Run a call and report any failure to the observer, returning `None` in its place.
    pub async fn absorb<T, F>(&self, site: CallSite, call: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.run(call).await {
            Ok(value) => Some(value),
            Err(e) => {
                self.observer.call_failed(&site, &e);
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
