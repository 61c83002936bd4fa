//! Aspect ratio change notifications.

use video_stream_types::AspectRatioChange;

/// Callback invoked with each published aspect ratio change.
pub type AspectRatioHandler = Box<dyn FnMut(AspectRatioChange) + Send>;

/// Subscriber list fired synchronously in registration order.
#[derive(Default)]
pub(crate) struct AspectRatioSubscribers {
    handlers: Vec<AspectRatioHandler>,
}

impl AspectRatioSubscribers {
    pub(crate) fn add(&mut self, handler: AspectRatioHandler) {
        self.handlers.push(handler);
    }

    /// Invoke every subscriber with `change`. Zero subscribers is fine.
    pub(crate) fn emit(&mut self, change: AspectRatioChange) {
        for handler in &mut self.handlers {
            handler(change);
        }
    }
}
