//! Decoder capability boundary.
//!
//! Everything behind this trait is owned by the embedding host: fetching,
//! demuxing, decoding, and frame upload. The adapter only issues control
//! requests and reads back state and resolution.

use video_stream_types::DecoderState;

/// Listener fired at most once when decoder setup completes.
pub type InitCompleteListener = Box<dyn FnOnce() + Send>;

/// Control surface the adapter needs from the underlying stream decoder.
///
/// Implementations fire registered init-complete listeners in registration
/// order, once, after asynchronous setup started by [`StreamDecoder::init`]
/// finishes. Listeners registered after that point wait for the next setup.
pub trait StreamDecoder: Send + Sync {
    /// Begin asynchronous decoder setup for `url`.
    fn init(&self, url: &str);

    /// Request that the decoder start producing frames.
    fn start_decoding(&self);

    /// Request that the decoder stop producing frames.
    ///
    /// A no-op at the decoder's discretion when nothing is running.
    fn stop_decoding(&self);

    /// Synchronous snapshot of the decoder lifecycle state.
    fn state(&self) -> DecoderState;

    /// Last reported video dimensions.
    ///
    /// Non-positive values mean the stream has not produced a valid frame yet.
    fn video_resolution(&self) -> (i32, i32);

    /// Register a one-shot listener for the init-complete signal.
    fn on_init_complete(&self, listener: InitCompleteListener);

    /// Drop every registered init-complete listener without firing it.
    fn clear_init_complete_listeners(&self);
}
