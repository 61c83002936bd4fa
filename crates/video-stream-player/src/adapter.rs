//! Stream player adapter.
//!
//! Bridges an externally supplied stream decoder to play/stop controls and
//! aspect ratio notifications. A start request either goes straight to the
//! decoder or waits for its init-complete signal; once issued, a polling
//! session keeps re-requesting playback until the stream reports a valid
//! resolution.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use video_stream_types::AspectRatioChange;

use crate::config::AdapterConfig;
use crate::decoder::StreamDecoder;
use crate::events::AspectRatioSubscribers;
use crate::poll::{self, PollSession};

/// Exposes a stream decoder through play/stop controls and aspect ratio
/// notifications. All state transitions are owned by the decoder; the adapter
/// is purely reactive.
pub struct StreamPlayerAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    decoder: Arc<dyn StreamDecoder>,
    config: AdapterConfig,
    subscribers: Mutex<AspectRatioSubscribers>,
    /// Bumped by every `set_stream_url`; an init-complete listener armed for an
    /// older URL compares against it and drops out instead of notifying.
    url_generation: AtomicU64,
    /// Whether a deferred decode start is waiting on init-complete.
    start_armed: AtomicBool,
    poll: Mutex<Option<PollSession>>,
}

impl StreamPlayerAdapter {
    /// Bind the adapter to its decoder.
    ///
    /// Configuration problems surface here rather than at first use.
    pub fn bind(decoder: Arc<dyn StreamDecoder>, config: AdapterConfig) -> Result<Self> {
        config.validate().context("stream player adapter config")?;
        Ok(Self {
            inner: Arc::new(AdapterInner {
                decoder,
                config,
                subscribers: Mutex::new(AspectRatioSubscribers::default()),
                url_generation: AtomicU64::new(0),
                start_armed: AtomicBool::new(false),
                poll: Mutex::new(None),
            }),
        })
    }

    /// Forward `url` to the decoder and arm a one-shot aspect ratio
    /// notification for when its setup completes.
    ///
    /// Known limitation carried from the notification contract: the aspect
    /// ratio is computed once, at init-complete time. If no valid resolution
    /// is available yet the `1.0` fallback is published and never revised,
    /// even once the stream activates. Calling this again before setup
    /// completes supersedes the earlier notification.
    pub fn set_stream_url(&self, url: &str) {
        tracing::info!(url = %url, "decoder init requested");
        self.inner.decoder.init(url);

        let generation = self.inner.url_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let weak = Arc::downgrade(&self.inner);
        self.inner.decoder.on_init_complete(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.url_generation.load(Ordering::Relaxed) != generation {
                tracing::debug!("aspect ratio notification superseded by a newer url");
                return;
            }
            emit_aspect_ratio_changed(&inner, aspect_ratio(inner.decoder.as_ref()));
        }));
    }

    /// Start playback now if the decoder accepts it, otherwise defer the start
    /// until the decoder signals init-complete.
    ///
    /// Never fails: an unrecognized decoder state degrades to waiting for
    /// initialization.
    pub fn play(&self) {
        request_playback(&self.inner);
    }

    /// Cancel any in-flight polling session, then forward a stop request to
    /// the decoder.
    ///
    /// Cancelling first keeps a mid-tick playback retry from racing the stop.
    /// A start still deferred on init-complete stays armed; the decoder firing
    /// the signal afterwards begins playback again.
    pub fn stop(&self) {
        tracing::info!("stop requested");
        cancel_polling(&self.inner);
        self.inner.decoder.stop_decoding();
    }

    /// Subscribe to aspect ratio notifications.
    ///
    /// Handlers fire synchronously in registration order.
    pub fn on_aspect_ratio_changed(&self, handler: impl FnMut(AspectRatioChange) + Send + 'static) {
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.add(Box::new(handler));
        }
    }
}

impl Drop for StreamPlayerAdapter {
    fn drop(&mut self) {
        // An abandoned adapter must not leave a thread re-requesting playback.
        cancel_polling(&self.inner);
    }
}

/// Route a playback request based on the observed decoder state.
fn request_playback(inner: &Arc<AdapterInner>) {
    if inner.decoder.state().is_startable() {
        start_decoding(inner);
    } else {
        arm_deferred_start(inner);
    }
}

/// Playback request issued from inside the polling tick. The tick's own
/// session is already running, so a direct start must not touch the session
/// slot.
fn request_playback_from_poll(inner: &Arc<AdapterInner>) {
    if inner.decoder.state().is_startable() {
        issue_decode_start(inner);
    } else {
        arm_deferred_start(inner);
    }
}

/// Single transition point from "start requested" to "polling for frames".
fn start_decoding(inner: &Arc<AdapterInner>) {
    issue_decode_start(inner);
    ensure_polling(inner);
}

/// Clear pending init-complete work, then ask the decoder to start.
fn issue_decode_start(inner: &Arc<AdapterInner>) {
    inner.decoder.clear_init_complete_listeners();
    inner.start_armed.store(false, Ordering::Relaxed);
    inner.decoder.start_decoding();
}

/// Defer a decode start until init-complete. At most one start is armed at a
/// time; firing it starts decoding exactly once.
fn arm_deferred_start(inner: &Arc<AdapterInner>) {
    if inner
        .start_armed
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        // A deferred start is already waiting on init-complete.
        return;
    }
    tracing::debug!("decoder not startable yet; start deferred to init-complete");
    let weak = Arc::downgrade(inner);
    inner.decoder.on_init_complete(Box::new(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        // Only the listener that still owns the armed flag may start.
        if inner.start_armed.swap(false, Ordering::Relaxed) {
            start_decoding(&inner);
        }
    }));
}

/// Keep exactly one polling session alive for the adapter.
fn ensure_polling(inner: &Arc<AdapterInner>) {
    let Ok(mut slot) = inner.poll.lock() else {
        return;
    };
    if slot.as_ref().is_some_and(|session| session.is_active()) {
        return;
    }
    tracing::debug!(
        interval = ?inner.config.polling_interval,
        "polling for an active stream"
    );
    let decoder = inner.decoder.clone();
    let weak = Arc::downgrade(inner);
    *slot = Some(poll::spawn(inner.config.polling_interval, move || {
        let (width, height) = decoder.video_resolution();
        if let Some(inner) = weak.upgrade() {
            request_playback_from_poll(&inner);
        }
        let active = width > 0 && height > 0;
        if active {
            tracing::debug!(width, height, "stream active");
        }
        active
    }));
}

fn cancel_polling(inner: &AdapterInner) {
    let session = match inner.poll.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    if let Some(session) = session {
        session.cancel();
    }
}

/// Aspect ratio from the decoder's current resolution, `1.0` when unknown.
fn aspect_ratio(decoder: &dyn StreamDecoder) -> f32 {
    let (width, height) = decoder.video_resolution();
    if width > 0 && height > 0 {
        width as f32 / height as f32
    } else {
        1.0
    }
}

fn emit_aspect_ratio_changed(inner: &AdapterInner, ratio: f32) {
    tracing::info!(aspect_ratio = ratio, "aspect ratio changed");
    if let Ok(mut subscribers) = inner.subscribers.lock() {
        subscribers.emit(AspectRatioChange {
            aspect_ratio: ratio,
        });
    }
}
