use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the underlying stream decoder.
///
/// The adapter only observes these states; every transition is owned by the
/// decoder itself. States outside [`DecoderState::is_startable`] degrade to
/// "wait for initialization to complete".
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecoderState {
    /// No decoder setup has been requested yet.
    NotInitialized,
    /// Setup is in flight; playback requests must wait for init-complete.
    Initializing,
    /// Setup finished, no playback requested yet.
    Initialized,
    /// Actively producing frames.
    Playing,
    /// Stalled waiting for stream data.
    Buffering,
    /// Playback suspended.
    Paused,
    /// Playback stopped by request.
    Stopped,
    /// Natural end of stream.
    Eof,
}

impl DecoderState {
    /// Whether a decode start request is accepted immediately in this state.
    pub fn is_startable(self) -> bool {
        matches!(
            self,
            DecoderState::Initialized
                | DecoderState::Paused
                | DecoderState::Stopped
                | DecoderState::Eof
        )
    }
}

/// Notification payload published when a stream's aspect ratio becomes known.
///
/// `aspect_ratio` is `width / height` when the decoder reports both dimensions
/// strictly positive, and exactly `1.0` while no valid resolution is available.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AspectRatioChange {
    pub aspect_ratio: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startable_states_match_decode_start_contract() {
        assert!(DecoderState::Initialized.is_startable());
        assert!(DecoderState::Paused.is_startable());
        assert!(DecoderState::Stopped.is_startable());
        assert!(DecoderState::Eof.is_startable());
    }

    #[test]
    fn pending_states_are_not_startable() {
        assert!(!DecoderState::NotInitialized.is_startable());
        assert!(!DecoderState::Initializing.is_startable());
        assert!(!DecoderState::Playing.is_startable());
        assert!(!DecoderState::Buffering.is_startable());
    }

    #[test]
    fn decoder_state_serializes_snake_case() {
        let json = serde_json::to_string(&DecoderState::NotInitialized).expect("serialize");
        assert_eq!(json, "\"not_initialized\"");
        let back: DecoderState = serde_json::from_str("\"eof\"").expect("deserialize");
        assert_eq!(back, DecoderState::Eof);
    }

    #[test]
    fn aspect_ratio_change_round_trips() {
        let change = AspectRatioChange { aspect_ratio: 1.5 };
        let json = serde_json::to_string(&change).expect("serialize");
        let back: AspectRatioChange = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, change);
    }
}
