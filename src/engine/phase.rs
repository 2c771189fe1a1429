//! Prefill/extend phase tracking for the stateful strategy.
//!
//! `DecodeState` owns the engine cache handle of one session. The handle is
//! never handed out beyond the duration of a single engine call.

use std::fmt;

use super::backend::CacheHandle;
use super::error::DecodeError;

/// Decode phase of a stateful session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePhase {
    /// Next call submits the whole prompt to seed the cache.
    Prefilling,
    /// Next call submits only the newest token.
    Extending,
}

impl DecodePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefilling => "prefill",
            Self::Extending => "extend",
        }
    }
}

impl fmt::Display for DecodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase and cache handle of one stateful session.
#[derive(Debug)]
pub struct DecodeState {
    phase: DecodePhase,
    cache: Option<CacheHandle>,
    in_flight: bool,
}

impl Default for DecodeState {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeState {
    /// A state with no cache; `reset` must run before the first prediction.
    pub fn new() -> Self {
        Self {
            phase: DecodePhase::Prefilling,
            cache: None,
            in_flight: false,
        }
    }

    pub fn phase(&self) -> DecodePhase {
        self.phase
    }

    /// Id of the current cache handle, if one is installed.
    pub fn cache_id(&self) -> Option<u64> {
        self.cache.as_ref().map(CacheHandle::id)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Install a fresh handle and return to `Prefilling`. The previous handle
    /// is dropped.
    pub fn reset(&mut self, handle: CacheHandle) {
        self.cache = Some(handle);
        self.phase = DecodePhase::Prefilling;
        self.in_flight = false;
    }

    /// Start a prediction: returns the phase that selects the input and
    /// moves to `Extending`.
    pub fn begin(&mut self) -> Result<DecodePhase, DecodeError> {
        if self.in_flight {
            return Err(DecodeError::precondition(
                "previous prediction did not complete; reset required",
            ));
        }
        if self.cache.is_none() {
            return Err(DecodeError::precondition(
                "no cache handle; reset required before predicting",
            ));
        }
        let phase = self.phase;
        self.phase = DecodePhase::Extending;
        self.in_flight = true;
        Ok(phase)
    }

    /// Handle for the engine call between `begin` and `finish`.
    pub(crate) fn cache_mut(&mut self) -> Result<&mut CacheHandle, DecodeError> {
        self.cache
            .as_mut()
            .ok_or_else(|| DecodeError::precondition("no cache handle"))
    }

    /// End a prediction. A failed call leaves the cache in an unknown state,
    /// so the handle is dropped and a reset becomes mandatory.
    pub fn finish(&mut self, succeeded: bool) {
        self.in_flight = false;
        if !succeeded {
            self.cache = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_before_reset_is_rejected() {
        let mut state = DecodeState::new();
        let err = state.begin().unwrap_err();
        assert!(err.is_caller_bug());
        assert_eq!(state.phase(), DecodePhase::Prefilling);
    }

    #[test]
    fn first_begin_prefills_then_extends() {
        let mut state = DecodeState::new();
        state.reset(CacheHandle::new(()));
        assert_eq!(state.begin().unwrap(), DecodePhase::Prefilling);
        state.finish(true);
        assert_eq!(state.phase(), DecodePhase::Extending);
        assert_eq!(state.begin().unwrap(), DecodePhase::Extending);
        state.finish(true);
        assert_eq!(state.begin().unwrap(), DecodePhase::Extending);
    }

    #[test]
    fn reset_restores_prefill_with_new_handle() {
        let mut state = DecodeState::new();
        state.reset(CacheHandle::new(()));
        let first = state.cache_id().unwrap();
        state.begin().unwrap();
        state.finish(true);
        state.reset(CacheHandle::new(()));
        assert_eq!(state.phase(), DecodePhase::Prefilling);
        assert_ne!(state.cache_id().unwrap(), first);
    }

    #[test]
    fn unfinished_prediction_blocks_next_begin() {
        let mut state = DecodeState::new();
        state.reset(CacheHandle::new(()));
        state.begin().unwrap();
        assert!(state.is_in_flight());
        assert!(state.begin().unwrap_err().is_caller_bug());
        state.reset(CacheHandle::new(()));
        assert!(state.begin().is_ok());
    }

    #[test]
    fn failed_prediction_drops_cache() {
        let mut state = DecodeState::new();
        state.reset(CacheHandle::new(()));
        state.begin().unwrap();
        state.finish(false);
        assert!(state.cache_id().is_none());
        assert!(state.begin().is_err());
    }
}
