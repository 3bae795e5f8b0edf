// Unified error - some helper methods for future use
#![allow(dead_code)]

//! `EngineError`: the one error type the turn controller and interaction
//! loop surface to their caller (§7). Every kind maps to a terminal outcome
//! for the current interaction; there is no silent mock fallback.

use super::correlation::CorrelationId;
use super::ports::LlmError;
use thiserror::Error;
use wrldbldr_domain::{DomainError, InvariantViolation};

#[derive(Debug, Error)]
pub enum EngineError {
    /// A generator produced a blueprint that fails validation (§4.C3); a
    /// bug in the generator, not a runtime condition a player can cause.
    #[error("blueprint invariant violation: {0:?}")]
    BlueprintInvariantViolation(Vec<InvariantViolation>),

    /// The constraint builder (§4.C4) failed against a blueprint that
    /// passed validation; should not occur, surfaced rather than panicking.
    #[error("constraint derivation error: {0}")]
    ConstraintDerivationError(String),

    /// The LM transport did not respond within its timeout (§5).
    #[error("LM request timed out")]
    LmTimeout,

    /// The LM request was cancelled (leaving `LocationInteraction`, §5).
    #[error("LM request cancelled")]
    LmCancelled,

    /// The LM's tool-call payload was not valid JSON.
    #[error("LM returned invalid JSON: {0}")]
    LmInvalidJson(String),

    /// The LM's tool-call payload failed schema validation (§4.C5).
    #[error("LM response violated the emitted schema: {0}")]
    LmSchemaViolation(String),

    /// A validated outcome referenced an inaccessible sublocation or state
    /// (§4.C7); treated the same as `LmSchemaViolation` per §7.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The LM transport failed a health probe; the controller refuses to
    /// enter `LocationInteraction` rather than substitute mock content.
    #[error("LM transport unavailable: {0}")]
    TransportUnavailable(String),
}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidStateTransition(msg) => EngineError::InvalidTransition(msg),
            other => EngineError::InvalidTransition(other.to_string()),
        }
    }
}

impl From<Vec<InvariantViolation>> for EngineError {
    fn from(violations: Vec<InvariantViolation>) -> Self {
        EngineError::BlueprintInvariantViolation(violations)
    }
}

impl From<LlmError> for EngineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(_) => EngineError::LmTimeout,
            LlmError::RequestFailed(msg) => EngineError::TransportUnavailable(msg),
            LlmError::InvalidResponse(msg) => EngineError::LmInvalidJson(msg),
        }
    }
}

/// `EngineError` with correlation context for log/trace correlation (§3
/// ambient logging).
#[derive(Debug)]
pub struct EngineErrorWithCorrelation {
    pub correlation_id: CorrelationId,
    pub error: EngineError,
}

impl EngineErrorWithCorrelation {
    pub fn new(correlation_id: CorrelationId, error: EngineError) -> Self {
        Self { correlation_id, error }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    pub fn error(&self) -> &EngineError {
        &self.error
    }
}

impl std::fmt::Display for EngineErrorWithCorrelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[correlation_id={}] {}", self.correlation_id.short(), self.error)
    }
}

impl std::error::Error for EngineErrorWithCorrelation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}
