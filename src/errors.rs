use thiserror::Error;

/// Every recoverable condition the engine reports through the error handler.
///
/// None of these abort the frame: the engine skips the offending element or
/// attachment, clamps the value, or stops adding elements, then keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorType {
    /// The arena could not fit this frame's collections or string data.
    #[error("arena capacity exceeded")]
    ArenaCapacityExceeded,
    /// More elements were declared than `max_element_count` allows.
    #[error("element capacity exceeded")]
    ElementsCapacityExceeded,
    /// The measured-word cache ran out of slots.
    #[error("text measurement cache capacity exceeded")]
    TextMeasurementCapacityExceeded,
    /// Two different elements in one frame resolved to the same id.
    #[error("duplicate element id")]
    DuplicateId,
    /// A floating element was attached to an id that was not declared.
    #[error("floating container parent not found")]
    FloatingParentNotFound,
    /// A percent sizing value was outside `0.0..=1.0`.
    #[error("percentage sizing value outside 0..=1")]
    PercentageOver1,
    /// The frame ended with elements still open.
    #[error("unbalanced open/close calls")]
    UnbalancedOpenClose,
    #[error("internal error")]
    InternalError,
    /// Text was declared but no measurement function was ever provided.
    #[error("text measurement function not provided")]
    TextMeasurementFunctionMissing,
}

/// Payload handed to the host's error handler.
#[derive(Debug, Clone, Copy)]
pub struct ErrorData<'a> {
    pub error_type: ErrorType,
    pub text: &'a str,
}

/// Host callback for recoverable errors. Any host state is captured by the closure.
pub type ErrorHandler = Box<dyn FnMut(ErrorData<'_>)>;

/// Failures of the arena substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("arena capacity exceeded: requested {requested} bytes at offset {offset}, capacity {capacity}")]
    CapacityExceeded {
        requested: usize,
        offset: usize,
        capacity: usize,
    },
    #[error("persistent boundary was already marked at offset {0}")]
    BoundaryAlreadyMarked(usize),
    #[error("region {offset}+{length} does not lie inside the arena")]
    InvalidRegion { offset: usize, length: usize },
}

/// Failures of bounded arrays and their views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("index {index} out of range (limit {limit})")]
    OutOfRange { index: usize, limit: usize },
    #[error("array is full (capacity {0})")]
    Full(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_types_have_messages() {
        assert_eq!(ErrorType::DuplicateId.to_string(), "duplicate element id");
        assert_eq!(
            ArrayError::OutOfRange { index: 4, limit: 2 }.to_string(),
            "index 4 out of range (limit 2)"
        );
    }
}
