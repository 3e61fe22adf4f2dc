/// Result of one control-plane call: a success value or a failure value,
/// never both.
///
/// Exactly one side is populated and the discriminant is fixed at
/// construction. Reading the inactive side is a contract violation and
/// aborts rather than returning a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(error: E) -> Self {
        Outcome::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Borrow the success value. Aborts on a failed outcome.
    pub fn result(&self) -> &T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => panic!("accessed the success side of a failed outcome"),
        }
    }

    /// Borrow the failure value. Aborts on a successful outcome.
    pub fn error(&self) -> &E {
        match self {
            Outcome::Success(_) => panic!("accessed the failure side of a successful outcome"),
            Outcome::Failure(error) => error,
        }
    }

    /// Consume the outcome, yielding the success value. Aborts on failure.
    pub fn into_result(self) -> T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(_) => panic!("accessed the success side of a failed outcome"),
        }
    }

    /// Consume the outcome, yielding the failure value. Aborts on success.
    pub fn into_error(self) -> E {
        match self {
            Outcome::Success(_) => panic!("accessed the failure side of a successful outcome"),
            Outcome::Failure(error) => error,
        }
    }
}
