/// Outcome of visiting one node. Blocks stop at the first non-`Normal`
/// result and hand it to their caller; loops turn it back into `Normal`.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlResult<T> {
    Normal(T),
    Returned(T),
    Broke(T),
}

impl<T> ControlResult<T> {
    pub fn is_normal(&self) -> bool {
        matches!(self, ControlResult::Normal(_))
    }

    pub fn is_signal(&self) -> bool {
        !self.is_normal()
    }

    /// The carried payload, whatever the signal.
    pub fn into_inner(self) -> T {
        match self {
            ControlResult::Normal(v) | ControlResult::Returned(v) | ControlResult::Broke(v) => v,
        }
    }

    pub fn inner(&self) -> &T {
        match self {
            ControlResult::Normal(v) | ControlResult::Returned(v) | ControlResult::Broke(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ControlResult<U> {
        match self {
            ControlResult::Normal(v) => ControlResult::Normal(f(v)),
            ControlResult::Returned(v) => ControlResult::Returned(f(v)),
            ControlResult::Broke(v) => ControlResult::Broke(f(v)),
        }
    }
}
