use super::ProblemError;
use crate::algebra::*;

/// Bound structure of a single variable

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableClass<T> {
    /// `l = u`.  The variable is substituted by its value.
    Fixed(T),
    /// `l ≤ x`
    Lower(T),
    /// `x ≤ u`
    Upper(T),
    /// `l ≤ x ≤ u`
    Boxed(T, T),
    /// unbounded in both directions
    Free,
}

impl<T> VariableClass<T>
where
    T: FloatT,
{
    pub fn classify(lower: T, upper: T) -> Option<Self> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return None;
        }
        // l = u = ±∞ cannot be honoured either
        if lower == upper {
            return lower.is_finite().then_some(VariableClass::Fixed(lower));
        }

        let class = match (lower.is_finite(), upper.is_finite()) {
            (true, true) => VariableClass::Boxed(lower, upper),
            (true, false) => VariableClass::Lower(lower),
            (false, true) => VariableClass::Upper(upper),
            (false, false) => VariableClass::Free,
        };
        Some(class)
    }

    /// Number of nonnegative standard variables used to represent
    /// this variable, not counting box slacks.
    pub fn nstandard(&self) -> usize {
        match self {
            VariableClass::Fixed(_) => 0,
            VariableClass::Free => 2,
            _ => 1,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, VariableClass::Fixed(_))
    }
}

/// Classify every variable of a problem, failing on the first
/// variable with inconsistent bounds.
pub fn presolve<T: FloatT>(lower: &[T], upper: &[T]) -> Result<Vec<VariableClass<T>>, ProblemError> {
    lower
        .iter()
        .zip(upper)
        .enumerate()
        .map(|(j, (&l, &u))| VariableClass::classify(l, u).ok_or(ProblemError::InconsistentBounds(j)))
        .collect()
}
