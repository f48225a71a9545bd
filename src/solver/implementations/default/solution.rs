use crate::algebra::*;
use crate::solver::core::SolverStatus;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Result of a solve, in terms of the original variables
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Outcome<T> {
    pub status: SolverStatus,
    /// final point.  For ERROR and ABORTED outcomes this is the last
    /// accepted iterate, or the starting point if there was none.
    pub x: Vec<T>,
    /// objective at `x`, absent for ERROR and ABORTED outcomes
    pub objective: Option<T>,
    pub iterations: u32,
    pub solve_time: f64,
}

impl<T> Outcome<T>
where
    T: FloatT,
{
    pub(crate) fn new(status: SolverStatus, x: Vec<T>, objective: Option<T>) -> Self {
        let objective = match status {
            SolverStatus::Error | SolverStatus::Aborted => None,
            _ => objective.filter(|f| f.is_finite()),
        };
        Self {
            status,
            x,
            objective,
            iterations: 0,
            solve_time: 0.,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

#[test]
fn test_outcome_objective() {
    let o = Outcome::new(SolverStatus::Optimal, vec![1.], Some(2.));
    assert_eq!(o.objective, Some(2.));
    assert!(o.is_optimal());

    let o = Outcome::new(SolverStatus::Aborted, vec![1.], Some(2.));
    assert_eq!(o.objective, None);

    let o = Outcome::new(SolverStatus::Failed, vec![1.], Some(f64::NAN));
    assert_eq!(o.objective, None);
}
