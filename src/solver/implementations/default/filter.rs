use crate::algebra::*;

/// A point in the (constraint violation, barrier objective) plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterEntry<T> {
    pub θ: T,
    pub φ: T,
}

/// Set of mutually non-dominating pairs `(θ, φ)`.  A trial point is
/// rejected if some entry is no worse in both measures.
#[derive(Debug, Clone)]
pub struct Filter<T> {
    entries: Vec<FilterEntry<T>>,
}

impl<T> Filter<T>
where
    T: FloatT,
{
    /// A filter that rejects only points with `θ ≥ θ_max`
    pub fn new(θ_max: T) -> Self {
        let mut filter = Self {
            entries: Vec::new(),
        };
        filter.reset(θ_max);
        filter
    }

    pub fn reset(&mut self, θ_max: T) {
        self.entries.clear();
        self.entries.push(FilterEntry {
            θ: θ_max,
            φ: -T::infinity(),
        });
    }

    pub fn is_acceptable(&self, θ: T, φ: T) -> bool {
        !self.entries.iter().any(|e| θ >= e.θ && φ >= e.φ)
    }

    /// Add `(θ, φ)`, dropping every entry it dominates
    pub fn augment(&mut self, θ: T, φ: T) {
        if !self.is_acceptable(θ, φ) {
            return;
        }
        self.entries.retain(|e| !(e.θ >= θ && e.φ >= φ));
        self.entries.push(FilterEntry { θ, φ });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FilterEntry<T>] {
        &self.entries
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_filter_acceptance() {
        let mut filter = Filter::<f64>::new(100.);
        assert!(filter.is_acceptable(99., 1e20));
        assert!(!filter.is_acceptable(100., -1e20));

        filter.augment(1., 5.);
        assert!(!filter.is_acceptable(1., 5.));
        assert!(!filter.is_acceptable(2., 6.));
        assert!(filter.is_acceptable(0.5, 6.));
        assert!(filter.is_acceptable(2., 4.));
    }

    #[test]
    fn test_filter_dominance() {
        let mut filter = Filter::<f64>::new(100.);
        filter.augment(3., 1.);
        filter.augment(1., 3.);
        filter.augment(2., 2.);
        assert_eq!(filter.len(), 4);

        // dominates (2,2) and (3,1)
        filter.augment(1.5, 0.5);
        assert_eq!(filter.len(), 3);
        assert!(filter.entries().contains(&FilterEntry { θ: 1.5, φ: 0.5 }));
        assert!(!filter.entries().contains(&FilterEntry { θ: 2., φ: 2. }));

        // a dominated pair is never added
        filter.augment(4., 4.);
        assert_eq!(filter.len(), 3);

        // no entry dominates another
        let e = filter.entries();
        for (i, a) in e.iter().enumerate() {
            for (j, b) in e.iter().enumerate() {
                assert!(i == j || !(a.θ >= b.θ && a.φ >= b.φ));
            }
        }

        filter.reset(10.);
        assert_eq!(filter.len(), 1);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_filter_rejection_is_monotone() {
        // once rejected, a pair stays rejected as the filter grows
        let mut filter = Filter::<f64>::new(100.);
        filter.augment(2., 2.);
        assert!(!filter.is_acceptable(3., 3.));
        for k in 0..10 {
            filter.augment(1. / (k + 2) as f64, 2. + k as f64);
            assert!(!filter.is_acceptable(3., 3.));
        }
    }
}
