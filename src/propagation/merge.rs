//! Merge policies for repeated observations of the same entity.

use super::scalar::Scalar;

/// Resolves a second observation against the value already stored.
///
/// Implementations must be pure. Policies that are not commutative make the
/// merged value depend on ingestion order.
pub trait MergePolicy<V>: Send + Sync {
    fn merge(&self, previous: V, observed: V) -> V;
}

impl<V, F> MergePolicy<V> for F
where
    F: Fn(V, V) -> V + Send + Sync,
{
    fn merge(&self, previous: V, observed: V) -> V {
        self(previous, observed)
    }
}

/// Keep the smallest observation (earliest date).
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl<V: Scalar> MergePolicy<V> for Min {
    fn merge(&self, previous: V, observed: V) -> V {
        if observed < previous {
            observed
        } else {
            previous
        }
    }
}

/// Pairwise arithmetic mean, `(previous + observed) / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl<V: Scalar> MergePolicy<V> for Mean {
    fn merge(&self, previous: V, observed: V) -> V {
        (previous + observed) / V::from_weight(2)
    }
}
