//! Composition of several pending responses into one value.
//!
//! [`combine_all`] waits for every input and merges them in the order they
//! were given. [`race_then_combine`] merges an anchor value with whichever
//! of two racers completes first.

use crate::error::Error;
use crate::pending::PendingResponse;

/// Wait for all inputs and merge them with right nesting:
/// `merge(v1, merge(v2, merge(v3, ...)))`.
///
/// The nesting follows the input order regardless of completion order.
/// Fails with the first failure observed, or with
/// [`Error::NothingToCombine`] when `inputs` is empty.
pub fn combine_all<T, F>(inputs: Vec<PendingResponse<T>>, merge: F) -> PendingResponse<T>
where
    T: Send + 'static,
    F: Fn(T, T) -> T + Send + Clone + 'static,
{
    let mut inputs = inputs.into_iter().rev();
    let Some(last) = inputs.next() else {
        return PendingResponse::failed(Error::NothingToCombine);
    };

    inputs.fold(last, |acc, next| {
        let merge = merge.clone();
        next.combine(acc, move |left, right| merge(left, right))
    })
}

/// Race `first` against `second` and merge the winner with `anchor`
/// as `merge(anchor, winner)`.
///
/// Which racer wins depends only on timing. A failed winner, or a failed
/// anchor, fails the result unless recovered beforehand.
pub fn race_then_combine<A, T, R, F>(
    anchor: PendingResponse<A>,
    first: PendingResponse<T>,
    second: PendingResponse<T>,
    merge: F,
) -> PendingResponse<R>
where
    A: Send + 'static,
    T: Send + 'static,
    R: Send + 'static,
    F: FnOnce(A, T) -> R + Send + 'static,
{
    anchor.combine(first.either(second), merge)
}
