use ndarray::{Array1, ArrayView1};
use proxima::Float;

/// First derivative of a series, length preserving.
///
/// Interior points average the backward difference with half the centered
/// difference; the endpoints copy their neighbours. Series shorter than three
/// samples are returned unchanged.
pub fn first_derivative<F: Float>(a: ArrayView1<F>) -> Array1<F> {
    let n = a.len();
    if n < 3 {
        return a.to_owned();
    }
    let mut d = Array1::zeros(n);
    let two = F::cast(2);
    for i in 1..n - 1 {
        d[i] = ((a[i] - a[i - 1]) + (a[i + 1] - a[i - 1]) / two) / two;
    }
    d[0] = d[1];
    d[n - 1] = d[n - 2];
    d
}
