//! Lagrange interpolation over the integer nodes `{0, 1, ..., d}`.
//!
//! Partial-sum polynomials are sent as evaluations on these nodes, so the verifier only ever
//! needs to evaluate a univariate polynomial from its values at `0..=d`.

use p3_field::Field;

/// Computes the Lagrange basis weights for interpolation at points `{0, 1, 2}`.
///
/// ```text
/// L_0(x) = (x - 1)(x - 2) / 2
/// L_1(x) = x(2 - x)
/// L_2(x) = x(x - 1) / 2
/// ```
pub fn lagrange_weights_012<F: Field>(r: F) -> [F; 3] {
    let inv_two = F::TWO.inverse();

    let l0 = (r - F::ONE) * (r - F::TWO) * inv_two;
    let l1 = r * (F::TWO - r);
    let l2 = r * (r - F::ONE) * inv_two;

    [l0, l1, l2]
}

/// Evaluates at `r` the unique polynomial of degree `< evals.len()` taking the value
/// `evals[i]` at `i`.
///
/// The general case computes
///
/// ```text
/// L_i(r) = prod_{j != i} (r - j) / prod_{j != i} (i - j)
/// ```
///
/// with prefix and suffix products for the numerators. The denominator is
/// `(-1)^(d - i) * i! * (d - i)!`.
///
/// # Panics
/// Panics if the number of nodes reaches the field characteristic.
pub fn interpolate_at<F: Field>(evals: &[F], r: F) -> F {
    match evals {
        [] => F::ZERO,
        [e0] => *e0,
        [e0, e1] => *e0 + r * (*e1 - *e0),
        [e0, e1, e2] => {
            let [w0, w1, w2] = lagrange_weights_012(r);
            *e0 * w0 + *e1 * w1 + *e2 * w2
        }
        _ => {
            let n = evals.len();
            let d = n - 1;

            // prefix[i] = prod_{j < i} (r - j), suffix[i] = prod_{j > i} (r - j)
            let mut prefix = Vec::with_capacity(n);
            let mut acc = F::ONE;
            for j in 0..n {
                prefix.push(acc);
                acc *= r - F::from_usize(j);
            }
            let mut suffix = vec![F::ONE; n];
            let mut acc = F::ONE;
            for j in (0..n).rev() {
                suffix[j] = acc;
                acc *= r - F::from_usize(j);
            }

            let mut factorials = Vec::with_capacity(n);
            let mut fact = F::ONE;
            factorials.push(fact);
            for k in 1..n {
                fact *= F::from_usize(k);
                factorials.push(fact);
            }

            evals
                .iter()
                .enumerate()
                .map(|(i, &e)| {
                    let denom = factorials[i] * factorials[d - i];
                    let weight = prefix[i] * suffix[i] * denom.inverse();
                    if (d - i) % 2 == 1 {
                        -e * weight
                    } else {
                        e * weight
                    }
                })
                .sum()
        }
    }
}
