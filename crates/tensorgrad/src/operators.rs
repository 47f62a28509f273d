//! Scalar operators used by the differentiable kernels.
//!
//! Each `*_back` function evaluates the derivative of its forward
//! counterpart at `x` and scales it by the incoming gradient `d`.
//! Functions that are undefined on part of their input return
//! `TensorError::Domain` instead of producing infinities or NaNs.

use crate::error::TensorError;
use crate::scalar::Scalar;

/// Tolerance used by [`is_close`].
pub const CLOSE_TOLERANCE: f64 = 1e-2;

#[inline]
pub fn id<T: Scalar>(x: T) -> T {
    x
}

#[inline]
pub fn neg<T: Scalar>(x: T) -> T {
    -x
}

#[inline]
pub fn add<T: Scalar>(x: T, y: T) -> T {
    x + y
}

#[inline]
pub fn mul<T: Scalar>(x: T, y: T) -> T {
    x * y
}

/// `1 / x`.
///
/// # Errors
///
/// Returns a domain error at `x == 0`.
pub fn inv<T: Scalar>(x: T) -> Result<T, TensorError> {
    if x == T::zero() {
        return Err(TensorError::domain("inv", "inverse is not defined at 0"));
    }
    Ok(T::one() / x)
}

/// Derivative of `inv` at `x`, scaled by `d`: `-d / x²`.
pub fn inv_back<T: Scalar>(x: T, d: T) -> Result<T, TensorError> {
    if x == T::zero() {
        return Err(TensorError::domain(
            "inv_back",
            "inverse derivative is not defined at 0",
        ));
    }
    Ok(-d / (x * x))
}

#[inline]
pub fn exp<T: Scalar>(x: T) -> T {
    Scalar::exp(x)
}

/// Natural logarithm.
///
/// # Errors
///
/// Returns a domain error for `x <= 0`.
pub fn log<T: Scalar>(x: T) -> Result<T, TensorError> {
    if x <= T::zero() {
        return Err(TensorError::domain(
            "log",
            format!("cannot take the log of non-positive value {x:?}"),
        ));
    }
    Ok(Scalar::ln(x))
}

/// Derivative of `log` at `x`, scaled by `d`: `d / x`.
pub fn log_back<T: Scalar>(x: T, d: T) -> Result<T, TensorError> {
    if x <= T::zero() {
        return Err(TensorError::domain(
            "log_back",
            format!("log derivative is only defined for positive values, got {x:?}"),
        ));
    }
    Ok(d / x)
}

#[inline]
pub fn relu<T: Scalar>(x: T) -> T {
    if x > T::zero() { x } else { T::zero() }
}

/// Derivative of `relu` at `x`, scaled by `d`. The derivative at 0 is taken as 0.
#[inline]
pub fn relu_back<T: Scalar>(x: T, d: T) -> T {
    if x > T::zero() { d } else { T::zero() }
}

/// Logistic sigmoid, evaluated with the branch that avoids overflow.
pub fn sigmoid<T: Scalar>(x: T) -> T {
    if x >= T::zero() {
        T::one() / (T::one() + Scalar::exp(-x))
    } else {
        let e = Scalar::exp(x);
        e / (T::one() + e)
    }
}

/// 1 if `x == y`, else 0.
#[inline]
pub fn eq<T: Scalar>(x: T, y: T) -> T {
    indicator(x == y)
}

/// 1 if `x < y`, else 0.
#[inline]
pub fn lt<T: Scalar>(x: T, y: T) -> T {
    indicator(x < y)
}

/// 1 if `|x - y| < 1e-2`, else 0.
pub fn is_close<T: Scalar>(x: T, y: T) -> T {
    let diff = if x > y { x - y } else { y - x };
    indicator(diff < T::from_f64(CLOSE_TOLERANCE))
}

#[inline]
pub fn max<T: Scalar>(x: T, y: T) -> T {
    if y > x { y } else { x }
}

#[inline]
fn indicator<T: Scalar>(flag: bool) -> T {
    if flag { T::one() } else { T::zero() }
}
