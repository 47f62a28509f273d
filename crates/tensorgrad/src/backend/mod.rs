//! Kernel backends for tensor operations.
//!
//! # Backends
//!
//! - [`GenericBackend`]: naive loop-based kernels (always available)
//! - [`FaerBackend`]: GEMM through faer; elementwise kernels shared with
//!   the generic backend
//!
//! Every tracked tensor carries a [`Backend`] tag. Operations resolve the
//! tag of their first input and run that backend's kernels; the autodiff
//! core never picks kernels itself.

mod faer_interop;
mod generic;
mod kernel;

pub use faer_interop::{AsFaerMat, FaerBackend};
pub use generic::GenericBackend;
pub use kernel::KernelBackend;

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Runtime selection of a kernel backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Naive loops.
    #[default]
    Generic,
    /// faer GEMM for matrix products.
    Faer,
}

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Generic => GenericBackend::$method($($arg),*),
            Backend::Faer => FaerBackend::$method($($arg),*),
        }
    };
}

impl Backend {
    /// Whether this backend runs an accelerated execution path.
    pub fn is_accelerated(self) -> bool {
        dispatch!(self, is_accelerated())
    }

    pub fn map<T: Scalar>(self, a: &DenseTensor<T>, f: impl Fn(T) -> T) -> DenseTensor<T> {
        dispatch!(self, map(a, f))
    }

    pub fn try_map<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        f: impl Fn(T) -> Result<T, TensorError>,
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, try_map(a, f))
    }

    pub fn zip<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
        f: impl Fn(T, T) -> T,
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, zip(a, b, f))
    }

    pub fn try_zip<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
        f: impl Fn(T, T) -> Result<T, TensorError>,
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, try_zip(a, b, f))
    }

    pub fn reduce<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        dim: usize,
        start: T,
        f: impl Fn(T, T) -> T,
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, reduce(a, dim, start, f))
    }

    pub fn broadcast_to<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        shape: &[usize],
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, broadcast_to(a, shape))
    }

    pub fn permute_into<T: Scalar>(
        self,
        dest: &mut DenseTensor<T>,
        src: &DenseTensor<T>,
        perm: &[usize],
    ) {
        dispatch!(self, permute_into(dest, src, perm))
    }

    pub fn matmul<T: Scalar>(
        self,
        a: &DenseTensor<T>,
        b: &DenseTensor<T>,
    ) -> Result<DenseTensor<T>, TensorError> {
        dispatch!(self, matmul(a, b))
    }
}

/// Validate operands of a 2-D matrix product, returning `(m, k, n)`.
pub(crate) fn matmul_dims<T: Scalar>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
) -> Result<(usize, usize, usize), TensorError> {
    for t in [a, b] {
        if t.ndim() != 2 {
            return Err(TensorError::RankMismatch {
                expected: 2,
                actual: t.ndim(),
            });
        }
    }
    let (m, k) = (a.shape()[0], a.shape()[1]);
    let (k2, n) = (b.shape()[0], b.shape()[1]);
    if k != k2 {
        return Err(TensorError::IncompatibleShapes {
            lhs: a.shape().to_vec(),
            rhs: b.shape().to_vec(),
        });
    }
    Ok((m, k, n))
}
