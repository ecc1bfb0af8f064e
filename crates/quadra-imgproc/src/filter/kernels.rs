use crate::error::FilterError;

/// Standard deviation of the synthesized gaussian kernels.
pub const GAUSSIAN_SIGMA: f32 = 0.75;

/// Scale applied to the gaussian weights.
const GAUSSIAN_SCALE: f32 = 100.0;

/// A square convolution kernel of odd size.
///
/// The weights are stored row-major: row `dy` and column `dx`, both in `0..size`,
/// hold the weight applied to the neighbor at offset `(dx - size / 2, dy - size / 2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    data: Vec<f32>,
}

/// The fixed 3x3 kernels of the filter catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedKernel {
    /// 8-connectivity laplacian.
    Laplacian,
    /// Prewitt response used as the 0 degree gradient.
    Prewitt0,
    /// Prewitt response used as the 90 degree gradient.
    Prewitt90,
    /// Uniform box of ones.
    Box,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is even or below 3, or if `data` does not hold `size * size` weights.
    pub fn new(size: usize, data: Vec<f32>) -> Result<Self, FilterError> {
        if size < 3 || size % 2 == 0 {
            return Err(FilterError::InvalidKernelSize(size));
        }
        if data.len() != size * size {
            return Err(FilterError::InvalidKernelData(data.len(), size));
        }
        Ok(Self { size, data })
    }

    fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self {
            size: 3,
            data: rows.into_iter().flatten().collect(),
        }
    }

    /// Build one of the fixed 3x3 kernels.
    ///
    /// # Examples
    ///
    /// ```
    /// use quadra_imgproc::filter::kernels::{FixedKernel, Kernel};
    ///
    /// let kernel = Kernel::fixed(FixedKernel::Box);
    /// assert_eq!(kernel.size(), 3);
    /// assert_eq!(kernel.sum(), 9.0);
    /// ```
    pub fn fixed(kind: FixedKernel) -> Self {
        match kind {
            FixedKernel::Laplacian => Self::laplacian(),
            FixedKernel::Prewitt0 => Self::prewitt_0(),
            FixedKernel::Prewitt90 => Self::prewitt_90(),
            FixedKernel::Box => Self::box3(),
        }
    }

    /// The 8-connectivity laplacian kernel.
    pub fn laplacian() -> Self {
        Self::from_rows([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])
    }

    /// The 0 degree kernel of the Prewitt boundary filter, an 8-neighbor laplacian.
    pub fn prewitt_0() -> Self {
        Self::from_rows([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])
    }

    /// The 90 degree gradient kernel of the Prewitt boundary filter.
    pub fn prewitt_90() -> Self {
        Self::from_rows([[-2.0, -2.0, 0.0], [-2.0, 0.0, 2.0], [0.0, 2.0, 2.0]])
    }

    /// A 3x3 box of ones.
    pub fn box3() -> Self {
        Self::from_rows([[1.0; 3]; 3])
    }

    /// Side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center to the kernel edge, `size / 2`.
    pub fn half_size(&self) -> usize {
        self.size / 2
    }

    /// Weight at row `dy`, column `dx` of the matrix.
    #[inline]
    pub fn at(&self, dx: usize, dy: usize) -> f32 {
        self.data[dy * self.size + dx]
    }

    /// Weight applied to the neighbor at the centered offset `(i, j)`.
    ///
    /// Returns `None` when the offset falls outside the kernel.
    pub fn get(&self, i: isize, j: isize) -> Option<f32> {
        let half = self.half_size() as isize;
        if i.abs() > half || j.abs() > half {
            return None;
        }
        Some(self.at((i + half) as usize, (j + half) as usize))
    }

    /// Sum of all the weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// The weights in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Create a gaussian kernel of size `kernel_size` and its normalization divisor.
///
/// Every weight is `100 * exp(-(dx² + dy²) / (2σ²)) / (2πσ²)` with `σ = 0.75`, and the
/// divisor is the sum of the weights.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, odd and at least 3.
///
/// # Returns
///
/// The kernel and the sum of its weights.
///
/// # Examples
///
/// ```
/// use quadra_imgproc::filter::kernels::gaussian_kernel;
///
/// let (kernel, divisor) = gaussian_kernel(5).unwrap();
/// assert_eq!(kernel.size(), 5);
/// assert_eq!(kernel.sum(), divisor);
/// ```
pub fn gaussian_kernel(kernel_size: usize) -> Result<(Kernel, f32), FilterError> {
    if kernel_size < 3 || kernel_size % 2 == 0 {
        return Err(FilterError::InvalidKernelSize(kernel_size));
    }

    let half = (kernel_size / 2) as isize;
    let two_sigma_sq = 2.0 * GAUSSIAN_SIGMA * GAUSSIAN_SIGMA;
    let norm = std::f32::consts::PI * two_sigma_sq;

    let mut data = Vec::with_capacity(kernel_size * kernel_size);
    for dy in -half..=half {
        for dx in -half..=half {
            let dist_sq = (dx * dx + dy * dy) as f32;
            data.push(GAUSSIAN_SCALE * (-dist_sq / two_sigma_sq).exp() / norm);
        }
    }

    let kernel = Kernel::new(kernel_size, data)?;
    let divisor = kernel.sum();

    Ok((kernel, divisor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_kernels() {
        let laplacian = Kernel::fixed(FixedKernel::Laplacian);
        assert_eq!(laplacian.get(0, 0), Some(8.0));
        assert_eq!(laplacian.get(-1, 1), Some(-1.0));
        assert_eq!(laplacian.sum(), 0.0);

        let prewitt_90 = Kernel::fixed(FixedKernel::Prewitt90);
        assert_eq!(
            prewitt_90.as_slice(),
            &[-2.0, -2.0, 0.0, -2.0, 0.0, 2.0, 0.0, 2.0, 2.0]
        );
        assert_eq!(Kernel::fixed(FixedKernel::Prewitt0), laplacian);
        assert_eq!(prewitt_90.get(2, 0), None);
    }

    #[test]
    fn test_kernel_new_rejects_bad_sizes() {
        assert_eq!(
            Kernel::new(4, vec![0.0; 16]),
            Err(FilterError::InvalidKernelSize(4))
        );
        assert_eq!(
            Kernel::new(1, vec![1.0]),
            Err(FilterError::InvalidKernelSize(1))
        );
        assert_eq!(
            Kernel::new(3, vec![0.0; 8]),
            Err(FilterError::InvalidKernelData(8, 3))
        );
    }

    #[test]
    fn test_gaussian_kernel_sum_matches_divisor() -> Result<(), FilterError> {
        for kernel_size in [3, 5, 7, 9, 11, 17] {
            let (kernel, divisor) = gaussian_kernel(kernel_size)?;
            assert_eq!(kernel.size(), kernel_size);
            assert_eq!(kernel.as_slice().len(), kernel_size * kernel_size);
            assert_relative_eq!(kernel.sum(), divisor);
        }
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_values() -> Result<(), FilterError> {
        let (kernel, _) = gaussian_kernel(3)?;
        let center = 100.0 / (2.0 * std::f32::consts::PI * 0.5625);
        assert_relative_eq!(kernel.at(1, 1), center, epsilon = 1e-4);
        assert_relative_eq!(
            kernel.get(1, 0).unwrap_or_default(),
            center * (-1.0f32 / 1.125).exp(),
            epsilon = 1e-4
        );

        // symmetric under every flip
        assert_eq!(kernel.get(-1, -1), kernel.get(1, 1));
        assert_eq!(kernel.get(-1, 0), kernel.get(0, 1));
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_deterministic() -> Result<(), FilterError> {
        assert_eq!(gaussian_kernel(7)?, gaussian_kernel(7)?);
        Ok(())
    }

    #[test]
    fn test_gaussian_kernel_rejects_even() {
        assert_eq!(gaussian_kernel(4), Err(FilterError::InvalidKernelSize(4)));
        assert_eq!(gaussian_kernel(1), Err(FilterError::InvalidKernelSize(1)));
    }
}
