//! Structure-of-Arrays gradient buffer.
//!
//! Gradients and hessians live in separate contiguous arrays so histogram
//! building can read one of them for a run of rows without striding.

/// Gradient and hessian of the loss for every training row.
///
/// # Example
///
/// ```
/// use boxboost::training::Gradients;
///
/// let mut buffer = Gradients::new(4);
/// buffer.set(0, -0.5, 1.0);
/// assert_eq!(buffer.get(0), (-0.5, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Gradients {
    /// Gradient values (∂L/∂pred).
    grads: Vec<f32>,
    /// Hessian values (∂²L/∂pred²).
    hess: Vec<f32>,
}

impl Gradients {
    /// Create a buffer for `n_samples` rows, initialized to zeros.
    pub fn new(n_samples: usize) -> Self {
        Self {
            grads: vec![0.0; n_samples],
            hess: vec![0.0; n_samples],
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.grads.len()
    }

    #[inline]
    pub fn get(&self, row: usize) -> (f32, f32) {
        (self.grads[row], self.hess[row])
    }

    #[inline]
    pub fn set(&mut self, row: usize, grad: f32, hess: f32) {
        self.grads[row] = grad;
        self.hess[row] = hess;
    }

    #[inline]
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    #[inline]
    pub fn hess(&self) -> &[f32] {
        &self.hess
    }

    /// Both arrays, mutably.
    #[inline]
    pub fn as_mut_slices(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.grads, &mut self.hess)
    }

    /// Sum of gradients and hessians over `rows`, accumulated in f64.
    pub fn sum(&self, rows: &[u32]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            (g + self.grads[r as usize] as f64, h + self.hess[r as usize] as f64)
        })
    }
}
