// DCT module - DCT-II from filter energies to cepstral coefficients
//
// The (n + 1) x n cosine table is built once; each transform is a dense
// matrix-vector product.

use crate::error::DspError;
use crate::sample::Sample;

/// DCT-II engine mapping `num_points` inputs to `num_points + 1` outputs
#[derive(Debug, Clone, PartialEq)]
pub struct Dct<T: Sample> {
    num_points: usize,
    /// Row-major `(num_points + 1) x num_points`
    table: Vec<T>,
}

impl<T: Sample> Dct<T> {
    /// # Panics
    /// Panics if `num_points` is 0
    pub fn new(num_points: usize) -> Self {
        assert!(num_points > 0, "num_points must be greater than 0");

        let n = num_points as f64;
        let scale = (2.0 / n).sqrt();
        let mut table = Vec::with_capacity((num_points + 1) * num_points);
        for i in 0..=num_points {
            for j in 0..num_points {
                let angle = std::f64::consts::PI * i as f64 * (j as f64 + 0.5) / n;
                table.push(T::lit(scale * angle.cos()));
            }
        }

        Self { num_points, table }
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_outputs(&self) -> usize {
        self.num_points + 1
    }

    /// Cosine table row for output `i`
    pub fn row(&self, i: usize) -> &[T] {
        &self.table[i * self.num_points..(i + 1) * self.num_points]
    }

    pub fn transform(&self, input: &[T]) -> Result<Vec<T>, DspError> {
        if input.len() != self.num_points {
            return Err(DspError::invalid_length("dct", self.num_points, input.len()));
        }

        Ok(self
            .table
            .chunks_exact(self.num_points)
            .map(|row| {
                row.iter()
                    .zip(input)
                    .fold(T::zero(), |acc, (&c, &x)| acc + c * x)
            })
            .collect())
    }
}
