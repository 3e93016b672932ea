use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Softmax is a vector-valued activation; it is applied over the whole
    /// output vector by `apply()`.  The element-wise `function()` treats it
    /// as identity so callers never need a special case.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Gelu,
    Swish,
}

impl ActivationFunction {
    /// Element-wise activation.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
        }
    }

    /// Applies the activation to a whole vector in place.
    pub fn apply(&self, values: &mut [f64]) {
        match self {
            ActivationFunction::Softmax => softmax(values),
            _ => values.iter_mut().for_each(|v| *v = self.function(*v)),
        }
    }
}

/// Numerically stable softmax (shifts by the max before exponentiating).
pub fn softmax(values: &mut [f64]) {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_is_a_distribution() {
        let mut v = vec![1.0, 2.0, 3.0, 1000.0];
        ActivationFunction::Softmax.apply(&mut v);
        let sum: f64 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(v.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!(v[3] > 0.99);
    }

    #[test]
    fn relu_clamps_negatives() {
        let mut v = vec![-1.5, 0.0, 2.5];
        ActivationFunction::ReLU.apply(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 2.5]);
    }
}
