use ndarray::Array1;
use rlsp::Discrete;

#[allow(dead_code)]
pub fn one_hot(n: usize, s: Discrete) -> Array1<f64> {
    let mut p_0 = Array1::zeros(n);
    p_0[s] = 1.;
    p_0
}
