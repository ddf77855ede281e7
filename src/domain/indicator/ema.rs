//! Exponential Moving Average.
//!
//! k = 2/(span+1), seeded with the first value, then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Every position carries a value; there is no warmup gap.

pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &x in &values[1..] {
        ema = x * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}
