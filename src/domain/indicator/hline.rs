//! Horizontal reference line, typically drawn across an oscillator panel.

pub fn calculate_hline(len: usize, y: f64) -> Vec<f64> {
    vec![y; len]
}
