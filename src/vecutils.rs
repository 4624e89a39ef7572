//! Vector utility functions: argmax(), cumulative()

/// Index of the largest value (first one on ties). `None` for an empty slice.
pub fn argmax(vec: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in vec.iter().enumerate() {
        match best {
            Some(b) if *v <= vec[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Running sums starting at 0: `[0, a, a + b, ...]` (one longer than `vec`).
pub fn cumulative(vec: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(vec.len() + 1);
    let mut sum = 0.;
    out.push(sum);
    for v in vec.iter() {
        sum += v;
        out.push(sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[2.0, 2.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_cumulative() {
        assert_eq!(cumulative(&[1.0, 2.0, 3.0]), vec![0.0, 1.0, 3.0, 6.0]);
        assert_eq!(cumulative(&[]), vec![0.0]);
    }
}
