use crate::error::KiraError;
use crate::structure::Point3;

pub fn rmsd(first: &[Point3], second: &[Point3]) -> Result<f64, KiraError> {
    if first.len() != second.len() {
        return Err(KiraError::InvalidInput(format!(
            "point set sizes differ: {} vs {}",
            first.len(),
            second.len()
        )));
    }
    if first.is_empty() {
        return Err(KiraError::InvalidInput(
            "cannot compute RMSD of empty point sets".to_string(),
        ));
    }
    let sum: f64 = first
        .iter()
        .zip(second)
        .map(|(a, b)| a.distance_squared(*b))
        .sum();
    Ok((sum / first.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn uniform_shift() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let b = vec![Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0)];
        assert!((rmsd(&a, &b).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let a = vec![Point3::default()];
        assert_matches!(rmsd(&a, &[]), Err(KiraError::InvalidInput(_)));
        assert_matches!(rmsd(&[], &[]), Err(KiraError::InvalidInput(_)));
    }
}
