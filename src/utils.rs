use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// Sum of a probability distribution must be within this of 1.0
pub const PROB_EPSILON: f64 = 1e-6;

/// Returns the indices of `probs` ordered by descending probability. Equal
/// probabilities keep their index order, so the ranking is deterministic.
///
/// ```
/// let probs = [0.2, 0.5, 0.1, 0.2];
/// assert_eq!(beamtree::utils::ranked(&probs), vec![1, 0, 3, 2]);
/// ```
pub fn ranked(probs: &[f64]) -> Vec<usize> {
  let mut order = (0..probs.len()).collect::<Vec<_>>();
  // sort_by is stable, so ties stay in index order
  order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));
  order
}

/// Checks that `probs` looks like a probability distribution
pub fn check_distribution(probs: &[f64]) -> Result<(), Err> {
  if let Some(p) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
    return Err(format!("probability {} out of range", p).into());
  }

  let total = probs.iter().sum::<f64>();
  if (total - 1.0).abs() > PROB_EPSILON {
    Err(format!("distribution sums to {}, not 1", total).into())
  } else {
    Ok(())
  }
}

#[test]
fn test_ranked_ties_are_stable() {
  assert_eq!(ranked(&[0.25, 0.25, 0.25, 0.25]), vec![0, 1, 2, 3]);
  assert_eq!(ranked(&[]), Vec::<usize>::new());
}

#[test]
fn test_check_distribution() {
  assert!(check_distribution(&[0.97, 0.03]).is_ok());
  assert!(check_distribution(&[0.5, 0.4]).is_err());
  assert!(check_distribution(&[1.5, -0.5]).is_err());
}
