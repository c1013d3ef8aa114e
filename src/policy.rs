use rand::Rng;

use crate::error::SearchError;
use crate::state::PositionState;
use crate::tree::Tree;

/// Visit distribution of the root's children as a dense action-space vector.
///
/// Each child's action index holds `visits / total_child_visits`; every other
/// entry is 0. Fails when the children have not been visited at all.
pub fn extract_policy_vector<S: PositionState>(tree: &Tree<S>) -> Result<Vec<f32>, SearchError> {
    let root = tree.get(tree.root());
    let total: u64 = root.children().iter().map(|&(_, c)| tree.get(c).visit_count() as u64).sum();
    if total == 0 {
        return Err(SearchError::NoSimulations);
    }
    let mut policy = vec![0.0f32; S::ACTION_SPACE];
    for (mv, child) in root.children() {
        let idx = root.position().action_index(mv)?;
        policy[idx] = (tree.get(*child).visit_count() as f64 / total as f64) as f32;
    }
    Ok(policy)
}

/// Non-zero entries of a dense policy, in index order.
pub fn sparse_entries(policy: &[f32]) -> Vec<(usize, f32)> {
    policy.iter().enumerate().filter(|&(_, &p)| p > 0.0).map(|(i, &p)| (i, p)).collect()
}

/// Pick an action index from `policy`.
///
/// `temperature == 0` picks the largest entry (first on ties); otherwise the
/// index is sampled with probability proportional to `p^(1/temperature)`.
/// Returns `None` when no entry is positive.
pub fn sample_from_policy<R: Rng + ?Sized>(policy: &[f32], temperature: f32, rng: &mut R) -> Option<usize> {
    if temperature <= 0.0 {
        let mut best: Option<(usize, f32)> = None;
        for (i, &p) in policy.iter().enumerate() {
            if p > 0.0 && best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        return best.map(|(i, _)| i);
    }
    let inv_t = 1.0 / temperature as f64;
    let weights: Vec<(usize, f64)> = policy
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p > 0.0)
        .map(|(i, &p)| (i, (p as f64).powf(inv_t)))
        .collect();
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if weights.is_empty() || !(sum > 0.0) {
        return None;
    }
    let r: f64 = rng.gen::<f64>() * sum;
    let mut cdf = 0.0;
    for &(i, w) in &weights {
        cdf += w;
        if r < cdf { return Some(i); }
    }
    weights.last().map(|&(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn greedy_takes_first_maximum() {
        let mut rng = SmallRng::seed_from_u64(1);
        let p = [0.0, 0.4, 0.2, 0.4];
        assert_eq!(sample_from_policy(&p, 0.0, &mut rng), Some(1));
    }

    #[test]
    fn sampling_only_hits_positive_entries() {
        let mut rng = SmallRng::seed_from_u64(7);
        let p = [0.0, 0.3, 0.0, 0.7];
        for _ in 0..200 {
            let i = sample_from_policy(&p, 1.0, &mut rng).unwrap();
            assert!(i == 1 || i == 3);
        }
    }

    #[test]
    fn empty_policy_has_no_sample() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(sample_from_policy(&[0.0; 4], 1.0, &mut rng), None);
        assert_eq!(sample_from_policy(&[0.0; 4], 0.0, &mut rng), None);
    }

    #[test]
    fn sparse_keeps_nonzero_entries() {
        assert_eq!(sparse_entries(&[0.0, 0.25, 0.0, 0.75]), vec![(1, 0.25), (3, 0.75)]);
    }
}
