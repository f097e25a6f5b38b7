//! Helper functions for regression tree building.
//!
//! Split search works on row-index lists into the caller's matrix, so
//! bootstrap samples never copy feature data.

use super::{RegressionLeaf, RegressionNode, RegressionTreeNode};
use crate::primitives::Matrix;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Growth limits shared by every node of one tree.
#[derive(Debug, Clone, Copy)]
pub(super) struct GrowthLimits {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
}

/// Best split found for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SplitCandidate {
    pub feature_idx: usize,
    pub threshold: f32,
    /// Reduction in summed squared error, `SSE(parent) - SSE(left) - SSE(right)`.
    pub gain: f64,
}

/// Draws `n_samples` row indices with replacement.
pub(super) fn bootstrap_sample(n_samples: usize, rng: &mut StdRng) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    (0..n_samples).map(|_| dist.sample(rng)).collect()
}

/// Mean and summed squared error of `y` over `rows`.
pub(super) fn mean_and_sse(y: &[f32], rows: &[usize]) -> (f64, f64) {
    let n = rows.len() as f64;
    let (sum, sum_sq) = rows.iter().fold((0.0_f64, 0.0_f64), |(s, sq), &r| {
        let v = f64::from(y[r]);
        (s + v, sq + v * v)
    });
    let mean = sum / n;
    (mean, (sum_sq - sum * mean).max(0.0))
}

/// Sweeps one feature's sorted values and returns the best threshold with
/// its SSE reduction.
///
/// Candidate thresholds sit midway between consecutive distinct values and
/// both children must keep at least `min_samples_leaf` rows.
pub(super) fn best_split_for_feature(
    x: &Matrix<f32>,
    y: &[f32],
    rows: &[usize],
    feature_idx: usize,
    min_samples_leaf: usize,
    scratch: &mut Vec<(f32, f32)>,
) -> Option<(f32, f64)> {
    let n = rows.len();
    if n < 2 * min_samples_leaf.max(1) {
        return None;
    }

    scratch.clear();
    scratch.extend(rows.iter().map(|&r| (x.get(r, feature_idx), y[r])));
    scratch.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let total: f64 = scratch.iter().map(|&(_, v)| f64::from(v)).sum();
    let baseline = total * total / n as f64;

    let mut best: Option<(f32, f64)> = None;
    let mut left_sum = 0.0_f64;
    for i in 0..n - 1 {
        left_sum += f64::from(scratch[i].1);
        let n_left = i + 1;
        let n_right = n - n_left;
        if n_right < min_samples_leaf {
            break;
        }
        if n_left < min_samples_leaf || scratch[i].0 >= scratch[i + 1].0 {
            continue;
        }

        let right_sum = total - left_sum;
        let gain = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64
            - baseline;
        if best.map_or(true, |(_, g)| gain > g) {
            best = Some((midpoint(scratch[i].0, scratch[i + 1].0), gain));
        }
    }
    best
}

// A midpoint that rounds up onto `hi` would send `hi` left.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = ((f64::from(lo) + f64::from(hi)) / 2.0) as f32;
    if mid < hi {
        mid
    } else {
        lo
    }
}

/// Searches a random subset of `max_features` features for the best split.
///
/// Features are visited in shuffled order. If none of the first
/// `max_features` admits a valid split, the search continues through the
/// remaining features until one does. Ties keep the earlier feature.
pub(super) fn find_best_split(
    x: &Matrix<f32>,
    y: &[f32],
    rows: &[usize],
    parent_sse: f64,
    limits: &GrowthLimits,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let mut features: Vec<usize> = (0..x.n_cols()).collect();
    features.shuffle(rng);

    let min_gain = parent_sse * f64::from(f32::EPSILON);
    let mut scratch = Vec::with_capacity(rows.len());
    let mut best: Option<SplitCandidate> = None;

    for (visited, &feature_idx) in features.iter().enumerate() {
        if visited >= limits.max_features && best.is_some() {
            break;
        }
        let Some((threshold, gain)) = best_split_for_feature(
            x,
            y,
            rows,
            feature_idx,
            limits.min_samples_leaf,
            &mut scratch,
        ) else {
            continue;
        };
        if gain <= min_gain {
            continue;
        }
        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature_idx,
                threshold,
                gain,
            });
        }
    }
    best
}

fn make_leaf(mean: f64, n_samples: usize) -> RegressionTreeNode {
    RegressionTreeNode::Leaf(RegressionLeaf {
        value: mean as f32,
        n_samples,
    })
}

/// Grows a regression tree over `rows` recursively.
pub(super) fn build_regression_tree(
    x: &Matrix<f32>,
    y: &[f32],
    rows: &[usize],
    depth: usize,
    limits: &GrowthLimits,
    rng: &mut StdRng,
) -> RegressionTreeNode {
    let n_samples = rows.len();
    let (mean, sse) = mean_and_sse(y, rows);

    if n_samples < limits.min_samples_split
        || n_samples < 2 * limits.min_samples_leaf
        || limits.max_depth.is_some_and(|d| depth >= d)
        || sse <= 1e-12
    {
        return make_leaf(mean, n_samples);
    }

    let Some(split) = find_best_split(x, y, rows, sse, limits, rng) else {
        return make_leaf(mean, n_samples);
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&r| x.get(r, split.feature_idx) <= split.threshold);

    let left = build_regression_tree(x, y, &left_rows, depth + 1, limits, rng);
    let right = build_regression_tree(x, y, &right_rows, depth + 1, limits, rng);

    RegressionTreeNode::Node(RegressionNode {
        feature_idx: split.feature_idx,
        threshold: split.threshold,
        n_samples,
        impurity_decrease: split.gain as f32,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Adds each split's SSE reduction to its feature's slot.
pub(super) fn accumulate_impurity_decrease(node: &RegressionTreeNode, importances: &mut [f32]) {
    if let RegressionTreeNode::Node(n) = node {
        importances[n.feature_idx] += n.impurity_decrease;
        accumulate_impurity_decrease(&n.left, importances);
        accumulate_impurity_decrease(&n.right, importances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn column(values: &[f32]) -> Matrix<f32> {
        Matrix::from_vec(values.len(), 1, values.to_vec()).expect("valid")
    }

    #[test]
    fn test_bootstrap_sample_is_reproducible() {
        let a = bootstrap_sample(50, &mut StdRng::seed_from_u64(7));
        let b = bootstrap_sample(50, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_mean_and_sse() {
        let (mean, sse) = mean_and_sse(&[1.0, 2.0, 3.0, 100.0], &[0, 1, 2]);
        assert!((mean - 2.0).abs() < 1e-12);
        assert!((sse - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_separates_step_function() {
        let x = column(&[1.0, 2.0, 3.0, 10.0, 11.0, 12.0]);
        let y = [5.0, 5.0, 5.0, 9.0, 9.0, 9.0];
        let rows: Vec<usize> = (0..6).collect();
        let (threshold, gain) =
            best_split_for_feature(&x, &y, &rows, 0, 1, &mut Vec::new()).expect("split");
        assert!((threshold - 6.5).abs() < 1e-6);
        // parent SSE = 6 * 4 = 24, children are pure
        assert!((gain - 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_split_respects_min_samples_leaf() {
        let x = column(&[1.0, 2.0, 3.0, 4.0]);
        let y = [0.0, 10.0, 10.0, 10.0];
        let rows: Vec<usize> = (0..4).collect();
        let (threshold, _) =
            best_split_for_feature(&x, &y, &rows, 0, 2, &mut Vec::new()).expect("split");
        assert!((threshold - 2.5).abs() < 1e-6);
        assert!(best_split_for_feature(&x, &y, &rows, 0, 3, &mut Vec::new()).is_none());
    }

    #[test]
    fn test_constant_feature_has_no_split() {
        let x = column(&[4.0, 4.0, 4.0]);
        let rows = [0, 1, 2];
        assert!(best_split_for_feature(&x, &[1.0, 2.0, 3.0], &rows, 0, 1, &mut Vec::new()).is_none());
    }

    #[test]
    fn test_duplicate_rows_from_bootstrap() {
        let x = column(&[1.0, 5.0]);
        let y = [0.0, 8.0];
        let rows = [0, 0, 1, 1, 1];
        let (threshold, _) =
            best_split_for_feature(&x, &y, &rows, 0, 1, &mut Vec::new()).expect("split");
        assert!((threshold - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint_never_reaches_upper_value() {
        let lo = 1.0_f32;
        let hi = f32::from_bits(lo.to_bits() + 1);
        let mid = midpoint(lo, hi);
        assert!(mid < hi);
        assert!(mid >= lo);
    }

    #[test]
    fn test_find_best_split_falls_back_past_max_features() {
        // feature 0 is constant, feature 1 carries the signal
        let x = Matrix::from_vec(4, 2, vec![1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0])
            .expect("valid");
        let y = [0.0, 0.0, 1.0, 1.0];
        let rows = [0, 1, 2, 3];
        let limits = GrowthLimits {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 1,
        };
        for seed in 0..8 {
            let split = find_best_split(&x, &y, &rows, 1.0, &limits, &mut StdRng::seed_from_u64(seed))
                .expect("a split exists on feature 1");
            assert_eq!(split.feature_idx, 1);
        }
    }
}
