//! CART decision tree classifier

use crate::error::{FitLabError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the class histogram of its training samples
    Leaf {
        class_counts: Vec<usize>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    Gini,
    Entropy,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
    /// Sorted distinct labels seen during fit
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(FitLabError::Shape {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(FitLabError::Training(format!(
                "cannot fit on a {}x{} matrix",
                n_samples, n_features
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FitLabError::DataInvalid(
                "inputs contain NaN or infinite values".to_string(),
            ));
        }

        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        let labels: Vec<usize> = y
            .iter()
            .map(|v| classes.partition_point(|c| c < v))
            .collect();

        self.classes = classes;
        self.n_features = n_features;

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_tree(x, &labels, &indices, 0, &mut importances);
        self.root = Some(root);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn class_counts(&self, labels: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[labels[i]] += 1;
        }
        counts
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        labels: &[usize],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(labels, indices);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure;

        if should_stop {
            return TreeNode::Leaf {
                class_counts: counts,
                n_samples,
            };
        }

        let parent_impurity = self.impurity(&counts, n_samples);
        let Some((feature_idx, threshold, gain)) =
            self.find_best_split(x, labels, indices, parent_impurity)
        else {
            return TreeNode::Leaf {
                class_counts: counts,
                n_samples,
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, labels, &left_indices, depth + 1, importances));
        let right = Box::new(self.build_tree(x, labels, &right_indices, depth + 1, importances));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    /// Best (feature, threshold, gain) over all features; ties keep the lower feature index
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        labels: &[usize],
        indices: &[usize],
        parent_impurity: f64,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let n_classes = self.classes.len();

        // Each feature is scanned independently; results come back in feature order
        let feature_results: Vec<Option<(usize, f64, f64)>> = (0..x.ncols())
            .into_par_iter()
            .map(|feature_idx| {
                let mut pairs: Vec<(f64, usize)> = indices
                    .iter()
                    .map(|&i| (x[[i, feature_idx]], labels[i]))
                    .collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut left_counts = vec![0usize; n_classes];
                let mut right_counts = vec![0usize; n_classes];
                for &(_, label) in &pairs {
                    right_counts[label] += 1;
                }

                let mut best: Option<(f64, f64)> = None;
                for pos in 0..n - 1 {
                    let label = pairs[pos].1;
                    left_counts[label] += 1;
                    right_counts[label] -= 1;

                    let (value, next) = (pairs[pos].0, pairs[pos + 1].0);
                    if value == next {
                        continue;
                    }
                    let left_n = pos + 1;
                    let right_n = n - left_n;
                    if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                        continue;
                    }

                    let weighted = (left_n as f64 * self.impurity(&left_counts, left_n)
                        + right_n as f64 * self.impurity(&right_counts, right_n))
                        / n as f64;
                    let gain = parent_impurity - weighted;
                    if gain > best.map_or(1e-12, |(_, g)| g) {
                        best = Some(((value + next) / 2.0, gain));
                    }
                }

                best.map(|(threshold, gain)| (feature_idx, threshold, gain))
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<(usize, f64, f64)>, cand| match acc {
                Some(best) if best.2 >= cand.2 => Some(best),
                _ => Some(cand),
            })
    }

    fn impurity(&self, counts: &[usize], n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        match self.criterion {
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.log2()
                })
                .sum::<f64>(),
        }
    }

    fn leaf_for<'a>(&'a self, node: &'a TreeNode, sample: ArrayView1<f64>) -> &'a [usize] {
        match node {
            TreeNode::Leaf { class_counts, .. } => class_counts,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature_idx] <= *threshold {
                    self.leaf_for(left, sample)
                } else {
                    self.leaf_for(right, sample)
                }
            }
        }
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<&TreeNode> {
        let root = self.root.as_ref().ok_or(FitLabError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(FitLabError::Shape {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(root)
    }

    /// Predict class labels; ties in a leaf go to the smallest label
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.check_input(x)?;
        let predictions: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let counts = self.leaf_for(root, row);
                let best = counts
                    .iter()
                    .enumerate()
                    .fold((0, 0), |acc, (i, &c)| if c > acc.1 { (i, c) } else { acc });
                self.classes[best.0]
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }

    /// Class frequencies of the reached leaf, one column per entry of [`classes`](Self::classes)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.check_input(x)?;
        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));
        for (r, row) in x.rows().into_iter().enumerate() {
            let counts = self.leaf_for(root, row);
            let total: usize = counts.iter().sum();
            for (c, &count) in counts.iter().enumerate() {
                proba[[r, c]] = if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                };
            }
        }
        Ok(proba)
    }

    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of split levels on the longest path
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_simple() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0],];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
        assert_eq!(tree.get_depth(), 1);
        assert_eq!(tree.get_n_leaves(), 2);
    }

    #[test]
    fn test_max_depth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(2);
        tree.fit(&x, &y).unwrap();
        assert!(tree.get_depth() <= 2);

        let mut deep = DecisionTree::new();
        deep.fit(&x, &y).unwrap();
        assert_eq!(deep.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0.0, 1.0, 1.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new().with_min_samples_leaf(2);
        tree.fit(&x, &y).unwrap();

        fn min_leaf(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { n_samples, .. } => *n_samples,
                TreeNode::Split { left, right, .. } => min_leaf(left).min(min_leaf(right)),
            }
        }
        assert!(min_leaf(tree.root.as_ref().unwrap()) >= 2);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let x = array![[1.0], [1.0], [1.0], [2.0], [2.0], [2.0]];
        let y = array![0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&array![[1.0], [2.0]]).unwrap();
        assert!((proba[[0, 1]] - 1.0 / 3.0).abs() < 1e-12);
        assert!((proba[[1, 1]] - 1.0).abs() < 1e-12);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tie_predicts_smallest_class() {
        let x = array![[1.0], [1.0]];
        let y = array![1.0, 0.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), array![0.0, 0.0]);
    }

    #[test]
    fn test_feature_importances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0],];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new().with_criterion(Criterion::Entropy);
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_unfitted_and_shape_errors() {
        let tree = DecisionTree::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(FitLabError::ModelNotFitted)
        ));

        let mut tree = DecisionTree::new();
        let err = tree.fit(&array![[1.0], [2.0]], &array![0.0]).unwrap_err();
        assert!(matches!(err, FitLabError::Shape { .. }));

        let err = tree
            .fit(&array![[f64::NAN], [2.0]], &array![0.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, FitLabError::DataInvalid(_)));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let x = array![[3.0, 1.0], [1.0, 2.0], [4.0, 1.0], [1.0, 5.0], [5.0, 9.0], [2.0, 6.0]];
        let y = array![1.0, 0.0, 1.0, 0.0, 1.0, 0.0];

        let mut a = DecisionTree::new();
        a.fit(&x, &y).unwrap();
        let mut b = DecisionTree::new();
        b.fit(&x, &y).unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
