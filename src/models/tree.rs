//! CART regression tree, the base learner for gradient boosting.

enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A depth-limited regression tree grown by greedy variance reduction.
///
/// Split candidates are midpoints between consecutive distinct feature
/// values; `x <= threshold` descends left. A node becomes a leaf (predicting
/// its mean target) when the depth limit is reached, fewer than two samples
/// remain, or no split reduces the squared error.
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Grow a tree over the given feature rows and targets.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], max_depth: usize) -> Self {
        let indices: Vec<usize> = (0..rows.len()).collect();
        Self {
            root: grow(rows, targets, indices, max_depth),
        }
    }

    /// Predict one feature row.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn grow(rows: &[Vec<f64>], targets: &[f64], indices: Vec<usize>, depth_left: usize) -> Node {
    let mean = node_mean(targets, &indices);
    if depth_left == 0 || indices.len() < 2 {
        return Node::Leaf { value: mean };
    }

    let Some((feature, threshold)) = best_split(rows, targets, &indices) else {
        return Node::Leaf { value: mean };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| rows[i][feature] <= threshold);
    if left.is_empty() || right.is_empty() {
        return Node::Leaf { value: mean };
    }

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(rows, targets, left, depth_left - 1)),
        right: Box::new(grow(rows, targets, right, depth_left - 1)),
    }
}

fn node_mean(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// Best (feature, threshold) by summed squared error of the two children,
/// or `None` when no candidate improves on the unsplit node.
fn best_split(rows: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let base_sse = total_sq - total_sum * total_sum / n;

    let width = rows[indices[0]].len();
    let mut best: Option<(f64, usize, f64)> = None;

    for feature in 0..width {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..order.len() {
            let prev = targets[order[k - 1]];
            left_sum += prev;
            left_sq += prev * prev;

            let v_prev = rows[order[k - 1]][feature];
            let v_next = rows[order[k]][feature];
            if v_prev == v_next {
                continue;
            }

            let left_n = k as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().map_or(true, |(s, _, _)| sse < *s) {
                best = Some((sse, feature, (v_prev + v_next) / 2.0));
            }
        }
    }

    best.and_then(|(sse, feature, threshold)| {
        if sse < base_sse - 1e-12 {
            Some((feature, threshold))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn constant_targets_become_a_single_leaf() {
        let rows = column(&[1.0, 2.0, 3.0, 4.0]);
        let targets = vec![5.0; 4];
        let tree = RegressionTree::fit(&rows, &targets, 3);

        assert_relative_eq!(tree.predict(&[0.0]), 5.0);
        assert_relative_eq!(tree.predict(&[10.0]), 5.0);
    }

    #[test]
    fn step_function_splits_exactly() {
        let rows = column(&[1.0, 2.0, 3.0, 10.0, 11.0, 12.0]);
        let targets = vec![0.0, 0.0, 0.0, 100.0, 100.0, 100.0];
        let tree = RegressionTree::fit(&rows, &targets, 3);

        assert_relative_eq!(tree.predict(&[2.0]), 0.0);
        assert_relative_eq!(tree.predict(&[11.0]), 100.0);
        // Threshold sits at the midpoint of the gap.
        assert_relative_eq!(tree.predict(&[6.0]), 0.0);
        assert_relative_eq!(tree.predict(&[7.0]), 100.0);
    }

    #[test]
    fn depth_zero_predicts_the_mean() {
        let rows = column(&[1.0, 2.0, 3.0, 4.0]);
        let targets = vec![0.0, 0.0, 100.0, 100.0];
        let tree = RegressionTree::fit(&rows, &targets, 0);

        assert_relative_eq!(tree.predict(&[1.0]), 50.0);
    }

    #[test]
    fn picks_the_informative_feature() {
        // Feature 0 is noise, feature 1 determines the target.
        let rows = vec![
            vec![5.0, 1.0],
            vec![1.0, 1.0],
            vec![4.0, 9.0],
            vec![2.0, 9.0],
        ];
        let targets = vec![0.0, 0.0, 50.0, 50.0];
        let tree = RegressionTree::fit(&rows, &targets, 2);

        assert_relative_eq!(tree.predict(&[3.0, 1.0]), 0.0);
        assert_relative_eq!(tree.predict(&[3.0, 9.0]), 50.0);
    }

    #[test]
    fn single_sample_is_a_leaf() {
        let rows = column(&[1.0]);
        let targets = vec![7.0];
        let tree = RegressionTree::fit(&rows, &targets, 3);

        assert_relative_eq!(tree.predict(&[99.0]), 7.0);
    }
}
