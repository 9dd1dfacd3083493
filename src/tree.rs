//! Decision Tree Weak Learner
//!
//! A shallow regression tree fit greedily to pseudo-residuals. Split finding
//! works on the residuals, while leaf values are delegated to the objective
//! so each loss can place its own optimal constant in a leaf.
use crate::data::Matrix;
use crate::node::Node;
use crate::splitter::Splitter;
use hashbrown::HashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::max;
use std::collections::VecDeque;
use std::fmt::{self, Display};

type LeafFn = fn(&[f64], &[f64], Option<f64>) -> f64;

/// Frontier entry of a node that may still be split. The samples of the
/// node are `index[start_idx..stop_idx]` of the tree's shared index buffer.
struct SplittableNode {
    num: usize,
    depth: usize,
    start_idx: usize,
    stop_idx: usize,
}

/// A fitted regression tree. Nodes are stored in an arena indexed by the
/// order of creation, with the root at position zero. Once fit, a tree is
/// never mutated.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub depth: usize,
    pub n_leaves: usize,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            depth: 0,
            n_leaves: 0,
        }
    }

    /// Fit the tree to the pseudo-residuals `grad`.
    ///
    /// * `data` - The feature matrix.
    /// * `index` - Row indices of the samples this tree trains on.
    /// * `grad` - Pseudo-residuals, indexed by row, split finding target.
    /// * `y` - True targets, indexed by row, used for leaf values only.
    /// * `yhat` - Current ensemble predictions, indexed by row, used for
    ///   leaf values only.
    /// * `leaf_value_fn` - The objective's optimal-constant rule.
    /// * `alpha` - Quantile level, where the objective needs one.
    /// * `splitter` - The split searcher carrying node-size constraints.
    /// * `max_depth` - Maximum depth of any leaf below the root.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self,
        data: &Matrix<f64>,
        mut index: Vec<usize>,
        grad: &[f64],
        y: &[f64],
        yhat: &[f64],
        leaf_value_fn: LeafFn,
        alpha: Option<f64>,
        splitter: &Splitter,
        max_depth: usize,
    ) {
        let root_weight = leaf_weight(&index, y, yhat, leaf_value_fn, alpha);
        self.nodes.push(Node::new_leaf(0, root_weight, 0, index.len()));
        self.n_leaves = 1;

        let mut growable: VecDeque<SplittableNode> = VecDeque::new();
        growable.push_front(SplittableNode {
            num: 0,
            depth: 0,
            start_idx: 0,
            stop_idx: index.len(),
        });

        while let Some(snode) = growable.pop_back() {
            if snode.depth >= max_depth {
                continue;
            }

            let node_index = &mut index[snode.start_idx..snode.stop_idx];
            let split_info = match splitter.best_split(data, node_index, grad) {
                Some(split_info) => split_info,
                // Degenerate or undersized nodes simply stay leaves.
                None => continue,
            };

            let (left_index, right_index) = node_index.split_at(split_info.n_left);
            let left_weight = leaf_weight(left_index, y, yhat, leaf_value_fn, alpha);
            let right_weight = leaf_weight(right_index, y, yhat, leaf_value_fn, alpha);

            let left_child = self.nodes.len();
            let right_child = left_child + 1;
            self.nodes
                .push(Node::new_leaf(left_child, left_weight, snode.depth + 1, left_index.len()));
            self.nodes
                .push(Node::new_leaf(right_child, right_weight, snode.depth + 1, right_index.len()));
            self.nodes[snode.num].make_parent_node(
                split_info.split_feature,
                split_info.split_value,
                split_info.split_gain,
                left_child,
                right_child,
            );
            self.depth = max(self.depth, snode.depth + 1);
            self.n_leaves += 1;

            let boundary = snode.start_idx + split_info.n_left;
            growable.push_front(SplittableNode {
                num: left_child,
                depth: snode.depth + 1,
                start_idx: snode.start_idx,
                stop_idx: boundary,
            });
            growable.push_front(SplittableNode {
                num: right_child,
                depth: snode.depth + 1,
                start_idx: boundary,
                stop_idx: snode.stop_idx,
            });
        }
    }

    fn predict_row(&self, data: &Matrix<f64>, row: usize) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value;
            }
            node_idx = node.get_child_idx(data.get(row, node.split_feature));
        }
    }

    /// Route a single row slice down to its leaf constant.
    pub fn predict_row_from_row_slice(&self, row: &[f64]) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.is_leaf {
                return node.weight_value;
            }
            node_idx = node.get_child_idx(&row[node.split_feature]);
        }
    }

    /// Generate predictions for the given data.
    ///
    /// * `data` - The feature matrix.
    /// * `parallel` - If `true`, rows are predicted in parallel using Rayon.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        if parallel {
            data.index.par_iter().map(|i| self.predict_row(data, *i)).collect()
        } else {
            data.index.iter().map(|i| self.predict_row(data, *i)).collect()
        }
    }

    fn get_node_stats<F>(&self, calc_stat: &F, stats: &mut HashMap<usize, (f64, usize)>)
    where
        F: Fn(&Node) -> f64,
    {
        for node in self.nodes.iter().filter(|n| !n.is_leaf) {
            stats
                .entry(node.split_feature)
                .and_modify(|(v, c)| {
                    *v += calc_stat(node);
                    *c += 1;
                })
                .or_insert((calc_stat(node), 1));
        }
    }

    pub fn calculate_importance_weight(&self, stats: &mut HashMap<usize, (f64, usize)>) {
        self.get_node_stats(&|_: &Node| 1., stats);
    }

    pub fn calculate_importance_gain(&self, stats: &mut HashMap<usize, (f64, usize)>) {
        self.get_node_stats(&|n: &Node| n.split_gain, stats);
    }

    pub fn calculate_importance_cover(&self, stats: &mut HashMap<usize, (f64, usize)>) {
        self.get_node_stats(&|n: &Node| n.counts as f64, stats);
    }
}

fn leaf_weight(index: &[usize], y: &[f64], yhat: &[f64], leaf_value_fn: LeafFn, alpha: Option<f64>) -> f64 {
    let y_node: Vec<f64> = index.iter().map(|i| y[*i]).collect();
    let yhat_node: Vec<f64> = index.iter().map(|i| yhat[*i]).collect();
    leaf_value_fn(&y_node, &yhat_node, alpha)
}

impl Display for Tree {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut print_buffer: Vec<usize> = vec![0];
        let mut r = String::new();
        while let Some(idx) = print_buffer.pop() {
            let node = &self.nodes[idx];
            r += format!("{}{}\n", "      ".repeat(node.depth).as_str(), node).as_str();
            if !node.is_leaf {
                print_buffer.push(node.right_child);
                print_buffer.push(node.left_child);
            }
        }
        write!(f, "{}", r)
    }
}
