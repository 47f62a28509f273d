//! Topological ordering of the graph behind a root node.

use super::tensor::{NodeId, TrackedTensor};
use crate::scalar::Scalar;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Order every non-constant node reachable from `root` so that each node
/// comes before all of its inputs.
///
/// This is the reversed depth-first postorder: `root` first, leaves last.
/// Each node appears exactly once, however many paths lead to it. Inputs
/// are explored oldest first by [`NodeId`], so the result does not depend
/// on hash order or argument order. The traversal is iterative and does
/// not recurse on deep graphs.
pub fn topological_order<T: Scalar>(root: &TrackedTensor<T>) -> Vec<TrackedTensor<T>> {
    let mut order = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    // (node, inputs already pushed)
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if node.is_constant() || !visited.insert(node.id()) {
            continue;
        }
        let mut parents: Vec<TrackedTensor<T>> = node
            .parents()
            .iter()
            .filter(|p| !p.is_constant() && !visited.contains(&p.id()))
            .cloned()
            .collect();
        // popped last-in first, so the oldest input is expanded first
        parents.sort_by_key(|p| Reverse(p.id()));
        stack.push((node, true));
        stack.extend(parents.into_iter().map(|p| (p, false)));
    }

    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tensor;
    use std::collections::HashMap;

    fn position<T: Scalar>(order: &[TrackedTensor<T>]) -> HashMap<NodeId, usize> {
        order.iter().enumerate().map(|(i, t)| (t.id(), i)).collect()
    }

    #[test]
    fn test_single_leaf() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let order = topological_order(&x);
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].id(), x.id());
    }

    #[test]
    fn test_constant_root_is_empty() {
        let c = TrackedTensor::new(Tensor::<f64>::ones(&[1]));
        assert!(topological_order(&c).is_empty());
    }

    #[test]
    fn test_diamond_visits_once() {
        // x -> a, x -> b, (a, b) -> y
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let a = x.exp().unwrap();
        let b = x.neg().unwrap();
        let y = a.mul(&b).unwrap();

        let order = topological_order(&y);
        assert_eq!(order.len(), 4);
        let pos = position(&order);
        assert_eq!(pos.len(), 4);

        assert_eq!(pos[&y.id()], 0);
        assert!(pos[&a.id()] < pos[&x.id()]);
        assert!(pos[&b.id()] < pos[&x.id()]);
        assert_eq!(pos[&x.id()], 3);
    }

    #[test]
    fn test_constants_are_skipped() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let c = TrackedTensor::new(Tensor::<f64>::ones(&[1]));
        let y = x.add(&c).unwrap();

        let order = topological_order(&y);
        let ids: Vec<NodeId> = order.iter().map(TrackedTensor::id).collect();
        assert_eq!(ids, vec![y.id(), x.id()]);
    }

    #[test]
    fn test_inputs_expanded_by_creation_order() {
        let older = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let newer = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));

        let y = newer.mul(&older).unwrap();
        let ids: Vec<NodeId> = topological_order(&y).iter().map(TrackedTensor::id).collect();
        assert_eq!(ids, vec![y.id(), newer.id(), older.id()]);

        let z = older.mul(&newer).unwrap();
        let ids: Vec<NodeId> = topological_order(&z).iter().map(TrackedTensor::id).collect();
        assert_eq!(ids, vec![z.id(), newer.id(), older.id()]);
    }

    #[test]
    fn test_deep_chain() {
        let x = TrackedTensor::leaf(Tensor::<f64>::ones(&[1]));
        let mut y = x.clone();
        for _ in 0..2_000 {
            y = y.neg().unwrap();
        }
        let order = topological_order(&y);
        assert_eq!(order.len(), 2_001);
        assert_eq!(order.last().unwrap().id(), x.id());
    }
}
