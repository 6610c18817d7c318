//! Property-based tests for the dynamic k-d tree.

use proptest::prelude::*;
use spart::space::L2Squared;
use spart::tree::Tree;
use std::cmp::Ordering;

prop_compose! {
    fn arb_point_2d()(x in -1000.0..1000.0, y in -1000.0..1000.0) -> (f64, f64) {
        (x, y)
    }
}

fn brute_knn_distances(points: &[(f64, f64)], target: (f64, f64), k: usize) -> Vec<f64> {
    let mut distances: Vec<f64> = points
        .iter()
        .map(|p| (p.0 - target.0).powi(2) + (p.1 - target.1).powi(2))
        .collect();
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    distances.into_iter().take(k).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn knn_matches_bruteforce(
        coords in prop::collection::vec(arb_point_2d(), 1..60),
        target in arb_point_2d(),
        k in 1usize..20
    ) {
        let mut tree = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            tree.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let k = k.min(coords.len());
        let knn = tree.search_knn(&[target.0, target.1], k);
        let brute = brute_knn_distances(&coords, target, k);
        let got: Vec<f64> = knn.iter().map(|(d, _)| *d).collect();

        prop_assert_eq!(got.len(), k);
        for i in 1..got.len() {
            prop_assert!(got[i - 1] <= got[i] + 1e-6);
        }
        for (g, e) in got.iter().zip(brute.iter()) {
            prop_assert!((g - e).abs() <= 1e-6);
        }
    }

    #[test]
    fn search_ball_matches_bruteforce(
        coords in prop::collection::vec(arb_point_2d(), 1..60),
        target in arb_point_2d(),
        radius in 0.0..500.0
    ) {
        let mut tree = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            tree.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let results = tree.search_ball(&[target.0, target.1], radius);
        let mut expected: Vec<i32> = coords
            .iter()
            .enumerate()
            .filter(|(_, (x, y))| (x - target.0).powi(2) + (y - target.1).powi(2) < radius)
            .map(|(idx, _)| idx as i32)
            .collect();
        let mut got: Vec<i32> = results.iter().map(|(_, id)| *id).collect();
        expected.sort();
        got.sort();

        prop_assert_eq!(got, expected);
    }

    #[test]
    fn capacity_limited_ball_is_prefix_of_ball(
        coords in prop::collection::vec(arb_point_2d(), 1..60),
        target in arb_point_2d(),
        radius in 0.0..500.0,
        k in 1usize..20
    ) {
        let mut tree = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            tree.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let ball = tree.search_ball(&[target.0, target.1], radius);
        let limited = tree.search_capacity_limited_ball(&[target.0, target.1], radius, k);

        prop_assert_eq!(limited.len(), k.min(ball.len()));
        for (a, b) in limited.iter().zip(ball.iter()) {
            prop_assert!((a.0 - b.0).abs() <= 1e-9);
        }
    }

    #[test]
    fn insertion_order_does_not_affect_query_results(
        coords in prop::collection::vec(arb_point_2d(), 1..40),
        target in arb_point_2d(),
    ) {
        let mut forward = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            forward.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let mut backward = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate().rev() {
            backward.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let k = coords.len();
        let mut a = forward.search_knn(&[target.0, target.1], k);
        let mut b = backward.search_knn(&[target.0, target.1], k);
        a.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap().then(x.1.cmp(&y.1)));
        b.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap().then(x.1.cmp(&y.1)));

        prop_assert_eq!(a, b);
    }

    #[test]
    fn deferred_build_matches_eager_build(
        coords in prop::collection::vec(arb_point_2d(), 1..50),
        target in arb_point_2d(),
    ) {
        let mut eager = Tree::new_2d(6).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            eager.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        let mut deferred = Tree::new_2d(6).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            deferred.add_point(&[*x, *y], idx as i32, false).unwrap();
        }
        deferred.split_outstanding().unwrap();

        let k = coords.len();
        let mut a = eager.search_knn(&[target.0, target.1], k);
        let mut b = deferred.search_knn(&[target.0, target.1], k);
        a.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap().then(x.1.cmp(&y.1)));
        b.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap().then(x.1.cmp(&y.1)));

        prop_assert_eq!(a, b);
    }

    #[test]
    fn self_query_finds_zero_distance(
        coords in prop::collection::vec(arb_point_2d(), 1..40),
    ) {
        let mut tree = Tree::new_2d(4).unwrap();
        for (idx, (x, y)) in coords.iter().enumerate() {
            tree.add_point(&[*x, *y], idx as i32, true).unwrap();
        }

        for (x, y) in &coords {
            let (d, _) = tree.search(&[*x, *y]).unwrap();
            prop_assert!(d.abs() < 1e-9);
        }
    }
}

#[test]
fn metric_space_type_is_l2_squared() {
    let tree: Tree<L2Squared, i32> = Tree::new(L2Squared::new(2), 8).unwrap();
    assert_eq!(tree.dim(), 2);
}
