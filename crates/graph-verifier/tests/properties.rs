//! Property tests over small random graphs.

use graph_verifier::{
    bfs, bfs_depths, check_bfs, check_dfs, dfs, dijkstra, kruskal, nearest_neighbor, solve,
    tour_weight, verify, AlgorithmClass, Edge, Graph, NodeId, NodeSpec, Puzzle, Solution,
    SpanningTreePolicy, VerifierConfig,
};
use proptest::prelude::*;

/// Up to seven nodes and a few parallel edges; self-loops are dropped.
fn graph_input() -> impl Strategy<Value = (Vec<NodeId>, Vec<Edge>)> {
    (1usize..8)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n, 0u64..20), 0..n * 3)))
        .prop_map(|(n, raw)| {
            let ids: Vec<NodeId> = (0..n).map(|i| NodeId::new(format!("N{i}"))).collect();
            let edges = raw
                .into_iter()
                .filter(|(a, b, _)| a != b)
                .map(|(a, b, w)| Edge::new(ids[a].clone(), ids[b].clone(), w))
                .collect();
            (ids, edges)
        })
}

/// Cheapest simple path by exhaustive search.
fn brute_force_cost(graph: &Graph, start: usize, end: usize) -> Option<u64> {
    fn walk(
        graph: &Graph,
        node: usize,
        end: usize,
        cost: u64,
        seen: &mut [bool],
        best: &mut Option<u64>,
    ) {
        if node == end {
            *best = Some(best.map_or(cost, |b| b.min(cost)));
            return;
        }
        for &(next, w) in graph.neighbors(node) {
            if !seen[next] {
                seen[next] = true;
                walk(graph, next, end, cost + w, seen, best);
                seen[next] = false;
            }
        }
    }

    let mut seen = vec![false; graph.len()];
    seen[start] = true;
    let mut best = None;
    walk(graph, start, end, 0, &mut seen, &mut best);
    best
}

proptest! {
    #[test]
    fn bfs_order_never_decreases_in_depth((ids, edges) in graph_input()) {
        let graph = Graph::build(&ids, &edges).unwrap();
        for start in 0..graph.len() {
            let order = bfs(&graph, start);
            let depths = bfs_depths(&graph, start);
            for pair in order.windows(2) {
                prop_assert!(depths[pair[0]] <= depths[pair[1]]);
            }
            prop_assert_eq!(check_bfs(&graph, start, &graph.ids_of(&order)), Ok(()));
        }
    }

    #[test]
    fn dfs_order_extends_the_current_path((ids, edges) in graph_input()) {
        let graph = Graph::build(&ids, &edges).unwrap();
        for start in 0..graph.len() {
            let order = dfs(&graph, start);
            for (i, &node) in order.iter().enumerate().skip(1) {
                prop_assert!(order[..i].iter().any(|&seen| graph.is_adjacent(seen, node)));
            }
            prop_assert_eq!(check_dfs(&graph, start, &graph.ids_of(&order)), Ok(()));
        }
    }

    #[test]
    fn dijkstra_matches_brute_force((ids, edges) in graph_input()) {
        let graph = Graph::build(&ids, &edges).unwrap();
        for start in 0..graph.len() {
            for end in 0..graph.len() {
                let found = dijkstra(&graph, start, end);
                prop_assert_eq!(
                    found.as_ref().map(|p| p.total_cost),
                    brute_force_cost(&graph, start, end)
                );
                if let Some(found) = found {
                    prop_assert_eq!(found.path.first(), Some(&start));
                    prop_assert_eq!(found.path.last(), Some(&end));
                }
            }
        }
    }

    #[test]
    fn kruskal_builds_a_spanning_forest((ids, edges) in graph_input()) {
        let graph = Graph::build(&ids, &edges).unwrap();
        let forest = kruskal(&graph);
        prop_assert_eq!(forest.len(), graph.len() - graph.component_count());

        // Same components with n - c edges means no edge closes a cycle.
        let spanned = Graph::build(&ids, &forest).unwrap();
        prop_assert_eq!(spanned.component_count(), graph.component_count());
    }

    #[test]
    fn closed_heuristic_tours_are_weighed_correctly((ids, edges) in graph_input()) {
        let graph = Graph::build(&ids, &edges).unwrap();
        for start in 0..graph.len() {
            let found = nearest_neighbor(&graph, start);
            prop_assert_eq!(found.tour.first(), Some(&start));
            prop_assert_eq!(found.tour.last(), Some(&start));
            if found.tour.len() == graph.len() + 1 {
                prop_assert_eq!(found.total_weight, tour_weight(&graph, &found.tour).ok());
            } else {
                // Stuck before visiting everything.
                prop_assert_eq!(found.total_weight, None);
            }
        }
    }

    #[test]
    fn canonical_answers_always_verify(
        (ids, edges) in graph_input(),
        start in 0usize..8,
        end in 0usize..8,
    ) {
        let start = ids[start % ids.len()].clone();
        let end = ids[end % ids.len()].clone();
        let nodes: Vec<NodeSpec> = ids.iter().cloned().map(NodeSpec::Id).collect();

        for class in [
            AlgorithmClass::BfsTraversal,
            AlgorithmClass::DfsTraversal,
            AlgorithmClass::ShortestPath,
            AlgorithmClass::SpanningTree,
            AlgorithmClass::TourHeuristic,
        ] {
            let instance = Puzzle::new(class, nodes.clone(), edges.clone())
                .with_start(start.clone())
                .with_end(end.clone())
                .instance()
                .unwrap();
            let first = solve(&instance).unwrap();
            prop_assert_eq!(&first, &solve(&instance).unwrap());

            let Some(solution) = first else { continue };
            // An open heuristic tour leans on a missing edge; it is no answer.
            if matches!(solution, Solution::Tour { total_weight: None, .. }) {
                continue;
            }
            for policy in [SpanningTreePolicy::CanonicalOnly, SpanningTreePolicy::AnyMinimum] {
                let config = VerifierConfig { spanning_tree_policy: policy };
                let answer = solution.to_answer();
                let verdict = verify(&instance, &answer, &solution, &config).unwrap();
                prop_assert!(
                    verdict.is_correct,
                    "{} rejected its own answer: {}",
                    class,
                    verdict.feedback
                );
            }
        }
    }
}
