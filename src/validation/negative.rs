//! Negative edge sampling.
//!
//! Node pairs are drawn uniformly and accepted if the 2 nodes differ, are not linked
//! (in any orientation) in the reference graph and were not already accepted.
//! This is rejection sampling, it degrades on dense graphs. To never loop forever
//! the number of pairs available is checked before sampling and the number of draws is capped.

use indexmap::IndexSet;
use petgraph::EdgeType;
use rand::distributions::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::BenchError;
use crate::graph::{GraphData, NodeId};

/// The number of draws allowed is NB_TRY_FACTOR * nb_sample * (1 + nb_ordered_pairs / nb_available)
pub const NB_TRY_FACTOR: usize = 100;

/// Number of pairs the sampler can return. For an undirected graph a pair is unordered,
/// for a directed graph (u,v) and (v,u) are 2 distinct negative edges, both excluded as soon as u and v are linked.
pub fn nb_available_pairs<Ty: EdgeType>(graph: &GraphData<Ty>) -> usize {
    let nb_nodes = graph.get_nb_nodes();
    let nb_unordered = nb_nodes * nb_nodes.saturating_sub(1) / 2;
    let nb_unlinked = nb_unordered - graph.get_nb_linked_pairs();
    if graph.is_directed() {
        2 * nb_unlinked
    } else {
        nb_unlinked
    }
} // end of nb_available_pairs

/// Returns nb_sample distinct node pairs (as node ranks of graph) that are not edges of graph.
/// Pairs are returned in order of acceptance, an undirected pair is given with smaller rank first.
///
/// Errors with InfeasibleSample if nb_sample exceeds [nb_available_pairs],
/// and with SamplingCapExceeded if draws are exhausted before nb_sample pairs are accepted.
pub fn sample_negative_ranks<Ty: EdgeType>(
    graph: &GraphData<Ty>,
    nb_sample: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Vec<(usize, usize)>, BenchError> {
    if nb_sample == 0 {
        return Ok(Vec::new());
    }
    let available = nb_available_pairs(graph);
    if nb_sample > available {
        log::error!(
            "cannot sample {} negative edges, only {} pairs available",
            nb_sample,
            available
        );
        return Err(BenchError::InfeasibleSample {
            requested: nb_sample,
            available,
        });
    }
    let nb_nodes = graph.get_nb_nodes();
    let density_factor = 1 + (nb_nodes * nb_nodes) / available;
    let nb_try_max = NB_TRY_FACTOR
        .saturating_mul(nb_sample)
        .saturating_mul(density_factor);
    log::debug!(
        "sampling {} negative edges, {} pairs available, max nb draws : {}",
        nb_sample,
        available,
        nb_try_max
    );
    sample_negative_ranks_with_cap(graph, nb_sample, nb_try_max, rng)
} // end of sample_negative_ranks

/// The rejection loop of [sample_negative_ranks], stopping with SamplingCapExceeded after nb_try_max draws.
/// Feasibility is not checked here.
pub(crate) fn sample_negative_ranks_with_cap<Ty: EdgeType>(
    graph: &GraphData<Ty>,
    nb_sample: usize,
    nb_try_max: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Vec<(usize, usize)>, BenchError> {
    let directed = graph.is_directed();
    let node_random = Uniform::<usize>::from(0..graph.get_nb_nodes().max(1));
    let mut selected = IndexSet::<(usize, usize)>::with_capacity(nb_sample);
    let mut nb_try: usize = 0;
    while selected.len() < nb_sample {
        if nb_try >= nb_try_max {
            log::error!(
                "negative sampling stopped after {} draws, {} accepted out of {}",
                nb_try,
                selected.len(),
                nb_sample
            );
            return Err(BenchError::SamplingCapExceeded {
                requested: nb_sample,
                accepted: selected.len(),
                nb_try,
            });
        }
        nb_try += 1;
        let i = node_random.sample(rng);
        let j = node_random.sample(rng);
        if i == j || graph.is_linked(i, j) {
            continue;
        }
        let key = if directed || i < j { (i, j) } else { (j, i) };
        selected.insert(key);
    }
    log::trace!("negative sampling accepted {} pairs in {} draws", nb_sample, nb_try);
    Ok(selected.into_iter().collect())
} // end of sample_negative_ranks_with_cap

/// same as [sample_negative_ranks] returning pairs of node ids
pub fn sample_negative_edges<Ty: EdgeType>(
    graph: &GraphData<Ty>,
    nb_sample: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Result<Vec<(NodeId, NodeId)>, BenchError> {
    let indexation = graph.get_node_indexation();
    let pairs = sample_negative_ranks(graph, nb_sample, rng)?
        .into_iter()
        .map(|(i, j)| (indexation[i].clone(), indexation[j].clone()))
        .collect();
    Ok(pairs)
}

//==========================================================================================

#[cfg(test)]
mod tests {

    use super::*;
    use petgraph::{Directed, Undirected};
    use rand_xoshiro::rand_core::SeedableRng;
    use std::collections::HashSet;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ring(nb_nodes: usize) -> GraphData<Undirected> {
        let mut graph = GraphData::<Undirected>::new(false);
        for i in 0..nb_nodes {
            graph.add_edge(&i.to_string(), &((i + 1) % nb_nodes).to_string(), 1.);
        }
        graph
    }

    #[test]
    fn test_sample_are_non_edges() {
        log_init_test();
        let graph = ring(30);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        let pairs = sample_negative_ranks(&graph, 200, &mut rng).unwrap();
        assert_eq!(pairs.len(), 200);
        let distinct: HashSet<(usize, usize)> = pairs.iter().cloned().collect();
        assert_eq!(distinct.len(), 200);
        for (i, j) in &pairs {
            assert_ne!(i, j);
            assert!(!graph.contains_edge(*i, *j));
            assert!(!graph.contains_edge(*j, *i));
            assert!(!distinct.contains(&(*j, *i)));
        }
    }

    #[test]
    fn test_sample_exhaustive() {
        log_init_test();
        // complete graph on 5 nodes minus one edge : exactly one negative pair
        let mut graph = GraphData::<Undirected>::new(false);
        for i in 0..5 {
            for j in (i + 1)..5 {
                if (i, j) != (1, 3) {
                    graph.add_edge(&i.to_string(), &j.to_string(), 1.);
                }
            }
        }
        assert_eq!(nb_available_pairs(&graph), 1);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let pairs = sample_negative_edges(&graph, 1, &mut rng).unwrap();
        assert_eq!(pairs, vec![("1".to_string(), "3".to_string())]);
        let res = sample_negative_edges(&graph, 2, &mut rng);
        assert!(matches!(
            res,
            Err(BenchError::InfeasibleSample {
                requested: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_sample_directed() {
        log_init_test();
        let mut graph = GraphData::<Directed>::new(false);
        graph.add_edge("a", "b", 1.);
        graph.add_node("c");
        // (a,c) (c,a) (b,c) (c,b)
        assert_eq!(nb_available_pairs(&graph), 4);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let pairs: HashSet<(NodeId, NodeId)> = sample_negative_edges(&graph, 4, &mut rng)
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(pairs.len(), 4);
        assert!(!pairs.contains(&("a".to_string(), "b".to_string())));
        assert!(!pairs.contains(&("b".to_string(), "a".to_string())));
    }

    #[test]
    fn test_sample_zero() {
        let graph = GraphData::<Undirected>::new(false);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let before = rng.clone();
        let pairs = sample_negative_ranks(&graph, 0, &mut rng).unwrap();
        assert!(pairs.is_empty());
        // no draw was done
        assert_eq!(rng, before);
    }

    #[test]
    fn test_sample_cap_exceeded() {
        log_init_test();
        // complete graph on 12 nodes minus a perfect matching : 6 negative pairs among 66
        let mut graph = GraphData::<Undirected>::new(false);
        for i in 0..12 {
            for j in (i + 1)..12 {
                if !(i % 2 == 0 && j == i + 1) {
                    graph.add_edge(&i.to_string(), &j.to_string(), 1.);
                }
            }
        }
        assert_eq!(nb_available_pairs(&graph), 6);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let res = sample_negative_ranks_with_cap(&graph, 6, 3, &mut rng);
        match res {
            Err(BenchError::SamplingCapExceeded {
                requested,
                accepted,
                nb_try,
            }) => {
                assert_eq!(requested, 6);
                assert_eq!(nb_try, 3);
                assert!(accepted < requested);
            }
            _ => panic!("sampling should stop at the draw cap"),
        }
        // with the default cap the same request succeeds
        let pairs = sample_negative_ranks(&graph, 6, &mut rng).unwrap();
        assert_eq!(pairs.len(), 6);
    }

    #[test]
    fn test_sample_deterministic() {
        let graph = ring(15);
        let mut rng1 = Xoshiro256PlusPlus::seed_from_u64(77);
        let mut rng2 = Xoshiro256PlusPlus::seed_from_u64(77);
        assert_eq!(
            sample_negative_ranks(&graph, 40, &mut rng1).unwrap(),
            sample_negative_ranks(&graph, 40, &mut rng2).unwrap()
        );
    }
} // end of mod tests
