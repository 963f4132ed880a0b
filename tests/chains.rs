use anyhow::Result;
use dungen::testing::{corridor_templates, cycle_level, path_level, square_template};
use dungen::{Chain, ChainOptions, LevelDescription, decompose_level};
use std::collections::HashSet;

/// Every chain invariant in one sweep: nodes covered exactly once, and
/// every chain after the first adjacent (through `passages`) to the union
/// of its predecessors.
fn assert_chain_invariants(chains: &[Chain], node_count: usize, passages: &[(u32, u32)]) {
    let mut seen: HashSet<usize> = HashSet::new();
    for (i, chain) in chains.iter().enumerate() {
        assert_eq!(chain.index, i, "chain indices follow placement order");
        assert!(!chain.nodes.is_empty(), "no empty chains");
        if i > 0 {
            let touches = chain.nodes.iter().any(|&v| {
                passages.iter().any(|&(a, b)| {
                    let (a, b) = (a as usize, b as usize);
                    (a == v && seen.contains(&b)) || (b == v && seen.contains(&a))
                })
            });
            assert!(
                touches,
                "chain {i} ({:?}) does not touch the earlier cover",
                chain.nodes
            );
        }
        for &v in &chain.nodes {
            assert!(seen.insert(v), "node {v} appears in two chains");
        }
    }
    assert_eq!(seen.len(), node_count, "every node in exactly one chain");
}

#[test]
fn path_decomposes_into_tree_chains() -> Result<()> {
    let level = path_level(6, vec![square_template(4)]);
    let passages: Vec<(u32, u32)> = (1..6).map(|i| (i - 1, i)).collect();
    let chains = decompose_level(&level, &ChainOptions::default())?;
    assert_chain_invariants(&chains, 6, &passages);
    assert!(chains.iter().all(|c| !c.from_face), "a path has no faces");
    Ok(())
}

#[test]
fn tree_chains_respect_the_size_cap() -> Result<()> {
    let level = path_level(7, vec![square_template(4)]);
    let options = ChainOptions {
        max_tree_size: 2,
        ..ChainOptions::default()
    };
    let chains = decompose_level(&level, &options)?;
    assert!(chains.iter().all(|c| c.nodes.len() <= 2));
    assert_chain_invariants(
        &chains,
        7,
        &(1..7).map(|i| (i - 1, i)).collect::<Vec<_>>(),
    );
    Ok(())
}

#[test]
fn cycle_becomes_a_single_face_chain() -> Result<()> {
    let level = cycle_level(5, vec![square_template(4)]);
    let chains = decompose_level(&level, &ChainOptions::default())?;
    assert_eq!(chains.len(), 1);
    assert!(chains[0].from_face);
    assert_eq!(chains[0].nodes.len(), 5);
    Ok(())
}

#[test]
fn faces_come_before_their_tails() -> Result<()> {
    // A triangle with a two-room tail: 0-1-2-0 plus 2-3-4.
    let mut level = LevelDescription::new();
    for node in 0u32..5 {
        level.add_room(node, vec![square_template(4)])?;
    }
    let passages = vec![(0u32, 1u32), (1, 2), (2, 0), (2, 3), (3, 4)];
    for &(a, b) in &passages {
        level.add_passage(a, b);
    }
    let chains = decompose_level(&level, &ChainOptions::default())?;
    assert!(chains[0].from_face, "the triangle is placed first");
    assert_eq!(chains[0].nodes.len(), 3);
    assert!(chains[1..].iter().all(|c| !c.from_face));
    assert_chain_invariants(&chains, 5, &passages);
    Ok(())
}

#[test]
fn two_fused_faces_give_two_face_chains() -> Result<()> {
    // Two triangles sharing the edge 1-2.
    let mut level = LevelDescription::new();
    for node in 0u32..4 {
        level.add_room(node, vec![square_template(4)])?;
    }
    let passages = vec![(0u32, 1u32), (1, 2), (2, 0), (1, 3), (3, 2)];
    for &(a, b) in &passages {
        level.add_passage(a, b);
    }
    let chains = decompose_level(&level, &ChainOptions::default())?;
    assert_chain_invariants(&chains, 4, &passages);
    assert!(chains[0].from_face);
    assert_eq!(chains[0].nodes.len(), 3);
    // The second face shares two nodes with the first, so it introduces
    // only node 3.
    assert!(chains[1].from_face);
    assert_eq!(chains[1].nodes, vec![3]);
    Ok(())
}

#[test]
fn corridor_rooms_stay_out_of_chains() -> Result<()> {
    let mut level = LevelDescription::new();
    level.add_room(0u32, vec![square_template(4)])?;
    level.add_room(1, vec![square_template(4)])?;
    level.add_corridor_room(7, corridor_templates())?;
    level.add_passage(0, 7);
    level.add_passage(7, 1);
    let chains = decompose_level(&level, &ChainOptions::default())?;
    // Node indices: 0 -> 0, 1 -> 1, 7 -> 2. The corridor (index 2) is
    // contracted away.
    let all: HashSet<usize> = chains.iter().flat_map(|c| c.nodes.iter().copied()).collect();
    assert_eq!(all, [0usize, 1].into_iter().collect());
    Ok(())
}

#[test]
fn decomposition_is_deterministic() -> Result<()> {
    let mut level = LevelDescription::new();
    for node in 0u32..8 {
        level.add_room(node, vec![square_template(4)])?;
    }
    for &(a, b) in &[(0u32, 1u32), (1, 2), (2, 3), (3, 0), (2, 4), (4, 5), (4, 6), (6, 7)] {
        level.add_passage(a, b);
    }
    let first = decompose_level(&level, &ChainOptions::default())?;
    let second = decompose_level(&level, &ChainOptions::default())?;
    assert_eq!(first, second);
    Ok(())
}
