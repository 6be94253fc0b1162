use crate::error::ConfigError;
use crate::net::{Direction, NodeId, TopologyKind};
use crate::topo::{HypercubeOpts, MeshOpts, build_hypercube, build_mesh};

#[test]
fn mesh_has_one_link_per_adjacency_and_no_wraparound() {
    let net = build_mesh(&MeshOpts {
        width: 4,
        height: 4,
    })
    .expect("mesh");

    assert_eq!(net.kind(), TopologyKind::Mesh { width: 4, height: 4 });
    assert_eq!(net.num_nodes(), 16);
    // 2 * w * (h - 1) for a square mesh
    assert_eq!(net.num_links(), 24);

    let corner = net.mesh_node(0, 0).expect("corner");
    let edge = net.mesh_node(0, 2).expect("edge");
    let interior = net.mesh_node(1, 2).expect("interior");
    assert_eq!(net.node(corner).expect("node").degree(), 2);
    assert_eq!(net.node(edge).expect("node").degree(), 3);
    assert_eq!(net.node(interior).expect("node").degree(), 4);

    // no wraparound between opposite edges
    let left = net.mesh_node(0, 1).expect("left");
    let right = net.mesh_node(3, 1).expect("right");
    assert!(!net.are_neighbors(left, right));
}

#[test]
fn mesh_node_ids_are_x_major_and_lookups_are_bounded() {
    let net = build_mesh(&MeshOpts {
        width: 4,
        height: 3,
    })
    .expect("mesh");

    assert_eq!(net.mesh_node(1, 2), Some(NodeId(5)));
    assert_eq!(net.mesh_coords(NodeId(5)), Some((1, 2)));
    assert_eq!(net.mesh_node(-1, 0), None);
    assert_eq!(net.mesh_node(0, -1), None);
    assert_eq!(net.mesh_node(4, 0), None);
    assert_eq!(net.mesh_node(0, 3), None);
    assert_eq!(net.mesh_coords(NodeId(99)), None);

    for node in net.nodes() {
        let (x, y) = node.mesh_xy().expect("mesh coords");
        assert_eq!(net.mesh_node(x as i64, y as i64), Some(node.id()));
        assert!(node.hypercube_bits().is_none());
    }
}

#[test]
fn mesh_manhattan_distance_matches_coordinates() {
    let net = build_mesh(&MeshOpts::default()).expect("mesh");
    let a = net.mesh_node(1, 6).expect("a");
    let b = net.mesh_node(5, 2).expect("b");
    assert_eq!(net.manhattan_distance(a, b), 8);
    assert_eq!(net.manhattan_distance(b, a), 8);
    assert_eq!(net.manhattan_distance(a, a), 0);
}

#[test]
fn mesh_link_direction_depends_on_viewing_endpoint() {
    let net = build_mesh(&MeshOpts {
        width: 3,
        height: 3,
    })
    .expect("mesh");
    let a = net.mesh_node(0, 0).expect("a");
    let right = net.mesh_node(1, 0).expect("right");
    let up = net.mesh_node(0, 1).expect("up");

    let horizontal = net
        .link(net.link_between(a, right).expect("link"))
        .expect("link");
    assert_eq!(horizontal.direction_from(a), Some(Direction::PositiveX));
    assert_eq!(horizontal.direction_from(right), Some(Direction::NegativeX));
    assert_eq!(horizontal.direction_from(up), None);

    let vertical = net.link(net.link_between(up, a).expect("link")).expect("link");
    assert_eq!(vertical.direction_from(a), Some(Direction::PositiveY));
    assert_eq!(vertical.direction_from(up), Some(Direction::NegativeY));
}

#[test]
fn connecting_an_existing_pair_returns_the_same_link() {
    let mut net = build_mesh(&MeshOpts {
        width: 2,
        height: 1,
    })
    .expect("mesh");
    let a = NodeId(0);
    let b = NodeId(1);
    let existing = net.link_between(a, b).expect("link");
    let links_before = net.num_links();

    assert_eq!(net.connect(a, b, Direction::PositiveX), existing);
    assert_eq!(net.connect(b, a, Direction::NegativeX), existing);
    assert_eq!(net.num_links(), links_before);
    assert_eq!(net.node(a).expect("node").degree(), 1);
}

#[test]
fn hypercube_links_nodes_differing_in_one_bit() {
    let net = build_hypercube(&HypercubeOpts { dimension: 3 }).expect("hypercube");

    assert_eq!(net.kind(), TopologyKind::Hypercube { dimension: 3 });
    assert_eq!(net.num_nodes(), 8);
    assert_eq!(net.num_links(), 12);
    for node in net.nodes() {
        assert_eq!(node.degree(), 3, "node {:?}", node.id());
        for nb in net.neighbors(node.id()) {
            assert_eq!(net.hamming_distance(node.id(), nb), 1);
        }
    }

    assert!(net.are_neighbors(NodeId(0), NodeId(1)));
    assert!(net.are_neighbors(NodeId(5), NodeId(7)));
    assert!(!net.are_neighbors(NodeId(0), NodeId(3)));
    assert!(!net.are_neighbors(NodeId(0), NodeId(8)));
    assert_eq!(net.hamming_distance(NodeId(0b101), NodeId(0b010)), 3);
}

#[test]
fn hypercube_coordinates_and_dimension_neighbors() {
    let net = build_hypercube(&HypercubeOpts { dimension: 3 }).expect("hypercube");

    let node = net.node(NodeId(5)).expect("node");
    assert_eq!(node.hypercube_bits(), Some(&[true, false, true][..]));
    assert!(node.mesh_xy().is_none());

    assert_eq!(net.neighbor_in_dimension(NodeId(5), 0), Some(NodeId(4)));
    assert_eq!(net.neighbor_in_dimension(NodeId(5), 1), Some(NodeId(7)));
    assert_eq!(net.neighbor_in_dimension(NodeId(5), 3), None);
    assert_eq!(net.neighbor_in_dimension(NodeId(8), 0), None);
    assert_eq!(net.mesh_node(0, 0), None);
}

#[test]
fn hypercube_direction_tags_cycle_by_dimension() {
    let net = build_hypercube(&HypercubeOpts { dimension: 5 }).expect("hypercube");
    let expected = [
        Direction::PositiveX,
        Direction::PositiveY,
        Direction::NegativeX,
        Direction::NegativeY,
        Direction::PositiveX,
    ];
    for (dim, dir) in expected.iter().enumerate() {
        let link = net
            .link(net.link_between(NodeId(0), NodeId(1 << dim)).expect("link"))
            .expect("link");
        assert_eq!(link.direction, *dir);
        assert_eq!(link.dimension, Some(dim));
    }
}

#[test]
fn degenerate_sizes_are_rejected() {
    for (w, h) in [(0, 4), (4, 0)] {
        let err = build_mesh(&MeshOpts {
            width: w,
            height: h,
        })
        .expect_err("zero-sized mesh");
        assert!(matches!(err, ConfigError::InvalidParameter { .. }));
    }
    for dimension in [0, 21] {
        let err = build_hypercube(&HypercubeOpts { dimension }).expect_err("bad dimension");
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                field: "network.hypercube_dimension",
                ..
            }
        ));
    }
}
