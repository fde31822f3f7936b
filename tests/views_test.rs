// SPDX-License-Identifier: Apache-2.0

mod common;

use lutmap::depth_view::DepthView;
use lutmap::lut_mapping::{lut_mapping, LutMappingParams};
use lutmap::mapping_view::MappingView;
use lutmap::network::Network;
use lutmap::simulation::simulate_outputs;
use lutmap::test_utils::setup_adder_chain;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use common::random_network;

#[test]
fn test_mapping_view_forwards_levels() {
    let t = setup_adder_chain(4);
    let depth = DepthView::new(&t.ntk);
    let expected = depth.depth();
    let view = MappingView::new(depth);
    assert_eq!(view.precomputed_depth(), Some(expected));
    t.ntk.foreach_node(|node| {
        assert_eq!(
            view.precomputed_level(node),
            Some(view.network().level(node))
        );
    });
}

#[test]
fn test_views_do_not_change_functions() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    let ntk = random_network(&mut rng, 6, 30, 3);
    let view = MappingView::new(DepthView::new(&ntk));
    assert_eq!(view.size(), ntk.size());
    assert_eq!(view.num_pis(), ntk.num_pis());
    assert_eq!(view.num_pos(), ntk.num_pos());
    assert_eq!(simulate_outputs(&view), simulate_outputs(&ntk));
}

#[test]
fn test_mapping_through_stacked_views_matches_plain_mapping() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    let ntk = random_network(&mut rng, 8, 50, 3);
    let params = LutMappingParams::default();

    let mut plain = MappingView::new(&ntk);
    let plain_stats = lut_mapping(&mut plain, &params);

    let mut stacked = MappingView::new(DepthView::new(DepthView::new(&ntk)));
    assert!(stacked.network().is_delegated());
    let stacked_stats = lut_mapping(&mut stacked, &params);

    assert_eq!(plain_stats, stacked_stats);
    ntk.foreach_node(|node| {
        assert_eq!(
            plain.lut_fanins(node).collect::<Vec<_>>(),
            stacked.lut_fanins(node).collect::<Vec<_>>()
        );
    });
}
