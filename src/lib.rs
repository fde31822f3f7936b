// SPDX-License-Identifier: Apache-2.0

pub mod collapse_mapped;
pub mod cut_enumeration;
pub mod depth_view;
pub mod klut_network;
pub mod logic_network;
pub mod lut_mapping;
pub mod lutmap_error;
pub mod mapping_view;
pub mod network;
pub mod simulation;
pub mod test_utils;
pub mod topo;
pub mod truth_table;
pub mod truth_table_cache;
pub mod use_count;
