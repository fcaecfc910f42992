// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subnet Allocation
//!
//! Whatever the VPC block and subnet sizes, allocated subnets never overlap
//! and never leave the VPC block.

use alb_mtls::domain::{Ipv4Cidr, NetworkError};
use proptest::prelude::*;
use std::net::Ipv4Addr;

/// A VPC-sized block (/16-/24) with host bits cleared
fn vpc_block() -> impl Strategy<Value = Ipv4Cidr> {
    (any::<u32>(), 16u8..=24).prop_map(|(address, prefix)| {
        let network = address & (u32::MAX << (32 - u32::from(prefix)));
        Ipv4Cidr::from_parts(Ipv4Addr::from(network), prefix).expect("host bits cleared")
    })
}

/// A block together with subnet prefix lengths no larger than it
fn block_and_masks() -> impl Strategy<Value = (Ipv4Cidr, Vec<u8>)> {
    vpc_block().prop_flat_map(|block| {
        let prefix = block.prefix_length();
        (Just(block), prop::collection::vec(prefix..=28u8, 1..8))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: allocated subnets lie inside the block
    #[test]
    fn prop_subnets_inside_block((block, masks) in block_and_masks()) {
        if let Ok(subnets) = block.allocate(&masks) {
            for subnet in &subnets {
                prop_assert!(block.contains_block(subnet), "{} escapes {}", subnet, block);
            }
        }
    }

    /// Property: allocated subnets are pairwise disjoint
    #[test]
    fn prop_subnets_disjoint((block, masks) in block_and_masks()) {
        if let Ok(subnets) = block.allocate(&masks) {
            for (i, left) in subnets.iter().enumerate() {
                for right in &subnets[i + 1..] {
                    prop_assert!(!left.overlaps(right), "{} overlaps {}", left, right);
                }
            }
        }
    }

    /// Property: allocation yields one subnet per mask, in order, or runs out of space
    #[test]
    fn prop_allocation_is_complete_or_fails((block, masks) in block_and_masks()) {
        match block.allocate(&masks) {
            Ok(subnets) => {
                let prefixes: Vec<u8> = subnets.iter().map(Ipv4Cidr::prefix_length).collect();
                prop_assert_eq!(prefixes, masks);
            }
            Err(error) => {
                let out_of_space = matches!(error, NetworkError::InsufficientAddressSpace { .. });
                prop_assert!(out_of_space, "unexpected error {}", error);
            }
        }
    }

    /// Property: equal sized subnets fit exactly when their total size fits
    #[test]
    fn prop_equal_masks_fit_by_size(block in vpc_block(), extra in 0u8..=4, count in 1usize..20) {
        let mask = (block.prefix_length() + extra).min(28);
        let masks = vec![mask; count];
        let fits = (count as u64) * (1u64 << (32 - u32::from(mask))) <= block.size();

        prop_assert_eq!(block.allocate(&masks).is_ok(), fits);
    }

    /// Property: allocation is deterministic
    #[test]
    fn prop_allocation_deterministic((block, masks) in block_and_masks()) {
        let first = block.allocate(&masks).ok();
        let second = block.allocate(&masks).ok();
        prop_assert_eq!(first, second);
    }
}
