// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the pure building blocks: subnet allocation, DNS names and
//! logical id derivation.

mod cidr_allocation;
mod domain_names;
