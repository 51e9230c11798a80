// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integration helpers for other Canopy crates.
//!
//! Modules in this file are behind feature flags so `canopy_dispatch` can
//! remain usable in contexts that do not depend on those crates.
//!
//! - [`scene_tree`] (`scene_tree_adapter` feature): dispatch against a
//!   [`canopy_scene::SceneTree`].

#[cfg(feature = "scene_tree_adapter")]
pub mod scene_tree;
