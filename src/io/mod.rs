// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - STL import and export

mod stl;

pub use stl::{load, load_with_config, save, OutputSettings, StlFormat};
