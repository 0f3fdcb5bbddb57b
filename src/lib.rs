// SPDX-FileCopyrightText: 2025 HalfSweet
// SPDX-License-Identifier: Apache-2.0

//! TransBOM - KiCad to JLCPCB assembly file conversion
//!
//! Converts a KiCad BOM and footprint position files into the BOM and CPL
//! tables the JLCPCB assembly service accepts, and fills in LCSC part numbers
//! from a mapping file.

#![allow(non_snake_case)]

pub mod annotate;
pub mod bom;
pub mod config;
pub mod converter;
pub mod designator;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod placement;
pub mod progress;
