//! Pre-defined parameter space configurations for sweeps.
//!
//! This module provides ready-to-use parameter space definitions that can be
//! selected for different kinds of experiments. Header values (H1–H4) are
//! never swept here; they have to match the server and come from the template
//! or the command line.

use crate::ParameterSpace;

/// Broad default grid: 4 × 2 × 3 × 2 × 2 = 96 combinations.
pub fn default_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![0, 3, 5, 10])
        .jmin(vec![40, 50])
        .jmax(vec![70, 100, 150])
        .s1(vec![0, 50])
        .s2(vec![0, 50])
}

/// Two combinations, useful to check that the tooling works at all.
pub fn minimal_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![0, 3])
        .jmin(vec![40])
        .jmax(vec![100])
        .s1(vec![0])
        .s2(vec![0])
}

/// Junk packet count and size window, without padding.
pub fn junk_focused_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![1, 3, 5, 8, 10, 15])
        .jmin(vec![20, 40, 60])
        .jmax(vec![70, 100, 250, 500])
        .s1(vec![0])
        .s2(vec![0])
        .require_jmax_above_jmin(true)
}

/// Handshake padding sizes with a fixed junk configuration.
pub fn padding_focused_space() -> ParameterSpace {
    ParameterSpace::grid()
        .jc(vec![3])
        .jmin(vec![40])
        .jmax(vec![70])
        .s1(vec![0, 15, 50, 100])
        .s2(vec![0, 15, 50, 100])
}
