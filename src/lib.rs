//! Shellcloud - word clouds from your shell history
//!
//! This library backs the `shellcloud` binary: it collects text from shell
//! history, init files, git logs, or plain files, and renders a word-cloud
//! PNG masked by a logo shape.
//!
//! # Modules
//!
//! - [`sources`]: text collection from the configured sources
//! - [`heuristics`]: resolution-derived word count and font size defaults
//! - [`mask`]: white canvas + centered logo mask composition
//! - [`cloud`]: frequency counting, placement, and rasterization
//! - [`logos`]: embedded logo shapes and distro mapping
//! - [`fonts`]: font file loading and system font discovery
//! - [`colors`]: color parsing and per-word palettes
//! - [`detect`]: best-effort distro/display/git detection
//! - [`config`]: optional YAML configuration
//! - [`warnings`]: deduplicated warning reporting

pub mod cloud;
pub mod colors;
pub mod config;
pub mod detect;
pub mod error;
pub mod fonts;
pub mod heuristics;
pub mod logos;
pub mod mask;
pub mod sources;
pub mod warnings;
