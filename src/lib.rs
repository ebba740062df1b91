//! gullwing-fpgen: IPC-7351B land patterns for gull-wing packages
//!
//! This library turns datasheet dimensions of QFP, SOIC and SO packages into
//! KiCad footprints.
//!
//! # Architecture
//!
//! - **Land pattern**: toleranced lead and body dimensions plus the IPC-7351B
//!   fillet goals give the pad size and position on each axis
//! - **Outline derivation**: silkscreen, fabrication outline and courtyard
//!   follow from the body edges and the computed pads
//! - **Output**: the assembled footprint is written as a `.kicad_mod` file
//!
//! Device records, style configuration and the IPC tables are YAML documents.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`footprint`]: Footprint primitives and the `.kicad_mod` writer
//! - [`generator`]: Device records and footprint assembly
//! - [`ipc7351`]: IPC-7351B calculations, tables and naming

pub mod config;
pub mod error;
pub mod footprint;
pub mod generator;
pub mod ipc7351;
