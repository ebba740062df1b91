//! IPC-7351B land pattern standard implementation.
//!
//! This module provides the IPC-7351B gull-wing land pattern calculation used
//! for SOIC, SSOP, TSSOP, MSOP and QFP packages, together with the coefficient
//! tables and naming conventions it depends on.
//!
//! # Density Levels
//!
//! IPC-7351B defines three density levels:
//!
//! - **Most (M)**: Maximum land protrusion, best solder fillet, for high reliability
//! - **Nominal (N)**: Standard density, recommended for most applications
//! - **Least (L)**: Minimum land protrusion, for high-density boards
//!
//! The coefficient table also depends on the lead pitch: parts with a pitch
//! of 0.625 mm and above use the large-pitch table.
//!
//! # Example
//!
//! ```
//! use gullwing_fpgen::ipc7351::{
//!     density::{DensityLevel, PitchClass},
//!     packages::{gullwing::GullWingCalculator, DeviceDimensions, HeelSpacing, PackageCalculator},
//!     standards::IpcStandards,
//!     tolerance::ToleranceSpec,
//! };
//!
//! // SOIC-8, 1.27 mm pitch
//! let dims = DeviceDimensions {
//!     body_size_x: ToleranceSpec::symmetric(3.9, 0.1),
//!     body_size_y: ToleranceSpec::symmetric(4.9, 0.1),
//!     lead_width: ToleranceSpec::from_limits("lead_width", 0.31, None, 0.51).unwrap(),
//!     heel_spacing: HeelSpacing::LeadLength(ToleranceSpec::from_limits("lead_len", 0.4, None, 1.27).unwrap()),
//!     overall_size_x: ToleranceSpec::symmetric(6.0, 0.2),
//!     overall_size_y: ToleranceSpec::symmetric(6.0, 0.2),
//!     exposed_pad: None,
//!     heel_reduction: 0.0,
//! };
//! let coeffs = IpcStandards::builtin().coefficients(PitchClass::from_pitch(1.27), DensityLevel::Nominal);
//! let pads = GullWingCalculator::default().pad_set(&dims, &coeffs).unwrap();
//!
//! assert!(pads.right.center.x > 0.0);
//! ```

pub mod density;
pub mod naming;
pub mod packages;
pub mod standards;
pub mod tolerance;

pub use density::{DensityLevel, PitchClass, SolderFilletGoals};
pub use packages::{DeviceDimensions, PackageCalculator, PadSet};
pub use standards::{IpcCoefficients, IpcStandards};
pub use tolerance::ToleranceSpec;
