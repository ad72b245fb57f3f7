// SPDX-License-Identifier: MPL-2.0
//! Frame data types and still-image export.

pub mod frame;
pub mod frame_export;

pub use frame::{luma_601, Frame};
pub use frame_export::{generate_default_filename, save_frame, ExportFormat};
