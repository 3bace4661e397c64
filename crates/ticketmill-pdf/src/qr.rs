//! QR matrix rasterization.
//!
//! The `qrcode` crate produces the module matrix; rasterizing it here (one
//! grayscale byte per pixel) keeps the PDF layer in control of module
//! scale and quiet zone instead of depending on the crate's image
//! integration.

use crate::prelude::*;
use qrcode::{EcLevel, QrCode};

/// Square grayscale bitmap of a QR code: 0 = dark, 255 = light.
#[derive(Clone, Debug)]
pub struct QrRaster {
	/// Edge length in pixels.
	pub size: usize,
	pub pixels: Vec<u8>,
}

/// Rasterize `data` at `scale` pixels per module with a `quiet_zone`
/// border (in modules) on every side.
pub fn rasterize(data: &str, scale: usize, quiet_zone: usize) -> TmResult<QrRaster> {
	let code = QrCode::with_error_correction_level(data, EcLevel::M)
		.map_err(|e| Error::Internal(format!("QR encoding failed for {:?}: {}", data, e)))?;

	let modules = code.width();
	let colors = code.to_colors();
	let size = (modules + 2 * quiet_zone) * scale;
	let mut pixels = vec![255u8; size * size];

	for my in 0..modules {
		for mx in 0..modules {
			if colors[my * modules + mx] == qrcode::Color::Dark {
				let px = (mx + quiet_zone) * scale;
				let py = (my + quiet_zone) * scale;
				for dy in 0..scale {
					let row = (py + dy) * size + px;
					pixels[row..row + scale].fill(0);
				}
			}
		}
	}

	Ok(QrRaster { size, pixels })
}


// vim: ts=4
