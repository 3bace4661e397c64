//! Best-effort remote image fetching.
//!
//! Watermark and poster bitmaps come from remote URLs. A failed fetch or
//! an undecodable payload must never sink the document, so the result is
//! an explicit outcome type instead of an error: callers keep the reason
//! and continue without the image.

use crate::prelude::*;

/// Outcome of a step the document can survive without.
#[derive(Clone, Debug)]
pub enum BestEffort<T> {
	Ok(T),
	Degraded(String),
}

impl<T> BestEffort<T> {
	pub fn as_ok(&self) -> Option<&T> {
		match self {
			BestEffort::Ok(value) => Some(value),
			BestEffort::Degraded(_) => None,
		}
	}

	pub fn degradation(&self) -> Option<&str> {
		match self {
			BestEffort::Ok(_) => None,
			BestEffort::Degraded(reason) => Some(reason),
		}
	}
}

/// Decoded RGB8 bitmap.
#[derive(Clone, Debug)]
pub struct RasterImage {
	pub width: usize,
	pub height: usize,
	/// Row-major RGB triplets, `width * height * 3` bytes.
	pub pixels: Vec<u8>,
}

impl RasterImage {
	/// Blend every pixel toward white, keeping `opacity` of the original.
	/// PDF image XObjects carry no alpha channel here, so watermark
	/// transparency is baked into the raster before placement.
	pub fn lightened(&self, opacity: f64) -> RasterImage {
		let pixels = self
			.pixels
			.iter()
			.map(|p| 255 - (opacity * f64::from(255 - p)).round() as u8)
			.collect();
		RasterImage { width: self.width, height: self.height, pixels }
	}
}

/// Fetch and decode a remote bitmap. Failures are logged and returned as
/// a degradation, never raised.
pub async fn fetch_image(client: &reqwest::Client, url: &str) -> BestEffort<RasterImage> {
	match try_fetch(client, url).await {
		Ok(image) => BestEffort::Ok(image),
		Err(reason) => {
			warn!("Continuing without remote image: {}", reason);
			BestEffort::Degraded(reason)
		}
	}
}

async fn try_fetch(client: &reqwest::Client, url: &str) -> Result<RasterImage, String> {
	let response = client
		.get(url)
		.send()
		.await
		.and_then(reqwest::Response::error_for_status)
		.map_err(|e| format!("fetch {} failed: {}", url, e))?;
	let bytes = response.bytes().await.map_err(|e| format!("read {} failed: {}", url, e))?;
	let decoded = image::load_from_memory(&bytes)
		.map_err(|e| format!("decode {} failed: {}", url, e))?
		.to_rgb8();
	Ok(RasterImage {
		width: decoded.width() as usize,
		height: decoded.height() as usize,
		pixels: decoded.into_raw(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lightened_pulls_toward_white() {
		let image = RasterImage { width: 1, height: 1, pixels: vec![0, 100, 255] };
		let light = image.lightened(0.1);
		assert_eq!(light.pixels, vec![230, 240, 255]);
	}

	#[test]
	fn test_best_effort_accessors() {
		let ok: BestEffort<u8> = BestEffort::Ok(7);
		assert_eq!(ok.as_ok(), Some(&7));
		assert!(ok.degradation().is_none());

		let bad: BestEffort<u8> = BestEffort::Degraded("nope".into());
		assert!(bad.as_ok().is_none());
		assert_eq!(bad.degradation(), Some("nope"));
	}

	#[tokio::test]
	async fn test_fetch_from_unreachable_host_degrades() {
		let client = reqwest::Client::new();
		let outcome = fetch_image(&client, "http://127.0.0.1:9/watermark.png").await;
		assert!(outcome.degradation().is_some());
	}
}

// vim: ts=4
