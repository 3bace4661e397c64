//! Ticket document builder.
//!
//! Layout model: A4 portrait, a brand/event header, an optional poster,
//! event metadata lines, then one bordered box per individual ticket code
//! with the QR image on the left and the fare details beside it. A moving
//! vertical cursor tracks used space; when the next box would cross the
//! printable height a new page is started and the watermark is re-stamped.

use printpdf::{
	BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageRotation, ImageTransform,
	ImageXObject, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
	PdfLayerReference, Point, Px, Rgb,
};
use std::time::Duration;

use crate::fetch::{self, BestEffort, RasterImage};
use crate::prelude::*;
use crate::qr;
use ticketmill_types::{TicketEmailData, TicketLineItem};

const PAGE_W: f64 = 210.0;
const PAGE_H: f64 = 297.0;
const MARGIN: f64 = 16.0;
/// Lowest cursor position (from the top, mm) content may reach.
const PRINTABLE_BOTTOM: f64 = PAGE_H - MARGIN;

const BOX_W: f64 = PAGE_W - 2.0 * MARGIN;
const BOX_H: f64 = 30.0;
const BOX_GAP: f64 = 6.0;
const QR_SIDE: f64 = 22.0;

const POSTER_MAX_W: f64 = BOX_W;
const POSTER_MAX_H: f64 = 60.0;
const WATERMARK_W: f64 = 130.0;
const WATERMARK_OPACITY: f64 = 0.1;

/// printpdf places raw images at 300 dpi when no dpi override is given.
const PLACEMENT_DPI: f64 = 300.0;

const DISCLAIMER: &str =
	"Tickets are non-transferable. Please present this document and a valid ID at the entrance.";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder configuration, fixed at startup.
#[derive(Clone, Debug)]
pub struct PdfOptions {
	/// Brand name painted in the document header.
	pub brand: String,
	/// Remote watermark bitmap; the document degrades gracefully when the
	/// URL is unset or unreachable.
	pub watermark_url: Option<String>,
}

/// A finished document plus what had to be left out of it.
#[derive(Clone, Debug)]
pub struct TicketDocument {
	pub bytes: Vec<u8>,
	pub pages: usize,
	/// Best-effort steps that were skipped (watermark/poster fetches).
	pub degradations: Vec<String>,
}

pub struct TicketDocumentBuilder {
	opts: PdfOptions,
	http: reqwest::Client,
}

impl TicketDocumentBuilder {
	pub fn new(opts: PdfOptions) -> TmResult<Self> {
		let http = reqwest::Client::builder()
			.timeout(FETCH_TIMEOUT)
			.user_agent(concat!("ticketmill/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| Error::Internal(format!("http client: {}", e)))?;
		Ok(Self { opts, http })
	}

	/// Build the complete ticket PDF for `data`.
	///
	/// Field validation happens before any I/O; remote image fetches are
	/// best-effort and reported via `TicketDocument::degradations`.
	pub async fn build(&self, data: &TicketEmailData) -> TmResult<TicketDocument> {
		Self::validate(data)?;
		let data = data.clone().normalized();

		let watermark = match self.opts.watermark_url.as_deref() {
			Some(url) => fetch::fetch_image(&self.http, url).await,
			None => BestEffort::Degraded("no watermark URL configured".into()),
		};
		let poster = match data.event_poster_url.as_deref() {
			Some(url) if !url.is_empty() => Some(fetch::fetch_image(&self.http, url).await),
			_ => None,
		};

		self.compose(&data, &watermark, poster.as_ref())
	}

	fn validate(data: &TicketEmailData) -> TmResult<()> {
		let required = [
			("eventTitle", &data.event_title),
			("eventDate", &data.event_date),
			("eventTime", &data.event_time),
			("eventVenue", &data.event_venue),
			("name", &data.name),
		];
		let missing: Vec<&str> = required
			.iter()
			.filter(|(_, value)| value.trim().is_empty())
			.map(|(field, _)| *field)
			.collect();
		if !missing.is_empty() {
			return Err(Error::ValidationError(format!(
				"missing required ticket fields: {}",
				missing.join(", ")
			)));
		}
		if data.tickets.is_empty() {
			return Err(Error::ValidationError("tickets must be a non-empty array".into()));
		}
		Ok(())
	}

	fn compose(
		&self,
		data: &TicketEmailData,
		watermark: &BestEffort<RasterImage>,
		poster: Option<&BestEffort<RasterImage>>,
	) -> TmResult<TicketDocument> {
		let mut degradations = Vec::new();

		let stamp = watermark.as_ok().map(|image| image.lightened(WATERMARK_OPACITY));
		if let Some(reason) = watermark.degradation() {
			degradations.push(format!("watermark: {}", reason));
		}

		let (doc, first_page, first_layer) = PdfDocument::new(
			format!("{} - {}", self.opts.brand, data.event_title),
			Mm(PAGE_W as f32),
			Mm(PAGE_H as f32),
			"content",
		);
		let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
		let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
		let mono = doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_err)?;

		let mut layer = doc.get_page(first_page).get_layer(first_layer);
		let mut pages = 1usize;
		if let Some(stamp) = &stamp {
			place_watermark(&layer, stamp);
		}

		layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.12, None)));

		// header
		let mut cursor = MARGIN + 6.0;
		layer.use_text(self.opts.brand.as_str(), 20.0, Mm(MARGIN as f32), Mm((PAGE_H - cursor) as f32), &bold);
		cursor += 9.0;
		layer.use_text(data.event_title.as_str(), 15.0, Mm(MARGIN as f32), Mm((PAGE_H - cursor) as f32), &regular);
		cursor += 10.0;

		if let Some(poster) = poster {
			match poster {
				BestEffort::Ok(image) => cursor = place_poster(&layer, image, cursor),
				BestEffort::Degraded(reason) => degradations.push(format!("poster: {}", reason)),
			}
		}

		for line in [
			format!("Attendee: {}", data.name),
			format!("Date: {}", data.event_date),
			format!("Time: {}", data.event_time),
			format!("Venue: {}", data.event_venue),
		] {
			layer.use_text(line, 11.0, Mm(MARGIN as f32), Mm((PAGE_H - cursor) as f32), &regular);
			cursor += 5.5;
		}
		cursor += 4.0;

		for item in &data.tickets {
			if item.codes.is_empty() {
				warn!("Skipping line item {:?}: no ticket codes", item.ticket_type);
				continue;
			}
			for code in &item.codes {
				if cursor + BOX_H > PRINTABLE_BOTTOM {
					cursor = break_page(&doc, &mut layer, &mut pages, stamp.as_ref());
				}
				draw_ticket_box(&layer, item, code, cursor, &bold, &regular, &mono)?;
				cursor += BOX_H + BOX_GAP;
			}
		}

		if cursor + 6.0 > PRINTABLE_BOTTOM {
			cursor = break_page(&doc, &mut layer, &mut pages, stamp.as_ref());
		}
		layer.use_text(DISCLAIMER, 8.5, Mm(MARGIN as f32), Mm((PAGE_H - cursor - 2.0) as f32), &regular);

		let bytes = doc.save_to_bytes().map_err(pdf_err)?;
		info!(
			"Built ticket document for {:?}: {} pages, {} bytes",
			data.event_title,
			pages,
			bytes.len()
		);
		Ok(TicketDocument { bytes, pages, degradations })
	}
}

fn pdf_err(err: printpdf::Error) -> Error {
	Error::Internal(format!("pdf generation failed: {}", err))
}

/// Physical size of a raw pixel count at the default placement density.
fn px_to_mm(px: usize) -> f64 {
	px as f64 * 25.4 / PLACEMENT_DPI
}

fn rgb_xobject(image: &RasterImage) -> ImageXObject {
	ImageXObject {
		width: Px(image.width),
		height: Px(image.height),
		color_space: ColorSpace::Rgb,
		bits_per_component: ColorBits::Bit8,
		interpolate: true,
		image_data: image.pixels.clone(),
		image_filter: None,
		smask: None,
		clipping_bbox: None,
	}
}

fn gray_xobject(raster: &qr::QrRaster) -> ImageXObject {
	ImageXObject {
		width: Px(raster.size),
		height: Px(raster.size),
		color_space: ColorSpace::Greyscale,
		bits_per_component: ColorBits::Bit8,
		// QR modules must stay crisp
		interpolate: false,
		image_data: raster.pixels.clone(),
		image_filter: None,
		smask: None,
		clipping_bbox: None,
	}
}

/// Start a fresh page, re-stamp the watermark, return the reset cursor.
fn break_page(
	doc: &PdfDocumentReference,
	layer: &mut PdfLayerReference,
	pages: &mut usize,
	stamp: Option<&RasterImage>,
) -> f64 {
	let (page, new_layer) = doc.add_page(Mm(PAGE_W as f32), Mm(PAGE_H as f32), "content");
	*layer = doc.get_page(page).get_layer(new_layer);
	*pages += 1;
	if let Some(stamp) = stamp {
		place_watermark(layer, stamp);
	}
	MARGIN + 4.0
}

/// Stamp the pre-lightened watermark, rotated 45°, centered on the page.
/// Painted first so all content overdraws it.
fn place_watermark(layer: &PdfLayerReference, stamp: &RasterImage) {
	let native_w = px_to_mm(stamp.width);
	let native_h = px_to_mm(stamp.height);
	let scale = WATERMARK_W / native_w;
	Image::from(rgb_xobject(stamp)).add_to_layer(
		layer.clone(),
		ImageTransform {
			translate_x: Some(Mm(((PAGE_W - native_w * scale) / 2.0) as f32)),
			translate_y: Some(Mm(((PAGE_H - native_h * scale) / 2.0) as f32)),
			rotate: Some(ImageRotation {
				angle_ccw_degrees: 45.0,
				rotation_center_x: Px(stamp.width / 2),
				rotation_center_y: Px(stamp.height / 2),
			}),
			scale_x: Some(scale as f32),
			scale_y: Some(scale as f32),
			dpi: None,
		},
	);
}

/// Place the event poster below the header, scaled (never up) to fit the
/// poster box. Returns the advanced cursor.
fn place_poster(layer: &PdfLayerReference, poster: &RasterImage, cursor: f64) -> f64 {
	let native_w = px_to_mm(poster.width);
	let native_h = px_to_mm(poster.height);
	let scale = (POSTER_MAX_W / native_w).min(POSTER_MAX_H / native_h).min(1.0);
	let height = native_h * scale;
	Image::from(rgb_xobject(poster)).add_to_layer(
		layer.clone(),
		ImageTransform {
			translate_x: Some(Mm(MARGIN as f32)),
			translate_y: Some(Mm((PAGE_H - cursor - height) as f32)),
			rotate: None,
			scale_x: Some(scale as f32),
			scale_y: Some(scale as f32),
			dpi: None,
		},
	);
	cursor + height + 6.0
}

fn draw_ticket_box(
	layer: &PdfLayerReference,
	item: &TicketLineItem,
	code: &str,
	cursor: f64,
	bold: &IndirectFontRef,
	regular: &IndirectFontRef,
	mono: &IndirectFontRef,
) -> TmResult<()> {
	let top = PAGE_H - cursor;
	let bottom = top - BOX_H;

	layer.set_outline_color(Color::Rgb(Rgb::new(0.45, 0.45, 0.45, None)));
	layer.set_outline_thickness(0.6);
	layer.add_line(Line {
		points: vec![
			(Point::new(Mm(MARGIN as f32), Mm(top as f32)), false),
			(Point::new(Mm((MARGIN + BOX_W) as f32), Mm(top as f32)), false),
			(Point::new(Mm((MARGIN + BOX_W) as f32), Mm(bottom as f32)), false),
			(Point::new(Mm(MARGIN as f32), Mm(bottom as f32)), false),
		],
		is_closed: true,
	});

	let raster = qr::rasterize(code, 4, 2)?;
	let inset = (BOX_H - QR_SIDE) / 2.0;
	let scale = QR_SIDE / px_to_mm(raster.size);
	Image::from(gray_xobject(&raster)).add_to_layer(
		layer.clone(),
		ImageTransform {
			translate_x: Some(Mm((MARGIN + inset) as f32)),
			translate_y: Some(Mm((bottom + inset) as f32)),
			rotate: None,
			scale_x: Some(scale as f32),
			scale_y: Some(scale as f32),
			dpi: None,
		},
	);

	let text_x = MARGIN + inset + QR_SIDE + 6.0;
	layer.use_text(item.ticket_type.as_str(), 12.0, Mm(text_x as f32), Mm((top - 8.0) as f32), bold);
	layer.use_text(
		format!("Qty: {}   Amount: {}", item.quantity, item.amount),
		10.0,
		Mm(text_x as f32),
		Mm((top - 14.5) as f32),
		regular,
	);
	layer.use_text(code, 10.0, Mm(text_x as f32), Mm((top - 21.0) as f32), mono);
	Ok(())
}


// vim: ts=4
