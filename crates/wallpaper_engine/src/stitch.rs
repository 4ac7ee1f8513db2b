//! Tile stitching: repeat one square texture across a canvas and encode it as PNG.
//!
//! The pure entry points ([`stitch_tiles`], [`stitch_tiles_native`]) work on
//! bytes already in memory and share no state, so they can run concurrently.
//! [`TileStitcher`] adds the network fetch in front of them.

use std::io::Cursor;
use std::sync::Arc;

use engine_logging::engine_info;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use crate::fetch::AssetSource;
use crate::EngineError;

/// Edge length, in pixels, of one painted tile.
pub const TILE_EDGE: u32 = 512;
/// Largest accepted canvas edge.
pub const MAX_CANVAS_EDGE: u32 = 8192;

/// Top-left corners of every tile painted on a `width x height` canvas,
/// row by row. At least one tile is always painted.
pub fn tile_origins(width: u32, height: u32, edge: u32) -> Vec<(u32, u32)> {
    let step = edge.max(1);
    let mut origins = Vec::new();
    let mut y: u32 = 0;
    loop {
        let mut x: u32 = 0;
        loop {
            origins.push((x, y));
            x = x.saturating_add(step);
            if x >= width {
                break;
            }
        }
        y = y.saturating_add(step);
        if y >= height {
            break;
        }
    }
    origins
}

/// Decode `source`, draw it at `tile_edge x tile_edge`, and repeat it over a
/// `width x height` canvas. Overflowing tiles are clipped.
pub fn stitch_tiles(
    source: &[u8],
    width: u32,
    height: u32,
    tile_edge: u32,
) -> Result<Vec<u8>, EngineError> {
    check_canvas(width, height)?;
    if tile_edge == 0 {
        return Err(EngineError::Validation("tile edge must be positive".into()));
    }
    let decoded = decode(source)?;
    let tile = if decoded.dimensions() == (tile_edge, tile_edge) {
        decoded
    } else {
        imageops::resize(&decoded, tile_edge, tile_edge, FilterType::Triangle)
    };
    encode_png(&paint(&tile, width, height))
}

/// Like [`stitch_tiles`] but keeps the source at its native size.
pub fn stitch_tiles_native(
    source: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, EngineError> {
    check_canvas(width, height)?;
    let tile = decode(source)?;
    encode_png(&paint(&tile, width, height))
}

fn check_canvas(width: u32, height: u32) -> Result<(), EngineError> {
    if width == 0 || height == 0 {
        return Err(EngineError::Validation(format!(
            "canvas must be non-empty (got {width}x{height})"
        )));
    }
    if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
        return Err(EngineError::Validation(format!(
            "canvas {width}x{height} exceeds {MAX_CANVAS_EDGE} pixels per edge"
        )));
    }
    Ok(())
}

fn decode(source: &[u8]) -> Result<RgbaImage, EngineError> {
    let image = image::load_from_memory(source)
        .map_err(|err| EngineError::AssetLoad(format!("decode failed: {err}")))?;
    let rgba = image.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(EngineError::AssetLoad("source image is empty".into()));
    }
    Ok(rgba)
}

fn paint(tile: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let (tile_w, tile_h) = tile.dimensions();
    let mut y: u32 = 0;
    while y < height {
        let mut x: u32 = 0;
        while x < width {
            imageops::replace(&mut canvas, tile, i64::from(x), i64::from(y));
            x = x.saturating_add(tile_w);
        }
        y = y.saturating_add(tile_h);
    }
    canvas
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, EngineError> {
    let mut out = Cursor::new(Vec::new());
    canvas
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| EngineError::Persist(format!("png encode failed: {err}")))?;
    Ok(out.into_inner())
}

/// Fetches a source tile by URL and stitches it.
#[derive(Clone)]
pub struct TileStitcher {
    source: Arc<dyn AssetSource>,
    tile_edge: u32,
}

impl TileStitcher {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            tile_edge: TILE_EDGE,
        }
    }

    pub fn with_tile_edge(mut self, tile_edge: u32) -> Self {
        self.tile_edge = tile_edge;
        self
    }

    pub fn tile_edge(&self) -> u32 {
        self.tile_edge
    }

    pub async fn stitch(&self, url: &str, width: u32, height: u32) -> Result<Vec<u8>, EngineError> {
        let fetched = self.source.fetch(url).await?;
        let png = stitch_tiles(&fetched.bytes, width, height, self.tile_edge)?;
        engine_info!(
            "Stitched {}x{} from {} ({} tiles)",
            width,
            height,
            fetched.metadata.final_url,
            tile_origins(width, height, self.tile_edge).len()
        );
        Ok(png)
    }

    pub async fn stitch_native(
        &self,
        url: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, EngineError> {
        let fetched = self.source.fetch(url).await?;
        stitch_tiles_native(&fetched.bytes, width, height)
    }
}
