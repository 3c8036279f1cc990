//! Region effects used by blur and magnifier callouts.
//!
//! All effects work on premultiplied pixmap data in place and touch only the
//! pixels inside the given region.

use tiny_skia::{
    FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8,
    Transform,
};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Integer pixel region clipped to a pixmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelRegion {
    /// Clip a floating-point rectangle to a `width` x `height` pixmap.
    ///
    /// Returns `None` when nothing of the rectangle is inside.
    pub fn clip(rect: &Rect, width: u32, height: u32) -> Option<PixelRegion> {
        let x0 = rect.left().floor().max(0.0) as u32;
        let y0 = rect.top().floor().max(0.0) as u32;
        let x1 = (rect.right().ceil().max(0.0) as u32).min(width);
        let y1 = (rect.bottom().ceil().max(0.0) as u32).min(height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRegion {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Replace each `block` x `block` cell of the region with its average colour.
pub fn pixelate(pixmap: &mut Pixmap, region: PixelRegion, block: u32) {
    let block = block.max(1);
    let stride = pixmap.width() as usize;
    let pixels = pixmap.pixels_mut();

    let mut by = region.y;
    while by < region.y + region.height {
        let bh = block.min(region.y + region.height - by);
        let mut bx = region.x;
        while bx < region.x + region.width {
            let bw = block.min(region.x + region.width - bx);
            let mut sum = [0u32; 4];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    let p = pixels[y as usize * stride + x as usize];
                    sum[0] += p.red() as u32;
                    sum[1] += p.green() as u32;
                    sum[2] += p.blue() as u32;
                    sum[3] += p.alpha() as u32;
                }
            }
            let n = bw * bh;
            let avg = average(sum, n);
            for y in by..by + bh {
                for x in bx..bx + bw {
                    pixels[y as usize * stride + x as usize] = avg;
                }
            }
            bx += block;
        }
        by += block;
    }
}

/// Three-pass box blur of the region with the given radius.
///
/// Three box passes approximate a gaussian kernel.
pub fn box_blur(pixmap: &mut Pixmap, region: PixelRegion, radius: u32) {
    if radius == 0 {
        return;
    }
    let stride = pixmap.width() as usize;
    let w = region.width as usize;
    let h = region.height as usize;

    let mut buf: Vec<[u32; 4]> = Vec::with_capacity(w * h);
    {
        let pixels = pixmap.pixels();
        for y in 0..h {
            for x in 0..w {
                let p = pixels[(region.y as usize + y) * stride + region.x as usize + x];
                buf.push([
                    p.red() as u32,
                    p.green() as u32,
                    p.blue() as u32,
                    p.alpha() as u32,
                ]);
            }
        }
    }

    let r = radius as usize;
    for _ in 0..3 {
        buf = blur_pass(&buf, w, h, r, true);
        buf = blur_pass(&buf, w, h, r, false);
    }

    let pixels = pixmap.pixels_mut();
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, a] = buf[y * w + x];
            let a = a.min(255) as u8;
            let clamp = |c: u32| (c.min(255) as u8).min(a);
            if let Some(p) = PremultipliedColorU8::from_rgba(clamp(r), clamp(g), clamp(b), a) {
                pixels[(region.y as usize + y) * stride + region.x as usize + x] = p;
            }
        }
    }
}

fn blur_pass(src: &[[u32; 4]], w: usize, h: usize, r: usize, horizontal: bool) -> Vec<[u32; 4]> {
    let mut out = vec![[0u32; 4]; src.len()];
    let (lines, len) = if horizontal { (h, w) } else { (w, h) };
    let index = |line: usize, i: usize| if horizontal { line * w + i } else { i * w + line };
    for line in 0..lines {
        for i in 0..len {
            let lo = i.saturating_sub(r);
            let hi = (i + r).min(len - 1);
            let mut sum = [0u32; 4];
            for j in lo..=hi {
                let p = src[index(line, j)];
                for c in 0..4 {
                    sum[c] += p[c];
                }
            }
            let n = (hi - lo + 1) as u32;
            out[index(line, i)] = [sum[0] / n, sum[1] / n, sum[2] / n, sum[3] / n];
        }
    }
    out
}

fn average(sum: [u32; 4], n: u32) -> PremultipliedColorU8 {
    let n = n.max(1);
    let a = (sum[3] / n) as u8;
    let c = |v: u32| ((v / n) as u8).min(a);
    PremultipliedColorU8::from_rgba(c(sum[0]), c(sum[1]), c(sum[2]), a)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

/// Draw a zoomed copy of the area around `circle`'s centre, clipped to the
/// circle inscribed in it.
///
/// The source is sampled from a snapshot taken before drawing, so the
/// magnified content never includes itself.
pub fn magnify(pixmap: &mut Pixmap, circle: &Rect, zoom: f32) -> Result<()> {
    let center = circle.center();
    let radius = circle.min_side() / 2.0;
    if radius <= 0.0 {
        return Err(Error::Render("magnifier has no area".to_string()));
    }

    let snapshot = pixmap.clone();
    let mut mask = Mask::new(pixmap.width(), pixmap.height())
        .ok_or_else(|| Error::Render("cannot allocate magnifier mask".to_string()))?;
    let path = PathBuilder::from_circle(center.x, center.y, radius)
        .ok_or_else(|| Error::Render("degenerate magnifier circle".to_string()))?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let transform = Transform::from_translate(center.x, center.y)
        .pre_scale(zoom, zoom)
        .pre_translate(-center.x, -center.y);
    pixmap.draw_pixmap(0, 0, snapshot.as_ref(), &paint, transform, Some(&mask));
    Ok(())
}
