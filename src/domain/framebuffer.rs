use super::geometry::Rect;

pub const FRAME_CHANNELS: usize = 4;

/// RGBA8 surface the overlay is composed into, one row after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * FRAME_CHANNELS],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocates for a new size; contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height * FRAME_CHANNELS, 0);
    }

    pub fn clear(&mut self, rgba: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(FRAME_CHANNELS) {
            pixel.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * FRAME_CHANNELS;
        let px = &self.pixels[idx..idx + FRAME_CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Source-over blend of one pixel. Coordinates outside the frame are dropped.
    pub fn blend(&mut self, x: i32, y: i32, color: [u8; 3], alpha: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * FRAME_CHANNELS;
        blend_pixel(&mut self.pixels, idx, color, alpha);
    }

    /// Blends a solid rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 3], alpha: u8) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = (y * self.width + x) * FRAME_CHANNELS;
                blend_pixel(&mut self.pixels, idx, color, alpha);
            }
        }
    }

    /// Blends a disc inscribed in `rect`.
    pub fn fill_ellipse(&mut self, rect: Rect, color: [u8; 3], alpha: u8) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let (cx, cy) = rect.center();
        let rx = rect.width() as f32 / 2.0;
        let ry = rect.height() as f32 / 2.0;
        for y in y0..y1 {
            let dy = (y as f32 + 0.5 - cy) / ry;
            for x in x0..x1 {
                let dx = (x as f32 + 0.5 - cx) / rx;
                if dx * dx + dy * dy <= 1.0 {
                    let idx = (y * self.width + x) * FRAME_CHANNELS;
                    blend_pixel(&mut self.pixels, idx, color, alpha);
                }
            }
        }
    }

    /// Nearest-neighbour scaled blit of an RGBA image into `dest`. The source
    /// alpha channel is multiplied by `alpha`.
    pub fn blit(&mut self, src: &[u8], src_w: usize, src_h: usize, dest: Rect, alpha: u8) {
        if src_w == 0 || src_h == 0 || src.len() < src_w * src_h * FRAME_CHANNELS {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(dest) else {
            return;
        };
        let dest_w = dest.width() as usize;
        let dest_h = dest.height() as usize;
        for y in y0..y1 {
            let sy = (y as i64 - dest.top as i64) as usize * src_h / dest_h;
            for x in x0..x1 {
                let sx = (x as i64 - dest.left as i64) as usize * src_w / dest_w;
                let s = (sy * src_w + sx) * FRAME_CHANNELS;
                let a = (src[s + 3] as u16 * alpha as u16 / 255) as u8;
                let idx = (y * self.width + x) * FRAME_CHANNELS;
                blend_pixel(&mut self.pixels, idx, [src[s], src[s + 1], src[s + 2]], a);
            }
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn clip(&self, rect: Rect) -> Option<(usize, usize, usize, usize)> {
        if rect.is_empty() {
            return None;
        }
        let x0 = rect.left.max(0) as usize;
        let y0 = rect.top.max(0) as usize;
        let x1 = (rect.right.max(0) as usize).min(self.width);
        let y1 = (rect.bottom.max(0) as usize).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }
}

fn blend_pixel(rgba: &mut [u8], idx: usize, color: [u8; 3], alpha: u8) {
    if alpha == 0 {
        return;
    }
    let inv = 255u16.saturating_sub(alpha as u16);
    let alpha = alpha as u16;
    rgba[idx] = ((rgba[idx] as u16 * inv + color[0] as u16 * alpha) / 255) as u8;
    rgba[idx + 1] = ((rgba[idx + 1] as u16 * inv + color[1] as u16 * alpha) / 255) as u8;
    rgba[idx + 2] = ((rgba[idx + 2] as u16 * inv + color[2] as u16 * alpha) / 255) as u8;
    rgba[idx + 3] = (alpha + rgba[idx + 3] as u16 * inv / 255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = Framebuffer::new(4, 4);
        frame.fill_rect(Rect::new(-2, -2, 2, 2), [255, 0, 0], 255);

        assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blend_mixes_by_alpha() {
        let mut frame = Framebuffer::new(1, 1);
        frame.clear([0, 0, 0, 255]);
        frame.blend(0, 0, [255, 255, 255], 127);

        assert_eq!(frame.pixel(0, 0), Some([127, 127, 127, 255]));
    }

    #[test]
    fn zero_alpha_leaves_pixels_untouched() {
        let mut frame = Framebuffer::new(2, 2);
        frame.fill_rect(Rect::new(0, 0, 2, 2), [9, 9, 9], 0);

        assert!(frame.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn blit_scales_nearest() {
        let src = [
            255, 0, 0, 255, //
            0, 0, 255, 255,
        ];
        let mut frame = Framebuffer::new(4, 1);
        frame.blit(&src, 2, 1, Rect::new(0, 0, 4, 1), 255);

        assert_eq!(frame.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(2, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn resize_reallocates() {
        let mut frame = Framebuffer::new(2, 2);
        frame.resize(3, 5);

        assert_eq!(frame.len(), 3 * 5 * FRAME_CHANNELS);
        assert_eq!(frame.pixel(2, 4), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(3, 0), None);
    }
}
