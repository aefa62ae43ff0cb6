/// The fireworks drawing surface: an RGB pixel grid sized to the viewport.
///
/// One surface pixel is half a terminal cell (the renderer pairs rows into
/// upper-half-block glyphs), so a `cols × rows` terminal maps to a
/// `cols × rows*2` surface.

use crate::domain::color::Rgb;

pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Surface { width, height, pixels: vec![Rgb::BLACK; width * height] }
    }

    /// Surface for a terminal of `cols × rows` cells.
    pub fn for_viewport(cols: u16, rows: u16) -> Self {
        Surface::new(cols as usize, rows as usize * 2)
    }

    /// Resize and clear. A no-op if the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![Rgb::BLACK; width * height];
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Rgb::BLACK
        }
    }

    /// Paint translucent black over everything. Repeated every frame this
    /// leaves decaying trails behind moving particles.
    pub fn fade(&mut self, alpha: f32) {
        for p in &mut self.pixels {
            *p = p.blend(Rgb::BLACK, alpha);
        }
    }

    /// Fill a circle given in surface pixel coordinates. Radii below one
    /// pixel still light the pixel containing the center.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) {
        if !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let x0 = (cx - r).floor().max(0.0) as usize;
        let y0 = (cy - r).floor().max(0.0) as usize;
        let x1 = (cx + r).ceil().min(self.width as f32) as usize;
        let y1 = (cy + r).ceil().min(self.height as f32) as usize;
        let r2 = r * r;

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let contains_center = cx.floor() as usize == x && cy.floor() as usize == y
                    && cx >= 0.0 && cy >= 0.0;
                if dx * dx + dy * dy <= r2 || contains_center {
                    self.pixels[y * self.width + x] = color;
                }
            }
        }
    }
}
