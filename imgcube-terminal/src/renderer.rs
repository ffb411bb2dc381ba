/// ASCII surface that rasterizes cube faces into terminal cells
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use imgcube_core::{Cube, FaceDirection, FaceTransform, Piece, Surface};
use std::io::Write;

/// Character drawn for faces that carry no sticker
const INTERIOR: char = ' ';

/// A 3x3 glyph picture standing in for a face image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceImage {
    pub glyphs: [char; 9],
    pub color: Color,
}

impl FaceImage {
    /// Uniform fill with a letter in the centre tile
    pub fn lettered(fill: char, letter: char, color: Color) -> Self {
        let mut glyphs = [fill; 9];
        glyphs[4] = letter;
        Self { glyphs, color }
    }

    fn glyph(&self, col: u8, row: u8) -> char {
        self.glyphs[usize::from(row) * 3 + usize::from(col)]
    }
}

/// Per-face imagery, indexed by [`FaceDirection::index`]
#[derive(Debug, Clone, PartialEq)]
pub struct FaceArt {
    images: [Option<FaceImage>; 6],
}

impl FaceArt {
    pub fn blank() -> Self {
        Self { images: [None; 6] }
    }

    pub fn set(&mut self, face: FaceDirection, image: FaceImage) {
        self.images[face.index()] = Some(image);
    }

    pub fn clear(&mut self) {
        self.images = [None; 6];
    }

    pub fn is_blank(&self) -> bool {
        self.images.iter().all(Option::is_none)
    }

    pub fn get(&self, face: FaceDirection) -> Option<&FaceImage> {
        self.images[face.index()].as_ref()
    }
}

impl Default for FaceArt {
    fn default() -> Self {
        Self {
            images: [
                Some(FaceImage::lettered('#', 'F', Color::Red)),
                Some(FaceImage::lettered('%', 'R', Color::Blue)),
                Some(FaceImage::lettered('@', 'B', Color::DarkYellow)),
                Some(FaceImage::lettered('&', 'L', Color::Green)),
                Some(FaceImage::lettered('*', 'U', Color::White)),
                Some(FaceImage::lettered('+', 'D', Color::Yellow)),
            ],
        }
    }
}

/// Maps screen-space pixels onto terminal cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: [f64; 2],
    /// Columns per pixel; rows get half of it since cells are twice as tall
    pub scale: f64,
}

impl Viewport {
    /// Fit the whole assembly, in any orientation, into `width` by `height`
    pub fn fit(cube: &Cube, width: usize, height: usize) -> Self {
        let c = cube.world().transform_vertex([0.0, 0.0, 0.0]);
        let extent = 3.0 * cube.cell_size() * 3f64.sqrt();
        let room = (width as f64).min(2.0 * height as f64);
        Self {
            center: [c[0], c[1]],
            scale: room / extent,
        }
    }

    fn project(&self, p: [f64; 3], width: usize, height: usize) -> (f32, f32, f32) {
        let col = (p[0] - self.center[0]) * self.scale + width as f64 / 2.0;
        let row = (p[1] - self.center[1]) * self.scale / 2.0 + height as f64 / 2.0;
        // Larger screen z is nearer; the depth buffer keeps the smallest value
        (col as f32, row as f32, -p[2] as f32)
    }
}

/// ASCII renderer that turns face transforms into terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    cell_size: f64,
    viewport: Viewport,
    art: FaceArt,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize, cube: &Cube) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            cell_size: cube.cell_size(),
            viewport: Viewport::fit(cube, width, height),
            art: FaceArt::default(),
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn art(&self) -> &FaceArt {
        &self.art
    }

    pub fn art_mut(&mut self) -> &mut FaceArt {
        &mut self.art
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn char_at(&self, col: usize, row: usize) -> char {
        self.char_buffer[row * self.width + col]
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Fill one screen triangle, keeping the nearest sample per cell
    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [a, b, c] = *coords;
        let area = edge((a.0, a.1), (b.0, b.1), (c.0, c.1));
        if area.abs() < 1e-6 {
            return;
        }

        let cols = span(a.0.min(b.0).min(c.0), a.0.max(b.0).max(c.0), self.width);
        let rows = span(a.1.min(b.1).min(c.1), a.1.max(b.1).max(c.1), self.height);
        for row in rows {
            for col in cols.clone() {
                let p = (col as f32 + 0.5, row as f32 + 0.5);
                let Some([wa, wb, wc]) = weights(a, b, c, area, p) else {
                    continue;
                };
                let depth = wa * a.2 + wb * b.2 + wc * c.2;
                let idx = row * self.width + col;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for AsciiRenderer {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw_face(&mut self, _index: usize, piece: &Piece, face: &FaceTransform) {
        let (character, color) = match (piece.tile(face.face), self.art.get(face.face)) {
            (Some((col, row)), Some(image)) => (image.glyph(col, row), image.color),
            (Some(_), None) => ('.', Color::Grey),
            (None, _) => (INTERIOR, Color::Reset),
        };
        let corners = face
            .corners(self.cell_size)
            .map(|p| self.viewport.project(p, self.width, self.height));
        self.rasterize_triangle(&[corners[0], corners[1], corners[2]], character, color);
        self.rasterize_triangle(&[corners[0], corners[2], corners[3]], character, color);
    }
}

/// Twice the signed area of triangle `a b p`
fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Cells covered by `[lo, hi]`, clipped to `0..len`
fn span(lo: f32, hi: f32, len: usize) -> std::ops::Range<usize> {
    if hi < 0.0 {
        return 0..0;
    }
    let start = lo.floor().max(0.0) as usize;
    let end = (hi.ceil().max(0.0) as usize + 1).min(len);
    start..end.max(start)
}

/// Normalised edge weights of `p`, or `None` outside the triangle.
/// `area` is `edge(a, b, c)`; either winding works.
fn weights(
    a: (f32, f32, f32),
    b: (f32, f32, f32),
    c: (f32, f32, f32),
    area: f32,
    p: (f32, f32),
) -> Option<[f32; 3]> {
    let wa = edge((b.0, b.1), (c.0, c.1), p) / area;
    let wb = edge((c.0, c.1), (a.0, a.1), p) / area;
    let wc = 1.0 - wa - wb;
    (wa >= 0.0 && wb >= 0.0 && wc >= 0.0).then_some([wa, wb, wc])
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgcube_core::Mat4;

    #[test]
    fn test_front_view_shows_front_face() {
        // Looking straight down -z onto the +z face
        let cube = Cube::new(10.0, Mat4::identity());
        let mut renderer = AsciiRenderer::new(60, 30, &cube);
        cube.render(&mut renderer);
        let centre = renderer.char_at(30, 15);
        assert_eq!(centre, 'F');
        assert_eq!(renderer.char_at(0, 0), ' ');
    }

    #[test]
    fn test_blank_art_draws_placeholder() {
        let cube = Cube::new(10.0, Mat4::identity());
        let mut renderer = AsciiRenderer::new(60, 30, &cube);
        renderer.art_mut().clear();
        assert!(renderer.art().is_blank());
        cube.render(&mut renderer);
        assert_eq!(renderer.char_at(30, 15), '.');
    }

    #[test]
    fn test_weights_either_winding() {
        let (a, b, c) = ((0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (0.0, 4.0, 0.0));
        for (b, c) in [(b, c), (c, b)] {
            let area = edge((a.0, a.1), (b.0, b.1), (c.0, c.1));
            let [wa, wb, wc] = weights(a, b, c, area, (1.0, 1.0)).unwrap();
            assert!((wa + wb + wc - 1.0).abs() < 1e-6);
            assert!((wa - 0.5).abs() < 1e-6);
            assert!(weights(a, b, c, area, (3.0, 3.0)).is_none());
        }
    }

    #[test]
    fn test_span_clips_to_screen() {
        assert_eq!(span(-3.2, 2.5, 10), 0..4);
        assert_eq!(span(7.5, 20.0, 10), 7..10);
        assert_eq!(span(-5.0, -1.0, 10), 0..0);
    }
}
