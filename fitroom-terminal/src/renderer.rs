/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use fitroom_core::geometry::{face_normal, ColoredVertex};
use fitroom_core::{project_to_screen, IndexedMesh, Mat4};
use nalgebra::Vector3;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Floor for lit faces so faces turned from the light stay visible
const AMBIENT: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// ASCII renderer that converts indexed meshes to colored terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            light_dir: Vector3::new(0.3, 0.5, 1.0).normalize(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    /// Draw `mesh` through the composed `matrix`. `rotation` is the
    /// rotation-only part of the chain, used to shade faces in view space.
    pub fn render_mesh(&mut self, mesh: &IndexedMesh, matrix: &Mat4, rotation: &Mat4) {
        for triangle in mesh.triangles() {
            self.render_triangle(&triangle, matrix, rotation);
        }
    }

    fn render_triangle(&mut self, triangle: &[ColoredVertex; 3], matrix: &Mat4, rotation: &Mat4) {
        let (width, height) = (self.width as u32, self.height as u32);

        // Project vertices to screen space; a vertex behind the eye drops the triangle
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(triangle) {
            match project_to_screen(matrix, &vertex.point(), width, height) {
                Some(coords) => *slot = coords,
                None => return,
            }
        }

        // Partially visible triangles are kept; rasterize_triangle clamps to the screen
        if off_screen(&screen_coords, self.width as f32, self.height as f32) {
            return;
        }

        let normal = rotation.fixed_view::<3, 3>(0, 0) * face_normal(triangle);
        let brightness = normal.dot(&self.light_dir).max(AMBIENT).min(1.0);

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);

        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index],
            color: shade(triangle[0].color, brightness),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };

                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                    let idx = y as usize * self.width + x as usize;
                    if depth < self.depth_buffer[idx] {
                        self.depth_buffer[idx] = depth;
                        self.cells[idx] = cell;
                    }
                }
            }
        }
    }

    /// Number of cells the last frame covered
    pub fn covered_cells(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.character))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// True when all three vertices lie beyond the same screen edge
fn off_screen(coords: &[(f32, f32, f32); 3], width: f32, height: f32) -> bool {
    coords.iter().all(|&(x, _, _)| x < 0.0)
        || coords.iter().all(|&(x, _, _)| x > width)
        || coords.iter().all(|&(_, y, _)| y < 0.0)
        || coords.iter().all(|&(_, y, _)| y > height)
}

fn shade(color: [f32; 4], brightness: f32) -> Color {
    let channel = |c: f32| (c * brightness * 255.0).clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: channel(color[0]),
        g: channel(color[1]),
        b: channel(color[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitroom_core::{TransformPipeline, ViewerConfig};

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);

        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    fn pipeline() -> TransformPipeline {
        TransformPipeline::new(ViewerConfig::default(), 80.0 * 8.0, 24.0 * 16.0).unwrap()
    }

    fn render_cube(matrix: &Mat4) -> AsciiRenderer {
        let mut renderer = AsciiRenderer::new(80, 24);
        renderer.render_mesh(&IndexedMesh::cube(2.0), matrix, &Mat4::identity());
        renderer
    }

    fn is_front_face(cell: Cell) -> bool {
        matches!(cell.color, Color::Rgb { r, g: 0, b: 0 } if r > 0)
    }

    #[test]
    fn test_cube_covers_center() {
        let pipeline = pipeline();
        let mut renderer = render_cube(&pipeline.composed(&pipeline.initial_state()));

        assert!(renderer.covered_cells() > 0);
        let center = renderer.cells[12 * 80 + 40];
        assert_ne!(center.character, ' ');
        // Front face (red) faces the camera at rest
        assert!(is_front_face(center));

        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_front_face_survives_full_zoom_in() {
        let pipeline = pipeline();
        let mut state = pipeline.initial_state();
        pipeline.wheel(&mut state, -300.0);
        assert_eq!(state.camera_distance, pipeline.config().min_distance);

        let renderer = render_cube(&pipeline.composed(&state));

        // Front face corners overflow the grid, yet it still fills the middle
        assert!(is_front_face(renderer.cells[12 * 80 + 40]));
        assert!(is_front_face(renderer.cells[0]));
        assert_eq!(renderer.covered_cells(), 80 * 24);
    }

    #[test]
    fn test_off_screen_triangle_is_skipped() {
        let left = [(-5.0, 1.0, 0.5), (-1.0, 3.0, 0.5), (-2.0, 8.0, 0.5)];
        assert!(off_screen(&left, 80.0, 24.0));

        let straddling = [(-5.0, 1.0, 0.5), (40.0, 3.0, 0.5), (-2.0, 8.0, 0.5)];
        assert!(!off_screen(&straddling, 80.0, 24.0));
    }

    #[test]
    fn test_draw_emits_every_row() {
        let renderer = AsciiRenderer::new(4, 3);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 3);
    }
}
