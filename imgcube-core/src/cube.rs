/// The 27-piece assembly and its screen transforms
use crate::config::Config;
use crate::matrix::{Axis, Mat4};
use crate::piece::{FaceDirection, GridCoord, Piece, PieceOrientation};
use crate::transform::TransformStack;
use strum::IntoEnumIterator;

/// Rotation applied, cumulatively, to reach each face from the previous one.
/// Starting from the piece frame the face normal walks
/// +z, +x, -z, -x, -y, +y.
const FACE_STEPS: [(Axis, f64); 6] = [
    (Axis::Y, 0.0),
    (Axis::Y, 90.0),
    (Axis::Y, 90.0),
    (Axis::Y, 90.0),
    (Axis::X, 90.0),
    (Axis::X, 180.0),
];

/// Composed screen transform for one piece face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceTransform {
    pub face: FaceDirection,
    pub matrix: Mat4,
    /// Screen-space Z of the point one unit out from the face centre.
    /// Larger is nearer the viewer.
    pub depth: f64,
}

impl FaceTransform {
    pub fn column_major(&self) -> [f64; 16] {
        self.matrix.column_major()
    }

    /// Paint-order hint
    pub fn z_index(&self) -> i32 {
        self.depth.round() as i32
    }

    /// Face square corners on screen, counterclockwise in the face frame
    pub fn corners(&self, cell_size: f64) -> [[f64; 3]; 4] {
        let h = cell_size / 2.0;
        [[-h, -h], [h, -h], [h, h], [-h, h]].map(|[x, y]| self.matrix.transform_vertex([x, y, 0.0]))
    }
}

/// Receives composed transforms every time the assembly moves
pub trait Surface {
    fn begin_frame(&mut self) {}

    fn draw_face(&mut self, index: usize, piece: &Piece, face: &FaceTransform);

    fn end_frame(&mut self) {}
}

/// Surface that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn draw_face(&mut self, _index: usize, _piece: &Piece, _face: &FaceTransform) {}
}

/// All 27 pieces plus the shared world transform
#[derive(Debug, Clone)]
pub struct Cube {
    pieces: Vec<Piece>,
    world: Mat4,
    cell_size: f64,
}

impl Cube {
    pub fn new(cell_size: f64, world: Mat4) -> Self {
        Self {
            pieces: GridCoord::all().map(|c| Piece::new(c, cell_size)).collect(),
            world,
            cell_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cell_size, config.world_transform())
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub(crate) fn pieces_mut(&mut self) -> &mut [Piece] {
        &mut self.pieces
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn world(&self) -> &Mat4 {
        &self.world
    }

    pub fn set_world(&mut self, world: Mat4) {
        self.world = world;
    }

    /// Turn the whole assembly in its own frame
    pub fn rotate_world(&mut self, axis: Axis, degrees: f64) {
        self.world = self.world.rotate(axis, degrees, false);
    }

    /// Indices of the pieces currently in `layer` along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is outside {-1, 0, 1}.
    pub fn layer(&self, axis: Axis, layer: i8) -> Vec<usize> {
        assert!((-1..=1).contains(&layer), "layer {layer} out of range");
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.coord().component(axis) == layer)
            .map(|(i, _)| i)
            .collect()
    }

    /// Every piece back at home with its original orientation
    pub fn is_solved(&self) -> bool {
        self.pieces
            .iter()
            .all(|p| *p.orientation() == PieceOrientation::new(p.home()))
    }

    /// Screen transforms for the six faces of piece `index`
    pub fn face_transforms(&self, index: usize) -> Vec<FaceTransform> {
        let piece = &self.pieces[index];
        let offset = Mat4::identity().translate(0.0, 0.0, self.cell_size / 2.0);
        let mut stack = TransformStack::new(*piece.local());
        let mut scope = stack.scope();

        let faces: Vec<FaceTransform> = FaceDirection::iter()
            .zip(FACE_STEPS)
            .map(|(face, (axis, degrees))| {
                scope.rotate(axis, degrees);
                let matrix = self.world * *scope.current() * offset;
                FaceTransform {
                    face,
                    matrix,
                    depth: matrix.transform_vertex([0.0, 0.0, 1.0])[2],
                }
            })
            .collect();
        faces
    }

    /// Screen-space depth of a piece centre
    pub fn piece_depth(&self, index: usize) -> f64 {
        (self.world * *self.pieces[index].local()).transform_vertex([0.0, 0.0, 0.0])[2]
    }

    /// Push every face transform to `surface`
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.begin_frame();
        for (index, piece) in self.pieces.iter().enumerate() {
            for face in self.face_transforms(index) {
                surface.draw_face(index, piece, &face);
            }
        }
        surface.end_frame();
    }
}
