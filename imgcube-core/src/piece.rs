/// Discrete piece state: grid position, orientation and stickers
use crate::matrix::{Axis, Mat4};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// Sense of a quarter turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Counterclockwise looking down the positive axis, `+1`
    Ccw,
    /// Clockwise looking down the positive axis, `-1`
    Cw,
}

impl Direction {
    pub fn sign(self) -> i8 {
        match self {
            Direction::Ccw => 1,
            Direction::Cw => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Ccw => Direction::Cw,
            Direction::Cw => Direction::Ccw,
        }
    }
}

/// One of the six canonical outward directions, in sticker index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum FaceDirection {
    PosZ,
    PosX,
    NegZ,
    NegX,
    NegY,
    PosY,
}

impl FaceDirection {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Unit normal of this direction
    pub fn normal(self) -> [i8; 3] {
        match self {
            FaceDirection::PosZ => [0, 0, 1],
            FaceDirection::PosX => [1, 0, 0],
            FaceDirection::NegZ => [0, 0, -1],
            FaceDirection::NegX => [-1, 0, 0],
            FaceDirection::NegY => [0, -1, 0],
            FaceDirection::PosY => [0, 1, 0],
        }
    }

    fn from_normal(n: [i8; 3]) -> Self {
        match n {
            [0, 0, 1] => FaceDirection::PosZ,
            [1, 0, 0] => FaceDirection::PosX,
            [0, 0, -1] => FaceDirection::NegZ,
            [-1, 0, 0] => FaceDirection::NegX,
            [0, -1, 0] => FaceDirection::NegY,
            [0, 1, 0] => FaceDirection::PosY,
            _ => unreachable!("rotation produced a non-unit normal {n:?}"),
        }
    }
}

/// Position in the 3x3x3 grid, each component in {-1, 0, 1}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i8,
    pub y: i8,
    pub z: i8,
}

impl GridCoord {
    /// # Panics
    ///
    /// Panics if any component is outside {-1, 0, 1}.
    pub fn new(x: i8, y: i8, z: i8) -> Self {
        assert!(
            [x, y, z].iter().all(|c| (-1..=1).contains(c)),
            "grid coordinate ({x}, {y}, {z}) out of range"
        );
        Self { x, y, z }
    }

    /// All 27 coordinates, x outermost and z innermost
    pub fn all() -> impl Iterator<Item = GridCoord> {
        (-1..=1).flat_map(|x| (-1..=1).flat_map(move |y| (-1..=1).map(move |z| GridCoord { x, y, z })))
    }

    pub fn component(&self, axis: Axis) -> i8 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn as_array(&self) -> [i8; 3] {
        [self.x, self.y, self.z]
    }

    /// Coordinates after a quarter turn about `axis`
    pub fn rotated(self, axis: Axis, direction: Direction) -> Self {
        let d = direction.sign();
        let GridCoord { x, y, z } = self;
        match axis {
            Axis::X => GridCoord { x, y: -d * z, z: d * y },
            Axis::Y => GridCoord { x: d * z, y, z: -d * x },
            Axis::Z => GridCoord { x: -d * y, y: d * x, z },
        }
    }

    /// Which canonical directions point out of the assembly from here
    pub fn outward(&self) -> [bool; 6] {
        let [x, y, z] = self.as_array();
        [z == 1, x == 1, z == -1, x == -1, y == -1, y == 1]
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Exact integer rotation built from quarter turns
pub type Rotation3 = [[i8; 3]; 3];

const IDENTITY_ROTATION: Rotation3 = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

fn quarter_turn(axis: Axis, direction: Direction) -> Rotation3 {
    let s = direction.sign();
    match axis {
        Axis::X => [[1, 0, 0], [0, 0, -s], [0, s, 0]],
        Axis::Y => [[0, 0, s], [0, 1, 0], [-s, 0, 0]],
        Axis::Z => [[0, -s, 0], [s, 0, 0], [0, 0, 1]],
    }
}

fn compose(a: &Rotation3, b: &Rotation3) -> Rotation3 {
    let mut c = [[0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            c[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    c
}

fn apply(r: &Rotation3, v: [i8; 3]) -> [i8; 3] {
    let mut out = [0; 3];
    for (i, row) in r.iter().enumerate() {
        out[i] = (0..3).map(|k| row[k] * v[k]).sum();
    }
    out
}

/// Current discrete state of one piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceOrientation {
    coord: GridCoord,
    rotation: Rotation3,
}

impl PieceOrientation {
    pub fn new(coord: GridCoord) -> Self {
        Self {
            coord,
            rotation: IDENTITY_ROTATION,
        }
    }

    pub fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Accumulated rotation since the solved state
    pub fn rotation(&self) -> &Rotation3 {
        &self.rotation
    }

    /// Apply a completed quarter turn
    pub fn rotate_about(&mut self, axis: Axis, direction: Direction) {
        self.coord = self.coord.rotated(axis, direction);
        self.rotation = compose(&quarter_turn(axis, direction), &self.rotation);
    }

    pub fn outward(&self) -> [bool; 6] {
        self.coord.outward()
    }

    /// Direction the piece's own `face` currently points
    pub fn face_direction(&self, face: FaceDirection) -> FaceDirection {
        FaceDirection::from_normal(apply(&self.rotation, face.normal()))
    }

    /// Local transform rebuilt from the discrete state
    pub fn local_transform(&self, cell_size: f64) -> Mat4 {
        let [x, y, z] = self.coord.as_array().map(|c| f64::from(c) * cell_size);
        Mat4::identity().translate(x, y, z) * Mat4::from_rotation3(&self.rotation)
    }
}

/// One of the 27 cells of the assembly
#[derive(Debug, Clone)]
pub struct Piece {
    home: GridCoord,
    orientation: PieceOrientation,
    local: Mat4,
}

impl Piece {
    pub fn new(home: GridCoord, cell_size: f64) -> Self {
        let orientation = PieceOrientation::new(home);
        Self {
            home,
            orientation,
            local: orientation.local_transform(cell_size),
        }
    }

    /// Grid position in the solved state
    pub fn home(&self) -> GridCoord {
        self.home
    }

    pub fn orientation(&self) -> &PieceOrientation {
        &self.orientation
    }

    pub fn coord(&self) -> GridCoord {
        self.orientation.coord
    }

    pub fn local(&self) -> &Mat4 {
        &self.local
    }

    pub(crate) fn pre_rotate(&mut self, axis: Axis, degrees: f64) {
        self.local = self.local.pre_rotate(axis, degrees);
    }

    /// Record completed quarter turns and rebuild the local transform
    pub(crate) fn settle(&mut self, axis: Axis, direction: Direction, quarter_turns: u32, cell_size: f64) {
        for _ in 0..quarter_turns {
            self.orientation.rotate_about(axis, direction);
        }
        self.local = self.orientation.local_transform(cell_size);
    }

    /// Whether the piece's own `face` carries a sticker
    pub fn has_sticker(&self, face: FaceDirection) -> bool {
        self.home.outward()[face.index()]
    }

    pub fn sticker_faces(&self) -> impl Iterator<Item = FaceDirection> + '_ {
        FaceDirection::iter().filter(|&face| self.has_sticker(face))
    }

    /// Column and row of the 3x3 face image shown on the sticker at `face`
    pub fn tile(&self, face: FaceDirection) -> Option<(u8, u8)> {
        if !self.has_sticker(face) {
            return None;
        }
        let GridCoord { x, y, z } = self.home;
        let (col, row) = match face {
            FaceDirection::PosZ | FaceDirection::NegZ => (z * x + 1, y + 1),
            FaceDirection::PosX | FaceDirection::NegX => (-x * z + 1, y + 1),
            FaceDirection::NegY | FaceDirection::PosY => (z + 1, y * x + 1),
        };
        Some((col as u8, row as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashSet;

    #[test]
    fn test_all_coords() {
        let coords: HashSet<_> = GridCoord::all().collect();
        assert_eq!(coords.len(), 27);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_coord_out_of_range() {
        GridCoord::new(2, 0, 0);
    }

    #[test]
    fn test_quarter_turn_closure() {
        for coord in GridCoord::all() {
            for axis in Axis::iter() {
                for direction in Direction::iter() {
                    let mut orientation = PieceOrientation::new(coord);
                    for _ in 0..4 {
                        orientation.rotate_about(axis, direction);
                    }
                    assert_eq!(orientation, PieceOrientation::new(coord));
                }
            }
        }
    }

    #[test]
    fn test_rotation_keeps_axis_component() {
        for coord in GridCoord::all() {
            for axis in Axis::iter() {
                let turned = coord.rotated(axis, Direction::Ccw);
                assert_eq!(turned.component(axis), coord.component(axis));
                let back = turned.rotated(axis, Direction::Cw);
                assert_eq!(back, coord);
            }
        }
    }

    #[test]
    fn test_coord_formula_matches_matrix() {
        for coord in GridCoord::all() {
            for axis in Axis::iter() {
                for direction in Direction::iter() {
                    let turned = coord.rotated(axis, direction);
                    let by_matrix = apply(&quarter_turn(axis, direction), coord.as_array());
                    assert_eq!(turned.as_array(), by_matrix);

                    let degrees = 90.0 * f64::from(direction.sign());
                    let p = Mat4::identity()
                        .rotate(axis, degrees, false)
                        .transform_vertex(coord.as_array().map(f64::from));
                    for (a, b) in p.iter().zip(turned.as_array()) {
                        assert_abs_diff_eq!(*a, f64::from(b), epsilon = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_stickers_follow_coords() {
        // The directions a piece's stickers face always match where it sits
        for home in GridCoord::all() {
            let mut orientation = PieceOrientation::new(home);
            let turns = [
                (Axis::X, Direction::Ccw),
                (Axis::Y, Direction::Cw),
                (Axis::Z, Direction::Ccw),
                (Axis::X, Direction::Ccw),
            ];
            for (axis, direction) in turns {
                orientation.rotate_about(axis, direction);
                let facing: HashSet<_> = FaceDirection::iter()
                    .filter(|f| home.outward()[f.index()])
                    .map(|f| orientation.face_direction(f))
                    .collect();
                let outward: HashSet<_> = FaceDirection::iter()
                    .filter(|f| orientation.outward()[f.index()])
                    .collect();
                assert_eq!(facing, outward);
            }
        }
    }

    #[test]
    fn test_sticker_counts() {
        let counts: Vec<usize> = GridCoord::all()
            .map(|c| Piece::new(c, 90.0).sticker_faces().count())
            .collect();
        assert_eq!(counts.iter().filter(|&&n| n == 3).count(), 8);
        assert_eq!(counts.iter().filter(|&&n| n == 2).count(), 12);
        assert_eq!(counts.iter().filter(|&&n| n == 1).count(), 6);
        assert_eq!(counts.iter().filter(|&&n| n == 0).count(), 1);
    }

    #[test]
    fn test_tiles_cover_each_face() {
        for face in FaceDirection::iter() {
            let tiles: HashSet<_> = GridCoord::all()
                .map(|c| Piece::new(c, 90.0))
                .filter_map(|p| p.tile(face))
                .collect();
            assert_eq!(tiles.len(), 9, "face {face:?}");
            assert!(tiles.iter().all(|&(c, r)| c < 3 && r < 3));
        }
    }

    #[test]
    fn test_initial_local_transform() {
        let piece = Piece::new(GridCoord::new(1, -1, 0), 90.0);
        assert_abs_diff_eq!(*piece.local(), Mat4::identity().translate(90.0, -90.0, 0.0));
    }

    #[test]
    fn test_settle_matches_animated_transform() {
        let mut piece = Piece::new(GridCoord::new(1, 1, -1), 90.0);
        let mut animated = *piece.local();
        for _ in 0..18 {
            animated = animated.pre_rotate(Axis::Y, -5.0);
        }
        piece.settle(Axis::Y, Direction::Cw, 1, 90.0);
        assert_abs_diff_eq!(*piece.local(), animated, epsilon = 1e-9);
        assert_eq!(piece.coord(), GridCoord::new(1, 1, 1));
    }
}
