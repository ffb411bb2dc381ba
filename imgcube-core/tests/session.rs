use imgcube_core::{
    format_twists, Axis, Config, Direction, FaceTransform, GridCoord, Piece, Session, SessionEvent,
    Surface, Twist,
};
use std::collections::HashMap;

fn config() -> Config {
    Config {
        seed: Some(2024),
        pause_ticks: 0,
        ..Config::default()
    }
}

fn coords(session: &Session) -> Vec<GridCoord> {
    session.cube().pieces().iter().map(|p| p.coord()).collect()
}

/// Keeps the latest transform pushed for every face
#[derive(Default)]
struct RecordingSurface {
    frames: usize,
    faces: HashMap<(usize, usize), FaceTransform>,
}

impl Surface for RecordingSurface {
    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn draw_face(&mut self, index: usize, _piece: &Piece, face: &FaceTransform) {
        self.faces.insert((index, face.face.index()), *face);
    }
}

#[test]
fn test_single_layer_turn() {
    let mut session = Session::new(config()).unwrap();
    let before = coords(&session);
    let mut surface = RecordingSurface::default();

    let mut handle = session.twist(Twist::new(Axis::X, 1, Direction::Ccw)).unwrap();
    let mut ticks = 0;
    while handle.try_recv().unwrap().is_none() {
        session.tick(&mut surface).unwrap();
        ticks += 1;
    }
    assert_eq!(ticks, 14);
    // The settling tick renders the baked transforms instead of the last step
    assert_eq!(surface.frames, 14);
    assert_eq!(surface.faces.len(), 27 * 6);

    let after = coords(&session);
    let mut moved = 0;
    for (b, a) in before.iter().zip(&after) {
        if b.x == 1 {
            assert_eq!(*a, GridCoord::new(b.x, -b.z, b.y));
            moved += 1;
        } else {
            assert_eq!(a, b);
        }
    }
    assert_eq!(moved, 9);
}

#[test]
fn test_shuffle_is_serialized() {
    let mut session = Session::new(config()).unwrap();
    let mut handle = session.shuffle(5).unwrap();

    // Shadow model updated only from completion reports
    let mut shadow = coords(&session);
    let mut began = Vec::new();
    let mut completed = 0;
    let mut in_flight = false;

    for _ in 0..1000 {
        for event in session.tick(&mut imgcube_core::NullSurface).unwrap() {
            match event {
                SessionEvent::TurnBegan { twist, pieces } => {
                    assert!(!in_flight, "turn began before the previous one settled");
                    in_flight = true;
                    let expected: Vec<usize> = shadow
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.component(twist.axis) == twist.layer)
                        .map(|(i, _)| i)
                        .collect();
                    assert_eq!(pieces, expected);
                    began.push(twist);
                }
                SessionEvent::TurnCompleted(report) => {
                    in_flight = false;
                    completed += 1;
                    for &i in &report.pieces {
                        shadow[i] = shadow[i].rotated(report.axis, report.direction);
                    }
                    assert_eq!(shadow, coords(&session));
                }
                SessionEvent::Stepped { .. } => {}
            }
        }
        if !session.is_busy() {
            break;
        }
    }

    assert_eq!(began.len(), 5);
    assert_eq!(completed, 5);
    let report = handle.try_recv().unwrap().unwrap();
    assert_eq!(report.twists, began);
}

#[test]
fn test_script_then_inverse_solves() {
    let mut session = Session::new(config()).unwrap();
    let script = "x1+ y0- z-1+ x-1- y1+";
    let mut handle = session.play_notation(script).unwrap();
    while session.is_busy() {
        session.tick(&mut imgcube_core::NullSurface).unwrap();
    }
    let played = handle.try_recv().unwrap().unwrap().twists;
    assert_eq!(format_twists(&played), script);
    assert!(!session.cube().is_solved());

    let undo: Vec<Twist> = played.iter().rev().map(|t| t.inverse()).collect();
    let _handle = session.play(undo).unwrap();
    while session.is_busy() {
        session.tick(&mut imgcube_core::NullSurface).unwrap();
    }
    assert!(session.cube().is_solved());
}

#[test]
fn test_stickers_point_outward_after_shuffle() {
    let mut session = Session::new(config()).unwrap();
    let _handle = session.shuffle(12).unwrap();
    while session.is_busy() {
        session.tick(&mut imgcube_core::NullSurface).unwrap();
    }
    for piece in session.cube().pieces() {
        let outward = piece.orientation().outward();
        for face in piece.sticker_faces() {
            let now = piece.orientation().face_direction(face);
            assert!(outward[now.index()], "sticker of {} faces inward", piece.home());
        }
    }
}
