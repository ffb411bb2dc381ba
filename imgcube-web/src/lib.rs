/// imgcube Web - DOM front end driven from WASM
///
/// Every piece face is an absolutely positioned element whose CSS
/// `matrix3d` and `z-index` are rewritten whenever the assembly moves.
/// The host page calls `tick` from `requestAnimationFrame`.
use imgcube_core::{Config, FaceDirection, FaceTransform, Piece, Session, Surface};
use strum::IntoEnumIterator;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

const FACES: usize = 6;

/// Sticker colours shown while a face has no image
const FACE_COLORS: [&str; FACES] = ["#c41e3a", "#0051ba", "#ff5800", "#009e60", "#ffffff", "#ffd500"];
const INTERIOR_COLOR: &str = "#111";

type Style = Vec<(&'static str, String)>;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn apply_style(element: &HtmlElement, style: &Style) -> Result<(), JsValue> {
    let declaration = element.style();
    for (property, value) in style {
        declaration.set_property(property, value)?;
    }
    Ok(())
}

/// Dark square behind every piece face. Its top-left corner sits at the
/// container origin; the world transform already accounts for the half cell.
fn border_style(cell_size: f64) -> Style {
    vec![
        ("position", "absolute".to_string()),
        ("left", "0px".to_string()),
        ("top", "0px".to_string()),
        ("width", format!("{cell_size}px")),
        ("height", format!("{cell_size}px")),
        ("background", INTERIOR_COLOR.to_string()),
    ]
}

/// Sticker inset by a twentieth of the cell on each side
fn sticker_style(cell_size: f64) -> Style {
    let inset = cell_size / 20.0;
    vec![
        ("position", "absolute".to_string()),
        ("left", format!("{inset}px")),
        ("top", format!("{inset}px")),
        ("width", format!("{}px", cell_size - 2.0 * inset)),
        ("height", format!("{}px", cell_size - 2.0 * inset)),
        ("backface-visibility", "hidden".to_string()),
        ("background-repeat", "no-repeat".to_string()),
    ]
}

/// Background offset that shows tile (`col`, `row`) of a face image through
/// an inset sticker
fn tile_position(cell_size: f64, col: u8, row: u8) -> (f64, f64) {
    let inset = cell_size / 20.0;
    (
        -inset - f64::from(col) * cell_size,
        -inset - f64::from(row) * cell_size,
    )
}

fn matrix3d(face: &FaceTransform) -> String {
    let values = face
        .column_major()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("matrix3d({values})")
}

/// Elements for one piece face
struct FaceElements {
    border: HtmlElement,
    sticker: Option<HtmlElement>,
}

/// Writes face transforms into one element per piece face
struct DomSurface {
    faces: Vec<FaceElements>,
    images: [Option<String>; FACES],
    cell_size: f64,
    failure: Option<JsValue>,
}

impl DomSurface {
    fn new(document: &Document, container: &HtmlElement, cell_size: f64, pieces: &[Piece]) -> Result<Self, JsValue> {
        let mut faces = Vec::with_capacity(pieces.len() * FACES);
        for piece in pieces {
            for face in FaceDirection::iter() {
                let border: HtmlElement = document.create_element("div")?.dyn_into()?;
                border.set_class_name("face-border");
                apply_style(&border, &border_style(cell_size))?;

                let sticker = if piece.has_sticker(face) {
                    let sticker: HtmlElement = document.create_element("div")?.dyn_into()?;
                    sticker.set_class_name(&format!("face-{}", face.index() + 1));
                    apply_style(&sticker, &sticker_style(cell_size))?;
                    border.append_child(&sticker)?;
                    Some(sticker)
                } else {
                    None
                };

                container.append_child(&border)?;
                faces.push(FaceElements { border, sticker });
            }
        }
        Ok(Self {
            faces,
            images: Default::default(),
            cell_size,
            failure: None,
        })
    }

    fn paint(&self, elements: &FaceElements, piece: &Piece, face: &FaceTransform) -> Result<(), JsValue> {
        let style = elements.border.style();
        style.set_property("transform", &matrix3d(face))?;
        style.set_property("z-index", &face.z_index().to_string())?;

        let (Some(sticker), Some((col, row))) = (&elements.sticker, piece.tile(face.face)) else {
            return Ok(());
        };
        let style = sticker.style();
        match &self.images[face.face.index()] {
            Some(url) => {
                let s = self.cell_size;
                let (x, y) = tile_position(s, col, row);
                style.set_property("background-image", &format!("url(\"{url}\")"))?;
                style.set_property("background-size", &format!("{}px {}px", 3.0 * s, 3.0 * s))?;
                style.set_property("background-position", &format!("{x}px {y}px"))?;
            }
            None => {
                style.remove_property("background-image")?;
                style.set_property("background-color", FACE_COLORS[face.face.index()])?;
            }
        }
        Ok(())
    }
}

impl Surface for DomSurface {
    fn draw_face(&mut self, index: usize, piece: &Piece, face: &FaceTransform) {
        let Some(elements) = self.faces.get(index * FACES + face.face.index()) else {
            return;
        };
        if let Err(err) = self.paint(elements, piece, face) {
            self.failure.get_or_insert(err);
        }
    }
}

#[wasm_bindgen]
pub struct WebCube {
    session: Session,
    surface: DomSurface,
}

#[wasm_bindgen]
impl WebCube {
    /// Build the cube inside the element with id `container_id`.
    /// `config_toml` overrides the defaults when given.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_toml: Option<String>) -> Result<WebCube, JsValue> {
        let config = match config_toml {
            Some(text) => Config::from_toml_str(&text).map_err(js_error)?,
            None => Config::default(),
        };
        let session = Session::new(config).map_err(js_error)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container: HtmlElement = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {container_id}")))?
            .dyn_into()?;
        container.style().set_property("position", "relative")?;

        let surface = DomSurface::new(
            &document,
            &container,
            session.cube().cell_size(),
            session.cube().pieces(),
        )?;
        let mut cube = WebCube { session, surface };
        cube.redraw()?;
        Ok(cube)
    }

    /// Queue `moves` random turns, or the configured count
    pub fn shuffle(&mut self, moves: Option<usize>) -> Result<(), JsValue> {
        let n = moves.unwrap_or(self.session.config().shuffle_moves);
        // Completion is observed through is_busy
        let _handle = self.session.shuffle(n).map_err(js_error)?;
        Ok(())
    }

    /// Queue turns written like "x1+ y0-"
    pub fn twist(&mut self, notation: &str) -> Result<(), JsValue> {
        let _handle = self.session.play_notation(notation).map_err(js_error)?;
        Ok(())
    }

    /// Advance one animation frame; returns whether work remains
    pub fn tick(&mut self) -> Result<bool, JsValue> {
        self.session.tick(&mut self.surface).map_err(js_error)?;
        self.take_failure()?;
        Ok(self.session.is_busy())
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    pub fn is_solved(&self) -> bool {
        self.session.cube().is_solved()
    }

    /// Show `url` across face `face` (0..6: +z, +x, -z, -x, -y, +y)
    pub fn set_face_image(&mut self, face: usize, url: String) -> Result<(), JsValue> {
        let face = FaceDirection::from_index(face)
            .ok_or_else(|| JsValue::from_str(&format!("face {face} out of range")))?;
        self.surface.images[face.index()] = Some(url);
        self.redraw()
    }

    pub fn clear_images(&mut self) -> Result<(), JsValue> {
        self.surface.images = Default::default();
        self.redraw()
    }

    /// Turn the view about "x", "y" or "z"
    pub fn rotate_view(&mut self, axis: &str, degrees: f64) -> Result<(), JsValue> {
        let axis = match axis {
            "x" => imgcube_core::Axis::X,
            "y" => imgcube_core::Axis::Y,
            "z" => imgcube_core::Axis::Z,
            other => return Err(JsValue::from_str(&format!("unknown axis {other}"))),
        };
        self.session.rotate_view(axis, degrees, &mut self.surface);
        self.take_failure()
    }

    pub fn reset_view(&mut self) -> Result<(), JsValue> {
        self.session.reset_view(&mut self.surface);
        self.take_failure()
    }
}

impl WebCube {
    fn redraw(&mut self) -> Result<(), JsValue> {
        self.session.render(&mut self.surface);
        self.take_failure()
    }

    fn take_failure(&mut self) -> Result<(), JsValue> {
        match self.surface.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgcube_core::{Cube, GridCoord, Mat4};

    fn value(style: &Style, property: &str) -> Option<String> {
        style.iter().find(|(p, _)| *p == property).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_border_sits_at_container_origin() {
        let style = border_style(90.0);
        assert_eq!(value(&style, "left").as_deref(), Some("0px"));
        assert_eq!(value(&style, "top").as_deref(), Some("0px"));
        assert_eq!(value(&style, "width").as_deref(), Some("90px"));
    }

    #[test]
    fn test_face_centre_lands_on_view_origin() {
        // Element centre is its top-left corner plus half a cell, and the
        // transform origin is that centre
        let config = Config::default();
        let cube = Cube::from_config(&config);
        let centre = cube
            .pieces()
            .iter()
            .position(|p| p.coord() == GridCoord::new(0, 0, 0))
            .unwrap();
        let half = config.cell_size / 2.0;
        let p = cube.world().transform_vertex([0.0, 0.0, 0.0]);
        assert!((p[0] + half - config.view.origin[0]).abs() < 1e-9);
        assert!((p[1] + half - config.view.origin[1]).abs() < 1e-9);
        assert_eq!(cube.face_transforms(centre).len(), FACES);
    }

    #[test]
    fn test_sticker_is_inset_and_one_sided() {
        let style = sticker_style(100.0);
        assert_eq!(value(&style, "left").as_deref(), Some("5px"));
        assert_eq!(value(&style, "width").as_deref(), Some("90px"));
        assert_eq!(value(&style, "backface-visibility").as_deref(), Some("hidden"));
    }

    #[test]
    fn test_tile_position_accounts_for_inset() {
        assert_eq!(tile_position(100.0, 0, 0), (-5.0, -5.0));
        assert_eq!(tile_position(100.0, 2, 1), (-205.0, -105.0));
    }

    #[test]
    fn test_matrix3d_is_column_major() {
        let cube = Cube::new(10.0, Mat4::identity().translate(1.0, 2.0, 3.0));
        let face = cube.face_transforms(0)[0];
        let text = matrix3d(&face);
        assert!(text.starts_with("matrix3d("));
        let values: Vec<f64> = text["matrix3d(".len()..text.len() - 1]
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(values.len(), 16);
        let expected = face.matrix.column_major();
        assert_eq!(values[12], expected[12]);
        assert_eq!(values[15], 1.0);
    }
}
