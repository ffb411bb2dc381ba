/// Twists and their text notation, e.g. `x1+ y-1- z0+`
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{all_consuming, map, value},
    multi::separated_list0,
    sequence::{delimited, tuple},
    IResult,
};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::matrix::Axis;
use crate::piece::Direction;

/// A requested quarter turn of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Twist {
    pub axis: Axis,
    pub layer: i8,
    pub direction: Direction,
}

impl Twist {
    /// # Panics
    ///
    /// Panics if `layer` is outside {-1, 0, 1}.
    pub fn new(axis: Axis, layer: i8, direction: Direction) -> Self {
        assert!((-1..=1).contains(&layer), "layer {layer} out of range");
        Self {
            axis,
            layer,
            direction,
        }
    }

    /// The twist that undoes this one
    pub fn inverse(self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self
        }
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Ccw => '+',
            Direction::Cw => '-',
        };
        write!(f, "{}{}{}", self.axis, self.layer, dir)
    }
}

impl FromStr for Twist {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match all_consuming(delimited(multispace0, twist, multispace0))(s) {
            Ok((_, twist)) => Ok(twist),
            Err(e) => Err(notation_error(s, e)),
        }
    }
}

/// Parse a whitespace-separated list of twists
pub fn parse_twists(input: &str) -> Result<Vec<Twist>> {
    let list = delimited(multispace0, separated_list0(multispace1, twist), multispace0);
    match all_consuming(list)(input) {
        Ok((_, twists)) => Ok(twists),
        Err(e) => Err(notation_error(input, e)),
    }
}

/// Render twists back to notation
pub fn format_twists(twists: &[Twist]) -> String {
    twists.iter().map(Twist::to_string).collect::<Vec<_>>().join(" ")
}

fn notation_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
    let remainder = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
        nom::Err::Incomplete(_) => input,
    };
    Error::Notation {
        remainder: remainder.to_string(),
    }
}

fn twist(input: &str) -> IResult<&str, Twist> {
    map(tuple((axis, layer, direction)), |(axis, layer, direction)| Twist {
        axis,
        layer,
        direction,
    })(input)
}

fn axis(input: &str) -> IResult<&str, Axis> {
    alt((
        value(Axis::X, one_of("xX")),
        value(Axis::Y, one_of("yY")),
        value(Axis::Z, one_of("zZ")),
    ))(input)
}

fn layer(input: &str) -> IResult<&str, i8> {
    alt((
        value(-1, tag("-1")),
        value(1, tag("+1")),
        value(1, char('1')),
        value(0, char('0')),
    ))(input)
}

fn direction(input: &str) -> IResult<&str, Direction> {
    alt((
        value(Direction::Ccw, char('+')),
        value(Direction::Cw, char('-')),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let twists = parse_twists("  x1+ Y-1-\tz0+ y+1- ").unwrap();
        assert_eq!(
            twists,
            vec![
                Twist::new(Axis::X, 1, Direction::Ccw),
                Twist::new(Axis::Y, -1, Direction::Cw),
                Twist::new(Axis::Z, 0, Direction::Ccw),
                Twist::new(Axis::Y, 1, Direction::Cw),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_twists("").unwrap().is_empty());
        assert!(parse_twists("   ").unwrap().is_empty());
    }

    #[test]
    fn test_error_reports_remainder() {
        match parse_twists("x1+ q0- z1+") {
            Err(Error::Notation { remainder }) => assert_eq!(remainder, "q0- z1+"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_twists("x2+").is_err());
        assert!(parse_twists("x1").is_err());
        assert!(parse_twists("x1+y1+").is_err());
    }

    #[test]
    fn test_display_matches_notation() {
        let twists = parse_twists("x-1- y0+ z1-").unwrap();
        assert_eq!(format_twists(&twists), "x-1- y0+ z1-");
        assert_eq!("z-1+".parse::<Twist>().unwrap(), Twist::new(Axis::Z, -1, Direction::Ccw));
    }

    #[test]
    fn test_inverse() {
        let twist = Twist::new(Axis::X, 0, Direction::Cw);
        assert_eq!(twist.inverse().direction, Direction::Ccw);
        assert_eq!(twist.inverse().inverse(), twist);
    }
}
