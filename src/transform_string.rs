//! # Transform strings
//!
//! Data sets may carry a textual affine transform, applied to the positions after
//! normalization. A transform string is a whitespace-separated sequence of terms:
//!
//! | Term                         | Matrix                                            |
//! |------------------------------|---------------------------------------------------|
//! | `rotate(angle, ax, ay, az)`  | Rotation of `angle` degrees (`°` or `deg` suffix optional) around the axis |
//! | `translate(x, y, z)`         | Translation                                       |
//! | `scale(s)`, `scale(x, y, z)` | Uniform or per-axis scaling                       |
//!
//! The result is the left-to-right product of the term matrices, so the last term is
//! the first one applied to a point. Stress line data sets produced by the tracer use
//! [`STRESS_LINE_TRANSFORM`](crate::constants::STRESS_LINE_TRANSFORM).
use nalgebra::{Matrix4, Unit};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, char, multispace0},
    combinator::opt,
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::{constants::Vec3, line_errors::LineDataError};

fn argument(input: &str) -> IResult<&str, f32> {
    preceded(
        multispace0,
        terminated(float, opt(preceded(multispace0, alt((tag("°"), tag("deg")))))),
    )
    .parse(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<f32>> {
    delimited(
        (multispace0, char('(')),
        separated_list1(preceded(multispace0, char(',')), argument),
        (multispace0, char(')')),
    )
    .parse(input)
}

fn term(input: &str) -> IResult<&str, (&str, Vec<f32>)> {
    (preceded(multispace0, alpha1), arguments).parse(input)
}

fn term_matrix(name: &str, args: &[f32]) -> Result<Matrix4<f32>, LineDataError> {
    let invalid = || {
        LineDataError::InvalidTransformString(format!(
            "{name} does not accept {} arguments",
            args.len()
        ))
    };

    match (name, args) {
        ("rotate", [angle, ax, ay, az]) => {
            let axis = Vec3::new(*ax, *ay, *az);
            if axis.norm() == 0.0 {
                return Err(LineDataError::InvalidTransformString(
                    "rotation axis must not be zero".into(),
                ));
            }
            Ok(Matrix4::from_axis_angle(
                &Unit::new_normalize(axis),
                angle.to_radians(),
            ))
        }
        ("translate", [x, y, z]) => Ok(Matrix4::new_translation(&Vec3::new(*x, *y, *z))),
        ("scale", [s]) => Ok(Matrix4::new_scaling(*s)),
        ("scale", [x, y, z]) => Ok(Matrix4::new_nonuniform_scaling(&Vec3::new(*x, *y, *z))),
        ("rotate" | "translate" | "scale", _) => Err(invalid()),
        _ => Err(LineDataError::InvalidTransformString(format!(
            "unknown transform '{name}'"
        ))),
    }
}

/// Parse a transform string into a homogeneous 4×4 matrix.
///
/// An empty (or blank) string is the identity.
///
/// Return
/// ----------
/// * `Err(LineDataError::InvalidTransformString)` on a syntax error, an unknown term, a
///   wrong argument count or a zero rotation axis.
pub fn parse_transform_string(input: &str) -> Result<Matrix4<f32>, LineDataError> {
    let mut rest = input;
    let mut matrix = Matrix4::identity();

    while !rest.trim().is_empty() {
        let (remaining, (name, args)) = term(rest).map_err(|_| {
            LineDataError::InvalidTransformString(format!("cannot parse '{}'", rest.trim()))
        })?;
        matrix *= term_matrix(name, &args)?;
        rest = remaining;
    }

    Ok(matrix)
}

#[cfg(test)]
mod transform_string_test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::constants::STRESS_LINE_TRANSFORM;

    fn apply(m: &Matrix4<f32>, v: Vec3) -> Vec3 {
        (m * v.push(1.0)).xyz()
    }

    #[test]
    fn test_stress_line_transform() {
        let m = parse_transform_string(STRESS_LINE_TRANSFORM).unwrap();
        assert_relative_eq!(
            apply(&m, Vec3::new(0.0, 1.0, 0.0)),
            Vec3::new(0.0, 0.0, -1.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            apply(&m, Vec3::new(0.0, 0.0, 1.0)),
            Vec3::new(0.0, 1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_composition_order() {
        let m = parse_transform_string("translate(1, 0, 0) scale(2)").unwrap();
        assert_relative_eq!(apply(&m, Vec3::new(1.0, 1.0, 1.0)), Vec3::new(3.0, 2.0, 2.0));

        let m = parse_transform_string(" scale( 1 , 2 , 3 )  rotate(90deg,0,0,1) ").unwrap();
        assert_relative_eq!(
            apply(&m, Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(0.0, 2.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_empty_is_identity() {
        assert_eq!(parse_transform_string("  ").unwrap(), Matrix4::identity());
    }

    #[test]
    fn test_invalid_strings() {
        assert!(parse_transform_string("rotate(90, 0, 0)").is_err());
        assert!(parse_transform_string("rotate(90, 0, 0, 0)").is_err());
        assert!(parse_transform_string("shear(1, 2, 3)").is_err());
        assert!(parse_transform_string("translate(1, 2, 3").is_err());
        assert_eq!(
            parse_transform_string("scale(1, 2)"),
            Err(LineDataError::InvalidTransformString(
                "scale does not accept 2 arguments".into()
            ))
        );
    }
}
