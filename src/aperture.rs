use std::fmt::Debug;
use std::io::Write;

use gerber_types::Aperture as ApertureShape;
use log::trace;

use crate::error::GerberError;

/// Registry key reserved for "no aperture"; primitives without an aperture are drawn with it.
pub const DEFAULT_APERTURE_KEY: &str = "default";

/// Select code of the default aperture.
pub const DEFAULT_APERTURE_CODE: i32 = 11;

/// Definition of the default aperture, a 0.001mm circle, written at the top of every layer.
pub const DEFAULT_APERTURE_DEFINITION: &str = "%ADD11C,0.00100*%\n";

/// A reusable stamp shape, referenced by draw commands via a select code.
pub trait Aperture: Debug {
    /// Apertures which report the same identity key are considered identical and are defined once per layer.
    fn id(&self) -> String;

    /// Write the aperture definition (`%ADD<code>...*%`) for the given select code.
    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError>;
}

/// The standard aperture templates, dimensions in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub enum ApertureTemplate {
    Circle {
        diameter: f64,
        hole_diameter: Option<f64>,
    },
    Rectangle {
        x: f64,
        y: f64,
        hole_diameter: Option<f64>,
    },
    Obround {
        x: f64,
        y: f64,
        hole_diameter: Option<f64>,
    },
    /// Regular polygon, `rotation` in degrees.
    Polygon {
        diameter: f64,
        vertices: u8,
        rotation: Option<f64>,
        hole_diameter: Option<f64>,
    },
}

impl TryFrom<ApertureShape> for ApertureTemplate {
    type Error = GerberError;

    fn try_from(shape: ApertureShape) -> Result<Self, Self::Error> {
        match shape {
            ApertureShape::Circle(circle) => Ok(ApertureTemplate::Circle {
                diameter: circle.diameter,
                hole_diameter: circle.hole_diameter,
            }),
            ApertureShape::Rectangle(rect) => Ok(ApertureTemplate::Rectangle {
                x: rect.x,
                y: rect.y,
                hole_diameter: rect.hole_diameter,
            }),
            ApertureShape::Obround(rect) => Ok(ApertureTemplate::Obround {
                x: rect.x,
                y: rect.y,
                hole_diameter: rect.hole_diameter,
            }),
            ApertureShape::Polygon(polygon) => Ok(ApertureTemplate::Polygon {
                diameter: polygon.diameter,
                vertices: polygon.vertices as u8,
                rotation: polygon.rotation,
                hole_diameter: polygon.hole_diameter,
            }),
            other => Err(GerberError::UnsupportedAperture(format!("{:?}", other))),
        }
    }
}

/// A standard aperture (circle, rectangle, obround or polygon).
#[derive(Debug)]
pub struct StandardAperture {
    template: ApertureTemplate,
}

impl StandardAperture {
    /// Macro apertures are not supported.
    pub fn new(shape: ApertureShape) -> Result<Self, GerberError> {
        Ok(Self::from_template(ApertureTemplate::try_from(shape)?))
    }

    pub fn from_template(template: ApertureTemplate) -> Self {
        Self {
            template,
        }
    }

    pub fn circle(diameter: f64) -> Self {
        Self::from_template(ApertureTemplate::Circle {
            diameter,
            hole_diameter: None,
        })
    }

    pub fn rectangle(x: f64, y: f64) -> Self {
        Self::from_template(ApertureTemplate::Rectangle {
            x,
            y,
            hole_diameter: None,
        })
    }

    pub fn obround(x: f64, y: f64) -> Self {
        Self::from_template(ApertureTemplate::Obround {
            x,
            y,
            hole_diameter: None,
        })
    }

    pub fn template(&self) -> &ApertureTemplate {
        &self.template
    }

    /// Width and height of the area covered by a single flash of this aperture, in millimeters.
    ///
    /// Polygons are treated as their circumscribed circle.
    pub fn size(&self) -> (f64, f64) {
        match &self.template {
            ApertureTemplate::Circle {
                diameter, ..
            }
            | ApertureTemplate::Polygon {
                diameter, ..
            } => (*diameter, *diameter),
            ApertureTemplate::Rectangle {
                x,
                y,
                ..
            }
            | ApertureTemplate::Obround {
                x,
                y,
                ..
            } => (*x, *y),
        }
    }

    /// The template part of the definition, e.g. `C,0.25000` or `R,1.00000X0.50000`.
    ///
    /// Numbers are written with 5 fractional digits, like the default aperture.
    fn definition_body(&self) -> String {
        fn with_hole(body: String, hole_diameter: &Option<f64>) -> String {
            match hole_diameter {
                Some(hole) => format!("{}X{:.5}", body, hole),
                None => body,
            }
        }

        match &self.template {
            ApertureTemplate::Circle {
                diameter,
                hole_diameter,
            } => with_hole(format!("C,{:.5}", diameter), hole_diameter),
            ApertureTemplate::Rectangle {
                x,
                y,
                hole_diameter,
            } => with_hole(format!("R,{:.5}X{:.5}", x, y), hole_diameter),
            ApertureTemplate::Obround {
                x,
                y,
                hole_diameter,
            } => with_hole(format!("O,{:.5}X{:.5}", x, y), hole_diameter),
            ApertureTemplate::Polygon {
                diameter,
                vertices,
                rotation,
                hole_diameter,
            } => {
                let mut body = format!("P,{:.5}X{}", diameter, vertices);
                match (rotation, hole_diameter) {
                    (Some(rotation), _) => body.push_str(&format!("X{:.5}", rotation)),
                    // a hole without rotation still needs the rotation slot
                    (None, Some(_)) => body.push_str(&format!("X{:.5}", 0.0)),
                    (None, None) => {}
                }
                with_hole(body, hole_diameter)
            }
        }
    }
}

impl Aperture for StandardAperture {
    /// Built from the exact dimensions, so apertures that only differ beyond the 5 written digits are
    /// still defined separately.
    fn id(&self) -> String {
        format!("{:?}", self.template)
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        let body = self.definition_body();
        trace!("aperture definition. code: {}, body: {}", code, body);
        writeln!(w, "%ADD{}{}*%", code, body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gerber_types::{Aperture as ApertureShape, Circle};
    use rstest::rstest;

    use super::*;

    fn definition(aperture: &StandardAperture, code: i32) -> String {
        let mut buf = Vec::new();
        aperture
            .write_gerber(&mut buf, code)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[rstest]
    #[case(StandardAperture::circle(0.25), 12, "%ADD12C,0.25000*%\n")]
    #[case(StandardAperture::rectangle(1.0, 0.5), 13, "%ADD13R,1.00000X0.50000*%\n")]
    #[case(StandardAperture::obround(0.6, 1.2), 20, "%ADD20O,0.60000X1.20000*%\n")]
    fn test_definition(#[case] aperture: StandardAperture, #[case] code: i32, #[case] expected: &str) {
        assert_eq!(definition(&aperture, code), expected);
    }

    #[test]
    fn test_circle_with_hole_definition() {
        // given
        let aperture = StandardAperture::new(ApertureShape::Circle(Circle {
            diameter: 1.5,
            hole_diameter: Some(0.8),
        }))
        .unwrap();

        // expect
        assert_eq!(definition(&aperture, 12), "%ADD12C,1.50000X0.80000*%\n");
        assert_eq!(aperture.template(), &ApertureTemplate::Circle {
            diameter: 1.5,
            hole_diameter: Some(0.8),
        });
    }

    #[rstest]
    #[case(Some(30.0), None, "%ADD14P,2.00000X6X30.00000*%\n")]
    #[case(None, None, "%ADD14P,2.00000X6*%\n")]
    #[case(None, Some(0.5), "%ADD14P,2.00000X6X0.00000X0.50000*%\n")]
    fn test_polygon_definition(
        #[case] rotation: Option<f64>,
        #[case] hole_diameter: Option<f64>,
        #[case] expected: &str,
    ) {
        // given
        let aperture = StandardAperture::from_template(ApertureTemplate::Polygon {
            diameter: 2.0,
            vertices: 6,
            rotation,
            hole_diameter,
        });

        // expect
        assert_eq!(definition(&aperture, 14), expected);
        assert_eq!(aperture.size(), (2.0, 2.0));
    }

    #[test]
    fn test_equal_shapes_share_identity() {
        assert_eq!(StandardAperture::circle(0.1).id(), StandardAperture::circle(0.1).id());
        assert_ne!(StandardAperture::circle(0.1).id(), StandardAperture::circle(0.2).id());
        assert_ne!(
            StandardAperture::rectangle(0.5, 0.5).id(),
            StandardAperture::obround(0.5, 0.5).id()
        );
    }

    #[test]
    fn test_identity_uses_exact_dimensions() {
        // given
        let a = StandardAperture::circle(0.123451);
        let b = StandardAperture::circle(0.123449);

        // expect
        // both are written as `C,0.12345`, but they are not the same aperture
        assert_eq!(definition(&a, 12), definition(&b, 12));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_unsupported_shape() {
        // given
        let shape = ApertureShape::Macro("THERMAL".to_string(), None);

        // when
        let result = StandardAperture::new(shape);

        // then
        assert!(matches!(result, Err(GerberError::UnsupportedAperture(_))));
    }
}
