use std::fmt::Debug;
use std::io::Write;
use std::sync::Arc;

use gerber_types::{Command, DCode, GCode, InterpolationMode, Operation};
use log::{trace, warn};
use nalgebra::Point2;

use crate::aperture::{Aperture, StandardAperture};
use crate::code::{coordinates, write_commands};
use crate::error::GerberError;
use crate::geometry::BoundingBox;

/// A single drawable element of a layer.
pub trait Primitive: Debug {
    /// `None` means the primitive is drawn with the layer's default aperture.
    fn aperture(&self) -> Option<Arc<dyn Aperture>>;

    /// In millimeters.
    fn bounding_box(&self) -> BoundingBox;

    /// Write the aperture select (`D<code>*`) followed by the draw commands.
    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError>;
}

fn select(code: i32) -> Command {
    DCode::SelectAperture(code).into()
}

fn operation(operation: Operation) -> Command {
    DCode::Operation(operation).into()
}

fn move_to(position: &Point2<f64>) -> Result<Command, GerberError> {
    Ok(operation(Operation::Move(coordinates(position)?)))
}

fn line_to(position: &Point2<f64>) -> Result<Command, GerberError> {
    Ok(operation(Operation::Interpolate(coordinates(position)?, None)))
}

/// A single stamp of an aperture, e.g. a pad or a drill hole.
#[derive(Debug, Clone)]
pub struct Flash {
    pub center: Point2<f64>,
    pub aperture: Arc<StandardAperture>,
}

impl Flash {
    pub fn new(center: Point2<f64>, aperture: Arc<StandardAperture>) -> Self {
        Self {
            center,
            aperture,
        }
    }
}

impl Primitive for Flash {
    fn aperture(&self) -> Option<Arc<dyn Aperture>> {
        Some(self.aperture.clone())
    }

    fn bounding_box(&self) -> BoundingBox {
        let (width, height) = self.aperture.size();
        BoundingBox::new(
            Point2::new(self.center.x - width / 2.0, self.center.y - height / 2.0),
            Point2::new(self.center.x + width / 2.0, self.center.y + height / 2.0),
        )
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        let commands = [select(code), operation(Operation::Flash(coordinates(&self.center)?))];
        write_commands(w, &commands)
    }
}

/// A straight trace segment drawn with an aperture.
#[derive(Debug, Clone)]
pub struct Line {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
    pub aperture: Arc<StandardAperture>,
}

impl Line {
    pub fn new(start: Point2<f64>, end: Point2<f64>, aperture: Arc<StandardAperture>) -> Self {
        Self {
            start,
            end,
            aperture,
        }
    }
}

impl Primitive for Line {
    fn aperture(&self) -> Option<Arc<dyn Aperture>> {
        Some(self.aperture.clone())
    }

    fn bounding_box(&self) -> BoundingBox {
        let (width, height) = self.aperture.size();
        let (half_width, half_height) = (width / 2.0, height / 2.0);

        let stamp = |point: &Point2<f64>| {
            BoundingBox::new(
                Point2::new(point.x - half_width, point.y - half_height),
                Point2::new(point.x + half_width, point.y + half_height),
            )
        };

        let mut bbox = stamp(&self.start);
        bbox.join(&stamp(&self.end));

        bbox
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        let commands = [
            select(code),
            GCode::InterpolationMode(InterpolationMode::Linear).into(),
            move_to(&self.start)?,
            line_to(&self.end)?,
        ];
        write_commands(w, &commands)
    }
}

/// A filled polygon. Regions carry no aperture of their own.
#[derive(Debug, Clone)]
pub struct Region {
    pub vertices: Vec<Point2<f64>>,
}

impl Region {
    pub fn new(vertices: Vec<Point2<f64>>) -> Self {
        Self {
            vertices,
        }
    }
}

impl Primitive for Region {
    fn aperture(&self) -> Option<Arc<dyn Aperture>> {
        None
    }

    /// An empty region has no extent, it reports the degenerate box.
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    fn write_gerber(&self, w: &mut dyn Write, code: i32) -> Result<(), GerberError> {
        if self.vertices.len() < 3 {
            warn!("Region with less than 3 vertices. vertices: {:?}", self.vertices);
        }
        trace!("region. vertices: {}", self.vertices.len());

        let mut commands = Vec::with_capacity(self.vertices.len() + 4);
        commands.push(select(code));
        commands.push(GCode::RegionMode(true).into());
        if let Some((first, rest)) = self.vertices.split_first() {
            commands.push(move_to(first)?);
            for vertex in rest {
                commands.push(line_to(vertex)?);
            }
            // close the contour
            commands.push(line_to(first)?);
        }
        commands.push(GCode::RegionMode(false).into());

        write_commands(w, &commands)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::Point2;
    use rstest::rstest;

    use super::*;

    fn written(primitive: &dyn Primitive, code: i32) -> String {
        let mut buf = Vec::new();
        primitive
            .write_gerber(&mut buf, code)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[rstest]
    #[case((0.0, 0.0), "D12*\nX0Y0D03*\n")]
    #[case((1.5, -0.25), "D12*\nX1500000Y-250000D03*\n")]
    #[case((-12.125, 100.0), "D12*\nX-12125000Y100000000D03*\n")]
    fn test_flash_position(#[case] center: (f64, f64), #[case] expected: &str) {
        // given
        let flash = Flash::new(Point2::new(center.0, center.1), Arc::new(StandardAperture::circle(0.5)));

        // expect
        assert_eq!(written(&flash, 12), expected);
    }

    #[test]
    fn test_non_finite_coordinate_is_an_error() {
        // given
        let flash = Flash::new(Point2::new(f64::NAN, 0.0), Arc::new(StandardAperture::circle(0.5)));

        // when
        let result = flash.write_gerber(&mut Vec::new(), 12);

        // then
        assert!(matches!(result, Err(GerberError::Code(_))));
    }

    #[test]
    fn test_flash() {
        // given
        let flash = Flash::new(Point2::new(1.0, -2.0), Arc::new(StandardAperture::rectangle(1.0, 0.5)));

        // expect
        assert_eq!(written(&flash, 12), "D12*\nX1000000Y-2000000D03*\n");
        assert_eq!(
            flash.bounding_box(),
            BoundingBox::new(Point2::new(0.5, -2.25), Point2::new(1.5, -1.75))
        );
        assert_eq!(
            flash
                .aperture()
                .unwrap()
                .id(),
            StandardAperture::rectangle(1.0, 0.5).id()
        );
    }

    #[test]
    fn test_line() {
        // given
        let line = Line::new(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 5.0),
            Arc::new(StandardAperture::circle(0.2)),
        );

        // expect
        assert_eq!(written(&line, 13), "D13*\nG01*\nX0Y0D02*\nX10000000Y5000000D01*\n");

        let bbox = line.bounding_box();
        assert!((bbox.min.x - -0.1).abs() < 1e-9);
        assert!((bbox.min.y - -0.1).abs() < 1e-9);
        assert!((bbox.max.x - 10.1).abs() < 1e-9);
        assert!((bbox.max.y - 5.1).abs() < 1e-9);
    }

    #[test]
    fn test_region() {
        // given
        let region = Region::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
        ]);

        // expect
        assert!(region.aperture().is_none());
        assert_eq!(
            written(&region, 11),
            "D11*\nG36*\nX0Y0D02*\nX2000000Y0D01*\nX2000000Y1000000D01*\nX0Y0D01*\nG37*\n"
        );
        assert_eq!(
            region.bounding_box(),
            BoundingBox::new(Point2::new(0.0, 0.0), Point2::new(2.0, 1.0))
        );
    }

    #[test]
    fn test_empty_region_still_written() {
        // given
        let region = Region::new(vec![]);

        // expect
        assert_eq!(written(&region, 11), "D11*\nG36*\nG37*\n");
        assert_eq!(region.bounding_box(), BoundingBox::degenerate());
    }
}
