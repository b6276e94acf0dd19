use std::io::Write;

use gerber_types::{
    Command, CoordinateFormat, CoordinateNumber, Coordinates, ExtendedCode, FunctionCode, GerberCode, MCode,
    Polarity, Unit,
};
use nalgebra::Point2;

use crate::error::GerberError;

/// 3 integer and 6 fractional digits, in millimeters.
pub fn coordinate_format() -> CoordinateFormat {
    CoordinateFormat::new(3, 6)
}

pub fn coordinates(position: &Point2<f64>) -> Result<Coordinates, GerberError> {
    Ok(Coordinates::new(
        CoordinateNumber::try_from(position.x)?,
        CoordinateNumber::try_from(position.y)?,
        coordinate_format(),
    ))
}

/// Coordinate format, units and polarity, written at the top of every layer.
pub fn header() -> Vec<Command> {
    vec![
        Command::ExtendedCode(ExtendedCode::CoordinateFormat(coordinate_format())),
        Command::ExtendedCode(ExtendedCode::Unit(Unit::Millimeters)),
        Command::ExtendedCode(ExtendedCode::LoadPolarity(Polarity::Dark)),
    ]
}

pub fn end_of_file() -> Command {
    Command::FunctionCode(FunctionCode::MCode(MCode::EndOfFile))
}

/// Serializes the commands one at a time, straight to the sink.
pub fn write_commands(mut w: &mut dyn Write, commands: &[Command]) -> Result<(), GerberError> {
    for command in commands {
        command.serialize(&mut w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gerber_types::{DCode, Operation};
    use rstest::rstest;

    use super::*;

    fn source(commands: &[Command]) -> String {
        let mut buf = Vec::new();
        write_commands(&mut buf, commands).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header() {
        assert_eq!(source(&header()), "%FSLAX36Y36*%\n%MOMM*%\n%LPD*%\n");
    }

    #[test]
    fn test_end_of_file() {
        assert_eq!(source(&[end_of_file()]), "M02*\n");
    }

    #[rstest]
    #[case((0.0, 0.0), "X0Y0D03*\n")]
    #[case((1.0, -2.0), "X1000000Y-2000000D03*\n")]
    #[case((1.5, 0.125), "X1500000Y125000D03*\n")]
    #[case((-0.25, 999.5), "X-250000Y999500000D03*\n")]
    fn test_coordinates(#[case] position: (f64, f64), #[case] expected: &str) {
        // given
        let coords = coordinates(&Point2::new(position.0, position.1)).unwrap();

        // when
        let result = source(&[DCode::Operation(Operation::Flash(coords)).into()]);

        // then
        assert_eq!(result, expected);
    }
}
