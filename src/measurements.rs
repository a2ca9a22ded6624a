//! Per-timestep micrometeorological inputs.

use std::collections::HashSet;

use ndarray::Array1;

use crate::error::{FootprintError, Result};

/// Time-ordered measurement columns. Every column has one entry per `time` key.
///
/// Only [`MeasurementSeries::new`] builds a series, so a value of this type is
/// never ragged and never repeats a time key.
#[derive(Clone, Debug)]
pub struct MeasurementSeries {
    air_pressure: Array1<f64>,
    air_temperature: Array1<f64>,
    friction_velocity: Array1<f64>,
    wind_speed: Array1<f64>,
    crosswind_variance: Array1<f64>,
    wind_direction: Array1<f64>,
    monin_obukhov_length: Array1<f64>,
    time: Vec<i64>,
}

impl MeasurementSeries {
    /// Assemble a series, rejecting empty input, ragged columns and repeated time keys.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        air_pressure: Array1<f64>,
        air_temperature: Array1<f64>,
        friction_velocity: Array1<f64>,
        wind_speed: Array1<f64>,
        crosswind_variance: Array1<f64>,
        wind_direction: Array1<f64>,
        monin_obukhov_length: Array1<f64>,
        time: Vec<i64>,
    ) -> Result<Self> {
        let expected = time.len();
        if expected == 0 {
            return Err(FootprintError::EmptySeries);
        }

        let columns: [(&'static str, usize); 7] = [
            ("air_pressure", air_pressure.len()),
            ("air_temperature", air_temperature.len()),
            ("friction_velocity", friction_velocity.len()),
            ("wind_speed", wind_speed.len()),
            ("crosswind_variance", crosswind_variance.len()),
            ("wind_direction", wind_direction.len()),
            ("monin_obukhov_length", monin_obukhov_length.len()),
        ];
        for (field, found) in columns {
            if found != expected {
                return Err(FootprintError::LengthMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }

        let mut seen = HashSet::with_capacity(expected);
        for &t in &time {
            if !seen.insert(t) {
                return Err(FootprintError::DuplicateTime(t));
            }
        }

        Ok(Self {
            air_pressure,
            air_temperature,
            friction_velocity,
            wind_speed,
            crosswind_variance,
            wind_direction,
            monin_obukhov_length,
            time,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Pa
    pub fn air_pressure(&self) -> &Array1<f64> {
        &self.air_pressure
    }

    /// °C
    pub fn air_temperature(&self) -> &Array1<f64> {
        &self.air_temperature
    }

    pub fn friction_velocity(&self) -> &Array1<f64> {
        &self.friction_velocity
    }

    pub fn wind_speed(&self) -> &Array1<f64> {
        &self.wind_speed
    }

    pub fn crosswind_variance(&self) -> &Array1<f64> {
        &self.crosswind_variance
    }

    /// Degrees clockwise from north, direction the wind blows from.
    pub fn wind_direction(&self) -> &Array1<f64> {
        &self.wind_direction
    }

    pub fn monin_obukhov_length(&self) -> &Array1<f64> {
        &self.monin_obukhov_length
    }

    /// Time keys in input order.
    pub fn time(&self) -> &[i64] {
        &self.time
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::array;

    type Row = (f64, f64, f64, f64, f64);

    /// Series with keys `0..n`, one row per timestep.
    pub(crate) fn series_of(rows: &[Row]) -> MeasurementSeries {
        series_at(rows, (0..rows.len() as i64).collect())
    }

    /// Series with the given time keys.
    pub(crate) fn series_at(rows: &[Row], time: Vec<i64>) -> MeasurementSeries {
        // (friction_velocity, wind_speed, crosswind_variance, wind_direction, L)
        let col = |f: fn(&Row) -> f64| rows.iter().map(f).collect::<Array1<f64>>();
        MeasurementSeries::new(
            Array1::from_elem(rows.len(), 101_325.0),
            Array1::from_elem(rows.len(), 20.0),
            col(|r| r.0),
            col(|r| r.1),
            col(|r| r.2),
            col(|r| r.3),
            col(|r| r.4),
            time,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_series() {
        let s = series_of(&[(0.3, 3.0, 1.0, 0.0, -50.0), (0.2, 2.0, 0.8, 90.0, 40.0)]);
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_length_mismatch_is_reported() {
        let err = MeasurementSeries::new(
            array![1.0, 2.0],
            array![1.0, 2.0],
            array![1.0, 2.0],
            array![1.0],
            array![1.0, 2.0],
            array![1.0, 2.0],
            array![1.0, 2.0],
            vec![0, 1],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FootprintError::LengthMismatch {
                field: "wind_speed",
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_duplicate_time_rejected() {
        let one = || array![1.0, 2.0, 3.0];
        let err =
            MeasurementSeries::new(one(), one(), one(), one(), one(), one(), one(), vec![5, 6, 5])
                .unwrap_err();
        assert!(matches!(err, FootprintError::DuplicateTime(5)));
    }

    #[test]
    fn test_accessors_keep_key_order() {
        let rows = [(0.3, 3.0, 1.0, 10.0, -50.0), (0.2, 2.0, 0.8, 90.0, 40.0)];
        let s = series_at(&rows, vec![9, 4]);
        assert_eq!(s.time(), &[9, 4]);
        assert_eq!(s.wind_direction(), &array![10.0, 90.0]);
        assert_eq!(s.monin_obukhov_length(), &array![-50.0, 40.0]);
        assert_eq!(s.air_pressure().len(), 2);
    }

    #[test]
    fn test_empty_rejected() {
        let e = Array1::<f64>::zeros(0);
        let err = MeasurementSeries::new(
            e.clone(),
            e.clone(),
            e.clone(),
            e.clone(),
            e.clone(),
            e.clone(),
            e,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, FootprintError::EmptySeries));
    }
}
