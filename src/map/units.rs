/// Conversion factors for one measurement system.
///
/// Geographic distances are first expressed in meters (via the per
/// micro-degree factors) and then converted with `to_screen_unit` or
/// `to_trip_unit`.
#[derive(Debug, PartialEq)]
pub struct UnitSystem {
    pub name: &'static str,
    /// Meters per micro-degree of latitude
    pub unit_per_latitude: f64,
    pub speed_per_knot: f64,
    pub speed_per_meter_per_second: f64,
    pub cm_to_unit: f64,
    /// Meters per trip unit (km or mile)
    pub to_trip_unit: i32,
    /// Meters per short distance unit (m or ft)
    pub to_screen_unit: f64,
    pub length: &'static str,
    pub trip_distance: &'static str,
    pub speed: &'static str,
}

pub static METRIC: UnitSystem = UnitSystem {
    name: "metric",
    unit_per_latitude: 0.11112,
    speed_per_knot: 1.852,
    speed_per_meter_per_second: 3.6,
    cm_to_unit: 0.01,
    to_trip_unit: 1000,
    to_screen_unit: 1.0,
    length: "m",
    trip_distance: "km",
    speed: "km/h",
};

pub static IMPERIAL: UnitSystem = UnitSystem {
    name: "imperial",
    unit_per_latitude: 0.11112,
    speed_per_knot: 1.151,
    speed_per_meter_per_second: 2.24,
    cm_to_unit: 0.01,
    to_trip_unit: 1609,
    to_screen_unit: 0.3048,
    length: "ft",
    trip_distance: "mi",
    speed: "mph",
};

impl UnitSystem {
    pub fn is_metric(&self) -> bool {
        std::ptr::eq(self, &METRIC)
    }

    /// Meters to the short distance unit
    pub fn to_length(&self, meters: i32) -> i32 {
        (meters as f64 / self.to_screen_unit) as i32
    }

    /// Meters to whole trip units
    pub fn to_trip_distance(&self, meters: i32) -> i32 {
        meters / self.to_trip_unit
    }

    /// Meters to tenths of a trip unit
    pub fn to_trip_distance_tenths(&self, meters: i32) -> i32 {
        (10 * meters as i64 / self.to_trip_unit as i64) as i32
    }

    pub fn to_speed(&self, knots: i32) -> i32 {
        (knots as f64 * self.speed_per_knot) as i32
    }

    pub fn meters_per_second_to_speed(&self, mps: f64) -> f64 {
        mps * self.speed_per_meter_per_second
    }

    /// Human-readable distance, switching to trip units past one unit
    pub fn format_distance(&self, meters: i32) -> String {
        if meters.abs() >= self.to_trip_unit {
            let tenths = self.to_trip_distance_tenths(meters);
            format!("{}.{} {}", tenths / 10, (tenths % 10).abs(), self.trip_distance)
        } else {
            format!("{} {}", self.to_length(meters), self.length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert!(METRIC.is_metric());
        assert!(!IMPERIAL.is_metric());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(METRIC.to_trip_distance(2500), 2);
        assert_eq!(METRIC.to_trip_distance_tenths(2500), 25);
        assert_eq!(IMPERIAL.to_length(1000), 3280);
        assert_eq!(IMPERIAL.to_trip_distance(3218), 2);
        assert_eq!(METRIC.to_speed(10), 18);
        assert!((METRIC.meters_per_second_to_speed(10.0) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(METRIC.format_distance(850), "850 m");
        assert_eq!(METRIC.format_distance(1250), "1.2 km");
        assert_eq!(IMPERIAL.format_distance(100), "328 ft");
        assert_eq!(IMPERIAL.format_distance(4023), "2.5 mi");
    }
}
