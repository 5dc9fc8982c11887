//! Unit-carrying quantities for forecast values.
//!
//! Each quantity stores one canonical unit internally and converts on read,
//! so callers never pass bare numbers between layers.

use serde::{Deserialize, Serialize};

const METERS_PER_MILE: f64 = 1609.344;
const KM_PER_MILE: f64 = 1.609_344;

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }
}

/// Wind speed unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    Kph,
    #[default]
    Mph,
}

impl SpeedUnit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kph => "km/h",
            Self::Mph => "mph",
        }
    }
}

/// A temperature, stored in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Temperature {
    celsius: f64,
}

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self { celsius }
    }

    pub fn from_fahrenheit(fahrenheit: f64) -> Self {
        Self {
            celsius: (fahrenheit - 32.0) * 5.0 / 9.0,
        }
    }

    pub fn celsius(&self) -> f64 {
        self.celsius
    }

    pub fn fahrenheit(&self) -> f64 {
        self.celsius * 9.0 / 5.0 + 32.0
    }

    pub fn in_unit(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.celsius(),
            TemperatureUnit::Fahrenheit => self.fahrenheit(),
        }
    }
}

/// A length, stored in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance {
    meters: f64,
}

impl Distance {
    pub fn from_meters(meters: f64) -> Self {
        Self { meters }
    }

    pub fn from_millimeters(millimeters: f64) -> Self {
        Self {
            meters: millimeters / 1000.0,
        }
    }

    pub fn from_centimeters(centimeters: f64) -> Self {
        Self {
            meters: centimeters / 100.0,
        }
    }

    pub fn from_kilometers(kilometers: f64) -> Self {
        Self {
            meters: kilometers * 1000.0,
        }
    }

    pub fn from_miles(miles: f64) -> Self {
        Self {
            meters: miles * METERS_PER_MILE,
        }
    }

    pub fn meters(&self) -> f64 {
        self.meters
    }

    pub fn millimeters(&self) -> f64 {
        self.meters * 1000.0
    }

    pub fn kilometers(&self) -> f64 {
        self.meters / 1000.0
    }

    pub fn miles(&self) -> f64 {
        self.meters / METERS_PER_MILE
    }
}

/// A speed, stored in kilometres per hour.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Speed {
    kph: f64,
}

impl Speed {
    pub fn from_kilometers_per_hour(kph: f64) -> Self {
        Self { kph }
    }

    pub fn kilometers_per_hour(&self) -> f64 {
        self.kph
    }

    pub fn miles_per_hour(&self) -> f64 {
        self.kph / KM_PER_MILE
    }

    pub fn in_unit(&self, unit: SpeedUnit) -> f64 {
        match unit {
            SpeedUnit::Kph => self.kilometers_per_hour(),
            SpeedUnit::Mph => self.miles_per_hour(),
        }
    }
}
