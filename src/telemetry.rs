/*
Copyright [2025] Seimizu Joukan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Telemetry snapshot as returned by the simulator services and the
//! quantities derived from it on every poll.

#[allow(unused)]
use {
    crate::error::SPError,
    error_stack::{Report, Result},
    jlogger_tracing::{jdebug, jerror, jinfo},
    ratatui::prelude::Color,
    serde_derive::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

pub const OVERCURRENT_TRIP_A: f64 = 2500.0;
pub const OVERCURRENT_PICKUP_A: f64 = 1000.0;
pub const GROUND_FAULT_TRIP_A: f64 = 800.0;
pub const GROUND_FAULT_PICKUP_A: f64 = 300.0;
pub const UNDERFREQUENCY_TRIP_HZ: f64 = 48.5;
pub const UNDERFREQUENCY_ALARM_HZ: f64 = 49.0;
pub const FREQUENCY_BAND_LOW_HZ: f64 = 49.8;
pub const FREQUENCY_BAND_HIGH_HZ: f64 = 50.2;

pub const POWER_FACTOR_FLOOR: f64 = 0.85;
pub const POWER_FACTOR_NOMINAL: f64 = 0.95;
pub const POWER_FACTOR_KNEE_A: f64 = 400.0;
pub const POWER_FACTOR_SLOPE_A: f64 = 2000.0;

/// One poll worth of telemetry. Every field is optional on the wire, the
/// services publish overlapping subsets of the same flat record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
    pub fault_current: f64,
    pub fault_detected: bool,
    pub trip_command: bool,
    /// true when the breaker is open
    pub breaker_status: bool,
    pub overcurrent_pickup: bool,
    #[serde(alias = "stNum")]
    pub goose_st_num: u64,
    #[serde(alias = "sqNum")]
    pub goose_sq_num: u64,
    #[serde(alias = "messageCount")]
    pub goose_msg_count: u64,
    #[serde(alias = "lastTime")]
    pub last_goose_time: Option<String>,
    pub last_alarm: Option<String>,
    pub trip_reason: Option<String>,
    pub position: Option<String>,
    pub trip_received: bool,
    pub status: Option<String>,
    pub rx_ok: Option<bool>,
    pub tx_ok: Option<bool>,

    #[serde(skip)]
    pub(crate) raw: Map<String, Value>,
}

impl Snapshot {
    /// Parses a response body. Anything that is not a JSON object, or that
    /// carries a known field with the wrong type, is rejected.
    pub fn parse(body: &str) -> Result<Self, SPError> {
        let value: Value = serde_json::from_str(body.trim()).map_err(|e| {
            Report::new(SPError::ParserError).attach_printable(format!("{e}"))
        })?;

        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SPError> {
        let Value::Object(raw) = value else {
            return Err(Report::new(SPError::ParserError)
                .attach_printable("Telemetry is not a JSON object"));
        };

        let mut snapshot: Snapshot = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(|e| Report::new(SPError::ParserError).attach_printable(format!("{e}")))?;
        snapshot.raw = raw;

        Ok(snapshot)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Breaker position, taken from `position` when published, otherwise
    /// from the `breakerStatus` flag.
    pub fn is_breaker_open(&self) -> bool {
        match self.position.as_deref() {
            Some(p) => p.eq_ignore_ascii_case("OPEN"),
            None => self.breaker_status,
        }
    }

    pub fn is_overcurrent(&self) -> bool {
        self.current > OVERCURRENT_PICKUP_A
    }

    pub fn voltage_str(&self) -> String {
        fmt_voltage(self.voltage)
    }

    pub fn current_str(&self) -> String {
        fmt_current(self.current)
    }

    pub fn frequency_str(&self) -> String {
        fmt_frequency(self.frequency)
    }

    pub fn fault_current_str(&self) -> String {
        fmt_current(self.fault_current)
    }
}

pub fn fmt_voltage(kv: f64) -> String {
    format!("{kv:.1} kV")
}

pub fn fmt_current(amps: f64) -> String {
    format!("{amps:.0} A")
}

pub fn fmt_frequency(hz: f64) -> String {
    format!("{hz:.3} Hz")
}

pub fn power_factor(current: f64) -> f64 {
    if current > 0.0 {
        let droop = ((current - POWER_FACTOR_KNEE_A) / POWER_FACTOR_SLOPE_A).max(0.0);
        (POWER_FACTOR_NOMINAL - droop).max(POWER_FACTOR_FLOOR)
    } else {
        1.0
    }
}

/// Three-phase active power in MW, voltage in kV and current in A.
pub fn active_power_mw(voltage: f64, current: f64) -> f64 {
    voltage * current * 3f64.sqrt() * power_factor(current) / 1000.0
}

pub fn reactive_power_mvar(active_mw: f64, pf: f64) -> f64 {
    if pf < 1.0 {
        active_mw * pf.acos().tan()
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerFlow {
    pub power_factor: f64,
    pub active_mw: f64,
    pub reactive_mvar: f64,
}

impl PowerFlow {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let power_factor = power_factor(snapshot.current);
        let active_mw = active_power_mw(snapshot.voltage, snapshot.current);
        Self {
            power_factor,
            active_mw,
            reactive_mvar: reactive_power_mvar(active_mw, power_factor),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Trip,
}

impl Severity {
    pub fn color(&self) -> Color {
        match self {
            Severity::Normal => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Trip => Color::Red,
        }
    }
}

/// Protection element state shown next to each element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementState {
    pub severity: Severity,
    pub label: &'static str,
}

impl ElementState {
    const NORMAL: ElementState = ElementState {
        severity: Severity::Normal,
        label: "NORMAL",
    };
}

/// Phase overcurrent, 50/51.
pub fn overcurrent_state(current: f64) -> ElementState {
    if current >= OVERCURRENT_TRIP_A {
        ElementState {
            severity: Severity::Trip,
            label: "50-INST TRIP",
        }
    } else if current >= OVERCURRENT_PICKUP_A {
        ElementState {
            severity: Severity::Warning,
            label: "51-PICKUP",
        }
    } else {
        ElementState::NORMAL
    }
}

/// Ground fault, 50G/51G.
pub fn ground_fault_state(fault_current: f64) -> ElementState {
    if fault_current >= GROUND_FAULT_TRIP_A {
        ElementState {
            severity: Severity::Trip,
            label: "50G-INST TRIP",
        }
    } else if fault_current >= GROUND_FAULT_PICKUP_A {
        ElementState {
            severity: Severity::Warning,
            label: "51G-PICKUP",
        }
    } else {
        ElementState::NORMAL
    }
}

/// Underfrequency, 81U.
pub fn underfrequency_state(frequency: f64) -> ElementState {
    if frequency < UNDERFREQUENCY_TRIP_HZ {
        ElementState {
            severity: Severity::Trip,
            label: "81U-TRIP",
        }
    } else if frequency < UNDERFREQUENCY_ALARM_HZ {
        ElementState {
            severity: Severity::Warning,
            label: "81U-ALARM",
        }
    } else {
        ElementState::NORMAL
    }
}

pub fn frequency_deviation(frequency: f64) -> Severity {
    if (FREQUENCY_BAND_LOW_HZ..=FREQUENCY_BAND_HIGH_HZ).contains(&frequency) {
        Severity::Normal
    } else {
        Severity::Warning
    }
}

/// Most likely cause of an active trip, checked from the most to the least
/// severe element.
pub fn trip_reason(snapshot: &Snapshot) -> &'static str {
    if !snapshot.trip_command {
        return "Normal";
    }

    if snapshot.fault_current >= GROUND_FAULT_TRIP_A {
        "50G-Instantaneous GF"
    } else if snapshot.fault_current >= GROUND_FAULT_PICKUP_A {
        "51G-Time GF"
    } else if snapshot.current >= OVERCURRENT_TRIP_A {
        "50-Instantaneous O/C"
    } else if snapshot.current >= OVERCURRENT_PICKUP_A {
        "51-Time O/C"
    } else if snapshot.frequency < UNDERFREQUENCY_TRIP_HZ {
        "81U-Underfrequency"
    } else {
        "Manual Trip"
    }
}
