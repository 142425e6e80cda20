//! Core controller types: snapshots, pairs, state, parameters and step records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::error::{ControllerError, ControllerResult};

/// Input key carrying the connection snapshot.
pub const PHYSICAL_CONNECTIONS: &str = "physical_connections";

/// Name under which the load selector is published.
pub const FILE_INDEX_LOAD: &str = "file_index_Load";

/// Well-known source id of the photovoltaic LED model.
pub const PV_SOURCE: &str = "PV_LED-0.time-based_0";

/// Well-known source id of the wind LED model.
pub const WIND_SOURCE: &str = "Wind_LED-0.time-based_0";

/// Per-step view of every model's connector identifiers.
///
/// Holds two parallel sequences: `values[i]` is the connector set of the
/// model named `sources[i]`. Both always have the same length.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use connectivity_ctl::sim::types::{ConnectionSnapshot, ConnectorId};
///
/// let values = vec![BTreeSet::from([ConnectorId::from("A")]), BTreeSet::new()];
/// let sources = vec!["pv".to_string(), "load".to_string()];
/// let snapshot = ConnectionSnapshot::new(values, sources).unwrap();
/// assert_eq!(snapshot.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    values: Vec<BTreeSet<ConnectorId>>,
    sources: Vec<String>,
}

impl ConnectionSnapshot {
    /// Creates a snapshot from its two parallel sequences.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSnapshot` if the sequences differ in length.
    pub fn new(
        values: Vec<BTreeSet<ConnectorId>>,
        sources: Vec<String>,
    ) -> ControllerResult<Self> {
        if values.len() != sources.len() {
            return Err(ControllerError::malformed(format!(
                "{} connector sets but {} sources",
                values.len(),
                sources.len()
            )));
        }
        Ok(Self { values, sources })
    }

    /// Parses a snapshot from the host's loosely-typed input value.
    ///
    /// Expects an object with `values` (or `value`) holding an array of
    /// connector arrays, and `sources` holding an array of strings. Connector
    /// ids may be strings or integers; `1` and `"1"` are different connectors.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSnapshot` naming the first offending path.
    pub fn from_value(raw: &Value) -> ControllerResult<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| ControllerError::malformed("expected an object"))?;

        let raw_values = obj
            .get("values")
            .or_else(|| obj.get("value"))
            .ok_or_else(|| ControllerError::malformed("missing field `values`"))?
            .as_array()
            .ok_or_else(|| ControllerError::malformed("`values` is not an array"))?;

        let raw_sources = obj
            .get("sources")
            .ok_or_else(|| ControllerError::malformed("missing field `sources`"))?
            .as_array()
            .ok_or_else(|| ControllerError::malformed("`sources` is not an array"))?;

        let mut values = Vec::with_capacity(raw_values.len());
        for (i, entry) in raw_values.iter().enumerate() {
            let ids = entry.as_array().ok_or_else(|| {
                ControllerError::malformed(format!("`values[{i}]` is not a collection"))
            })?;
            let mut set = BTreeSet::new();
            for (j, id) in ids.iter().enumerate() {
                set.insert(connector_id(id).ok_or_else(|| {
                    ControllerError::malformed(format!(
                        "`values[{i}][{j}]` is not a connector identifier"
                    ))
                })?);
            }
            values.push(set);
        }

        let sources = raw_sources
            .iter()
            .enumerate()
            .map(|(i, s)| {
                s.as_str().map(str::to_string).ok_or_else(|| {
                    ControllerError::malformed(format!("`sources[{i}]` is not a string"))
                })
            })
            .collect::<ControllerResult<Vec<_>>>()?;

        Self::new(values, sources)
    }

    /// Number of model entries.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` when the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn values(&self) -> &[BTreeSet<ConnectorId>] {
        &self.values
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Iterates `(connector_ids, source)` entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&BTreeSet<ConnectorId>, &str)> {
        self.values
            .iter()
            .zip(self.sources.iter().map(String::as_str))
    }
}

fn connector_id(value: &Value) -> Option<ConnectorId> {
    match value {
        Value::String(s) => Some(ConnectorId::Str(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .map(ConnectorId::Int),
        _ => None,
    }
}

/// Label of a physical wiring point.
///
/// Integer and string labels never compare equal, even when they print the
/// same.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnectorId {
    Int(i128),
    Str(String),
}

impl From<&str> for ConnectorId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for ConnectorId {
    fn from(n: i64) -> Self {
        Self::Int(i128::from(n))
    }
}

/// Two distinct models found to share at least one connector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionPair {
    /// Source at the lower snapshot index.
    pub first: String,
    /// Source at the higher snapshot index.
    pub second: String,
}

impl ConnectionPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Returns `true` if this pair joins `a` and `b` in either orientation.
    pub fn links(&self, a: &str, b: &str) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

impl fmt::Display for ConnectionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// State the controller publishes to the host after each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    /// Which load data file the downstream source reads (0 or 1).
    #[serde(rename = "file_index_Load")]
    pub file_index_load: u8,
}

impl ControllerState {
    /// Published name → value view, as read by the host.
    pub fn to_map(&self) -> BTreeMap<String, i64> {
        BTreeMap::from([(FILE_INDEX_LOAD.to_string(), i64::from(self.file_index_load))])
    }
}

/// Named inputs handed to the controller for one step.
#[derive(Debug, Clone, Default)]
pub struct StepInputs {
    entries: BTreeMap<String, Value>,
}

impl StepInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs holding only a `physical_connections` entry.
    pub fn with_connections(snapshot: Value) -> Self {
        let mut inputs = Self::new();
        inputs.insert(PHYSICAL_CONNECTIONS, snapshot);
        inputs
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Looks up a required input.
    ///
    /// # Errors
    ///
    /// Returns `MissingInput` if `key` is absent.
    pub fn require(&self, key: &str) -> ControllerResult<&Value> {
        self.get(key).ok_or_else(|| ControllerError::MissingInput {
            key: key.to_string(),
        })
    }
}

/// Battery settings accepted by the controller's schema.
///
/// Carried for the battery logic layered on top; the connectivity step does
/// not read them.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryParams {
    /// Minimum state of charge before discharging stops (%).
    pub soc_min: f32,
    /// Maximum state of charge before charging stops (%).
    pub soc_max: f32,
    /// Maximum power to/from the battery (kW).
    pub max_p: f32,
    /// Whether battery operation is enabled.
    pub battery_active: bool,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            soc_min: 10.0,
            soc_max: 90.0,
            max_p: 0.0,
            battery_active: false,
        }
    }
}

/// Per-instance controller parameters.
///
/// # Examples
///
/// ```
/// use connectivity_ctl::sim::types::ControllerParams;
///
/// let params = ControllerParams::default();
/// assert_eq!(params.time_step_size, 1);
/// assert_eq!(params.load_switch_time, 40);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerParams {
    /// Offset added to `time` to get the next invocation time (> 0).
    pub time_step_size: u64,
    /// Selector switches to 1 strictly after this time.
    pub load_switch_time: u64,
    /// Source id of the PV model.
    pub pv_source: String,
    /// Source id of the wind model.
    pub wind_source: String,
    pub battery: BatteryParams,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            time_step_size: 1,
            load_switch_time: 40,
            pv_source: PV_SOURCE.to_string(),
            wind_source: WIND_SOURCE.to_string(),
            battery: BatteryParams::default(),
        }
    }
}

/// Full outcome of one controller step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Time the step ran at.
    pub time: u64,
    /// Time the controller asks to be invoked next.
    pub next_time: u64,
    /// Pairs discovered in this step's snapshot.
    pub connections: Vec<ConnectionPair>,
    /// Whether the PV and wind models were found connected.
    pub pv_wind_connected: bool,
    /// State published at the end of the step.
    pub state: ControllerState,
}

/// One row of a scenario replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub time: u64,
    pub file_index_load: u8,
    /// Number of connection pairs found.
    pub connections: usize,
    pub pv_wind_connected: bool,
    pub next_time: u64,
}

impl From<&StepReport> for StepRecord {
    fn from(report: &StepReport) -> Self {
        Self {
            time: report.time,
            file_index_load: report.state.file_index_load,
            connections: report.connections.len(),
            pv_wind_connected: report.pv_wind_connected,
            next_time: report.next_time,
        }
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} | file_index_Load={} | pairs={:>2} pv_wind={} | next={}",
            self.time,
            self.file_index_load,
            self.connections,
            self.pv_wind_connected,
            self.next_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_rejects_length_mismatch() {
        let err = ConnectionSnapshot::new(vec![BTreeSet::new()], vec![]).unwrap_err();
        assert!(matches!(err, ControllerError::MalformedSnapshot { .. }));
    }

    #[test]
    fn from_value_accepts_values_and_value_keys() {
        let a = ConnectionSnapshot::from_value(&json!({
            "values": [["A"], ["B"]],
            "sources": ["x", "y"],
        }))
        .unwrap();
        let b = ConnectionSnapshot::from_value(&json!({
            "value": [["A"], ["B"]],
            "sources": ["x", "y"],
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.sources(), ["x", "y"]);
    }

    #[test]
    fn from_value_keeps_integer_ids_distinct_from_strings() {
        let snap = ConnectionSnapshot::from_value(&json!({
            "values": [[1, 2], ["1"], [2]],
            "sources": ["x", "y", "z"],
        }))
        .unwrap();
        assert!(snap.values()[0].contains(&ConnectorId::from(1)));
        assert!(!snap.values()[0].contains(&ConnectorId::from("1")));
        assert!(snap.values()[1].contains(&ConnectorId::from("1")));
        assert!(!snap.values()[0].is_disjoint(&snap.values()[2]));
    }

    #[test]
    fn from_value_reports_offending_path() {
        let err = ConnectionSnapshot::from_value(&json!({
            "values": [["A"], [1.5]],
            "sources": ["x", "y"],
        }))
        .unwrap_err();
        assert!(err.to_string().contains("values[1][0]"));

        let err = ConnectionSnapshot::from_value(&json!({
            "values": ["A"],
            "sources": ["x"],
        }))
        .unwrap_err();
        assert!(err.to_string().contains("values[0]"));
    }

    #[test]
    fn from_value_rejects_mismatched_lengths() {
        let err = ConnectionSnapshot::from_value(&json!({
            "values": [["A"], ["A"]],
            "sources": ["x"],
        }))
        .unwrap_err();
        assert!(matches!(err, ControllerError::MalformedSnapshot { .. }));
    }

    #[test]
    fn from_value_rejects_non_object() {
        assert!(ConnectionSnapshot::from_value(&Value::Null).is_err());
    }

    #[test]
    fn pair_links_either_orientation() {
        let pair = ConnectionPair::new("a", "b");
        assert!(pair.links("a", "b"));
        assert!(pair.links("b", "a"));
        assert!(!pair.links("a", "c"));
    }

    #[test]
    fn state_publishes_under_host_name() {
        let state = ControllerState { file_index_load: 1 };
        assert_eq!(state.to_map().get(FILE_INDEX_LOAD), Some(&1));
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json, json!({ "file_index_Load": 1 }));
    }

    #[test]
    fn require_reports_missing_key() {
        let inputs = StepInputs::new();
        let err = inputs.require(PHYSICAL_CONNECTIONS).unwrap_err();
        assert_eq!(
            err,
            ControllerError::MissingInput {
                key: PHYSICAL_CONNECTIONS.to_string()
            }
        );
    }

    #[test]
    fn step_record_display_does_not_panic() {
        let r = StepRecord {
            time: 3,
            file_index_load: 0,
            connections: 1,
            pv_wind_connected: true,
            next_time: 4,
        };
        assert!(!format!("{r}").is_empty());
    }
}
