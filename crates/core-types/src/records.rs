use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Using `#[serde(rename_all = "camelCase")]` so the wire format matches what
// the CLI and any other HTTP consumer expect (`restingMetab`, `distanceUnit`, ...).

/// A single dated body-measurement record, as stored in the `weighins` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeighIn {
    /// Server-assigned, monotonically increasing identity.
    pub id: i64,
    pub date: NaiveDate,
    /// Body weight in pounds. The store only accepts values in [100, 300].
    pub weight: f64,
    pub bmi: f64,
    /// Body fat percentage (0-100).
    pub fat: Option<f64>,
    /// Muscle mass percentage (0-100).
    pub muscle: Option<f64>,
    /// Resting metabolic rate in kcal, must exceed 1000.
    #[sqlx(rename = "restingMetab")]
    pub resting_metab: Option<i64>,
    /// Visceral fat level (10-30).
    #[sqlx(rename = "visceralFat")]
    pub visceral_fat: Option<i64>,
}

/// The body of `POST /weight`. Identity is assigned by the store, so any `id`
/// a caller sends is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeighIn {
    #[serde(deserialize_with = "crate::dates::deserialize_iso_date")]
    pub date: NaiveDate,
    pub weight: f64,
    pub bmi: f64,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub muscle: Option<f64>,
    #[serde(default)]
    pub resting_metab: Option<i64>,
    #[serde(default)]
    pub visceral_fat: Option<i64>,
}

impl NewWeighIn {
    /// A weigh-in with only the mandatory fields set.
    pub fn new(date: NaiveDate, weight: f64, bmi: f64) -> Self {
        Self {
            date,
            weight,
            bmi,
            fat: None,
            muscle: None,
            resting_metab: None,
            visceral_fat: None,
        }
    }

    /// Attaches the identity assigned by the store.
    pub fn with_id(self, id: i64) -> WeighIn {
        WeighIn {
            id,
            date: self.date,
            weight: self.weight,
            bmi: self.bmi,
            fat: self.fat,
            muscle: self.muscle,
            resting_metab: self.resting_metab,
            visceral_fat: self.visceral_fat,
        }
    }
}

/// A single dated running-activity record, as stored in the `runs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: i64,
    pub date: NaiveDate,
    /// Always strictly positive.
    pub distance: f64,
    /// Free-text unit label, e.g. "mi" or "km".
    #[sqlx(rename = "distanceUnit")]
    pub distance_unit: String,
    /// Duration of the run in whole seconds.
    #[serde(rename = "time", alias = "timeInSeconds")]
    #[sqlx(rename = "time")]
    pub time_in_seconds: i64,
}

/// The body of `POST /run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRun {
    #[serde(deserialize_with = "crate::dates::deserialize_iso_date")]
    pub date: NaiveDate,
    pub distance: f64,
    pub distance_unit: String,
    #[serde(rename = "time", alias = "timeInSeconds")]
    pub time_in_seconds: i64,
}

impl NewRun {
    pub fn with_id(self, id: i64) -> Run {
        Run {
            id,
            date: self.date,
            distance: self.distance,
            distance_unit: self.distance_unit,
            time_in_seconds: self.time_in_seconds,
        }
    }
}

/// The derived summary served by `GET /about`. Never persisted; it is rebuilt
/// from the store on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub api_version: String,
    pub weigh_ins_count: i64,
    pub runs_count: i64,
    pub last_weigh_in_date: Option<NaiveDate>,
    pub last_run_date: Option<NaiveDate>,
}

impl AboutInfo {
    /// The zero-valued summary reported for an empty (or unreachable) store.
    pub fn empty(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            weigh_ins_count: 0,
            runs_count: 0,
            last_weigh_in_date: None,
            last_run_date: None,
        }
    }
}
