//! Raw upstream payloads
//!
//! Gateway firmware revisions and the weather service both omit fields
//! freely, so every leaf is optional. A missing key and an explicit `null`
//! both mean "not reported".

use serde::{Deserialize, Serialize};

/// A leaf value from an upstream payload, before coercion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// `production.json`: aggregate production and consumption channels
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawProductionSummary {
    #[serde(default)]
    pub production: Vec<RawChannel>,
    #[serde(default)]
    pub consumption: Vec<RawChannel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    #[serde(rename = "type")]
    pub kind: Option<Scalar>,
    pub measurement_type: Option<Scalar>,
    pub w_now: Option<Scalar>,
    pub wh_today: Option<Scalar>,
    pub wh_lifetime: Option<Scalar>,
}

/// Named rows of the production summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryChannel {
    Site,
    TotalConsumption,
    NetConsumption,
}

impl SummaryChannel {
    fn measurement_type(self) -> &'static str {
        match self {
            SummaryChannel::Site => "production",
            SummaryChannel::TotalConsumption => "total-consumption",
            SummaryChannel::NetConsumption => "net-consumption",
        }
    }
}

impl RawProductionSummary {
    /// First row reporting the given channel, if any
    pub fn channel(&self, which: SummaryChannel) -> Option<&RawChannel> {
        let rows = match which {
            SummaryChannel::Site => &self.production,
            SummaryChannel::TotalConsumption | SummaryChannel::NetConsumption => {
                &self.consumption
            }
        };
        rows.iter().find(|row| match &row.measurement_type {
            Some(Scalar::Text(kind)) => kind == which.measurement_type(),
            _ => false,
        })
    }
}

/// One entry of `api/v1/production/inverters`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawInverter {
    pub serial_number: Option<Scalar>,
    pub last_report_date: Option<Scalar>,
    pub dev_type: Option<Scalar>,
    pub last_report_watts: Option<Scalar>,
    pub max_report_watts: Option<Scalar>,
    pub wh_lifetime: Option<Scalar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverterField {
    LastReportWatts,
    MaxReportWatts,
    WhLifetime,
}

impl RawInverter {
    pub fn field(&self, field: InverterField) -> Option<&Scalar> {
        match field {
            InverterField::LastReportWatts => self.last_report_watts.as_ref(),
            InverterField::MaxReportWatts => self.max_report_watts.as_ref(),
            InverterField::WhLifetime => self.wh_lifetime.as_ref(),
        }
    }
}

/// `ivp/livedata/status`: near-real-time meter channels
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawLiveMeterStatus {
    pub meters: Option<RawMeters>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMeters {
    pub last_update: Option<Scalar>,
    pub pv: Option<RawMeterChannel>,
    pub grid: Option<RawMeterChannel>,
    pub load: Option<RawMeterChannel>,
    pub storage: Option<RawMeterChannel>,
    pub generator: Option<RawMeterChannel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawMeterChannel {
    /// Aggregate active power, milliwatts
    pub agg_p_mw: Option<Scalar>,
    /// Aggregate apparent power, milli-VA
    pub agg_s_mva: Option<Scalar>,
}

/// Meter channels read by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterChannel {
    Pv,
    Grid,
    Load,
}

impl RawLiveMeterStatus {
    /// Aggregate active power of a channel in milliwatts, unparsed
    pub fn power_mw(&self, which: MeterChannel) -> Option<&Scalar> {
        let meters = self.meters.as_ref()?;
        let channel = match which {
            MeterChannel::Pv => meters.pv.as_ref(),
            MeterChannel::Grid => meters.grid.as_ref(),
            MeterChannel::Load => meters.load.as_ref(),
        }?;
        channel.agg_p_mw.as_ref()
    }
}

/// `ivp/pdm/energy`: today's energy totals
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawDailyEnergy {
    pub production: Option<RawEnergyBucket>,
    pub consumption: Option<RawEnergyBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEnergyBucket {
    pub eim: Option<RawEnergyTotals>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawEnergyTotals {
    pub watt_hours_today: Option<Scalar>,
    pub watt_hours_seven_days: Option<Scalar>,
    pub watt_hours_lifetime: Option<Scalar>,
    pub watts_now: Option<Scalar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyFlow {
    Production,
    Consumption,
}

impl RawDailyEnergy {
    /// Watt-hours accumulated today for one direction, unparsed
    pub fn watt_hours_today(&self, flow: EnergyFlow) -> Option<&Scalar> {
        let bucket = match flow {
            EnergyFlow::Production => self.production.as_ref(),
            EnergyFlow::Consumption => self.consumption.as_ref(),
        }?;
        bucket.eim.as_ref()?.watt_hours_today.as_ref()
    }
}

/// OpenWeatherMap current-conditions response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWeather {
    pub main: Option<RawWeatherMain>,
    pub rain: Option<RawRain>,
    pub clouds: Option<RawClouds>,
    pub wind: Option<RawWind>,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
    pub dt: Option<Scalar>,
    pub name: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWeatherMain {
    pub temp: Option<Scalar>,
    pub humidity: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRain {
    #[serde(rename = "1h")]
    pub one_hour: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawClouds {
    pub all: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWind {
    pub speed: Option<Scalar>,
    pub deg: Option<Scalar>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawCondition {
    pub description: Option<Scalar>,
    pub icon: Option<Scalar>,
}

/// The four gateway payloads of one run; `None` means unavailable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayPayloads {
    pub summary: Option<RawProductionSummary>,
    pub inverters: Option<Vec<RawInverter>>,
    pub live: Option<RawLiveMeterStatus>,
    pub energy: Option<RawDailyEnergy>,
}

/// Everything fetched for one run
///
/// `gateway` is `None` only when no gateway credential is configured;
/// `weather` is `None` when unconfigured or unavailable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayloads {
    pub gateway: Option<GatewayPayloads>,
    pub weather: Option<RawWeather>,
}
