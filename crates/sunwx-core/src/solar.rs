//! Reconciliation of gateway payloads into one solar snapshot
//!
//! The gateway exposes four overlapping views of the same installation. Each
//! output metric has a fallback chain: an ordered list of [`Candidate`]
//! steps, tried in turn until one yields a finite value. The chains are plain
//! data so that every precedence rule can be exercised on its own.
//!
//! Sources, most to least authoritative:
//! - live meter (`ivp/livedata/status`): true instantaneous power, grid
//!   flow signed (negative is export)
//! - production summary (`production.json`): slightly less fresh
//! - inverter list: per-inverter reports, an approximation of production only
//!
//! Daily totals (`ivp/pdm/energy`) lead every energy chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coerce::{coerce_number, coerce_string, number};
use crate::types::{
    EnergyFlow, GatewayPayloads, InverterField, MeterChannel, RawDailyEnergy, RawInverter,
    RawLiveMeterStatus, RawProductionSummary, SummaryChannel,
};
use crate::units::{milliwatts_to_kw, watts_to_kw, wh_to_kwh};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolarSnapshot {
    /// kW
    pub producing: f64,
    pub importing: f64,
    pub consuming: f64,
    pub exporting: f64,
    /// kWh since local midnight
    pub produced: f64,
    pub consumed: f64,
    pub exported: f64,
    /// kW, best known historical peak
    pub peak: f64,
    /// kWh; not reported by any source, always 0
    pub imported: f64,
    pub inverters: Vec<InverterSummary>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InverterSummary {
    pub serial: String,
    pub last_report_watts: f64,
    pub max_report_watts: f64,
}

/// The gateway payloads visible to one reconciliation; `None` is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarSources<'a> {
    pub summary: Option<&'a RawProductionSummary>,
    pub inverters: Option<&'a [RawInverter]>,
    pub live: Option<&'a RawLiveMeterStatus>,
    pub energy: Option<&'a RawDailyEnergy>,
}

impl<'a> From<&'a GatewayPayloads> for SolarSources<'a> {
    fn from(payloads: &'a GatewayPayloads) -> Self {
        Self {
            summary: payloads.summary.as_ref(),
            inverters: payloads.inverters.as_deref(),
            live: payloads.live.as_ref(),
            energy: payloads.energy.as_ref(),
        }
    }
}

/// One named step of a fallback chain
#[derive(Clone, Copy)]
pub struct Candidate {
    pub source: &'static str,
    pub resolve: fn(&SolarSources<'_>) -> Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f64,
    /// Winning step, `None` when the chain was exhausted
    pub source: Option<&'static str>,
}

/// Walk a chain and return the first finite value, or 0
pub fn resolve(chain: &[Candidate], sources: &SolarSources<'_>) -> Resolved {
    chain
        .iter()
        .find_map(|candidate| {
            (candidate.resolve)(sources)
                .filter(|value| value.is_finite())
                .map(|value| Resolved {
                    value,
                    source: Some(candidate.source),
                })
        })
        .unwrap_or(Resolved {
            value: 0.0,
            source: None,
        })
}

pub const PRODUCING: &[Candidate] = &[
    Candidate {
        source: "livedata.pv",
        resolve: live_pv_power,
    },
    Candidate {
        source: "production.site",
        resolve: site_power,
    },
    Candidate {
        source: "inverters.lastReportWatts",
        resolve: inverter_power,
    },
];

pub const CONSUMING: &[Candidate] = &[
    Candidate {
        source: "livedata.load",
        resolve: live_load_power,
    },
    Candidate {
        source: "production.total-consumption",
        resolve: total_consumption_power,
    },
];

pub const IMPORTING: &[Candidate] = &[
    Candidate {
        source: "livedata.grid",
        resolve: live_grid_import,
    },
    Candidate {
        source: "production.net-consumption",
        resolve: net_consumption_import,
    },
];

pub const EXPORTING: &[Candidate] = &[
    Candidate {
        source: "livedata.grid",
        resolve: live_grid_export,
    },
    Candidate {
        source: "production.net-consumption",
        resolve: net_consumption_export,
    },
];

pub const PRODUCED: &[Candidate] = &[
    Candidate {
        source: "pdm.production",
        resolve: daily_produced,
    },
    Candidate {
        source: "production.site",
        resolve: site_energy_today,
    },
    Candidate {
        source: "inverters.whLifetime",
        resolve: inverter_lifetime_energy,
    },
];

pub const CONSUMED: &[Candidate] = &[
    Candidate {
        source: "pdm.consumption",
        resolve: daily_consumed,
    },
    Candidate {
        source: "production.total-consumption",
        resolve: total_consumption_energy,
    },
];

pub const EXPORTED: &[Candidate] = &[
    Candidate {
        source: "pdm",
        resolve: daily_surplus,
    },
    Candidate {
        source: "production",
        resolve: summary_surplus,
    },
];

pub const PEAK: &[Candidate] = &[
    Candidate {
        source: "inverters.maxReportWatts",
        resolve: inverter_peak,
    },
    Candidate {
        source: "production.site",
        resolve: site_power,
    },
];

fn live_power_kw(sources: &SolarSources<'_>, channel: MeterChannel) -> Option<f64> {
    number(sources.live?.power_mw(channel)).map(milliwatts_to_kw)
}

fn summary_w_now(sources: &SolarSources<'_>, channel: SummaryChannel) -> Option<f64> {
    number(sources.summary?.channel(channel)?.w_now.as_ref())
}

fn summary_wh_today(sources: &SolarSources<'_>, channel: SummaryChannel) -> Option<f64> {
    number(sources.summary?.channel(channel)?.wh_today.as_ref())
}

fn daily_wh(sources: &SolarSources<'_>, flow: EnergyFlow) -> Option<f64> {
    number(sources.energy?.watt_hours_today(flow))
}

/// Finite values of one field across the inverter list; empty when none report it
fn inverter_values<'a>(
    sources: &SolarSources<'a>,
    field: InverterField,
) -> impl Iterator<Item = f64> + 'a {
    sources
        .inverters
        .unwrap_or_default()
        .iter()
        .filter_map(move |inverter| number(inverter.field(field)))
}

fn inverter_sum(sources: &SolarSources<'_>, field: InverterField) -> Option<f64> {
    inverter_values(sources, field).fold(None, |acc, value| Some(acc.unwrap_or(0.0) + value))
}

fn inverter_max(sources: &SolarSources<'_>, field: InverterField) -> Option<f64> {
    inverter_values(sources, field).fold(None, |acc: Option<f64>, value| {
        Some(acc.map_or(value, |max| max.max(value)))
    })
}

fn surplus(produced: f64, consumed: f64) -> f64 {
    (produced - consumed).max(0.0)
}

fn live_pv_power(sources: &SolarSources<'_>) -> Option<f64> {
    live_power_kw(sources, MeterChannel::Pv)
}

fn live_load_power(sources: &SolarSources<'_>) -> Option<f64> {
    live_power_kw(sources, MeterChannel::Load)
}

fn live_grid_import(sources: &SolarSources<'_>) -> Option<f64> {
    live_power_kw(sources, MeterChannel::Grid).filter(|kw| *kw > 0.0)
}

fn live_grid_export(sources: &SolarSources<'_>) -> Option<f64> {
    live_power_kw(sources, MeterChannel::Grid)
        .filter(|kw| *kw < 0.0)
        .map(f64::abs)
}

fn site_power(sources: &SolarSources<'_>) -> Option<f64> {
    summary_w_now(sources, SummaryChannel::Site).map(watts_to_kw)
}

fn total_consumption_power(sources: &SolarSources<'_>) -> Option<f64> {
    summary_w_now(sources, SummaryChannel::TotalConsumption).map(watts_to_kw)
}

fn net_consumption_import(sources: &SolarSources<'_>) -> Option<f64> {
    summary_w_now(sources, SummaryChannel::NetConsumption)
        .map(watts_to_kw)
        .filter(|kw| *kw > 0.0)
}

fn net_consumption_export(sources: &SolarSources<'_>) -> Option<f64> {
    summary_w_now(sources, SummaryChannel::NetConsumption)
        .map(watts_to_kw)
        .filter(|kw| *kw < 0.0)
        .map(f64::abs)
}

fn inverter_power(sources: &SolarSources<'_>) -> Option<f64> {
    inverter_sum(sources, InverterField::LastReportWatts).map(watts_to_kw)
}

fn daily_produced(sources: &SolarSources<'_>) -> Option<f64> {
    daily_wh(sources, EnergyFlow::Production).map(wh_to_kwh)
}

fn daily_consumed(sources: &SolarSources<'_>) -> Option<f64> {
    daily_wh(sources, EnergyFlow::Consumption).map(wh_to_kwh)
}

// The site row's `whToday` is taken as reported, without rescaling.
fn site_energy_today(sources: &SolarSources<'_>) -> Option<f64> {
    summary_wh_today(sources, SummaryChannel::Site)
}

fn total_consumption_energy(sources: &SolarSources<'_>) -> Option<f64> {
    summary_wh_today(sources, SummaryChannel::TotalConsumption).map(wh_to_kwh)
}

fn inverter_lifetime_energy(sources: &SolarSources<'_>) -> Option<f64> {
    inverter_sum(sources, InverterField::WhLifetime).map(wh_to_kwh)
}

fn daily_surplus(sources: &SolarSources<'_>) -> Option<f64> {
    Some(surplus(daily_produced(sources)?, daily_consumed(sources)?))
}

fn summary_surplus(sources: &SolarSources<'_>) -> Option<f64> {
    let produced = summary_wh_today(sources, SummaryChannel::Site).map(wh_to_kwh)?;
    Some(surplus(produced, total_consumption_energy(sources)?))
}

fn inverter_peak(sources: &SolarSources<'_>) -> Option<f64> {
    inverter_max(sources, InverterField::MaxReportWatts).map(watts_to_kw)
}

fn metric(name: &'static str, chain: &[Candidate], sources: &SolarSources<'_>) -> f64 {
    let resolved = resolve(chain, sources);
    match resolved.source {
        Some(source) => debug!(metric = name, source, value = resolved.value, "solar metric resolved"),
        None => debug!(metric = name, "no source reported solar metric, defaulting to 0"),
    }
    // Also folds -0.0 into 0.0
    if resolved.value > 0.0 {
        resolved.value
    } else {
        0.0
    }
}

pub fn summarize_inverters(inverters: Option<&[RawInverter]>) -> Vec<InverterSummary> {
    inverters
        .unwrap_or_default()
        .iter()
        .map(|inverter| InverterSummary {
            serial: coerce_string(inverter.serial_number.as_ref(), ""),
            last_report_watts: coerce_number(inverter.last_report_watts.as_ref(), 0.0),
            max_report_watts: coerce_number(inverter.max_report_watts.as_ref(), 0.0),
        })
        .collect()
}

/// Merge whatever gateway payloads were obtained into one snapshot.
///
/// Total: a metric no source can supply is 0, never absent.
pub fn reconcile(sources: &SolarSources<'_>, captured_at: DateTime<Utc>) -> SolarSnapshot {
    SolarSnapshot {
        producing: metric("producing", PRODUCING, sources),
        importing: metric("importing", IMPORTING, sources),
        consuming: metric("consuming", CONSUMING, sources),
        exporting: metric("exporting", EXPORTING, sources),
        produced: metric("produced", PRODUCED, sources),
        consumed: metric("consumed", CONSUMED, sources),
        exported: metric("exported", EXPORTED, sources),
        peak: metric("peak", PEAK, sources),
        imported: 0.0,
        inverters: summarize_inverters(sources.inverters),
        last_updated: captured_at,
    }
}
