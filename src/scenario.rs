//! Dynamic scenario synthesis.
//!
//! Turns coarse user parameters (density, vehicle mix, arrival pattern,
//! seed) into a concrete vehicle/route schedule document for the simulator,
//! deterministically: the same parameters always yield a byte-identical
//! document because the pseudo-random generator is seeded per call.

use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;

/// Vehicle count and simulation duration for one density tier.
#[derive(Debug, Clone, Copy)]
pub struct DensityConfig {
    pub count: usize,
    /// Simulation end time in seconds.
    pub duration: u32,
}

static DENSITY_CONFIG: &[(&str, DensityConfig)] = &[
    ("low", DensityConfig { count: 15, duration: 200 }),
    ("medium", DensityConfig { count: 40, duration: 300 }),
    ("high", DensityConfig { count: 80, duration: 400 }),
    ("rush_hour", DensityConfig { count: 120, duration: 500 }),
];

/// Class ratios per mix tier. Each tier sums to 1.0; selection quantizes
/// to whole percents by expanding into a 100-entry weighted pool.
static MIX_CONFIG: &[(&str, &[(&str, f64)])] = &[
    ("cars_only", &[("car", 1.0), ("bus", 0.0), ("truck", 0.0)]),
    ("mixed", &[("car", 0.6), ("bus", 0.2), ("truck", 0.2)]),
    ("heavy_commercial", &[("car", 0.3), ("bus", 0.3), ("truck", 0.4)]),
];

static PATTERNS: &[&str] = &["uniform", "rush_hour", "random"];

/// Physical parameters for one vehicle class, written verbatim into the
/// schedule document.
struct VehicleClass {
    id: &'static str,
    length: &'static str,
    min_gap: &'static str,
    max_speed: &'static str,
    color: &'static str,
    accel: &'static str,
    decel: &'static str,
    sigma: &'static str,
}

static VTYPES: &[VehicleClass] = &[
    VehicleClass {
        id: "car",
        length: "5",
        min_gap: "2.5",
        max_speed: "13.89",
        color: "yellow",
        accel: "2.6",
        decel: "4.5",
        sigma: "0.5",
    },
    VehicleClass {
        id: "bus",
        length: "12",
        min_gap: "3.0",
        max_speed: "11.11",
        color: "blue",
        accel: "1.2",
        decel: "4.0",
        sigma: "0.5",
    },
    VehicleClass {
        id: "truck",
        length: "10",
        min_gap: "3.5",
        max_speed: "8.33",
        color: "red",
        accel: "1.0",
        decel: "3.5",
        sigma: "0.5",
    },
];

/// Every route in the network, grouped by entry point. Vehicles are
/// assigned uniformly across the whole table, independent of tier.
static NETWORK_ROUTES: &[(&str, &str)] = &[
    // west
    ("highway_direct", "S1_J1 J1_J2 J2_J3 J3_D1"),
    ("highway_via_city", "S1_J1 J1_J4 J4_J5 J5_J6 J6_J3 J3_D1"),
    ("highway_via_local", "S1_J1 J1_J4 J4_J7 J7_J8 J8_J9 J9_J6 J6_J3 J3_D1"),
    ("west_to_d2_mid", "S1_J1 J1_J2 J2_J5 J5_J8 J8_J9 J9_D2"),
    ("west_to_d2_south", "S1_J1 J1_J4 J4_J7 J7_J8 J8_J9 J9_D2"),
    ("s1_to_sr1", "S1_J1 J1_J2 J2_J5 J5_J8 J8_SR1"),
    ("s1_to_sr2", "S1_J1 J1_J2 J2_J3 J3_J6 J6_J9 J9_SR2"),
    // southwest
    ("s2_to_d1_up", "S2_J7 J7_J4 J4_J1 J1_J2 J2_J3 J3_D1"),
    ("s2_to_d1_mid", "S2_J7 J7_J8 J8_J5 J5_J2 J2_J3 J3_D1"),
    ("s2_to_d2", "S2_J7 J7_J8 J8_J9 J9_D2"),
    // north
    ("nr1_to_d1", "NR1_J1 J1_J2 J2_J3 J3_D1"),
    ("nr1_to_d2", "NR1_J1 J1_J4 J4_J7 J7_J8 J8_J9 J9_D2"),
    ("nr1_to_sr1", "NR1_J1 J1_J4 J4_J5 J5_J8 J8_SR1"),
    ("nr2_to_d1", "NR2_J2 J2_J3 J3_D1"),
    ("nr2_to_d2", "NR2_J2 J2_J5 J5_J8 J8_J9 J9_D2"),
    ("nr2_to_sr1", "NR2_J2 J2_J5 J5_J8 J8_SR1"),
    ("nr3_to_d1", "NR3_J3 J3_D1"),
    ("nr3_to_d2", "NR3_J3 J3_J6 J6_J9 J9_D2"),
    ("nr3_to_sr2", "NR3_J3 J3_J6 J6_J9 J9_SR2"),
];

pub fn density_options() -> Vec<&'static str> {
    DENSITY_CONFIG.iter().map(|(name, _)| *name).collect()
}

pub fn mix_options() -> Vec<&'static str> {
    MIX_CONFIG.iter().map(|(name, _)| *name).collect()
}

pub fn pattern_options() -> Vec<&'static str> {
    PATTERNS.to_vec()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Evenly spaced departures.
fn uniform_departures(count: usize, duration: u32) -> Vec<f64> {
    let gap = f64::from(duration) / count as f64;
    (0..count).map(|i| round2(i as f64 * gap)).collect()
}

/// Departures clustered in the first 40% of the duration (morning rush).
fn rush_hour_departures(count: usize, duration: u32, rng: &mut StdRng) -> Vec<f64> {
    let rush_end = f64::from(duration) * 0.4;
    let mut departures: Vec<f64> = (0..count)
        .map(|_| round2(rng.gen_range(0.0..rush_end)))
        .collect();
    departures.sort_by(f64::total_cmp);
    departures
}

/// Departures spread randomly across the first 80% of the duration.
fn random_departures(count: usize, duration: u32, rng: &mut StdRng) -> Vec<f64> {
    let mut departures: Vec<f64> = (0..count)
        .map(|_| round2(rng.gen_range(0.0..f64::from(duration) * 0.8)))
        .collect();
    departures.sort_by(f64::total_cmp);
    departures
}

/// Generates the vehicle schedule document for the given scenario
/// parameters. Returns the document and the simulation duration.
///
/// # Errors
///
/// Returns an error if any of the three tier names is unknown. Tiers are
/// never silently defaulted.
pub fn generate_scenario(
    density: &str,
    vehicle_mix: &str,
    pattern: &str,
    seed: u64,
) -> Result<(String, u32)> {
    let Some((_, cfg)) = DENSITY_CONFIG.iter().find(|(name, _)| *name == density) else {
        bail!(
            "invalid density '{}', options: {:?}",
            density,
            density_options()
        );
    };
    let Some((_, mix)) = MIX_CONFIG.iter().find(|(name, _)| *name == vehicle_mix) else {
        bail!(
            "invalid vehicle_mix '{}', options: {:?}",
            vehicle_mix,
            mix_options()
        );
    };
    if !PATTERNS.contains(&pattern) {
        bail!("invalid pattern '{}', options: {:?}", pattern, PATTERNS);
    }

    let mut rng = StdRng::seed_from_u64(seed);

    // Weighted class pool: ratio quantized to whole percents.
    let mut type_pool: Vec<&str> = Vec::with_capacity(100);
    for (class, ratio) in *mix {
        let entries = (*ratio * 100.0) as usize;
        type_pool.extend(std::iter::repeat(*class).take(entries));
    }

    let departures = match pattern {
        "uniform" => uniform_departures(cfg.count, cfg.duration),
        "rush_hour" => rush_hour_departures(cfg.count, cfg.duration, &mut rng),
        _ => random_departures(cfg.count, cfg.duration, &mut rng),
    };

    let mut xml = String::new();
    xml.push_str("<routes>\n");

    for vt in VTYPES {
        let _ = writeln!(
            xml,
            "    <vType id=\"{}\" length=\"{}\" minGap=\"{}\" maxSpeed=\"{}\" color=\"{}\" accel=\"{}\" decel=\"{}\" sigma=\"{}\"/>",
            vt.id, vt.length, vt.min_gap, vt.max_speed, vt.color, vt.accel, vt.decel, vt.sigma
        );
    }

    for (route_id, edges) in NETWORK_ROUTES {
        let _ = writeln!(xml, "    <route id=\"{}\" edges=\"{}\"/>", route_id, edges);
    }

    for (i, depart) in departures.iter().enumerate() {
        // Class first, then route, so a given seed replays identically.
        let vtype = type_pool.choose(&mut rng).copied().unwrap_or("car");
        let (route_id, _) = NETWORK_ROUTES
            .choose(&mut rng)
            .copied()
            .unwrap_or(NETWORK_ROUTES[0]);
        let _ = writeln!(
            xml,
            "    <vehicle id=\"v{}\" type=\"{}\" route=\"{}\" depart=\"{:.2}\"/>",
            i, vtype, route_id, depart
        );
    }

    xml.push_str("</routes>\n");

    Ok((xml, cfg.duration))
}
