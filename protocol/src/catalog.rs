//! Built-in parameter catalog.
//!
//! Covers the parameters available on the common Heliotherm controllers
//! (e.g. HP08S10W-WEB, HP10S12W-WEB). Limits are the factory defaults and
//! can be refreshed from the device using
//! [`HeatPump::update_param_limits`](crate::HeatPump::update_param_limits).

use crate::params::{Access, DataType, DpType, Param, Value};

#[derive(Copy, Clone, Debug)]
enum Limits {
    Bool,
    Int(i32, i32),
    Float(f64, f64),
}

#[derive(Debug)]
struct Definition {
    name: &'static str,
    dp_type: DpType,
    number: u16,
    access: Access,
    limits: Limits,
}

const fn mp(name: &'static str, number: u16, limits: Limits) -> Definition {
    Definition {
        name,
        dp_type: DpType::Measurement,
        number,
        access: Access::Read,
        limits,
    }
}

const fn sp(name: &'static str, number: u16, limits: Limits) -> Definition {
    Definition {
        name,
        dp_type: DpType::Setting,
        number,
        access: Access::ReadWrite,
        limits,
    }
}

const DEFINITIONS: &[Definition] = &[
    // Temperatures
    mp("Temp. Aussen", 0, Limits::Float(-20.0, 40.0)),
    mp("Temp. Aussen verzoegert", 1, Limits::Float(-20.0, 40.0)),
    mp("Temp. Brauchwasser", 2, Limits::Float(0.0, 70.0)),
    mp("Temp. Vorlauf", 3, Limits::Float(0.0, 70.0)),
    mp("Temp. Ruecklauf", 4, Limits::Float(0.0, 70.0)),
    mp("Temp. Pufferspeicher", 5, Limits::Float(0.0, 70.0)),
    mp("Temp. EQ_Eintritt", 6, Limits::Float(-20.0, 30.0)),
    mp("Temp. EQ_Austritt", 7, Limits::Float(-20.0, 30.0)),
    mp("Temp. Sauggas", 8, Limits::Float(-20.0, 30.0)),
    mp("Temp. Verdampfung", 9, Limits::Float(-50.0, 30.0)),
    mp("Temp. Kondensation", 10, Limits::Float(-50.0, 60.0)),
    mp("Temp. Heissgas", 11, Limits::Float(0.0, 150.0)),
    mp("Temp. Frischwasser_Istwert", 12, Limits::Float(0.0, 70.0)),
    // Pressures
    mp("Niederdruck (bar)", 13, Limits::Float(0.0, 18.0)),
    mp("Hochdruck (bar)", 14, Limits::Float(0.0, 40.0)),
    // Operating state
    mp("Heizkreispumpe", 15, Limits::Bool),
    mp("Pufferladepumpe", 16, Limits::Bool),
    mp("Verdichter", 17, Limits::Bool),
    mp("Stoerung", 18, Limits::Bool),
    mp("Vierwegeventil Luft", 19, Limits::Bool),
    mp("WMZ_Durchfluss", 20, Limits::Float(0.0, 100.0)),
    mp("n-Soll Verdichter", 21, Limits::Int(0, 1000)),
    mp("COP", 22, Limits::Float(0.0, 20.0)),
    mp("Temp. Frischwasser_Sollwert", 23, Limits::Float(0.0, 70.0)),
    mp("Verdichteranforderung", 24, Limits::Int(0, 5)),
    mp("EQ Pumpe (Ventilator)", 25, Limits::Bool),
    mp("FWS Stroemungsschalter", 26, Limits::Bool),
    mp("Frischwasserpumpe", 27, Limits::Int(0, 100)),
    mp("Zirkulationspumpe WW", 28, Limits::Bool),
    mp("HKR_Sollwert", 29, Limits::Float(0.0, 50.0)),
    mp("MKR1_Sollwert", 30, Limits::Float(0.0, 50.0)),
    mp("MKR2_Sollwert", 31, Limits::Float(0.0, 50.0)),
    mp("Verdichter_Status", 36, Limits::Int(0, 20)),
    mp("Verdichter laeuft seit", 37, Limits::Int(0, 100_000)),
    mp("Energiezaehler", 42, Limits::Int(0, 1_000_000)),
    // Settings
    sp("Betriebsart", 13, Limits::Int(0, 7)),
    sp("HKR Aufheiztemp. (K)", 15, Limits::Int(0, 10)),
    sp("HKR Absenktemp. (K)", 16, Limits::Int(-10, 0)),
    sp("HKR Heizgrenze", 17, Limits::Float(10.0, 30.0)),
    sp("HKR RLT Soll_oHG (Heizkurve)", 21, Limits::Float(10.0, 75.0)),
    sp("HKR RLT Soll_0 (Heizkurve)", 22, Limits::Float(10.0, 75.0)),
    sp("HKR RLT Soll_uHG (Heizkurve)", 23, Limits::Float(10.0, 75.0)),
    sp("HKR Soll_Raum", 69, Limits::Float(10.0, 25.0)),
    sp("WW Normaltemp.", 83, Limits::Int(10, 75)),
    sp("WW Minimaltemp.", 85, Limits::Int(10, 75)),
    sp("MKR1 Aktiviert", 221, Limits::Bool),
    sp("MKR2 Aktiviert", 222, Limits::Bool),
];

/// Returns the parameters of the built-in catalog.
pub fn builtin() -> impl Iterator<Item = Param> {
    DEFINITIONS.iter().filter_map(|def| {
        let (data_type, min, max) = match def.limits {
            Limits::Bool => (DataType::Bool, Value::Bool(false), Value::Bool(true)),
            Limits::Int(min, max) => (DataType::Int, Value::Int(min), Value::Int(max)),
            Limits::Float(min, max) => (DataType::Float, Value::Float(min), Value::Float(max)),
        };

        Param::new(def.name, def.dp_type, def.number, def.access, data_type)
            .with_limits(Some(min), Some(max))
            .ok()
    })
}
