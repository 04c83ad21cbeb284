// src/scaling/mod.rs
//! Compiles `NI_Scale[k]_*` property declarations into a raw -> f64
//! conversion function.

use crate::error::{Result, TdmsError};
use crate::types::PropertyValue;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
enum ScaleStep {
    Linear { slope: f64, intercept: f64 },
    Polynomial { coefficients: Vec<f64> },
    Table { pre_scaled: Vec<f64>, scaled: Vec<f64> },
    /// Recognized by name but not evaluated: RTD/Thermistor/Thermocouple,
    /// or any scale type this engine does not know about.
    Unsupported(String),
}

/// A compiled chain of scale steps, applied in ascending `k` order. Built
/// once per channel at index-construction time from that channel's (or its
/// group's, if the channel has none) cumulative properties.
#[derive(Debug, Clone, Default)]
pub struct Scaling {
    steps: Vec<ScaleStep>,
}

impl Scaling {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn from_properties(properties: &IndexMap<String, PropertyValue>) -> Result<Self> {
        let mut steps = Vec::new();
        let mut k = 0usize;
        loop {
            let type_key = format!("NI_Scale[{k}]_Scale_Type");
            let Some(kind) = properties.get(&type_key).and_then(|v| v.as_str()) else {
                break;
            };
            steps.push(parse_step(kind, k, properties)?);
            k += 1;
        }
        Ok(Scaling { steps })
    }

    /// Whether `NI_Scaling_Status` says scaled output should be exposed.
    /// Defaults to scaled when a scaling chain is present and the property
    /// is absent, matching the common case of writers that set up scales
    /// without an explicit status flag.
    pub fn status_is_scaled(properties: &IndexMap<String, PropertyValue>) -> bool {
        match properties.get("NI_Scaling_Status").and_then(|v| v.as_str()) {
            Some("unscaled") => false,
            Some(_) => true,
            None => true,
        }
    }

    pub fn apply(&self, raw: f64) -> Result<f64> {
        let mut value = raw;
        for step in &self.steps {
            value = match step {
                ScaleStep::Linear { slope, intercept } => value * slope + intercept,
                ScaleStep::Polynomial { coefficients } => coefficients
                    .iter()
                    .enumerate()
                    .fold(0.0, |acc, (i, c)| acc + c * value.powi(i as i32)),
                ScaleStep::Table { pre_scaled, scaled } => interpolate_table(pre_scaled, scaled, value),
                ScaleStep::Unsupported(kind) => {
                    return Err(TdmsError::UnsupportedFeature(format!("{kind} scaling")))
                }
            };
        }
        Ok(value)
    }

    pub fn apply_array(&self, raw: &[f64]) -> Result<Vec<f64>> {
        raw.iter().map(|&v| self.apply(v)).collect()
    }
}

fn parse_step(kind: &str, k: usize, properties: &IndexMap<String, PropertyValue>) -> Result<ScaleStep> {
    match kind {
        "Linear" => {
            let slope = f64_prop(properties, &format!("NI_Scale[{k}]_Linear_Slope"))?;
            let intercept = f64_prop(properties, &format!("NI_Scale[{k}]_Linear_Y_Intercept"))?;
            Ok(ScaleStep::Linear { slope, intercept })
        }
        "Polynomial" => {
            let size = properties
                .get(&format!("NI_Scale[{k}]_Polynomial_Coefficients_Size"))
                .and_then(|v| v.as_u32())
                .unwrap_or(0) as usize;
            let mut coefficients = Vec::with_capacity(size);
            for i in 0..size {
                coefficients.push(f64_prop(
                    properties,
                    &format!("NI_Scale[{k}]_Polynomial_Coefficients[{i}]"),
                )?);
            }
            Ok(ScaleStep::Polynomial { coefficients })
        }
        "Table" => {
            let size = properties
                .get(&format!("NI_Scale[{k}]_Table_Pre_Scaled_Values_Size"))
                .and_then(|v| v.as_u32())
                .unwrap_or(0) as usize;
            let mut pre_scaled = Vec::with_capacity(size);
            let mut scaled = Vec::with_capacity(size);
            for i in 0..size {
                pre_scaled.push(f64_prop(
                    properties,
                    &format!("NI_Scale[{k}]_Table_Pre_Scaled_Values[{i}]"),
                )?);
                scaled.push(f64_prop(
                    properties,
                    &format!("NI_Scale[{k}]_Table_Scaled_Values[{i}]"),
                )?);
            }
            Ok(ScaleStep::Table { pre_scaled, scaled })
        }
        other => Ok(ScaleStep::Unsupported(other.to_string())),
    }
}

fn f64_prop(properties: &IndexMap<String, PropertyValue>, key: &str) -> Result<f64> {
    properties
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| TdmsError::malformed(0, 0, format!("missing scaling coefficient {key}")))
}

fn interpolate_table(pre_scaled: &[f64], scaled: &[f64], x: f64) -> f64 {
    if pre_scaled.is_empty() {
        return x;
    }
    if pre_scaled.len() == 1 {
        return scaled[0];
    }
    let mut i = 0;
    while i + 2 < pre_scaled.len() && x > pre_scaled[i + 1] {
        i += 1;
    }
    let (x0, x1) = (pre_scaled[i], pre_scaled[i + 1]);
    let (y0, y1) = (scaled[i], scaled[i + 1]);
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
