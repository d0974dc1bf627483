use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::script::{parse_key, Press, PressScript, DEFAULT_HOLD_MS};

/// A press script loaded from a TOML file
///
/// ```toml
/// until_ms = 20000
///
/// [[press]]
/// key = "*"
/// at_ms = 0
/// hold_ms = 50
/// ```
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    /// How long to run the simulation for, in virtual milliseconds
    pub until_ms: Option<u64>,

    /// Presses in any order
    #[serde(rename = "press")]
    pub presses: Vec<PressConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct PressConfig {
    /// Key symbol as printed on the keypad
    pub key: String,
    pub at_ms: u64,
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

fn default_hold_ms() -> u64 {
    DEFAULT_HOLD_MS
}

impl ScriptConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_script(&self) -> Result<PressScript> {
        let presses = self
            .presses
            .iter()
            .enumerate()
            .map(|(i, press)| {
                let key = parse_key(&press.key).with_context(|| format!("in press #{}", i + 1))?;

                Ok(Press {
                    key,
                    at_ms: press.at_ms,
                    hold_ms: press.hold_ms,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        PressScript::new(presses)
    }
}

pub fn parse_script_config(path: &Path) -> Result<ScriptConfig> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "press script `{}` does not exist",
            path.display()
        ));
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read file `{}`", path.display()))?;

    ScriptConfig::from_toml(&source)
        .with_context(|| format!("could not parse file `{}`", path.display()))
}
