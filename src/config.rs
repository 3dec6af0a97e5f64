use std::{fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{
    descriptor::NB_SIDES,
    error::{VgenError, VgenResult},
};

/// Control signal shared by all IO cells
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ControlSignal {
    /// Signal name in the pad module
    pub name: String,
    /// Cell pin the signal connects to
    pub pin: String,
    #[serde(default = "default_nbits")]
    pub nbits: u32,
}

fn default_nbits() -> u32 { 1 }

impl ControlSignal {
    pub fn new(name: &str, pin: &str, nbits: u32) -> Self {
        ControlSignal { name: name.to_owned(), pin: pin.to_owned(), nbits }
    }
}

/// Pad ring description
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PadRingConfig {
    /// Number of IO positions on each side
    pub capacity: u32,
    /// Positions reserved on each side for cells emitted separately
    pub reserved: [u32; NB_SIDES],
    /// IO cell library name
    pub cell: String,
    /// Retention control cell, placed on one of the reserved positions
    pub retention_cell: String,
    /// Retention enable signal connected to every IO cell
    pub retention_signal: String,
    /// Name of the core module instantiated by the pad module
    pub core_module: String,
    /// Prefix of core ports which are not pads
    pub ignore_prefix: String,
    pub control: Vec<ControlSignal>,
}

impl Default for PadRingConfig {
    fn default() -> Self {
        PadRingConfig {
            capacity: 68,
            reserved: [0, 0, 0, 1],
            cell: "LIB_PAD".to_owned(),
            retention_cell: "PAD_RET".to_owned(),
            retention_signal: "SC_PAD_RTE".to_owned(),
            core_module: "TOP".to_owned(),
            ignore_prefix: "SC_".to_owned(),
            control: vec![
                ControlSignal::new("SC_PAD_ST", "ST", 1),
                ControlSignal::new("SC_PAD_DS", "DS", 4),
                ControlSignal::new("SC_PAD_SL", "SL", 1),
            ],
        }
    }
}

/// Register file interface
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegsConfig {
    /// Clock connected in the instantiation template
    pub clock: String,
    /// Reset connected in the instantiation template
    pub reset: String,
    /// Register bus port name
    pub bus: String,
    /// MSB of the word address decoded on the register bus
    pub addr_msb: u32,
    /// Header included by the generated C test
    pub test_include: String,
    /// Prefix of the peripheral pointer used by the generated C test
    pub periph_prefix: String,
}

impl Default for RegsConfig {
    fn default() -> Self {
        RegsConfig {
            clock: "?clk".to_owned(),
            reset: "?rstn".to_owned(),
            bus: "regbus".to_owned(),
            addr_msb: 9,
            test_include: "SM2_CM0.h".to_owned(),
            periph_prefix: "SM2_".to_owned(),
        }
    }
}

impl RegsConfig {
    /// Number of word address bits compared by the decoder
    pub fn addr_bits(&self) -> u32 {
        self.addr_msb - 1
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VgenConfig {
    pub pads: PadRingConfig,
    pub regs: RegsConfig,
}

impl VgenConfig {

    pub fn parse(txt: &str) -> VgenResult<VgenConfig> {
        let cfg: VgenConfig = toml::from_str(txt)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration file if any, default configuration otherwise
    pub fn load(path: Option<&Path>) -> VgenResult<VgenConfig> {
        match path {
            Some(p) => {
                debug!("Loading configuration {}", p.display());
                VgenConfig::parse(&fs::read_to_string(p)?)
            }
            None => Ok(VgenConfig::default()),
        }
    }

    fn validate(&self) -> VgenResult<()> {
        if let Some(r) = self.pads.reserved.iter().find(|r| **r > self.pads.capacity) {
            return Err(VgenError::Config(format!(
                "{r} reserved positions exceed side capacity {}", self.pads.capacity
            )));
        }
        if self.regs.addr_msb < 2 {
            return Err(VgenError::Config(format!("address msb {} below word alignment", self.regs.addr_msb)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let cfg = VgenConfig::parse(
            r#"
[pads]
capacity = 40
reserved = [0, 0, 2, 1]
control = [{ name = "SC_DRIVE", pin = "DS", nbits = 2 }]

[regs]
clock = "clk_i"
"#,
        )
        .unwrap();
        assert_eq!(cfg.pads.capacity, 40);
        assert_eq!(cfg.pads.reserved, [0, 0, 2, 1]);
        assert_eq!(cfg.pads.control, vec![ControlSignal::new("SC_DRIVE", "DS", 2)]);
        assert_eq!(cfg.pads.cell, "LIB_PAD");
        assert_eq!(cfg.regs.clock, "clk_i");
        assert_eq!(cfg.regs.reset, "?rstn");
        assert_eq!(cfg.regs.addr_bits(), 8);
        assert_eq!(VgenConfig::parse("").unwrap(), VgenConfig::default());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(VgenConfig::parse("[pads]\ncapacty = 3\n"), Err(VgenError::Config(_))));
        assert!(matches!(VgenConfig::parse("[pads]\ncapacity = 3\nreserved = [4, 0, 0, 0]\n"), Err(VgenError::Config(_))));
    }
}
