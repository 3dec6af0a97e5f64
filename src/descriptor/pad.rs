use std::fmt::Display;

use crate::error::VgenResult;

use super::table::{Record, Table};

/// Minimum set of keys required to handle a pad table
pub const PAD_KEYS: [&str; 3] = ["name", "direction", "side"];

/// Number of sides of the pad ring
pub const NB_SIDES: usize = 4;

/// Direction of a pad or signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
    Bidir,
    /// Power, ground and anything not handled by the generators
    Other,
}

impl Direction {

    /// Interpret a descriptor cell, unknown values map to `Other`
    pub fn from_cell(s: &str) -> Direction {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Direction::Input,
            "output" => Direction::Output,
            "bidir" | "inout" => Direction::Bidir,
            _ => Direction::Other,
        }
    }

    pub fn is_io(&self) -> bool {
        *self != Direction::Other
    }

    /// Port direction keyword in SystemVerilog
    pub fn sv_keyword(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Bidir => "inout",
            Direction::Other => "",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
            Direction::Bidir => write!(f, "bidir"),
            Direction::Other => write!(f, "other"),
        }
    }
}

/// Cell orientation derived from the pad-ring side
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Orientation {
    /// Left/right sides
    H,
    /// Top/bottom sides
    V,
}

impl Orientation {
    pub fn from_side(side: u8) -> Orientation {
        if side % 2 == 1 {Orientation::H} else {Orientation::V}
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::H => write!(f, "H"),
            Orientation::V => write!(f, "V"),
        }
    }
}

/// Physical chip IO
#[derive(Clone, Debug, PartialEq)]
pub struct Pad {
    pub name: String,
    pub direction: Direction,
    /// Pad-ring side (1 left, 2 top, 3 right, 4 bottom), None when unassigned
    pub side: Option<u8>,
    pub desc: String,
}

impl Pad {

    pub fn from_record(rec: &Record) -> Pad {
        let get = |k: &str| rec.get(k).map(|s| s.trim()).unwrap_or("");
        let side = get("side")
            .parse::<u8>()
            .ok()
            .filter(|s| (1..=NB_SIDES as u8).contains(s));
        Pad {
            name: get("name").to_owned(),
            direction: Direction::from_cell(get("direction")),
            side,
            desc: get("desc").to_owned(),
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.side.map(Orientation::from_side)
    }
}

/// Pads in table order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PadList {
    pub pads: Vec<Pad>,
}

impl PadList {

    pub fn from_table(table: &Table, schema: &[&str]) -> VgenResult<PadList> {
        table.check_keys(schema)?;
        table.check_keys(&PAD_KEYS)?;
        table.check_unique()?;
        Ok(PadList {
            pads: table.iter().map(Pad::from_record).collect(),
        })
    }

    /// Pads with an actual IO cell (power/ground excluded)
    pub fn io(&self) -> impl Iterator<Item=&Pad> {
        self.pads.iter().filter(|p| p.direction.is_io())
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }
}
