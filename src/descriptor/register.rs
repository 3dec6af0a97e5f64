use std::{fmt::Display, str::FromStr};

use crate::{
    config::RegsConfig,
    error::{VgenError, VgenResult},
    parser::{bool_or_default, hex_last, identifier_last, u32_last},
};

use super::table::{Record, Table};

/// Minimum set of keys required to handle a register table
pub const REG_KEYS: [&str; 7] = ["name", "idx", "nbits", "start", "access", "test", "rval"];

/// Width of a register word in bits
pub const REG_WIDTH: u32 = 32;

/// Highest word index with a byte offset representable on 32 bits
pub const MAX_IDX: u32 = u32::MAX / 4;

/// Software access of a register field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Access {
    /// Read-only: field driven by hardware
    R,
    /// Read/Write: field stored in the register file
    RW,
}

impl Access {
    pub fn is_writable(&self) -> bool {
        *self == Access::RW
    }
}

impl FromStr for Access {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r" | "ro" => Ok(Access::R),
            "rw" => Ok(Access::RW),
            _ => Err(format!("invalid access '{s}' (expecting r or rw)")),
        }
    }
}

impl Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::R => write!(f, "R"),
            Access::RW => write!(f, "RW"),
        }
    }
}

/// One memory-mapped register field
#[derive(Clone, Debug, PartialEq)]
pub struct RegField {
    pub name: String,
    /// Word index: byte offset is `idx*4`
    pub idx: u32,
    pub nbits: u32,
    /// Position of the LSB inside the word
    pub start: u32,
    pub access: Access,
    /// Reset value
    pub rval: u64,
    /// Include field in the generated self-test
    pub test: bool,
    pub desc: String,
}

fn cell<'a>(row: usize, rec: &'a Record, key: &str) -> VgenResult<&'a str> {
    rec.get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| VgenError::MissingKey {
            row,
            name: rec.get("name").cloned().unwrap_or_default(),
            key: key.to_owned(),
        })
}

fn bad_cell(row: usize, key: &str, value: &str) -> VgenError {
    VgenError::parse(row, format!("invalid {key} value '{value}'"))
}

impl RegField {

    pub fn from_record(row: usize, rec: &Record) -> VgenResult<RegField> {
        let name = cell(row, rec, "name")?;
        let name = identifier_last(name).map_err(|_| bad_cell(row, "name", name))?;
        let num = |key: &str| -> VgenResult<u32> {
            let v = cell(row, rec, key)?;
            u32_last(v).map_err(|_| bad_cell(row, key, v))
        };
        let access = cell(row, rec, "access")?;
        let rval = cell(row, rec, "rval")?;
        let test = cell(row, rec, "test")?;
        let field = RegField {
            name: name.to_owned(),
            idx: num("idx")?,
            nbits: num("nbits")?,
            start: num("start")?,
            access: access.parse().map_err(|e: String| VgenError::parse(row, e))?,
            rval: hex_last(rval).map_err(|_| bad_cell(row, "rval", rval))?,
            test: bool_or_default(test, false).map_err(|_| bad_cell(row, "test", test))?,
            desc: rec.get("desc").map(|s| s.trim().to_owned()).unwrap_or_default(),
        };
        if field.idx > MAX_IDX {
            return Err(VgenError::Layout(format!(
                "{}: index {} out of the 32b address space (max {MAX_IDX})",
                field.name, field.idx
            )));
        }
        if field.nbits == 0 || field.start.checked_add(field.nbits).map_or(true, |end| end > REG_WIDTH) {
            return Err(VgenError::Layout(format!(
                "{}: {} bits starting at bit {} does not fit in a {REG_WIDTH}b word",
                field.name, field.nbits, field.start
            )));
        }
        if field.rval > field.mask() {
            return Err(VgenError::Layout(format!(
                "{}: reset value {:#x} does not fit in {} bits",
                field.name, field.rval, field.nbits
            )));
        }
        Ok(field)
    }

    /// Bit position of the field MSB inside the word
    pub fn msb(&self) -> u32 {
        self.start + self.nbits - 1
    }

    /// Mask of the field value (not shifted)
    pub fn mask(&self) -> u64 {
        (1_u64 << self.nbits) - 1
    }

    /// Byte offset of the register word
    pub fn offset(&self) -> u32 {
        self.idx * 4
    }
}

/// Register fields in address order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegisterMap {
    pub fields: Vec<RegField>,
}

impl RegisterMap {

    /// Convert a descriptor table after checking it carries all keys of `schema`
    pub fn from_table(table: &Table, schema: &[&str]) -> VgenResult<RegisterMap> {
        table.check_keys(schema)?;
        table.check_keys(&REG_KEYS)?;
        table.check_unique()?;
        let mut fields: Vec<RegField> = Vec::with_capacity(table.len());
        for (i, rec) in table.iter().enumerate() {
            let field = RegField::from_record(i + 1, rec)?;
            if let Some(prev) = fields.last() {
                if field.idx <= prev.idx {
                    return Err(VgenError::Layout(format!(
                        "{} (idx {}) must come after {} (idx {}): index must be strictly increasing",
                        field.name, field.idx, prev.name, prev.idx
                    )));
                }
            }
            fields.push(field);
        }
        Ok(RegisterMap { fields })
    }

    /// Check every word index fits in the address bits decoded on the register bus
    pub fn check_decode(&self, cfg: &RegsConfig) -> VgenResult<()> {
        let nb_words = 1_u64.checked_shl(cfg.addr_bits()).unwrap_or(u64::MAX);
        match self.fields.iter().find(|f| u64::from(f.idx) >= nb_words) {
            Some(f) => Err(VgenError::Layout(format!(
                "{} (idx {}) not reachable with {} address bits (addr[{}:2])",
                f.name, f.idx, cfg.addr_bits(), cfg.addr_msb
            ))),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item=&RegField> {
        self.fields.iter()
    }

    /// Fields read by software only: input ports of the register module
    pub fn inputs(&self) -> impl Iterator<Item=&RegField> {
        self.fields.iter().filter(|f| !f.access.is_writable())
    }

    /// Fields written by software: output ports of the register module
    pub fn outputs(&self) -> impl Iterator<Item=&RegField> {
        self.fields.iter().filter(|f| f.access.is_writable())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const REGS_CSV: &str = "\
name,idx,nbits,start,access,test,rval,desc
ctrl,0,8,0,rw,1,0x5,Control register
status,1,4,0,r,1,0x0,Status flags
mode,3,4,0,rw,1,0x0,Mode selection
data,5,32,0,rw,0,0x0,Data word
";

    pub fn regs_map() -> RegisterMap {
        let table = Table::parse(REGS_CSV).unwrap();
        RegisterMap::from_table(&table, &REG_KEYS).unwrap()
    }

    #[test]
    fn test_from_table() {
        let map = regs_map();
        assert_eq!(map.len(), 4);
        assert_eq!(
            map.fields[0],
            RegField {
                name: "ctrl".to_owned(),
                idx: 0,
                nbits: 8,
                start: 0,
                access: Access::RW,
                rval: 5,
                test: true,
                desc: "Control register".to_owned(),
            }
        );
        assert_eq!(map.fields[3].mask(), 0xFFFF_FFFF);
        assert_eq!(map.fields[2].offset(), 12);
        assert_eq!(map.inputs().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["status"]);
        assert_eq!(map.outputs().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["ctrl", "mode", "data"]);
    }

    #[test]
    fn test_invalid_tables() {
        let missing = Table::parse("name,idx,nbits,start,access,test\nA,0,1,0,rw,0\n").unwrap();
        assert!(matches!(
            RegisterMap::from_table(&missing, &REG_KEYS),
            Err(VgenError::MissingKey { key, .. }) if key == "rval"
        ));
        let with_desc = ["desc"];
        let no_desc = Table::parse("name,idx,nbits,start,access,test,rval\nA,0,1,0,rw,0,0x0\n").unwrap();
        assert!(RegisterMap::from_table(&no_desc, &REG_KEYS).is_ok());
        assert!(RegisterMap::from_table(&no_desc, &with_desc).is_err());
        let unordered = Table::parse("name,idx,nbits,start,access,test,rval\nA,2,1,0,rw,0,0x0\nB,1,1,0,rw,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&unordered, &REG_KEYS), Err(VgenError::Layout(_))));
        let too_wide = Table::parse("name,idx,nbits,start,access,test,rval\nA,0,8,28,rw,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&too_wide, &REG_KEYS), Err(VgenError::Layout(_))));
        let bad_access = Table::parse("name,idx,nbits,start,access,test,rval\nA,0,8,0,wo,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&bad_access, &REG_KEYS), Err(VgenError::Parse { line: 1, .. })));
        let bad_name = Table::parse("name,idx,nbits,start,access,test,rval\n2A,0,2,0,rw,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&bad_name, &REG_KEYS), Err(VgenError::Parse { line: 1, .. })));
        let bad_rval = Table::parse("name,idx,nbits,start,access,test,rval\nA,0,2,0,rw,0,0x7\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&bad_rval, &REG_KEYS), Err(VgenError::Layout(_))));
    }

    #[test]
    fn test_out_of_range_values() {
        let huge_start = Table::parse("name,idx,nbits,start,access,test,rval\nA,0,1,4294967295,rw,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&huge_start, &REG_KEYS), Err(VgenError::Layout(_))));
        let huge_idx = Table::parse("name,idx,nbits,start,access,test,rval\nA,1073741824,1,0,rw,0,0x0\n").unwrap();
        assert!(matches!(RegisterMap::from_table(&huge_idx, &REG_KEYS), Err(VgenError::Layout(_))));
        let last = Table::parse("name,idx,nbits,start,access,test,rval\nA,1073741823,1,0,rw,0,0x0\n").unwrap();
        let map = RegisterMap::from_table(&last, &REG_KEYS).unwrap();
        assert_eq!(map.fields[0].offset(), 0xFFFF_FFFC);
    }

    #[test]
    fn test_check_decode() {
        let cfg = RegsConfig::default();
        assert!(regs_map().check_decode(&cfg).is_ok());
        let aliased = Table::parse("name,idx,nbits,start,access,test,rval\nA,1,1,0,rw,0,0x0\nB,257,1,0,rw,0,0x0\n").unwrap();
        let map = RegisterMap::from_table(&aliased, &REG_KEYS).unwrap();
        assert!(matches!(map.check_decode(&cfg), Err(VgenError::Layout(msg)) if msg.starts_with("B (idx 257)")));
        let top = Table::parse("name,idx,nbits,start,access,test,rval\nA,255,1,0,rw,0,0x0\n").unwrap();
        assert!(RegisterMap::from_table(&top, &REG_KEYS).unwrap().check_decode(&cfg).is_ok());
        let wide = RegsConfig { addr_msb: 10, ..Default::default() };
        assert!(map.check_decode(&wide).is_ok());
    }
}
