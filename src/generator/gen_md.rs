use crate::{
    descriptor::RegisterMap,
    error::VgenResult,
    layout::{address_layout, AddrEntry},
};

use super::{
    field_fmt::{addr_hex, c_hex},
    gen_common::{banner_end, banner_start, CommentStyle, GeneratorBase, GeneratorBaseSetting},
};

/// Table row standing for an unused register word
pub const GAP_ROW: &str = "| | | | | | | |\n";

/// Programmers model in markdown
pub struct GeneratorMd {
    base: GeneratorBase,
}

impl GeneratorMd {

    pub fn new(setting: GeneratorBaseSetting) -> Self {
        GeneratorMd { base: GeneratorBase::new(setting) }
    }

    fn write(&mut self, string: &str) {
        self.base.write(string);
    }

    pub fn gen(&mut self, map: &RegisterMap) -> VgenResult<()> {
        self.gen_docs(map);
        let filename = format!("{}.md", self.base.setting.module);
        self.base.save(&filename)?;
        Ok(())
    }

    pub fn gen_docs(&mut self, map: &RegisterMap) {
        self.write(&banner_start(CommentStyle::Html));
        self.write("# Programmers Model\n\n");
        self.write(&format!("## Module: {}\n\n", self.base.setting.module.to_uppercase()));
        self.write("| Address Offset | Signal Name | Access | Bit width | Start bit | Reset value | Description |\n");
        self.write("| ---            | ---         | ---    | ---       | ---       | ---         | ---         |\n");
        for entry in address_layout(map) {
            match entry {
                AddrEntry::Field(f) => self.write(&format!(
                    "| {} | **{}** | {} | {} | {} | {} | {} |\n",
                    addr_hex(f.offset()), f.name.to_uppercase(), f.access, f.nbits, f.start, c_hex(f.rval), f.desc
                )),
                AddrEntry::Gap(_) => self.write(GAP_ROW),
            }
        }
        self.write(&banner_end(CommentStyle::Html));
    }
}
