use crate::{
    descriptor::RegisterMap,
    error::VgenResult,
    layout::{address_layout, AddrEntry},
};

use super::{
    casing::{Casing::Pascal, ToCasing},
    field_fmt::{addr_hex, reserved_name},
    gen_common::{banner_end, banner_start, CommentStyle, GeneratorBase, GeneratorBaseSetting},
};

/// Python class giving the address of every register from a base offset
pub struct GeneratorPy {
    base: GeneratorBase,
}

impl GeneratorPy {

    pub fn new(setting: GeneratorBaseSetting) -> Self {
        GeneratorPy { base: GeneratorBase::new(setting) }
    }

    fn write(&mut self, string: &str) {
        self.base.write(string);
    }

    pub fn gen(&mut self, map: &RegisterMap) -> VgenResult<()> {
        self.gen_class(map);
        let filename = format!("{}.py", self.base.setting.module);
        self.base.save(&filename)?;
        Ok(())
    }

    pub fn gen_class(&mut self, map: &RegisterMap) {
        self.write(&banner_start(CommentStyle::Hash));
        self.write(&format!("class {}(object):\n\n", self.base.setting.module.to_casing(Pascal)));
        self.write("    def __init__(self, base_offset):\n");
        self.write("        self.base_offset = base_offset\n\n");
        for entry in address_layout(map) {
            match entry {
                AddrEntry::Field(f) => self.write(&format!(
                    "        self.{} = self.base_offset + {}  # {}\n",
                    f.name.to_uppercase(), addr_hex(f.offset()), f.desc
                )),
                AddrEntry::Gap(idx) => self.write(&format!("        self.{} = None\n", reserved_name(idx))),
            }
        }
        self.write(&banner_end(CommentStyle::Hash));
    }
}
