use crate::{
    config::RegsConfig,
    descriptor::{Access, RegField, RegisterMap},
    error::VgenResult,
    layout::{address_layout, AddrEntry},
};

use super::{
    casing::{Casing::{Snake, Upper}, ToCasing},
    field_fmt::{addr_hex, c_hex, reserved_name},
    gen_common::{banner_end, banner_start, CommentStyle, GeneratorBase, GeneratorBaseSetting},
};

/// C header describing the register map and a C self-test of the register file
pub struct GeneratorC {
    base: GeneratorBase,
    cfg: RegsConfig,
}

impl GeneratorC {

    pub fn new(setting: GeneratorBaseSetting, cfg: RegsConfig) -> Self {
        GeneratorC { base: GeneratorBase::new(setting), cfg }
    }

    fn write(&mut self, string: &str) {
        self.base.write(string);
    }

    /// Module name used for C macros and types
    fn name_uc(&self) -> String {
        self.base.setting.module.to_casing(Upper)
    }

    /// Prefix of the test functions
    fn name_lc(&self) -> String {
        self.base.setting.module.to_casing(Snake)
    }

    pub fn gen(&mut self, map: &RegisterMap) -> VgenResult<()> {
        let module = self.base.setting.module.clone();
        self.gen_header(map);
        self.base.save(&format!("{}.h", self.name_uc()))?;
        self.gen_test_header();
        self.base.save(&format!("{module}_test.h"))?;
        self.gen_test_source(map);
        self.base.save(&format!("{module}_test.c"))?;
        Ok(())
    }

    //-----------------------------------------------------------------------------
    // Register map header
    //-----------------------------------------------------------------------------

    pub fn gen_header(&mut self, map: &RegisterMap) {
        let name = self.name_uc();
        self.write(&banner_start(CommentStyle::Slash));
        self.write(&format!("#ifndef {name}_H\n#define {name}_H\n\n"));
        self.write("#include <stdint.h>\n\n");
        self.write("#ifndef __I\n#define __I  volatile const\n#endif\n");
        self.write("#ifndef __IO\n#define __IO volatile\n#endif\n\n");
        // The structure starts at the first register: member offsets are relative to it
        let base_idx = map.fields.first().map_or(0, |f| f.idx);
        if base_idx > 0 {
            self.write(&format!("// Offset of the first register word\n#define {name}_BASE_IDX {base_idx}\n\n"));
        }
        self.write("typedef struct\n{\n");
        for entry in address_layout(map) {
            match entry {
                AddrEntry::Field(f) => {
                    let (qualifier, rw) = match f.access {
                        Access::R => ("__I ", "R/ "),
                        Access::RW => ("__IO", "R/W"),
                    };
                    self.write(&format!(
                        "\t{qualifier} uint32_t {};\t\t/* Offset: {} ({rw}) {} */\n",
                        f.name.to_uppercase(), addr_hex(f.offset() - base_idx * 4), f.desc
                    ));
                }
                AddrEntry::Gap(idx) => self.write(&format!("\t     uint32_t {};\n", reserved_name(idx))),
            }
        }
        self.write(&format!("}} {name}_TypeDef;\n\n"));
        self.write("#endif\n");
        self.write(&banner_end(CommentStyle::Slash));
    }

    //-----------------------------------------------------------------------------
    // Self-test
    //-----------------------------------------------------------------------------

    pub fn gen_test_header(&mut self) {
        let name = self.name_uc();
        let prefix = self.name_lc();
        self.write(&banner_start(CommentStyle::Slash));
        self.write(&format!("#ifndef {name}_TEST_H\n#define {name}_TEST_H\n\n"));
        self.write(&format!("#include <stdio.h>\n#include \"{}\"\n\n", self.cfg.test_include));
        self.write("// Check initial (reset) values of registers\n");
        self.write(&format!("int {prefix}_initial_value_test(void);\n\n"));
        self.write("// Check write and read back of read/write registers\n");
        self.write(&format!("int {prefix}_write_read_test(void);\n\n"));
        self.write("#endif\n");
        self.write(&banner_end(CommentStyle::Slash));
    }

    /// Register access through the peripheral pointer
    fn periph_reg(&self, f: &RegField) -> String {
        format!("{}{}->{}", self.cfg.periph_prefix, self.name_uc(), f.name.to_uppercase())
    }

    fn check(&self, f: &RegField, expected: u64) -> String {
        format!(
            "\tif ({} != {})\t\t{{num_errors += 1; puts(\"ERROR: {}\");}}",
            self.periph_reg(f), c_hex(expected), f.name.to_uppercase()
        )
    }

    pub fn gen_test_source(&mut self, map: &RegisterMap) {
        let prefix = self.name_lc();
        self.write(&banner_start(CommentStyle::Slash));
        self.write(&format!("#include \"{}_test.h\"\n\n", self.base.setting.module));

        self.write("// Check initial (reset) values of registers\n");
        self.write(&format!("int {prefix}_initial_value_test(void) {{\n"));
        self.write("\tint num_errors = 0;\n\n");
        for f in map.iter().filter(|f| f.test) {
            let line = self.check(f, f.rval << f.start);
            self.write(&format!("{line}\n"));
        }
        self.write("\n\treturn num_errors;\n}\n\n");

        self.write("// Check write and read back of read/write registers\n");
        self.write(&format!("int {prefix}_write_read_test(void) {{\n"));
        self.write("\tint num_errors = 0;\n\n");
        for f in map.outputs().filter(|f| f.test) {
            let reg = self.periph_reg(f);
            let ones = self.check(f, f.mask() << f.start);
            let zeros = self.check(f, 0);
            self.write(&format!("\t{reg} = 0xFFFFFFFF;\t// write all-1s\n"));
            self.write(&format!("{ones}\t// check field is all-1s\n"));
            self.write(&format!("\t{reg} = 0x0;\t// clear field\n"));
            self.write(&format!("{zeros}\t// check field is all-0s\n\n"));
        }
        self.write("\treturn num_errors;\n}\n");
        self.write(&banner_end(CommentStyle::Slash));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{register::tests::regs_map, Table, REG_KEYS};

    fn generator() -> GeneratorC {
        let setting = GeneratorBaseSetting { module: "csr".to_owned(), ..Default::default() };
        GeneratorC::new(setting, RegsConfig::default())
    }

    #[test]
    fn test_header() {
        let mut gen = generator();
        gen.gen_header(&regs_map());
        let txt = gen.base.take();
        assert!(txt.contains("#ifndef CSR_H\n#define CSR_H\n"));
        assert!(txt.contains("\t__IO uint32_t CTRL;\t\t/* Offset: 0x0 (R/W) Control register */\n"));
        assert!(txt.contains("\t__I  uint32_t STATUS;\t\t/* Offset: 0x4 (R/ ) Status flags */\n"));
        assert!(txt.contains("} CSR_TypeDef;\n"));
        assert!(!txt.contains("CSR_BASE_IDX"));
        let members: Vec<&str> = txt
            .lines()
            .filter(|l| l.contains("uint32_t "))
            .filter_map(|l| l.split("uint32_t ").nth(1))
            .map(|l| l.split(';').next().unwrap_or_default())
            .collect();
        assert_eq!(members, vec!["CTRL", "STATUS", "RESERVED2", "MODE", "RESERVED4", "DATA"]);
    }

    #[test]
    fn test_header_offset_start() {
        let table = Table::parse("name,idx,nbits,start,access,test,rval\nA,4,1,0,rw,0,0x0\nB,6,1,0,r,0,0x0\n").unwrap();
        let map = RegisterMap::from_table(&table, &REG_KEYS).unwrap();
        let mut gen = generator();
        gen.gen_header(&map);
        let txt = gen.base.take();
        assert!(txt.contains("#define CSR_BASE_IDX 4\n"));
        assert!(txt.contains("\t__IO uint32_t A;\t\t/* Offset: 0x0 (R/W)  */\n"));
        assert!(txt.contains("\t__I  uint32_t B;\t\t/* Offset: 0x8 (R/ )  */\n"));
        assert!(txt.contains("uint32_t RESERVED5;"));
        assert!(!txt.contains("RESERVED3"));
    }

    #[test]
    fn test_self_test() {
        let mut gen = generator();
        gen.gen_test_header();
        let h = gen.base.take();
        assert!(h.contains("#include \"SM2_CM0.h\"\n"));
        assert!(h.contains("int csr_write_read_test(void);"));

        gen.gen_test_source(&regs_map());
        let c = gen.base.take();
        assert!(c.contains("\tif (SM2_CSR->CTRL != 0x5)\t\t{num_errors += 1; puts(\"ERROR: CTRL\");}\n"));
        assert!(c.contains("\tif (SM2_CSR->STATUS != 0x0)"));
        // Round trip of a 4-bit read/write field
        assert!(c.contains(
            "\tSM2_CSR->MODE = 0xFFFFFFFF;\t// write all-1s\n\
             \tif (SM2_CSR->MODE != 0xF)\t\t{num_errors += 1; puts(\"ERROR: MODE\");}\t// check field is all-1s\n\
             \tSM2_CSR->MODE = 0x0;\t// clear field\n\
             \tif (SM2_CSR->MODE != 0x0)\t\t{num_errors += 1; puts(\"ERROR: MODE\");}\t// check field is all-0s\n"
        ));
        // Read-only field has no write test, disabled field no test at all
        assert!(!c.contains("SM2_CSR->STATUS = "));
        assert!(!c.contains("SM2_CSR->DATA"));
    }
}
