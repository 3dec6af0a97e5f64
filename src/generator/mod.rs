pub mod casing;
pub mod field_fmt;
pub mod gen_common;
pub mod template;
pub mod gen_regs_sv;
pub mod gen_pads_sv;
pub mod gen_md;
pub mod gen_c;
pub mod gen_py;

use crate::{
    config::VgenConfig,
    descriptor::{PadList, RegisterMap},
    error::VgenResult,
};

use gen_common::GeneratorBaseSetting;

/// Generate all register artifacts
pub fn gen_regs(map: &RegisterMap, setting: GeneratorBaseSetting, cfg: &VgenConfig) -> VgenResult<()> {
    gen_regs_sv::GeneratorRegsSv::new(setting.clone(), cfg.regs.clone()).gen(map)?;
    gen_md::GeneratorMd::new(setting.clone()).gen(map)?;
    gen_c::GeneratorC::new(setting.clone(), cfg.regs.clone()).gen(map)?;
    gen_py::GeneratorPy::new(setting).gen(map)?;
    Ok(())
}

/// Generate the pad module and its instantiation
pub fn gen_pads(pads: &PadList, setting: GeneratorBaseSetting, cfg: &VgenConfig) -> VgenResult<()> {
    gen_pads_sv::GeneratorPadsSv::new(setting, cfg.pads.clone()).gen(pads)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::{Path, PathBuf}};

    use super::*;
    use crate::descriptor::register::tests::regs_map;
    use super::casing::{Casing::Upper, ToCasing};

    /// Expected artifacts of a register generation
    fn regs_outputs(dir: &Path, module: &str) -> Vec<PathBuf> {
        let upper = module.to_casing(Upper);
        [
            format!("{module}.sv"),
            format!("{module}.inst.sv"),
            format!("{module}.md"),
            format!("{upper}.h"),
            format!("{module}.py"),
            format!("{module}_test.h"),
            format!("{module}_test.c"),
        ]
        .iter()
        .map(|f| dir.join(f))
        .collect()
    }

    #[test]
    fn test_gen_regs_all() {
        let dir = tempfile::tempdir().unwrap();
        let setting = GeneratorBaseSetting {
            path: dir.path().to_owned(),
            module: "csr".to_owned(),
            ..Default::default()
        };
        let cfg = VgenConfig::default();
        gen_regs(&regs_map(), setting.clone(), &cfg).unwrap();
        let outputs = regs_outputs(dir.path(), "csr");
        let first: Vec<String> = outputs.iter().map(|p| fs::read_to_string(p).unwrap()).collect();
        // Same table gives the same files
        gen_regs(&regs_map(), setting, &cfg).unwrap();
        let second: Vec<String> = outputs.iter().map(|p| fs::read_to_string(p).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_gaps_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let setting = GeneratorBaseSetting {
            path: dir.path().to_owned(),
            module: "csr".to_owned(),
            ..Default::default()
        };
        gen_regs(&regs_map(), setting, &VgenConfig::default()).unwrap();
        let read = |f: &str| fs::read_to_string(dir.path().join(f)).unwrap();
        let header = read("CSR.h");
        let class = read("csr.py");
        let docs = read("csr.md");
        // Position of fillers among the entries of each artifact
        let header_pos: Vec<usize> = header
            .lines()
            .filter(|l| l.contains("uint32_t "))
            .enumerate()
            .filter(|(_, l)| l.contains("RESERVED"))
            .map(|(i, _)| i)
            .collect();
        let class_pos: Vec<usize> = class
            .lines()
            .filter(|l| l.trim().starts_with("self.") && !l.contains("base_offset = base_offset"))
            .enumerate()
            .filter(|(_, l)| l.contains("RESERVED"))
            .map(|(i, _)| i)
            .collect();
        let docs_pos: Vec<usize> = docs
            .lines()
            .filter(|l| l.starts_with('|'))
            .skip(2)
            .enumerate()
            .filter(|(_, l)| *l == gen_md::GAP_ROW.trim_end())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(header_pos, vec![2, 4]);
        assert_eq!(class_pos, header_pos);
        assert_eq!(docs_pos, header_pos);
        assert!(header.contains("RESERVED2;") && header.contains("RESERVED4;"));
        assert!(class.contains("self.RESERVED2 = None") && class.contains("self.RESERVED4 = None"));
    }

    #[test]
    fn test_gen_regs_bad_template() {
        let out = tempfile::tempdir().unwrap();
        let tpl_dir = tempfile::tempdir().unwrap();
        let bad = tpl_dir.path().join("regs.sv");
        fs::write(&bad, "// VGEN: HEADER\n// VGEN: MODULE NAME\n").unwrap();
        let cfg = VgenConfig::default();
        for template in [bad, tpl_dir.path().join("missing.sv")] {
            let setting = GeneratorBaseSetting {
                path: out.path().to_owned(),
                template: Some(template),
                module: "csr".to_owned(),
            };
            assert!(gen_regs(&regs_map(), setting, &cfg).is_err());
            assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
        }
    }
}
