use tracing::warn;

use crate::{
    config::PadRingConfig,
    descriptor::{Direction, Orientation, Pad, PadList},
    error::VgenResult,
    layout::PadRing,
};

use super::{
    field_fmt::{decl_range, list_sep},
    gen_common::{banner_end, banner_start, CommentStyle, GeneratorBase, GeneratorBaseSetting},
    template::Template,
};

pub const PADS_TEMPLATE: &str = include_str!("resources/pads_template.sv");

pub const PADS_TAGS: [&str; 6] = [
    "HEADER",
    "MODULE NAME",
    "MODULE DECLARATION",
    "TOP LEVEL MODULE SIGNALS",
    "TOP LEVEL MODULE INSTANTIATION",
    "IO CELL INSTANTIATION",
];

/// Port of the pad module
#[derive(Clone, Debug, PartialEq)]
pub struct PadPort {
    pub name: String,
    pub direction: Direction,
    /// Tied-off cell filling an unused position
    pub filler: bool,
}

/// Ports of the pad module: IO pads in table order followed by unused positions.
/// Shared by the module and its instantiation so that both lists always match.
pub fn pad_ports(pads: &PadList, ring: &PadRing) -> Vec<PadPort> {
    pads.io()
        .map(|p| PadPort { name: format!("PAD_{}", p.name), direction: p.direction, filler: false })
        .chain(ring.unused_slots().map(|s| PadPort { name: s.name(), direction: Direction::Output, filler: true }))
        .collect()
}

/// Signals between the core module and an IO cell
fn core_signals(pad: &Pad) -> Vec<String> {
    match pad.direction {
        Direction::Bidir => ["PORTEN", "PORTIN", "PORTOUT"]
            .iter()
            .map(|s| format!("{}_{s}", pad.name))
            .collect(),
        _ => vec![pad.name.clone()],
    }
}

/// Pad module wrapping the core module with its IO cells, and its instantiation
pub struct GeneratorPadsSv {
    base: GeneratorBase,
    cfg: PadRingConfig,
}

impl GeneratorPadsSv {

    pub fn new(setting: GeneratorBaseSetting, cfg: PadRingConfig) -> Self {
        GeneratorPadsSv { base: GeneratorBase::new(setting), cfg }
    }

    fn write(&mut self, string: &str) {
        self.base.write(string);
    }

    pub fn template(&self) -> VgenResult<Template> {
        let tpl = Template::load(self.base.setting.template.as_deref(), "pads_template.sv", PADS_TEMPLATE)?;
        tpl.validate(&PADS_TAGS)?;
        Ok(tpl)
    }

    pub fn gen(&mut self, pads: &PadList) -> VgenResult<()> {
        let tpl = self.template()?;
        let ring = PadRing::new(pads, &self.cfg);
        let module = self.base.setting.module.clone();
        self.gen_module(pads, &ring, &tpl)?;
        self.base.save(&format!("{module}.sv"))?;
        self.gen_instance(pads, &ring);
        self.base.save(&format!("{module}_instance.sv"))?;
        Ok(())
    }

    /// Control pins shared by every cell, retention included
    fn control_pins(&self) -> String {
        let mut s: String = self.cfg.control
            .iter()
            .map(|c| format!(",.{}({})", c.pin, c.name))
            .collect();
        s.push_str(&format!(",.RTE({})", self.cfg.retention_signal));
        s
    }

    //-----------------------------------------------------------------------------
    // Pad module
    //-----------------------------------------------------------------------------

    pub fn gen_module(&mut self, pads: &PadList, ring: &PadRing, tpl: &Template) -> VgenResult<()> {
        let mut cursor = tpl.cursor();
        self.write(&banner_start(CommentStyle::Slash));
        self.write(&cursor.read_segment("HEADER")?);
        self.write(&format!(
            "// {} IO pads, {} unused positions filled with tied-off cells\n",
            pads.io().count(), ring.nb_unused()
        ));

        self.write(&cursor.read_segment("MODULE NAME")?);
        self.write(&format!("{}\n", self.base.setting.module));

        self.write(&cursor.read_segment("MODULE DECLARATION")?);
        let ports = pad_ports(pads, ring);
        for (i, p) in ports.iter().enumerate() {
            self.write(&format!("{}\twire\t{}{}\n", p.direction.sv_keyword(), p.name, list_sep(i, ports.len())));
        }

        self.write(&cursor.read_segment("TOP LEVEL MODULE SIGNALS")?);
        self.write("\n// Control signals for IO cells.\n");
        for c in self.cfg.control.clone().iter() {
            match decl_range(c.nbits).as_str() {
                "" => self.write(&format!("logic\t{};\n", c.name)),
                dims => self.write(&format!("logic\t{dims}\t{};\n", c.name)),
            }
        }
        self.write("\n// Signals from TOP to IO cells.\n");
        for pad in pads.io() {
            for s in core_signals(pad) {
                self.write(&format!("logic\t{s};\n"));
            }
        }

        self.write(&cursor.read_segment("TOP LEVEL MODULE INSTANTIATION")?);
        let core = self.cfg.core_module.clone();
        self.write(&format!("{core} u{core} (\n"));
        self.write("\n// Control signals for IO cells.\n");
        let mut connections: Vec<String> = self.cfg.control.iter().map(|c| format!(".{}", c.name)).collect();
        let nb_control = connections.len();
        connections.extend(pads.io().flat_map(core_signals).map(|s| format!(".{s}")));
        for (i, c) in connections.iter().enumerate() {
            if i == nb_control {
                self.write("\n// Signals from TOP to IO cells.\n");
            }
            self.write(&format!("{c}{}\n", list_sep(i, connections.len())));
        }
        self.write(");\n");
        self.write("\n// NOTE: OEN pin of the IO cell is active LOW.\n");

        self.write(&cursor.read_segment("IO CELL INSTANTIATION")?);
        self.gen_cells(pads, ring);

        self.write(&cursor.read_segment("")?);
        self.write(&banner_end(CommentStyle::Slash));
        Ok(())
    }

    fn gen_cells(&mut self, pads: &PadList, ring: &PadRing) {
        let cell = self.cfg.cell.clone();
        let pins = self.control_pins();
        self.write(&format!("logic\t{};\n", self.cfg.retention_signal));
        for (n, pad) in pads.pads.iter().enumerate() {
            let (dir, conn) = match pad.direction {
                Direction::Input => ("IN", format!(".OUT({}),.IN(1'b0),.OEN(1'b1)", pad.name)),
                Direction::Output => ("OUT", format!(".IN({}),.OUT(),.OEN(1'b0)", pad.name)),
                Direction::Bidir => ("BIDIR", format!(
                    ".IN({0}_PORTOUT),.OUT({0}_PORTIN),.OEN(~{0}_PORTEN)", pad.name
                )),
                // Power and ground cells are not instantiated here
                Direction::Other => continue,
            };
            let orientation = pad.orientation().unwrap_or_else(|| {
                warn!("Side not assigned for pad {}: using orientation H", pad.name);
                Orientation::H
            });
            self.write(&format!(
                "{cell}\t#(.DIRECTION(\"{dir}\"),.ORIENTATION(\"{orientation}\"))\tuPAD{n}\t(.PAD(PAD_{}),{conn}{pins});\t// {}: {}\n",
                pad.name, pad.name, pad.desc
            ));
        }
        self.write("\n");

        self.write("// Tied-off cells on unused positions\n");
        let mut side = 0;
        for slot in ring.unused_slots() {
            if side != 0 && slot.side != side {
                self.write("\n");
            }
            side = slot.side;
            let name = slot.name();
            self.write(&format!(
                "{cell}\t#(.DIRECTION(\"UNUSED\"),.ORIENTATION(\"{}\"))\tu{name}\t(.PAD({name}),.IN(1'b0),.OUT(),.OEN(1'b0){pins});\t// Unused tied-off IO cell: side {} position {}\n",
                slot.orientation(), slot.side, slot.index
            ));
        }
        self.write("\n");

        self.write("// Retention cell. NOTE: retention mode is active high, disabled by default\n");
        self.write(&format!(
            "{}\tuPAD_rte\t(.RTE({}), .IRTE(1'b0));\n",
            self.cfg.retention_cell, self.cfg.retention_signal
        ));
    }

    //-----------------------------------------------------------------------------
    // Testbench instantiation
    //-----------------------------------------------------------------------------

    pub fn gen_instance(&mut self, pads: &PadList, ring: &PadRing) {
        let module = self.base.setting.module.clone();
        self.write(&banner_start(CommentStyle::Slash));
        self.write("// Signal declaration for each pad.\n");
        for pad in pads.io() {
            let kind = if pad.direction == Direction::Bidir {"wire"} else {"logic"};
            self.write(&format!("{kind}\tPAD_{};\t\t// {}\n", pad.name, pad.direction.to_string().to_uppercase()));
        }

        self.write("\n// Module instantiation.\n");
        self.write(&format!("{module} u{module} (\n"));
        let ports = pad_ports(pads, ring);
        for (i, p) in ports.iter().enumerate() {
            let sep = list_sep(i, ports.len());
            if p.filler {
                self.write(&format!(".{}(){sep}\n", p.name));
            } else {
                self.write(&format!(".{}{sep}\n", p.name));
            }
        }
        self.write(");\n\n");

        self.write("// Pull-ups for bidir signals.\n");
        for pad in pads.io().filter(|p| p.direction == Direction::Bidir) {
            self.write(&format!("pullup(PAD_{});\n", pad.name));
        }
        self.write(&banner_end(CommentStyle::Slash));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::pad::tests::pad_list;

    fn generator() -> GeneratorPadsSv {
        let setting = GeneratorBaseSetting { module: "TOP_PADS".to_owned(), ..Default::default() };
        GeneratorPadsSv::new(setting, PadRingConfig::default())
    }

    fn small_ring() -> PadRingConfig {
        PadRingConfig { capacity: 2, reserved: [0, 0, 0, 1], ..Default::default() }
    }

    #[test]
    fn test_module() {
        let mut gen = generator();
        gen.cfg = small_ring();
        let pads = pad_list();
        let ring = PadRing::new(&pads, &gen.cfg);
        assert_eq!(ring.unused, [1, 1, 1, 0]);
        let tpl = gen.template().unwrap();
        gen.gen_module(&pads, &ring, &tpl).unwrap();
        let txt = gen.base.take();
        assert!(txt.contains("module\nTOP_PADS\n(\n"));
        assert!(txt.contains(
            "input\twire\tPAD_CLK,\noutput\twire\tPAD_UART_TX,\ninout\twire\tPAD_SDA,\noutput\twire\tPAD_SPARE,\n\
             output\twire\tPAD_UNUSED_1_0,\noutput\twire\tPAD_UNUSED_2_0,\noutput\twire\tPAD_UNUSED_3_0\n);"
        ));
        assert!(!txt.contains("PAD_VDD"));
        assert!(txt.contains("logic\t[3:0]\tSC_PAD_DS;\n"));
        assert!(txt.contains("logic\tSDA_PORTEN;\nlogic\tSDA_PORTIN;\nlogic\tSDA_PORTOUT;\n"));
        assert!(txt.contains("TOP uTOP (\n\n// Control signals for IO cells.\n.SC_PAD_ST,\n.SC_PAD_DS,\n.SC_PAD_SL,\n"));
        assert!(txt.contains(".SDA_PORTOUT,\n.SPARE\n);\n"));
        assert!(txt.contains(
            "LIB_PAD\t#(.DIRECTION(\"IN\"),.ORIENTATION(\"H\"))\tuPAD0\t(.PAD(PAD_CLK),.OUT(CLK),.IN(1'b0),.OEN(1'b1),\
             .ST(SC_PAD_ST),.DS(SC_PAD_DS),.SL(SC_PAD_SL),.RTE(SC_PAD_RTE));\t// CLK: Main clock\n"
        ));
        assert!(txt.contains("#(.DIRECTION(\"BIDIR\"),.ORIENTATION(\"V\"))\tuPAD2\t(.PAD(PAD_SDA),.IN(SDA_PORTOUT),.OUT(SDA_PORTIN),.OEN(~SDA_PORTEN),"));
        // Unplaced pad defaults to horizontal
        assert!(txt.contains("#(.DIRECTION(\"OUT\"),.ORIENTATION(\"H\"))\tuPAD4\t"));
        assert!(txt.contains("#(.DIRECTION(\"UNUSED\"),.ORIENTATION(\"V\"))\tuPAD_UNUSED_2_0\t(.PAD(PAD_UNUSED_2_0),"));
        assert!(txt.contains("PAD_RET\tuPAD_rte\t(.RTE(SC_PAD_RTE), .IRTE(1'b0));\n"));
        assert!(!txt.contains("VGEN:"));
        assert!(txt.trim_end().ends_with(&"-".repeat(20)));
    }

    #[test]
    fn test_instance_matches_module() {
        let mut gen = generator();
        gen.cfg = small_ring();
        let pads = pad_list();
        let ring = PadRing::new(&pads, &gen.cfg);
        gen.gen_instance(&pads, &ring);
        let txt = gen.base.take();
        assert!(txt.contains("logic\tPAD_CLK;\t\t// INPUT\n"));
        assert!(txt.contains("wire\tPAD_SDA;\t\t// BIDIR\n"));
        assert!(txt.contains("TOP_PADS uTOP_PADS (\n"));
        assert!(txt.contains(".PAD_SPARE,\n.PAD_UNUSED_1_0(),\n"));
        assert!(txt.contains(".PAD_UNUSED_3_0()\n);\n"));
        assert!(txt.contains("pullup(PAD_SDA);\n"));
        let connected: Vec<String> = txt
            .lines()
            .filter(|l| l.starts_with(".PAD_"))
            .map(|l| l[1..].split(['(', ',']).next().unwrap_or_default().to_owned())
            .collect();
        let declared: Vec<String> = pad_ports(&pads, &ring).into_iter().map(|p| p.name).collect();
        assert_eq!(connected, declared);
    }

    #[test]
    fn test_gen_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut gen = generator();
        gen.base.setting.path = dir.path().to_owned();
        gen.gen(&pad_list()).unwrap();
        let txt = std::fs::read_to_string(dir.path().join("TOP_PADS.sv")).unwrap();
        assert_eq!(txt.matches("DIRECTION(\"UNUSED\")").count(), 267);
        assert!(dir.path().join("TOP_PADS_instance.sv").is_file());
    }
}
