use crate::{
    config::RegsConfig,
    descriptor::{Direction, RegisterMap},
    error::{VgenError, VgenResult},
};

use super::{
    field_fmt::{decode_addr, field_range, list_sep, reg_ports, sv_hex},
    gen_common::{banner_end, banner_start, CommentStyle, GeneratorBase, GeneratorBaseSetting},
    template::Template,
};

pub const REGS_TEMPLATE: &str = include_str!("resources/regs_template.sv");

pub const REGS_TAGS: [&str; 6] = [
    "HEADER",
    "MODULE NAME",
    "INPUTS TO REGS",
    "OUTPUTS FROM REGS",
    "REG WRITE",
    "REG READ",
];

/// Register file module and its instantiation template
pub struct GeneratorRegsSv {
    base: GeneratorBase,
    cfg: RegsConfig,
}

impl GeneratorRegsSv {

    pub fn new(setting: GeneratorBaseSetting, cfg: RegsConfig) -> Self {
        GeneratorRegsSv { base: GeneratorBase::new(setting), cfg }
    }

    fn write(&mut self, string: &str) {
        self.base.write(string);
    }

    pub fn template(&self) -> VgenResult<Template> {
        let tpl = Template::load(self.base.setting.template.as_deref(), "regs_template.sv", REGS_TEMPLATE)?;
        tpl.validate(&REGS_TAGS)?;
        Ok(tpl)
    }

    pub fn gen(&mut self, map: &RegisterMap) -> VgenResult<()> {
        if map.is_empty() {
            return Err(VgenError::Layout("no register to generate".to_owned()));
        }
        map.check_decode(&self.cfg)?;
        let tpl = self.template()?;
        let module = self.base.setting.module.clone();
        self.gen_module(map, &tpl)?;
        self.base.save(&format!("{module}.sv"))?;
        self.gen_instance(map);
        self.base.save(&format!("{module}.inst.sv"))?;
        Ok(())
    }

    //-----------------------------------------------------------------------------
    // Register module
    //-----------------------------------------------------------------------------

    pub fn gen_module(&mut self, map: &RegisterMap, tpl: &Template) -> VgenResult<()> {
        let mut cursor = tpl.cursor();
        self.write(&banner_start(CommentStyle::Slash));

        self.write(&cursor.read_segment("HEADER")?);
        self.write("// Register file contents:\n");
        self.write("// idx  name                 nbits start access test rval\n");
        for f in map.iter() {
            self.write(&format!(
                "// {:<4} {:<20} {:<5} {:<5} {:<6} {:<4} {:#x} : {}\n",
                f.idx, f.name, f.nbits, f.start, f.access, f.test as u8, f.rval, f.desc
            ));
        }
        self.write("\n");

        self.write(&cursor.read_segment("MODULE NAME")?);
        self.write(&format!("{}\n", self.base.setting.module));

        // Inputs and outputs share a single port list to place the final comma
        let ports = reg_ports(map);
        let nb_ports = ports.len();
        self.write(&cursor.read_segment("INPUTS TO REGS")?);
        for (i, (f, _)) in ports.iter().enumerate().filter(|(_, (_, d))| *d == Direction::Input) {
            self.write(&format!(
                "  input  logic {} {}{}\t// idx {}: {}\n",
                field_range(f), f.name, list_sep(i, nb_ports), f.idx, f.desc
            ));
        }
        self.write(&cursor.read_segment("OUTPUTS FROM REGS")?);
        for (i, (f, _)) in ports.iter().enumerate().filter(|(_, (_, d))| *d == Direction::Output) {
            self.write(&format!(
                "  output logic {} {}{}\t// idx {}: {}\n",
                field_range(f), f.name, list_sep(i, nb_ports), f.idx, f.desc
            ));
        }

        self.write(&cursor.read_segment("REG WRITE")?);
        let bus = self.cfg.bus.clone();
        for f in map.outputs() {
            let dims = field_range(f);
            let reg = format!("{}_reg", f.name);
            self.write(&format!("// idx {}\n", f.idx));
            self.write(&format!("logic {dims} {reg};\n"));
            self.write("always_ff @(posedge clk or negedge rstn) begin\n");
            self.write(&format!("  if (~rstn) begin\n    {reg}{dims} <= {};\n", sv_hex(f.nbits, f.rval)));
            self.write("  end else begin\n");
            self.write(&format!(
                "    if ({bus}.write_en & ({})) {reg}{dims} <= {bus}.wdata{dims};\n",
                decode_addr(&self.cfg, f.idx)
            ));
            self.write("  end\nend\n");
            self.write(&format!("assign {}{dims} = {reg}{dims};\n\n", f.name));
        }

        self.write(&cursor.read_segment("REG READ")?);
        for f in map.iter() {
            let dims = field_range(f);
            self.write(&format!(
                "  if ({}) rdata_o{dims} = {}{dims};\t// idx {}\n",
                decode_addr(&self.cfg, f.idx), f.name, f.idx
            ));
        }

        self.write(&cursor.read_segment("")?);
        self.write(&banner_end(CommentStyle::Slash));
        Ok(())
    }

    //-----------------------------------------------------------------------------
    // Instantiation template
    //-----------------------------------------------------------------------------

    pub fn gen_instance(&mut self, map: &RegisterMap) {
        let module = self.base.setting.module.clone();
        self.write(&banner_start(CommentStyle::Slash));
        self.write("// START\n");
        let ports = reg_ports(map);
        for (f, _) in ports.iter() {
            self.write(&format!("logic {} {};\n", field_range(f), f.name));
        }

        self.write(&format!("\n{module} u_{module} (\n\n"));
        self.write("// clocks and resets\n");
        self.write(&format!(".clk({}),\n.rstn({}),\n\n", self.cfg.clock, self.cfg.reset));
        self.write("// Synchronous register interface\n");
        self.write(&format!(".{}({module}.sink),\n\n", self.cfg.bus));
        self.write("// reg file signals\n");
        let nb_ports = ports.len();
        for (i, (f, _)) in ports.iter().enumerate() {
            self.write(&format!(
                ".{}({}{}){}\t// idx {}\n",
                f.name, f.name, field_range(f), list_sep(i, nb_ports), f.idx
            ));
        }
        self.write("\n);\n// END\n");
        self.write(&banner_end(CommentStyle::Slash));
    }
}
