use crate::{
    config::RegsConfig,
    descriptor::{Direction, RegField, RegisterMap},
};

/// Bit range `[msb:lsb]`
pub fn bit_range(msb: u32, lsb: u32) -> String {
    format!("[{msb}:{lsb}]")
}

/// Position of a field inside its register word
pub fn field_range(field: &RegField) -> String {
    bit_range(field.msb(), field.start)
}

/// Packed dimension of a signal declaration: empty for a single bit
pub fn decl_range(nbits: u32) -> String {
    if nbits > 1 { bit_range(nbits - 1, 0) } else { String::new() }
}

/// SystemVerilog sized literal
pub fn sv_hex(nbits: u32, value: u64) -> String {
    if value == 0 { "'0".to_owned() } else { format!("{nbits}'h{value:X}") }
}

/// C/Python hexadecimal literal
pub fn c_hex(value: u64) -> String {
    format!("0x{value:X}")
}

/// Byte offset of a register word
pub fn addr_hex(offset: u32) -> String {
    format!("{offset:#x}")
}

/// Placeholder for an unused register word
pub fn reserved_name(idx: u32) -> String {
    format!("RESERVED{idx}")
}

/// Address decode of a register word on the register bus
pub fn decode_addr(cfg: &RegsConfig, idx: u32) -> String {
    format!("{}.addr{}=={}'h{:x}", cfg.bus, bit_range(cfg.addr_msb, 2), cfg.addr_bits(), idx)
}

/// Separator to put after element `i` of a port list of size `len`
pub fn list_sep(i: usize, len: usize) -> &'static str {
    if i + 1 < len { "," } else { "" }
}

/// Ports of the register module: read-only fields as inputs followed by read/write fields as outputs.
/// Shared by the module and its instantiation template so that both lists always match.
pub fn reg_ports(map: &RegisterMap) -> Vec<(&RegField, Direction)> {
    map.inputs()
        .map(|f| (f, Direction::Input))
        .chain(map.outputs().map(|f| (f, Direction::Output)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::register::tests::regs_map;

    #[test]
    fn test_format() {
        let map = regs_map();
        assert_eq!(field_range(&map.fields[1]), "[3:0]");
        assert_eq!(decl_range(1), "");
        assert_eq!(decl_range(4), "[3:0]");
        assert_eq!(sv_hex(8, 0), "'0");
        assert_eq!(sv_hex(8, 0xa5), "8'hA5");
        assert_eq!(c_hex(0xFF), "0xFF");
        assert_eq!(addr_hex(map.fields[3].offset()), "0x14");
        assert_eq!(addr_hex(0), "0x0");
        assert_eq!(decode_addr(&RegsConfig::default(), 10), "regbus.addr[9:2]==8'ha");
        assert_eq!(list_sep(0, 2), ",");
        assert_eq!(list_sep(1, 2), "");
    }

    #[test]
    fn test_reg_ports() {
        let map = regs_map();
        let ports: Vec<(&str, Direction)> = reg_ports(&map).into_iter().map(|(f, d)| (f.name.as_str(), d)).collect();
        assert_eq!(
            ports,
            vec![
                ("status", Direction::Input),
                ("ctrl", Direction::Output),
                ("mode", Direction::Output),
                ("data", Direction::Output),
            ]
        );
    }
}
