pub mod parser_common;
pub mod parser_csv;
pub mod parser_template;
pub mod parser_verilog;

pub use {
	parser_common::*,
	parser_csv::*,
	parser_template::*,
	parser_verilog::*,
};
