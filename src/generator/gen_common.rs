use std::{
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing::{debug, info};

use crate::error::VgenResult;

#[derive(Clone, Debug, Default)]
pub struct GeneratorBaseSetting {
    /// Output directory path
    pub path: PathBuf,
    /// Path to a template file overriding the embedded one
    pub template: Option<PathBuf>,
    /// Name of the generated module, used in file names and identifiers
    pub module: String,
}

/// Comment syntax of a generated artifact
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommentStyle {
    /// `//` : SystemVerilog, C
    Slash,
    /// `#` : Python
    Hash,
    /// `<!-- -->` : Markdown
    Html,
}

impl CommentStyle {
    pub fn line(&self, txt: &str) -> String {
        match self {
            CommentStyle::Slash => format!("// {txt}\n"),
            CommentStyle::Hash => format!("# {txt}\n"),
            CommentStyle::Html => format!("<!-- {txt} -->\n"),
        }
    }
}

const BANNER_RULE: &str = "-----------------------------------------------------------------------------";

/// Header of every generated file. Contains no date so that generation is reproducible
pub fn banner_start(style: CommentStyle) -> String {
    let mut s = style.line(BANNER_RULE);
    s.push_str(&style.line("File generated automatically by vgen: DO NOT EDIT."));
    s.push_str(&style.line(BANNER_RULE));
    s.push('\n');
    s
}

pub fn banner_end(style: CommentStyle) -> String {
    let mut s = String::from("\n");
    s.push_str(&style.line(BANNER_RULE));
    s.push_str(&style.line("End of file generated by vgen"));
    s.push_str(&style.line(BANNER_RULE));
    s
}

/// Copy an existing file to `<file>.<timestamp>.bak` before it gets overwritten
pub fn backup_existing(path: &Path) -> VgenResult<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.bak", Local::now().format("%Y%m%d_%H%M%S")));
    let bak = path.with_file_name(name);
    fs::copy(path, &bak)?;
    debug!("Backup of {} in {}", path.display(), bak.display());
    Ok(Some(bak))
}

/// Text buffer shared by all generators
#[derive(Clone, Debug)]
pub struct GeneratorBase {
    pub setting: GeneratorBaseSetting,
    pub txt: String,
}

impl GeneratorBase {

    pub fn new(setting: GeneratorBaseSetting) -> Self {
        GeneratorBase {
            setting,
            txt: String::with_capacity(10000),
        }
    }

    pub fn write(&mut self, string: &str) {
        self.txt.push_str(string);
    }

    /// Retrieve the generated text, leaving the buffer empty
    #[cfg(test)]
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.txt)
    }

    /// Write the buffer in the output directory, backing up any previous version
    pub fn save(&mut self, filename: &str) -> VgenResult<PathBuf> {
        create_dir_all(&self.setting.path)?;
        let path = self.setting.path.join(filename);
        backup_existing(&path)?;
        fs::write(&path, self.txt.as_bytes())?;
        info!("Wrote {}", path.display());
        self.txt.clear();
        Ok(path)
    }
}
