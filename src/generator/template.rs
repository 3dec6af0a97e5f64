//! Template files are plain text split by sentinel lines `// VGEN: <TAG>`.
//! Generators copy the text between sentinels unchanged and insert their
//! own content in place of each sentinel.

use std::{fs, path::Path};

use crate::{
    error::{VgenError, VgenResult},
    parser::sentinel,
};

/// Text preceding a sentinel line
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
    /// Tag of the sentinel closing the segment, None for the end of the template
    pub tag: Option<String>,
    /// Raw sentinel line, including its line break
    pub sentinel: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub name: String,
    segments: Vec<Segment>,
}

impl Template {

    pub fn parse(name: &str, txt: &str) -> Template {
        let mut segments = Vec::new();
        let mut text = String::new();
        for line in txt.split_inclusive('\n') {
            match sentinel(line.trim_end_matches(['\n', '\r'])) {
                Ok(tag) => segments.push(Segment {
                    text: std::mem::take(&mut text),
                    tag: Some(tag.to_owned()),
                    sentinel: line.to_owned(),
                }),
                Err(_) => text.push_str(line),
            }
        }
        segments.push(Segment { text, tag: None, sentinel: String::new() });
        Template { name: name.to_owned(), segments }
    }

    pub fn read(path: &Path) -> VgenResult<Template> {
        let txt = fs::read_to_string(path)?;
        Ok(Template::parse(&path.display().to_string(), &txt))
    }

    /// Template from a file when provided, embedded default otherwise
    pub fn load(path: Option<&Path>, default_name: &str, default_txt: &str) -> VgenResult<Template> {
        match path {
            Some(p) => Template::read(p),
            None => Ok(Template::parse(default_name, default_txt)),
        }
    }

    pub fn tags(&self) -> impl Iterator<Item=&str> {
        self.segments.iter().filter_map(|s| s.tag.as_deref())
    }

    /// Check the template contains all tags, in order
    pub fn validate(&self, required: &[&str]) -> VgenResult<()> {
        let mut tags = self.tags();
        for tag in required {
            if !tags.any(|t| t == *tag) {
                return Err(VgenError::template(&self.name, tag));
            }
        }
        Ok(())
    }

    pub fn cursor(&self) -> SegmentCursor<'_> {
        SegmentCursor { template: self, pos: 0 }
    }
}

/// Sequential reader over template segments
pub struct SegmentCursor<'a> {
    template: &'a Template,
    pos: usize,
}

impl<'a> SegmentCursor<'a> {

    /// Return everything up to the sentinel of `tag` (excluded) and move after it.
    /// Sentinels of other tags met on the way are kept verbatim.
    /// An empty tag reads until the end of the template.
    pub fn read_segment(&mut self, tag: &str) -> VgenResult<String> {
        let mut out = String::new();
        let segments = &self.template.segments;
        for (i, seg) in segments.iter().enumerate().skip(self.pos) {
            out.push_str(&seg.text);
            match seg.tag.as_deref() {
                Some(t) if !tag.is_empty() && t == tag => {
                    self.pos = i + 1;
                    return Ok(out);
                }
                Some(_) => out.push_str(&seg.sentinel),
                None => {}
            }
        }
        if tag.is_empty() {
            self.pos = segments.len();
            Ok(out)
        } else {
            Err(VgenError::template(&self.template.name, tag))
        }
    }
}
