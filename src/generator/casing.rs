#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum Casing {#[default]
    /// Display string as-is
    Raw,
    /// lowercase with word separated by underscore
    Snake,
    /// UPPERCASE with word separated by underscore
    Upper,
    /// All words starts with uppercase
    Pascal,
}

/// Split an identifier in words on separators and on lowercase/uppercase transitions
fn words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for part in s.split(['_', '-', ' ']).filter(|p| !p.is_empty()) {
        let mut start = 0;
        let mut prev_lower = false;
        for (i, c) in part.char_indices() {
            if c.is_uppercase() && prev_lower {
                words.push(&part[start..i]);
                start = i;
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
        words.push(&part[start..]);
    }
    words
}

impl Casing {
    pub fn format(&self, s: &str) -> String {
        let w = words(s);
        match self {
            Casing::Raw => s.to_owned(),
            Casing::Snake => w.iter().map(|w| w.to_ascii_lowercase()).collect::<Vec<_>>().join("_"),
            Casing::Upper => w.iter().map(|w| w.to_ascii_uppercase()).collect::<Vec<_>>().join("_"),
            Casing::Pascal => w.iter()
                .map(|w| {
                    let mut c = w.chars();
                    match c.next() {
                        Some(f) => f.to_ascii_uppercase().to_string() + &c.as_str().to_ascii_lowercase(),
                        None => String::new(),
                    }
                })
                .collect(),
        }
    }
}

pub trait ToCasing {
    fn to_casing(&self, casing: Casing) -> String;
}

impl<T> ToCasing for T where T: AsRef<str> {
    fn to_casing(&self, casing: Casing) -> String {
        casing.format(self.as_ref())
    }
}
