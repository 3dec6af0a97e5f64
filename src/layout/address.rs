use crate::descriptor::{RegField, RegisterMap};

/// Element of the register address map
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AddrEntry<'a> {
    Field(&'a RegField),
    /// Word index with no register between the first and the last register
    Gap(u32),
}

/// Register map in address order, with a gap entry for every unused word
/// strictly between the lowest and highest index.
/// All generators filling holes in the address map go through this.
pub fn address_layout(map: &RegisterMap) -> Vec<AddrEntry<'_>> {
    let mut entries = Vec::with_capacity(map.len());
    let mut next: Option<u32> = None;
    for field in map.iter() {
        if let Some(n) = next {
            entries.extend((n..field.idx).map(AddrEntry::Gap));
        }
        entries.push(AddrEntry::Field(field));
        next = Some(field.idx + 1);
    }
    entries
}

/// Unused word indexes
pub fn gaps(map: &RegisterMap) -> Vec<u32> {
    address_layout(map)
        .into_iter()
        .filter_map(|e| match e {
            AddrEntry::Gap(i) => Some(i),
            AddrEntry::Field(_) => None,
        })
        .collect()
}
