pub mod order_dict;
pub mod table;
pub mod register;
pub mod pad;

pub use {table::*, register::*, pad::*};

/// Generated artifacts, each with its own set of required descriptor keys
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArtifactKind {
    RegModule,
    RegInstance,
    RegDocs,
    RegHeader,
    RegClass,
    RegTest,
    PadModule,
    PadInstance,
}

impl ArtifactKind {

    pub const REGS: [ArtifactKind; 6] = [
        ArtifactKind::RegModule,
        ArtifactKind::RegInstance,
        ArtifactKind::RegDocs,
        ArtifactKind::RegHeader,
        ArtifactKind::RegClass,
        ArtifactKind::RegTest,
    ];

    pub const PADS: [ArtifactKind; 2] = [ArtifactKind::PadModule, ArtifactKind::PadInstance];

    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            ArtifactKind::RegModule => &["idx", "name", "nbits", "access", "start", "test", "rval", "desc"],
            ArtifactKind::RegInstance |
            ArtifactKind::RegDocs |
            ArtifactKind::RegHeader |
            ArtifactKind::RegClass |
            ArtifactKind::RegTest => &REG_KEYS,
            ArtifactKind::PadModule |
            ArtifactKind::PadInstance => &PAD_KEYS,
        }
    }

    /// Union of the required keys of several artifacts, in first-seen order
    pub fn schema(kinds: &[ArtifactKind]) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Vec::new();
        for k in kinds.iter().flat_map(|a| a.required_keys()) {
            if !keys.contains(k) {
                keys.push(k);
            }
        }
        keys
    }
}
