use std::fmt::Display;

use log::debug;

/// Electrical or transport type of an output, guessed from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectricalInterface {
    Analog,
    /// Digital output, with the keyword that identified the transport if it was more
    /// specific than just "digital".
    Digital(Option<&'static str>),
    Unknown,
}

impl ElectricalInterface {
    pub fn is_digital(&self) -> bool {
        matches!(self, ElectricalInterface::Digital(_))
    }
}

/// Digital keywords in match priority order. First hit wins.
///
/// Longer patterns listed after a shorter one they contain (AES/EBU after AES) can never
/// match on their own; the order is kept as-is so existing labels classify the same way.
static DIGITAL_KEYWORDS: &[(&str, Option<&str>)] = &[
    ("ADAT", Some("ADAT")),
    ("AES", Some("AES")),
    ("EBU", Some("EBU")),
    ("AES/EBU", Some("AES/EBU")),
    ("Digital", None),
    ("DSD", Some("DSD")),
    ("HDMI", Some("HDMI")),
    ("i2s", Some("i2s")),
    ("iec958", Some("iec958")),
    ("SPDIF", Some("SPDIF")),
    ("s/pdif", Some("s/pdif")),
    ("Toslink", Some("Toslink")),
    ("UAC", Some("UAC")),
    ("USB", Some("USB")),
];

/// Classify an output from its display label.
///
/// Case-insensitive substring search over the digital keywords, then "analog". A label that
/// mentions both a digital keyword and "analog" is digital.
pub fn classify(label: &str) -> ElectricalInterface {
    let label = label.to_lowercase();
    for (pattern, kind) in DIGITAL_KEYWORDS {
        if label.contains(&pattern.to_lowercase()) {
            debug!("label matched digital keyword '{pattern}'");
            return ElectricalInterface::Digital(*kind);
        }
    }
    if label.contains("analog") {
        ElectricalInterface::Analog
    } else {
        ElectricalInterface::Unknown
    }
}

impl Display for ElectricalInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectricalInterface::Analog => write!(f, "Analog audio output interface"),
            ElectricalInterface::Digital(None) => write!(f, "Digital audio output interface"),
            ElectricalInterface::Digital(Some(kind)) => {
                write!(f, "Digital ({kind}) audio output interface")
            }
            ElectricalInterface::Unknown => write!(f, "Unknown"),
        }
    }
}
