use std::path::{Path, PathBuf};

use thiserror::Error;

/// Identity of one playback endpoint, as listed by `aplay -l`.
///
/// A listing line looks like:
///
/// ```text
/// card 0: PCH [HDA Intel PCH], device 0: ALC892 Analog [ALC892 Analog]
/// ```
///
/// The unbracketed names are ALSA's internal identifiers and the bracketed ones are the
/// human-facing labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceIdentity {
    pub card_index: u32,
    pub device_index: u32,
    pub card_system_name: String,
    pub card_label: String,
    pub device_system_name: String,
    pub device_label: String,
}

impl InterfaceIdentity {
    /// Parse a single line of `aplay -l` output that starts with the token `card`.
    pub fn from_listing_line(line: &str) -> Result<Self, ParseError> {
        if !is_card_line(line) {
            return Err(ParseError::NotACardLine);
        }
        let segments: Vec<&str> = line.split(',').collect();
        if segments.len() != 2 {
            return Err(ParseError::SegmentCount(segments.len()));
        }
        let card = parse_segment(segments[0], "card")?;
        let device = parse_segment(segments[1], "device")?;
        Ok(Self {
            card_index: card.index,
            device_index: device.index,
            card_system_name: card.system_name,
            card_label: card.label,
            device_system_name: device.system_name,
            device_label: device.label,
        })
    }

    /// ALSA hardware address in the form `hw:<card>,<device>`.
    pub fn hardware_address(&self) -> String {
        format!("hw:{},{}", self.card_index, self.device_index)
    }

    /// Playback character device node under `<dev_root>/snd`, normally `/dev/snd`.
    pub fn character_device_path(&self, dev_root: &Path) -> PathBuf {
        dev_root
            .join("snd")
            .join(format!("pcmC{}D{}p", self.card_index, self.device_index))
    }

    pub fn display_label(&self, hostname: &str) -> String {
        format!(
            "`{}' output of sound device `{}' on host `{}'",
            self.device_label, self.card_label, hostname
        )
    }
}

/// True if the first space-separated token of `line` is exactly `card`.
pub fn is_card_line(line: &str) -> bool {
    line.split(' ').next() == Some("card")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line does not start with the token 'card'")]
    NotACardLine,

    #[error("expected 2 comma separated segments, found {0}")]
    SegmentCount(usize),

    #[error("segment '{0}' has no ':' between index and name")]
    MissingColon(String),

    #[error("segment '{0}' does not start with '{1} <index>'")]
    BadIndex(String, &'static str),

    #[error("name '{0}' is not of the form 'System [Label]'")]
    MalformedName(String),
}

struct Segment {
    index: u32,
    system_name: String,
    label: String,
}

fn parse_segment(segment: &str, keyword: &'static str) -> Result<Segment, ParseError> {
    let segment = segment.trim();
    // Labels may contain colons of their own, only the first one separates the index
    let Some((index_part, name_part)) = segment.split_once(':') else {
        return Err(ParseError::MissingColon(segment.to_owned()));
    };
    let index = index_part
        .trim()
        .strip_prefix(keyword)
        .filter(|rest| rest.starts_with(' '))
        .and_then(|rest| rest.trim().parse::<u32>().ok())
        .ok_or_else(|| ParseError::BadIndex(segment.to_owned(), keyword))?;
    let (system_name, label) = parse_name(name_part)?;
    Ok(Segment {
        index,
        system_name,
        label,
    })
}

fn parse_name(name: &str) -> Result<(String, String), ParseError> {
    let malformed = || ParseError::MalformedName(name.trim().to_owned());
    let (system_name, rest) = name.split_once('[').ok_or_else(malformed)?;
    let (label, trailing) = rest.split_once(']').ok_or_else(malformed)?;
    if label.contains('[') || trailing.contains('[') || trailing.contains(']') {
        return Err(malformed());
    }
    if !trailing.trim().is_empty() {
        return Err(malformed());
    }
    Ok((system_name.trim().to_owned(), label.trim().to_owned()))
}
