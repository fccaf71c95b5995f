use std::str::FromStr;

use alsacore::electrical::ElectricalInterface;
use alsacore::usb::UsbAudioClass;
use regex::Regex;

use crate::error::InspectError;

/// Broad interface category used to limit the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Analog,
    /// Any digital interface, USB audio class devices included.
    Digital,
    Usb,
}

impl FromStr for InterfaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "analog" => Ok(InterfaceKind::Analog),
            "d" | "digital" => Ok(InterfaceKind::Digital),
            "u" | "usb" | "uac" => Ok(InterfaceKind::Usb),
            other => Err(format!(
                "unknown interface kind '{other}', expected one of a, analog, d, digital, u, usb, uac"
            )),
        }
    }
}

impl InterfaceKind {
    fn accepts(&self, electrical: &ElectricalInterface, usb_audio_class: &UsbAudioClass) -> bool {
        let usb = usb_audio_class.is_usb_audio_class()
            || matches!(electrical, ElectricalInterface::Digital(Some("USB" | "UAC")));
        match self {
            InterfaceKind::Analog => *electrical == ElectricalInterface::Analog,
            InterfaceKind::Digital => electrical.is_digital() || usb,
            InterfaceKind::Usb => usb,
        }
    }
}

/// Criteria narrowing which interfaces are probed and reported. Every criterion that is set must
/// match.
///
/// The address and label criteria are checked from the listing alone. The kind needs the card's
/// stream descriptor, so it is checked once that has been read. Either way an interface that
/// doesn't match never gets a playback attempt.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    kind: Option<InterfaceKind>,
    /// Exact hardware address, e.g. `hw:1,0`.
    address: Option<String>,
    /// Case-sensitive substring of the display label.
    substring: Option<String>,
    pattern: Option<Regex>,
}

impl Selection {
    pub fn new(
        kind: Option<InterfaceKind>,
        address: Option<String>,
        substring: Option<String>,
    ) -> Self {
        Self {
            kind,
            address,
            substring,
            pattern: None,
        }
    }

    /// Also require the display label to match a regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, InspectError> {
        let re =
            Regex::new(pattern).map_err(|e| InspectError::InvalidRegex(pattern.to_owned(), e))?;
        self.pattern = Some(re);
        Ok(self)
    }

    /// Check the criteria that only need the hardware address and display label.
    pub fn matches_label(&self, address: &str, display_label: &str) -> bool {
        self.address.as_ref().is_none_or(|a| a == address)
            && self
                .substring
                .as_ref()
                .is_none_or(|s| display_label.contains(s.as_str()))
            && self
                .pattern
                .as_ref()
                .is_none_or(|re| re.is_match(display_label))
    }

    /// Check the interface kind limit, if any.
    pub fn matches_kind(
        &self,
        electrical: &ElectricalInterface,
        usb_audio_class: &UsbAudioClass,
    ) -> bool {
        self.kind
            .is_none_or(|k| k.accepts(electrical, usb_audio_class))
    }
}
