use std::fmt::Display;

use thiserror::Error;

/// Isochronous synchronisation mode of a USB Audio Class output endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbSyncMode {
    Adaptive,
    Asynchronous,
}

impl UsbSyncMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ADAPTIVE" => Some(UsbSyncMode::Adaptive),
            "ASYNC" => Some(UsbSyncMode::Asynchronous),
            _ => None,
        }
    }

    pub fn class_id(&self) -> u8 {
        match self {
            UsbSyncMode::Adaptive => 1,
            UsbSyncMode::Asynchronous => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UsbSyncMode::Adaptive => "isochronous adaptive",
            UsbSyncMode::Asynchronous => "isochronous asynchronous",
        }
    }
}

/// Outcome of looking for USB Audio Class stream information for a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsbAudioClass {
    /// The card has no USB stream descriptor, so it is not a USB audio device.
    NotApplicable,
    Class(UsbSyncMode),
    /// The descriptor exists but could not be read or understood.
    Undetermined(String),
}

impl UsbAudioClass {
    pub fn is_usb_audio_class(&self) -> bool {
        matches!(self, UsbAudioClass::Class(_))
    }
}

impl Display for UsbAudioClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsbAudioClass::NotApplicable => write!(f, "(not applicable)"),
            UsbAudioClass::Class(mode) => write!(f, "{}: {}", mode.class_id(), mode.description()),
            UsbAudioClass::Undetermined(reason) => write!(f, "unable to determine. {reason}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamDescriptorError {
    #[error("no line containing 'Endpoint' with a parenthesised sync type")]
    NoEndpoint,

    #[error("unrecognised sync type '{0}'")]
    UnknownSyncType(String),
}

/// Extract the sync mode from the contents of `/proc/asound/card<N>/stream0`.
///
/// The first line mentioning `Endpoint` is used and the sync type is the contents of its last
/// parenthesised group, e.g. `Endpoint: 0x01 (1 OUT) (ASYNC)` or `Endpoint: 1 OUT (ADAPTIVE)`.
pub fn parse_stream_descriptor(contents: &str) -> Result<UsbSyncMode, StreamDescriptorError> {
    let line = contents
        .lines()
        .find(|l| l.contains("Endpoint"))
        .ok_or(StreamDescriptorError::NoEndpoint)?;
    let after_marker = &line[line.find("Endpoint").unwrap_or(0)..];
    let open = after_marker
        .rfind('(')
        .ok_or(StreamDescriptorError::NoEndpoint)?;
    let token = &after_marker[open + 1..];
    let close = token.find(')').ok_or(StreamDescriptorError::NoEndpoint)?;
    let token = token[..close].trim();
    UsbSyncMode::from_token(token)
        .ok_or_else(|| StreamDescriptorError::UnknownSyncType(token.to_owned()))
}
