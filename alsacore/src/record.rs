use std::fmt::Display;
use std::path::PathBuf;

use crate::electrical::{classify, ElectricalInterface};
use crate::interface::InterfaceIdentity;
use crate::monitor::MonitorState;
use crate::process::ProcessOwner;
use crate::usb::UsbAudioClass;

/// What the playback attempt found out about an interface's sample formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleFormatProbe {
    /// Formats advertised by the driver, in its order.
    Formats(Vec<String>),
    /// The device refused to open, most likely because something else holds it.
    InUse {
        error: String,
        owner: Option<ProcessOwner>,
    },
    /// The probe itself could not be carried out or did not finish.
    Failed(String),
}

/// Everything measured about one interface apart from its identity.
#[derive(Debug, Clone)]
pub struct ProbeResults {
    pub character_device_path: PathBuf,
    pub usb_audio_class: UsbAudioClass,
    pub usb_driver_packets: Option<String>,
    pub monitor_path: PathBuf,
    pub monitor: MonitorState,
    pub sample_formats: SampleFormatProbe,
}

/// Fully probed description of one ALSA playback interface.
#[derive(Debug, Clone)]
pub struct InterfaceRecord {
    pub identity: InterfaceIdentity,
    pub hardware_address: String,
    pub character_device_path: PathBuf,
    pub display_label: String,
    pub electrical_interface: ElectricalInterface,
    pub usb_audio_class: UsbAudioClass,
    /// `nrpacks` parameter of the USB audio driver, only looked up for USB audio class cards.
    pub usb_driver_packets: Option<String>,
    pub monitor_path: PathBuf,
    pub monitor: MonitorState,
    pub sample_formats: Vec<String>,
    pub sample_format_error: Option<String>,
}

impl InterfaceRecord {
    pub fn new(identity: InterfaceIdentity, hostname: &str, probes: ProbeResults) -> Self {
        let display_label = identity.display_label(hostname);
        let electrical_interface = classify(&display_label);
        let (sample_formats, sample_format_error) = match probes.sample_formats {
            SampleFormatProbe::Formats(formats) => (formats, None),
            SampleFormatProbe::InUse { error, owner } => {
                let holder = match owner {
                    Some(owner) => owner.to_string(),
                    None => "(unknown)".to_owned(),
                };
                (
                    vec![format!("can't detect, device is in use by {holder}")],
                    Some(error),
                )
            }
            SampleFormatProbe::Failed(error) => (vec![], Some(error)),
        };
        Self {
            hardware_address: identity.hardware_address(),
            character_device_path: probes.character_device_path,
            display_label,
            electrical_interface,
            usb_audio_class: probes.usb_audio_class,
            usb_driver_packets: probes.usb_driver_packets,
            monitor_path: probes.monitor_path,
            monitor: probes.monitor,
            sample_formats,
            sample_format_error,
            identity,
        }
    }

    pub fn is_usb_audio_class(&self) -> bool {
        self.usb_audio_class.is_usb_audio_class()
    }

    pub fn is_in_use(&self) -> bool {
        self.sample_format_error
            .as_ref()
            .is_some_and(|e| !e.is_empty())
    }
}

impl Display for InterfaceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_use = if self.is_in_use() {
            "in use"
        } else {
            "not in use"
        };
        let accessible = if self.monitor.accessible {
            "accessible"
        } else {
            "not accessible"
        };
        writeln!(f, "* {}", self.display_label)?;
        writeln!(f, "  - hardware address  = {}", self.hardware_address)?;
        writeln!(f, "  - electrical        = {}", self.electrical_interface)?;
        writeln!(
            f,
            "  - character device  = {} ({in_use})",
            self.character_device_path.display()
        )?;
        writeln!(
            f,
            "  - monitor file      = {} ({accessible}, {})",
            self.monitor_path.display(),
            self.monitor.status
        )?;
        writeln!(f, "  - usb audio class   = {}", self.usb_audio_class)?;
        writeln!(
            f,
            "  - sample formats    = {}",
            self.sample_formats.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorStatus;
    use crate::usb::UsbSyncMode;

    fn identity(line: &str) -> InterfaceIdentity {
        InterfaceIdentity::from_listing_line(line).unwrap()
    }

    fn probes(sample_formats: SampleFormatProbe) -> ProbeResults {
        ProbeResults {
            character_device_path: PathBuf::from("/dev/snd/pcmC0D0p"),
            usb_audio_class: UsbAudioClass::NotApplicable,
            usb_driver_packets: None,
            monitor_path: PathBuf::from("/proc/asound/card0/pcm0p/sub0/hw_params"),
            monitor: MonitorState::from_hw_params("closed"),
            sample_formats,
        }
    }

    #[test]
    fn report_block_layout() {
        let record = InterfaceRecord::new(
            identity("card 0: MID [HDA Intel MID], device 0: ALC888 Analog [ALC888 Analog]"),
            "box",
            probes(SampleFormatProbe::Formats(vec![
                "S16_LE".to_owned(),
                "S32_LE".to_owned(),
            ])),
        );
        assert!(!record.is_in_use());
        assert_eq!(
            record.to_string(),
            "\
* `ALC888 Analog' output of sound device `HDA Intel MID' on host `box'
  - hardware address  = hw:0,0
  - electrical        = Analog audio output interface
  - character device  = /dev/snd/pcmC0D0p (not in use)
  - monitor file      = /proc/asound/card0/pcm0p/sub0/hw_params (accessible, closed)
  - usb audio class   = (not applicable)
  - sample formats    = S16_LE, S32_LE
"
        );
    }

    #[test]
    fn busy_device_record() {
        let mut probes = probes(SampleFormatProbe::InUse {
            error: "audio open error: Device or resource busy".to_owned(),
            owner: Some(ProcessOwner {
                pid: 812,
                command: "pipewire".to_owned(),
            }),
        });
        probes.character_device_path = PathBuf::from("/dev/snd/pcmC2D0p");
        probes.usb_audio_class = UsbAudioClass::Class(UsbSyncMode::Asynchronous);
        probes.monitor = MonitorState::from_hw_params("access: MMAP_INTERLEAVED\n");
        let record = InterfaceRecord::new(
            identity("card 2: DAC [USB Audio DAC], device 0: USB Audio [USB Audio]"),
            "box",
            probes,
        );
        assert!(record.is_in_use());
        assert!(record.is_usb_audio_class());
        assert_eq!(record.monitor.status, MonitorStatus::Opened);
        assert_eq!(
            record.sample_format_error.as_deref(),
            Some("audio open error: Device or resource busy")
        );
        assert_eq!(
            record.sample_formats,
            vec!["can't detect, device is in use by process `pipewire' with pid `812'"]
        );
        let report = record.to_string();
        assert!(report.contains("  - character device  = /dev/snd/pcmC2D0p (in use)\n"));
        assert!(report.contains("  - usb audio class   = 2: isochronous asynchronous\n"));
        assert!(report.contains("(accessible, opened)"));
    }

    #[test]
    fn unattributed_busy_device() {
        let record = InterfaceRecord::new(
            identity("card 0: PCH [HDA Intel PCH], device 3: HDMI 0 [HDMI 0]"),
            "box",
            probes(SampleFormatProbe::InUse {
                error: "audio open error: Device or resource busy".to_owned(),
                owner: None,
            }),
        );
        assert_eq!(
            record.sample_formats,
            vec!["can't detect, device is in use by (unknown)"]
        );
    }

    #[test]
    fn failed_probe_leaves_formats_empty() {
        let mut probes = probes(SampleFormatProbe::Failed(
            "playback probe timed out after 5000 ms".to_owned(),
        ));
        probes.monitor = MonitorState::inaccessible();
        let record = InterfaceRecord::new(
            identity("card 0: PCH [HDA Intel PCH], device 3: HDMI 0 [HDMI 0]"),
            "box",
            probes,
        );
        assert!(record.sample_formats.is_empty());
        assert!(record.is_in_use());
        let report = record.to_string();
        assert!(report.contains("(not accessible, (unknown))"));
        assert!(report.ends_with("  - sample formats    = \n"));
    }
}
