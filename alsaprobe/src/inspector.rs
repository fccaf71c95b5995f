use std::path::{Path, PathBuf};

use alsacore::diagnostics::{parse_playback_diagnostics, PlaybackDiagnostics};
use alsacore::electrical::classify;
use alsacore::interface::{is_card_line, InterfaceIdentity};
use alsacore::record::{InterfaceRecord, ProbeResults, SampleFormatProbe};
use alsacore::usb::UsbAudioClass;
use log::{debug, warn};

use crate::attribution::{Fallback, LsofAttributor, ProcFdAttributor, ProcessAttributor};
use crate::config::InspectorConfig;
use crate::kernel::KernelFiles;
use crate::playback::{AplayProbe, PlaybackProbe};
use crate::selection::Selection;

const USB_AUDIO_DRIVER: &str = "snd_usb_audio";
const USB_PACKETS_PARAMETER: &str = "nrpacks";

/// Turns `aplay -l` output into fully probed interface records.
///
/// Interfaces are probed one after another. The playback probe claims the device while it
/// runs, so a given hardware address is never probed twice at once.
pub struct Inspector<P, A> {
    hostname: String,
    dev_root: PathBuf,
    kernel: KernelFiles,
    playback: P,
    attributor: A,
}

/// Inspector wired to the real `aplay`, `lsof` and kernel trees described by a config.
pub type SystemInspector = Inspector<AplayProbe, Fallback<LsofAttributor, ProcFdAttributor>>;

impl SystemInspector {
    pub fn from_config(config: &InspectorConfig, hostname: String) -> Self {
        Inspector::new(
            hostname,
            config.dev_root.clone(),
            KernelFiles::new(&config.proc_root, &config.sys_root),
            AplayProbe::new(
                config.aplay.clone(),
                config.random_source.clone(),
                config.playback_timeout,
            ),
            Fallback {
                primary: LsofAttributor::new(config.sudo.clone(), config.lsof.clone()),
                secondary: ProcFdAttributor::new(&config.proc_root),
            },
        )
    }
}

impl<P: PlaybackProbe, A: ProcessAttributor> Inspector<P, A> {
    pub fn new(
        hostname: String,
        dev_root: PathBuf,
        kernel: KernelFiles,
        playback: P,
        attributor: A,
    ) -> Self {
        Self {
            hostname,
            dev_root,
            kernel,
            playback,
            attributor,
        }
    }

    /// Probe every selected `card` line of a device listing, in listing order.
    ///
    /// Lines that don't start with `card` are ignored. Malformed `card` lines are skipped with a
    /// warning. Interfaces outside `selection` are dropped before the playback probe, which
    /// would otherwise grab hardware the caller asked to leave alone.
    pub fn inspect_listing(&self, listing: &str, selection: &Selection) -> Vec<InterfaceRecord> {
        let mut records = vec![];
        for line in listing.lines() {
            if !is_card_line(line) {
                continue;
            }
            let identity = match InterfaceIdentity::from_listing_line(line) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!("skipping malformed device listing line '{line}': {e}");
                    continue;
                }
            };
            let address = identity.hardware_address();
            let label = identity.display_label(&self.hostname);
            if !selection.matches_label(&address, &label) {
                debug!("{address} not selected");
                continue;
            }
            let usb_audio_class = self.kernel.usb_audio_class(identity.card_index);
            if !selection.matches_kind(&classify(&label), &usb_audio_class) {
                debug!("{address} not selected by kind");
                continue;
            }
            records.push(self.inspect_classified(identity, usb_audio_class));
        }
        records
    }

    /// Run every probe against one interface.
    pub fn inspect(&self, identity: InterfaceIdentity) -> InterfaceRecord {
        let usb_audio_class = self.kernel.usb_audio_class(identity.card_index);
        self.inspect_classified(identity, usb_audio_class)
    }

    fn inspect_classified(
        &self,
        identity: InterfaceIdentity,
        usb_audio_class: UsbAudioClass,
    ) -> InterfaceRecord {
        let address = identity.hardware_address();
        let card = identity.card_index;
        let device = identity.device_index;
        debug!("probing {address}");

        let usb_driver_packets = usb_audio_class.is_usb_audio_class().then(|| {
            self.kernel
                .module_parameter(USB_AUDIO_DRIVER, USB_PACKETS_PARAMETER)
        });
        if let Some(packets) = &usb_driver_packets {
            debug!("{address}: {USB_AUDIO_DRIVER} {USB_PACKETS_PARAMETER} = {packets}");
        }

        let character_device_path = identity.character_device_path(&self.dev_root);
        let monitor_path = self.kernel.hw_params_path(card, device);
        let monitor = self.kernel.monitor_state(card, device);
        let sample_formats = self.sample_formats(&address, &character_device_path);

        InterfaceRecord::new(
            identity,
            &self.hostname,
            ProbeResults {
                character_device_path,
                usb_audio_class,
                usb_driver_packets,
                monitor_path,
                monitor,
                sample_formats,
            },
        )
    }

    fn sample_formats(&self, address: &str, device: &Path) -> SampleFormatProbe {
        let stderr = match self.playback.attempt(address) {
            Ok(s) => s,
            Err(e) => {
                warn!("unable to probe sample formats of {address}: {e}");
                return SampleFormatProbe::Failed(e.to_string());
            }
        };
        match parse_playback_diagnostics(&stderr) {
            PlaybackDiagnostics::Formats(formats) => {
                debug!("{address} accepts {}", formats.join(", "));
                SampleFormatProbe::Formats(formats)
            }
            PlaybackDiagnostics::Refused(error) => {
                debug!("{address} refused playback: {error}");
                let owner = self.attributor.attribute(device);
                SampleFormatProbe::InUse { error, owner }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::InterfaceKind;
    use crate::test_util::{CannedPlayback, FixedAttributor};
    use alsacore::electrical::ElectricalInterface;
    use alsacore::monitor::MonitorStatus;
    use alsacore::process::ProcessOwner;
    use alsacore::usb::{UsbAudioClass, UsbSyncMode};
    use std::fs;
    use tempfile::TempDir;

    const LISTING: &str = "\
**** List of PLAYBACK Hardware Devices ****
card 0: PCH [HDA Intel PCH], device 0: ALC892 Analog [ALC892 Analog]
  Subdevices: 1/1
  Subdevice #0: subdevice #0
card 1: DAC [USB Audio DAC], device 0: USB Audio [USB Audio]
  Subdevices: 0/1
  Subdevice #0: subdevice #0
card 2 PCH [HDA Intel PCH], device 3: HDMI 0 [HDMI 0]
";

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn pipewire() -> ProcessOwner {
        ProcessOwner {
            pid: 812,
            command: "pipewire".to_owned(),
        }
    }

    fn fake_system(tmp: &TempDir) -> Inspector<CannedPlayback, FixedAttributor> {
        let root = tmp.path();
        write(root, "proc/asound/card0/pcm0p/sub0/hw_params", "closed\n");
        write(
            root,
            "proc/asound/card1/pcm0p/sub0/hw_params",
            "access: MMAP_INTERLEAVED\nformat: S32_LE\n",
        );
        write(
            root,
            "proc/asound/card1/stream0",
            "Playback:\n    Endpoint: 0x01 (1 OUT) (ASYNC)\n",
        );
        write(root, "sys/module/snd_usb_audio/parameters/nrpacks", "8\n");

        let playback = CannedPlayback::new([
            (
                "hw:0,0",
                "aplay: set_params:1339: Sample format non available\nAvailable formats:\n- S16_LE\n- S32_LE\n",
            ),
            (
                "hw:1,0",
                "aplay: main:831: audio open error: Device or resource busy\n",
            ),
        ]);
        Inspector::new(
            "studio".to_owned(),
            root.join("dev"),
            KernelFiles::new(root.join("proc"), root.join("sys")),
            playback,
            FixedAttributor::new(Some(pipewire())),
        )
    }

    #[test]
    fn listing_produces_records_in_order() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        let records = inspector.inspect_listing(LISTING, &Selection::default());

        assert_eq!(records.len(), 2);
        assert_eq!(inspector.playback.attempts(), ["hw:0,0", "hw:1,0"]);

        let analog = &records[0];
        assert_eq!(analog.hardware_address, "hw:0,0");
        assert_eq!(
            analog.display_label,
            "`ALC892 Analog' output of sound device `HDA Intel PCH' on host `studio'"
        );
        assert_eq!(analog.electrical_interface, ElectricalInterface::Analog);
        assert_eq!(analog.usb_audio_class, UsbAudioClass::NotApplicable);
        assert_eq!(analog.usb_driver_packets, None);
        assert_eq!(analog.monitor.status, MonitorStatus::Closed);
        assert!(analog.monitor.accessible);
        assert_eq!(analog.sample_formats, ["S16_LE", "S32_LE"]);
        assert_eq!(analog.sample_format_error, None);
        assert!(!analog.is_in_use());

        let usb = &records[1];
        assert_eq!(usb.hardware_address, "hw:1,0");
        assert_eq!(
            usb.electrical_interface,
            ElectricalInterface::Digital(Some("USB"))
        );
        assert_eq!(
            usb.usb_audio_class,
            UsbAudioClass::Class(UsbSyncMode::Asynchronous)
        );
        assert_eq!(usb.usb_driver_packets.as_deref(), Some("8"));
        assert_eq!(usb.monitor.status, MonitorStatus::Opened);
        assert_eq!(
            usb.monitor_path,
            tmp.path().join("proc/asound/card1/pcm0p/sub0/hw_params")
        );
        assert_eq!(
            usb.character_device_path,
            tmp.path().join("dev/snd/pcmC1D0p")
        );
        assert!(usb.is_in_use());
        assert_eq!(
            usb.sample_format_error.as_deref(),
            Some("audio open error: Device or resource busy")
        );
        assert_eq!(
            usb.sample_formats,
            ["can't detect, device is in use by process `pipewire' with pid `812'"]
        );
        assert_eq!(inspector.attributor.calls(), 1);
    }

    #[test]
    fn failed_probe_is_recorded_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        // Nothing canned for this address, so the stub reports a timeout
        let records = inspector
            .inspect_listing(
                "card 5: Loopback [Loopback], device 0: Loopback PCM [Loopback PCM]\n",
                &Selection::default(),
            );
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.electrical_interface, ElectricalInterface::Unknown);
        assert!(record.sample_formats.is_empty());
        assert!(
            record
                .sample_format_error
                .as_deref()
                .unwrap()
                .starts_with("playback probe timed out")
        );
        assert_eq!(record.monitor.status, MonitorStatus::Unknown);
        assert!(!record.monitor.accessible);
        assert_eq!(inspector.attributor.calls(), 0);
    }

    #[test]
    fn empty_listing() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        assert!(inspector.inspect_listing("", &Selection::default()).is_empty());
        assert!(
            inspector
                .inspect_listing(
                    "aplay: device_list:274: no soundcards found...\n",
                    &Selection::default()
                )
                .is_empty()
        );
        assert!(inspector.playback.attempts().is_empty());
    }

    #[test]
    fn unselected_address_is_never_played() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        let selection = Selection::new(None, Some("hw:1,0".to_owned()), None);
        let records = inspector.inspect_listing(LISTING, &selection);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hardware_address, "hw:1,0");
        assert_eq!(inspector.playback.attempts(), ["hw:1,0"]);
    }

    #[test]
    fn unselected_label_is_never_played() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);

        let by_substring = Selection::new(None, None, Some("Intel".to_owned()));
        let records = inspector.inspect_listing(LISTING, &by_substring);
        assert_eq!(records.len(), 1);
        assert_eq!(inspector.playback.attempts(), ["hw:0,0"]);

        let by_pattern = Selection::default().with_pattern("^`USB").unwrap();
        let records = inspector.inspect_listing(LISTING, &by_pattern);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hardware_address, "hw:1,0");
        assert_eq!(inspector.playback.attempts(), ["hw:0,0", "hw:1,0"]);
    }

    #[test]
    fn unselected_kind_is_never_played_or_attributed() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        let analog = Selection::new(Some(InterfaceKind::Analog), None, None);
        let records = inspector.inspect_listing(LISTING, &analog);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hardware_address, "hw:0,0");
        assert_eq!(inspector.playback.attempts(), ["hw:0,0"]);
        assert_eq!(inspector.attributor.calls(), 0);
    }

    #[test]
    fn inspect_single_identity() {
        let tmp = TempDir::new().unwrap();
        let inspector = fake_system(&tmp);
        let identity = InterfaceIdentity::from_listing_line(
            "card 1: DAC [USB Audio DAC], device 0: USB Audio [USB Audio]",
        )
        .unwrap();
        let record = inspector.inspect(identity);
        assert!(record.is_usb_audio_class());
        assert_eq!(record.usb_driver_packets.as_deref(), Some("8"));
        assert_eq!(inspector.playback.attempts(), ["hw:1,0"]);
    }

    #[test]
    fn system_inspector_uses_config_paths() {
        let config = InspectorConfig {
            proc_root: PathBuf::from("/tmp/fake-proc"),
            dev_root: PathBuf::from("/tmp/fake-dev"),
            ..Default::default()
        };
        let inspector = SystemInspector::from_config(&config, "box".to_owned());
        assert_eq!(inspector.dev_root, PathBuf::from("/tmp/fake-dev"));
        assert_eq!(
            inspector.kernel.hw_params_path(0, 0),
            PathBuf::from("/tmp/fake-proc/asound/card0/pcm0p/sub0/hw_params")
        );
    }
}
