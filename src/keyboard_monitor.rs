use crate::gesture::{KeyCode, Modifiers, RawInputEvent};
use anyhow::{Context, Result};
use evdev::{Device, InputEventKind, Key};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Tracks held modifier keys and turns evdev key transitions into raw events.
///
/// A modifier key transition is reported twice: once as the key event itself
/// and once as a `ModifiersChanged` carrying the new modifier set.
#[derive(Debug, Default)]
pub struct EventTranslator {
    held: HashSet<KeyCode>,
}

impl EventTranslator {
    pub fn modifiers(&self) -> Modifiers {
        self.held
            .iter()
            .filter_map(|key| Modifiers::for_key(*key))
            .fold(Modifiers::empty(), |acc, m| acc | m)
    }

    /// `value` is the evdev key value: 1 press, 0 release, 2 auto-repeat.
    pub fn translate(&mut self, key: KeyCode, value: i32) -> Vec<RawInputEvent> {
        let pressed = match value {
            1 => true,
            0 => false,
            _ => return Vec::new(),
        };

        let before = self.modifiers();
        if Modifiers::for_key(key).is_some() {
            if pressed {
                self.held.insert(key);
            } else {
                self.held.remove(&key);
            }
        }
        let modifiers = self.modifiers();

        let mut events = Vec::with_capacity(2);
        events.push(if pressed {
            RawInputEvent::KeyDown { key, modifiers }
        } else {
            RawInputEvent::KeyUp { key, modifiers }
        });
        if modifiers != before {
            events.push(RawInputEvent::ModifiersChanged(modifiers));
        }
        events
    }
}

pub struct KeyboardMonitor {
    device: Device,
    translator: EventTranslator,
}

impl KeyboardMonitor {
    /// Open the given keyboard device, or find one
    pub fn new(device_path: Option<&Path>) -> Result<Self> {
        let device = match device_path {
            Some(path) => Device::open(path)
                .with_context(|| format!("Failed to open keyboard device {}", path.display()))?,
            None => Self::find_keyboard_device().context("Failed to find keyboard device")?,
        };

        info!("Using keyboard device: {:?}", device.name());

        Ok(KeyboardMonitor {
            device,
            translator: EventTranslator::default(),
        })
    }

    /// Find a suitable keyboard device from /dev/input/event*
    fn find_keyboard_device() -> Result<Device> {
        let devices = evdev::enumerate();

        // Look for a device that supports the keys we need
        for (_, device) in devices {
            if let Some(keys) = device.supported_keys() {
                if keys.contains(Key::KEY_LEFTALT)
                    && keys.contains(Key::KEY_TAB)
                    && keys.contains(Key::KEY_LEFTSHIFT)
                {
                    debug!("Found suitable keyboard: {:?}", device.name());
                    return Ok(device);
                }
            }
        }

        anyhow::bail!("No suitable keyboard device found. Make sure you have permission to read /dev/input/event* devices.")
    }

    /// Read keyboard events and send them through the channel.
    /// Blocks; run it on a dedicated thread.
    pub fn monitor_blocking(mut self, tx: mpsc::UnboundedSender<RawInputEvent>) -> Result<()> {
        info!("Starting keyboard monitoring");

        loop {
            let events = match self.device.fetch_events() {
                Ok(events) => events.collect::<Vec<_>>(),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No events available, sleep briefly
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    continue;
                }
                Err(e) => return Err(e).context("Failed to read keyboard events"),
            };

            for event in events {
                let InputEventKind::Key(key) = event.kind() else {
                    continue;
                };

                for raw in self.translator.translate(KeyCode(key.code()), event.value()) {
                    if tx.send(raw).is_err() {
                        warn!("Failed to send key event, receiver dropped");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Check that a keyboard device can be read.
///
/// This is the permission gate for arming the switch engine.
pub fn check_permissions(device_path: Option<&Path>) -> Result<()> {
    let result = match device_path {
        Some(path) => Device::open(path)
            .map(|_| ())
            .with_context(|| format!("Cannot open {}", path.display())),
        None => KeyboardMonitor::find_keyboard_device().map(|_| ()),
    };

    match result {
        Ok(()) => {
            info!("Keyboard device access OK");
            Ok(())
        }
        Err(e) => {
            eprintln!("ERROR: Cannot access keyboard devices.");
            eprintln!("This daemon needs permission to read /dev/input/event* devices.");
            eprintln!("\nTo fix this, add your user to the 'input' group:");
            eprintln!("  sudo usermod -aG input $USER");
            eprintln!("  (then log out and log back in)");
            Err(e)
        }
    }
}
