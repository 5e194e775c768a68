//! Machine identity for host-bound licenses.
//!
//! A [`MachineId`] is a stable UUID-formatted identifier for this host. Its
//! string form is what issuers write into a license's `binding` and what
//! callers pass to verification as the host binding.

use crate::error::{LicenseError, LicenseResult};
use sha2::{Digest, Sha256};
use std::env;
use std::fmt;
use std::path::Path;
use uuid::{Builder, Uuid};

/// A stable identifier of the current machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineId {
    id: Uuid,
}

impl MachineId {
    /// Derives the identifier of the current machine.
    ///
    /// Uses the platform machine-id when there is one, otherwise a hash of
    /// OS, architecture, hostname and user.
    #[must_use]
    pub fn current() -> Self {
        match platform_machine_id() {
            Some(raw) => Self::from_machine_id(&raw).unwrap_or_else(|_| Self::from_text(&raw)),
            None => Self::from_text(&fallback_ids().join("|")),
        }
    }

    /// Reads a systemd-style machine-id file (32 hex digits).
    pub fn from_path(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LicenseError::MachineId(format!("{}: {e}", path.display())))?;
        Self::from_machine_id(&content)
    }

    /// Converts a hex machine-id into a UUID.
    ///
    /// The first 16 bytes become a version 4 UUID, so
    /// `000102030405060708090a0b0c0d0e0f` yields
    /// `00010203-0405-4607-8809-0a0b0c0d0e0f`.
    pub fn from_machine_id(text: &str) -> LicenseResult<Self> {
        let hex: String = text
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .collect();
        if hex.len() < 32 || !hex.is_ascii() {
            return Err(LicenseError::MachineId(format!(
                "machine id {:?} is shorter than 16 bytes",
                text.trim()
            )));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| {
                LicenseError::MachineId(format!("machine id {:?} is not hex", text.trim()))
            })?;
        }
        Ok(Self {
            id: Builder::from_random_bytes(bytes).into_uuid(),
        })
    }

    fn from_text(text: &str) -> Self {
        let hash = Sha256::digest(text.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self {
            id: Builder::from_random_bytes(bytes).into_uuid(),
        }
    }

    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.id
    }

    /// Hyphenated lowercase form, as written into `binding`.
    #[must_use]
    pub fn id(&self) -> String {
        self.id.hyphenated().to_string()
    }

    /// True if `binding` names this machine.
    #[must_use]
    pub fn matches(&self, binding: &str) -> bool {
        Uuid::parse_str(binding.trim()).is_ok_and(|u| u == self.id)
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.hyphenated())
    }
}

fn fallback_ids() -> Vec<String> {
    let mut ids = vec![
        env::consts::OS.to_string(),
        env::consts::ARCH.to_string(),
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string()),
    ];
    if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        ids.push(user);
    }
    ids
}

fn platform_machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        ["/etc/machine-id", "/var/lib/dbus/machine-id"]
            .iter()
            .find_map(|p| std::fs::read_to_string(p).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
