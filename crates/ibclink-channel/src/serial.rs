use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serialport::{SerialPort, SerialPortType};
use tracing::{debug, info, warn};

use crate::error::{ChannelError, Result};
use crate::io::{ByteChannel, IoChannel};

/// Line rate used by the control-frame peer.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read deadline applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// How to open a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    pub baud_rate: u32,
    /// Read deadline for each blocking read.
    pub timeout: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A serial port exposed as a [`ByteChannel`].
///
/// The port is closed when this value is dropped.
pub struct SerialChannel {
    inner: IoChannel<Box<dyn SerialPort>>,
    config: SerialConfig,
}

impl SerialChannel {
    /// Open and configure the port described by `config`.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|source| ChannelError::Open {
                port: config.port.clone(),
                source,
            })?;

        info!(
            port = %config.port,
            baud_rate = config.baud_rate,
            timeout = ?config.timeout,
            "opened serial port"
        );

        Ok(Self {
            inner: IoChannel::with_timeout(port, config.timeout),
            config,
        })
    }

    /// The configuration this port was opened with.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl ByteChannel for SerialChannel {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.inner.write(bytes)
    }

    /// The configured timeout bounds the whole read. The port's own timeout
    /// is shortened before each inner read and restored afterwards, since
    /// writes use it too.
    fn read(&mut self, n: usize) -> Result<Bytes> {
        let result = self.inner.read_within(n, |port, remaining| {
            port.set_timeout(remaining).map_err(std::io::Error::from)
        });
        if let Err(err) = self.inner.get_mut().set_timeout(self.config.timeout) {
            warn!(port = %self.config.port, error = %err, "failed to restore port timeout");
        }
        result
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("config", &self.config)
            .finish()
    }
}

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub description: String,
}

/// Enumerate the serial ports present on this host.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(ChannelError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports
        .into_iter()
        .map(|port| PortInfo {
            description: describe(&port.port_type),
            name: port.port_name,
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let label = usb
                .product
                .clone()
                .or_else(|| usb.manufacturer.clone())
                .unwrap_or_else(|| "USB serial".to_string());
            format!("{label} ({:04x}:{:04x})", usb.vid, usb.pid)
        }
        SerialPortType::PciPort => "PCI serial".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth serial".to_string(),
        SerialPortType::Unknown => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.timeout, Duration::from_secs(1));
        assert_eq!(cfg.port, "/dev/ttyUSB0");
    }

    #[test]
    fn open_missing_port_reports_open_error() {
        let err = SerialChannel::open(SerialConfig::new("/dev/ibclink-does-not-exist"))
            .unwrap_err();
        assert!(matches!(
            err,
            ChannelError::Open { ref port, .. } if port.ends_with("does-not-exist")
        ));
    }

    #[test]
    fn describe_non_usb_ports() {
        assert_eq!(describe(&SerialPortType::PciPort), "PCI serial");
        assert_eq!(describe(&SerialPortType::Unknown), "n/a");
    }
}
