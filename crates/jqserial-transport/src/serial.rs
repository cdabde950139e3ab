use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Factory default UART speed of the JQ8400 modules.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Upper bound on a single blocking read. Reads are only issued after
/// `available()` reported data, so this only matters if the driver lies.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// A serial port transport (8N1, no flow control).
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open `path` at `baud_rate`, 8 data bits, no parity, one stop bit.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: path.to_string(),
                source,
            })?;
        info!(port = path, baud_rate, "serial port opened");
        Ok(Self::from_port(port))
    }

    /// Wrap an already-configured port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        let name = port.name().unwrap_or_else(|| "<unnamed>".to_string());
        Self { port, name }
    }

    /// Device path of the underlying port.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current line speed as reported by the driver.
    pub fn baud_rate(&self) -> Result<u32> {
        Ok(self.port.baud_rate()?)
    }

    /// Borrow the underlying port.
    pub fn get_ref(&self) -> &dyn SerialPort {
        self.port.as_ref()
    }

    /// Consume the transport and return the inner port.
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, byte: u8) -> Result<()> {
        self.write_all(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.port.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.port.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(_) => return Ok(byte[0]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.name)
            .finish()
    }
}

/// A serial port discovered on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path or COM name.
    pub name: String,
    /// Bus type: `usb`, `pci`, `bluetooth` or `unknown`.
    pub kind: &'static str,
    /// Manufacturer/product string for USB adapters.
    pub description: Option<String>,
}

/// Enumerate serial ports visible to this process.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, description) = match port.port_type {
                SerialPortType::UsbPort(usb) => {
                    let label = [usb.manufacturer, usb.product]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    let label = if label.is_empty() {
                        format!("{:04x}:{:04x}", usb.vid, usb.pid)
                    } else {
                        format!("{label} ({:04x}:{:04x})", usb.vid, usb.pid)
                    };
                    ("usb", Some(label))
                }
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: port.port_name,
                kind,
                description,
            }
        })
        .collect())
}
