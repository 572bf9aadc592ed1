//! Debug console command surface.
//!
//! Handlers for the driver-lifecycle and UART debug commands. The command
//! tokenizer and registration framework live outside this core; handlers
//! here receive the raw argument remainder of a line and do their own
//! minimal splitting. Only malformed invocations (missing or unparseable
//! arguments) are errors — an unknown driver name is logged and the command
//! still succeeds, matching the firmware's forgiving console.
//!
//! Hex arguments are decoded leniently: whitespace between byte pairs is
//! skipped, and non-hex characters fold to an unspecified nibble value
//! instead of aborting the command. This is a documented unchecked
//! contract, not an invitation to rely on it.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::registry::{DriverRegistry, StopTarget};
use crate::scheduler::TickScheduler;
use crate::serial::{UartService, UART_RX_RING_CAPACITY};

/// Distinguished results for malformed command invocations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("not enough arguments")]
    NotEnoughArguments,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

/// Source of `$name$` constants for `uartSendHex`.
///
/// The firmware exposes channel values and scripting constants this way;
/// hosts provide whatever table makes sense for them.
pub trait ConstantSource: Send + Sync {
    /// Resolve a constant name to its numeric value.
    fn resolve(&self, name: &str) -> Option<f64>;
}

/// Map-backed [`ConstantSource`].
#[derive(Default)]
pub struct MapConstants(HashMap<String, f64>);

impl MapConstants {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a constant.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }
}

impl ConstantSource for MapConstants {
    fn resolve(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }
}

/// Console context: the handlers plus everything they act on.
pub struct Console {
    registry: Arc<DriverRegistry>,
    scheduler: TickScheduler,
    uart: Arc<UartService>,
    constants: Box<dyn ConstantSource>,
}

impl Console {
    /// Build a console over the given runtime objects.
    pub fn new(
        registry: Arc<DriverRegistry>,
        uart: Arc<UartService>,
        constants: Box<dyn ConstantSource>,
    ) -> Self {
        let scheduler = TickScheduler::new(Arc::clone(&registry));
        Self {
            registry,
            scheduler,
            uart,
            constants,
        }
    }

    /// `startDriver <name>` — requires exactly one argument.
    ///
    /// Unknown names are logged by the registry but still count as a
    /// successful command.
    pub fn start_driver(&self, args: &str) -> Result<(), CommandError> {
        let name = first_token(args).ok_or(CommandError::NotEnoughArguments)?;
        self.registry.start(name);
        Ok(())
    }

    /// `stopDriver <name-or-*>` — `*` means every loaded driver.
    pub fn stop_driver(&self, args: &str) -> Result<(), CommandError> {
        let name = first_token(args).ok_or(CommandError::NotEnoughArguments)?;
        let target = if name.starts_with('*') {
            StopTarget::AllLoaded
        } else {
            StopTarget::Named(name)
        };
        self.registry.stop(target);
        Ok(())
    }

    /// `uartInit <baud>` — (re)configures the transport, marks manual debug
    /// mode, and resets the receive ring to its fixed 512-byte capacity.
    pub fn uart_init(&self, args: &str) -> Result<(), CommandError> {
        let token = first_token(args).ok_or(CommandError::NotEnoughArguments)?;
        let baud = parse_integer(token)
            .ok_or_else(|| CommandError::InvalidArgument(token.to_string()))?;
        if let Err(err) = self.uart.reconfigure(baud) {
            // Port trouble degrades the command, never the process.
            warn!(%err, "uartInit: port configuration failed");
            return Ok(());
        }
        self.uart.mark_manual_init();
        self.uart.init_rx_ring(UART_RX_RING_CAPACITY);
        Ok(())
    }

    /// `uartSendHex <hex-or-$const$ tokens>` — transmits raw bytes.
    ///
    /// `$name$` spans resolve through the constant table and emit the value
    /// as a single byte between the surrounding hex bytes.
    pub fn uart_send_hex(&self, args: &str) -> Result<(), CommandError> {
        if args.trim().is_empty() {
            info!("uartSendHex: requires 1 argument (hex string, like FFAABB00CCDD)");
            return Err(CommandError::NotEnoughArguments);
        }
        for byte in decode_hex_stream(args, Some(self.constants.as_ref())) {
            self.uart.send_byte(byte);
        }
        Ok(())
    }

    /// `uartSendASCII <text>` — transmits the remainder verbatim, one byte
    /// per character.
    pub fn uart_send_ascii(&self, args: &str) -> Result<(), CommandError> {
        if args.is_empty() {
            info!("uartSendASCII: requires 1 argument (text)");
            return Err(CommandError::NotEnoughArguments);
        }
        self.uart.send(args.as_bytes());
        Ok(())
    }

    /// `uartFakeHex <hex>` — injects bytes into the receive ring as if the
    /// hardware had received them. Reception-path testing without a wire.
    pub fn uart_fake_hex(&self, args: &str) -> Result<(), CommandError> {
        if args.trim().is_empty() {
            info!("uartFakeHex: requires 1 argument (hex string, like FFAABB00CCDD)");
            return Err(CommandError::NotEnoughArguments);
        }
        for byte in decode_hex_stream(args, None) {
            self.uart.feed_byte(byte);
        }
        Ok(())
    }

    /// `setChannel <channel> <value>` — host glue feeding the channel layer
    /// into the channel-changed dispatch.
    pub fn set_channel(&self, args: &str) -> Result<(), CommandError> {
        let mut tokens = args.split_whitespace();
        let channel = tokens.next().ok_or(CommandError::NotEnoughArguments)?;
        let value = tokens.next().ok_or(CommandError::NotEnoughArguments)?;
        let channel: i32 = channel
            .parse()
            .map_err(|_| CommandError::InvalidArgument(channel.to_string()))?;
        let value: i32 = value
            .parse()
            .map_err(|_| CommandError::InvalidArgument(value.to_string()))?;
        self.scheduler.channel_changed(channel, value);
        Ok(())
    }

    /// Dispatch one console line: case-insensitive command word, remainder
    /// passed through to the handler untouched.
    pub fn dispatch(&self, line: &str) -> Result<(), CommandError> {
        let line = line.trim_start();
        if line.is_empty() {
            return Ok(());
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "startdriver" => self.start_driver(rest),
            "stopdriver" => self.stop_driver(rest),
            "uartinit" => self.uart_init(rest),
            "uartsendhex" => self.uart_send_hex(rest),
            "uartsendascii" => self.uart_send_ascii(rest),
            "uartfakehex" => self.uart_fake_hex(rest),
            "setchannel" => self.set_channel(rest),
            _ => Err(CommandError::UnknownCommand(word.to_string())),
        }
    }
}

/// First whitespace-delimited token, if any.
fn first_token(args: &str) -> Option<&str> {
    args.split_whitespace().next()
}

/// Integer parse accepting decimal or `0x` hex, the forms the firmware
/// tokenizer takes.
fn parse_integer(token: &str) -> Option<u32> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

/// One hex nibble, leniently.
///
/// Non-hex input is not rejected; it folds to an unspecified nibble value,
/// matching the console's documented unchecked contract.
fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        other => other & 0x0f,
    }
}

/// Decode a hex stream with optional `$const$` expansion.
///
/// Whitespace between byte pairs is skipped. An odd trailing digit reads a
/// zero low nibble. With `constants` supplied, a `$name$` span emits the
/// resolved value as one byte; unresolvable names emit 0 with a warning
/// (the defined stand-in for the firmware's undefined read).
fn decode_hex_stream(input: &str, constants: Option<&dyn ConstantSource>) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c == b'$' {
            if let Some(source) = constants {
                let end = bytes[i + 1..]
                    .iter()
                    .position(|&b| b == b'$')
                    .map(|p| i + 1 + p);
                let name_end = end.unwrap_or(bytes.len());
                let name = &input[i + 1..name_end];
                let value = source.resolve(name).unwrap_or_else(|| {
                    warn!(constant = name, "unknown constant, sending 0");
                    0.0
                });
                out.push(value as i64 as u8);
                match end {
                    Some(close) => {
                        i = close + 1;
                        continue;
                    }
                    // Unterminated span: consume the rest of the line.
                    None => break,
                }
            }
            // No constant table on this path; fall through to the lenient
            // nibble fold like any other non-hex character.
        }
        let hi = hex_nibble(c);
        let lo = bytes.get(i + 1).map(|&b| hex_nibble(b)).unwrap_or(0);
        out.push((hi << 4) | lo);
        i += 2;
    }
    out
}
