//! Serial reception plumbing: the SPSC receive ring, the UART service that
//! owns it, and a simulated port for hosts without hardware.

pub mod ring;
pub mod sim;
pub mod uart;

pub use ring::RxRing;
pub use sim::SimUart;
pub use uart::{UartPort, UartService, UART_RX_RING_CAPACITY};
