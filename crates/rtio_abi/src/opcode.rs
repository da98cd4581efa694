// rtio_abi/src/opcode.rs
//! Operation codes for submission requests

/// Operation codes
///
/// Device endpoints interpret `Read`/`Write` against their own hardware.
/// `Nop` and `Callback` may also run inside the executor when a request
/// names no device endpoint.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// No operation
    Nop = 0,
    /// Read from the device into a buffer
    Read = 1,
    /// Write a buffer to the device
    Write = 2,
    /// Invoke a function in the executor's context
    Callback = 3,
}

impl OpCode {
    /// Convert from raw u8 value
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Nop),
            1 => Some(Self::Read),
            2 => Some(Self::Write),
            3 => Some(Self::Callback),
            _ => None,
        }
    }

    /// Operation name for diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Read => "read",
            Self::Write => "write",
            Self::Callback => "callback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Nop));
        assert_eq!(OpCode::from_u8(3), Some(OpCode::Callback));
        assert_eq!(OpCode::from_u8(4), None);
        assert_eq!(OpCode::from_u8(OpCode::Write as u8), Some(OpCode::Write));
    }
}
