//! CRT-571 wire constants and command/parameter codes.

/// Largest counted region (the LEN field) of any frame, in bytes.
pub const MAX_FRAME_LEN: usize = 1024;

// Transport markers
pub const STX: u8 = 0xF2;
pub const ETX: u8 = 0x03;
pub const CMT: u8 = 0x43;
pub const PMT: u8 = 0x50;
pub const EMT: u8 = 0x45;
/// Alternate negative-reply marker seen on some firmware revisions.
pub const EMT_ALT: u8 = 0x4E;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
/// Clears the line.
pub const EOT: u8 = 0x04;

/// Bytes in front of the counted region: STX, ADDR, LEN(2).
pub(crate) const HEADER_SIZE: usize = 4;
/// Bytes after the counted region: ETX, BCC.
pub(crate) const TRAILER_SIZE: usize = 2;
/// CMT, CM, PM.
pub(crate) const REQUEST_FIXED: usize = 3;
/// PMT, CM, PM, ST0, ST1, ST2.
pub(crate) const POSITIVE_FIXED: usize = 6;
/// EMT, CM, E1, E0, PM.
pub(crate) const NEGATIVE_FIXED: usize = 5;
/// Largest payload that still fits in a request frame.
pub const MAX_REQUEST_PAYLOAD: usize = MAX_FRAME_LEN - REQUEST_FIXED;
/// Largest frame on the wire, header and trailer included.
pub const MAX_WIRE_LEN: usize = HEADER_SIZE + MAX_FRAME_LEN + TRAILER_SIZE;

// Command codes (CM)
pub const CM_INITIALIZE: u8 = 0x30;
pub const CM_STATUS_REQUEST: u8 = 0x31;
pub const CM_CARD_MOVE: u8 = 0x32;
pub const CM_CARD_ENTRY: u8 = 0x33;
pub const CM_CARD_TYPE: u8 = 0x50;
pub const CM_CPU_CARD: u8 = 0x51;
pub const CM_SAM_CARD: u8 = 0x52;
pub const CM_SLE_CARD: u8 = 0x53;
pub const CM_IIC_CARD: u8 = 0x54;
pub const CM_RF_CARD: u8 = 0x60;
pub const CM_CARD_SERIAL_NUMBER: u8 = 0xA2;
pub const CM_READ_CONFIG: u8 = 0xA3;
pub const CM_READ_VERSION: u8 = 0xA4;
pub const CM_RECYCLE_BIN_COUNTER: u8 = 0xA5;

// Card status codes
pub const ST0_NO_CARD: u8 = 0x30;
pub const ST0_CARD_IN_GATE: u8 = 0x31;
pub const ST0_CARD_ON_POSITION: u8 = 0x32;

pub const ST1_STACKER_EMPTY: u8 = 0x30;
pub const ST1_STACKER_FEW: u8 = 0x31;
pub const ST1_STACKER_ENOUGH: u8 = 0x32;

pub const ST2_BIN_NOT_FULL: u8 = 0x30;
pub const ST2_BIN_FULL: u8 = 0x31;

/// Generates a parameter enum whose discriminants are the PM bytes.
macro_rules! parameter_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:expr,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Parameter byte sent on the wire.
            pub fn pm(self) -> u8 {
                self as u8
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.pm()
            }
        }
    };
}

parameter_enum! {
    /// What `initialize` does with a card left inside the machine.
    InitMode {
        MoveToHold = 0x30,
        Capture = 0x31,
        NoMove = 0x33,
        MoveToHoldCounted = 0x34,
        CaptureCounted = 0x35,
        NoMoveCounted = 0x37,
    }
}

parameter_enum! {
    StatusKind {
        Device = 0x30,
        Sensor = 0x31,
    }
}

parameter_enum! {
    /// Card move destinations.
    MovePosition {
        Hold = 0x30,
        IcPosition = 0x31,
        RfPosition = 0x32,
        ErrorBin = 0x33,
        Gate = 0x39,
    }
}

parameter_enum! {
    /// Card entry from the output gate.
    CardEntry {
        Enable = 0x30,
        Disable = 0x31,
    }
}

parameter_enum! {
    CardTypeCheck {
        Ic = 0x30,
        Rf = 0x31,
    }
}

parameter_enum! {
    /// Contact CPU card operations.
    CpuCardOp {
        ColdReset = 0x30,
        PowerDown = 0x31,
        StatusCheck = 0x32,
        T0Apdu = 0x33,
        T1Apdu = 0x34,
        HotReset = 0x38,
        AutoApdu = 0x39,
    }
}

parameter_enum! {
    SamCardOp {
        ColdReset = 0x30,
        PowerDown = 0x31,
        StatusCheck = 0x32,
        T0Apdu = 0x33,
        T1Apdu = 0x34,
        HotReset = 0x38,
        AutoApdu = 0x39,
        /// Select the SAM slot.
        SelectSlot = 0x40,
    }
}

parameter_enum! {
    SleCardOp {
        Reset = 0x30,
        PowerDown = 0x31,
        Status = 0x32,
        OperateSle4442 = 0x33,
        OperateSle4428 = 0x34,
    }
}

parameter_enum! {
    /// 24C01..24C256 memory card operations.
    IicCardOp {
        Reset = 0x30,
        PowerDown = 0x31,
        Status = 0x32,
        Read = 0x33,
        Write = 0x34,
    }
}

parameter_enum! {
    /// Mifare / type A & B T=CL operations (13.56 MHz).
    RfCardOp {
        Startup = 0x30,
        PowerDown = 0x31,
        Status = 0x32,
        MifareReadWrite = 0x33,
        TypeAApdu = 0x34,
        TypeBApdu = 0x35,
        EnableDisable = 0x39,
    }
}

parameter_enum! {
    BinCounterOp {
        Read = 0x30,
        Reset = 0x31,
    }
}

/// PM byte for the single-parameter read commands (serial number, config, version).
pub const PM_READ: u8 = 0x30;
