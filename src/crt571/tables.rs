//! Human-readable names for CRT-571 codes.
//!
//! Presentation data only; nothing in the exchange depends on these.

use super::types::*;

/// Name of a command byte.
pub fn command_name(cm: u8) -> Option<&'static str> {
    let name = match cm {
        CM_INITIALIZE => "Initialize CRT-571",
        CM_STATUS_REQUEST => "Inquire status",
        CM_CARD_MOVE => "Card movement",
        CM_CARD_ENTRY => "Card entry from output gate",
        CM_CARD_TYPE => "IC card/RF card type check",
        CM_CPU_CARD => "CPU card application operation",
        CM_SAM_CARD => "SAM card application operation",
        CM_SLE_CARD => "SLE4442/4428 card control",
        CM_IIC_CARD => "24C01-24C256 card operation",
        CM_RF_CARD => "Mifare standard card type A & B T=CL protocol operation (13.56 MHz)",
        CM_CARD_SERIAL_NUMBER => "Read card serial number",
        CM_READ_CONFIG => "Read card configuration information",
        CM_READ_VERSION => "Read card software version information",
        CM_RECYCLE_BIN_COUNTER => "Recycle bin counter",
        _ => return None,
    };
    Some(name)
}

/// Description of a parameter byte in the context of its command.
pub fn parameter_name(cm: u8, pm: u8) -> Option<&'static str> {
    let name = match (cm, pm) {
        (CM_INITIALIZE, 0x30) => "If card is inside, move card to cardholding position",
        (CM_INITIALIZE, 0x31) => "If card is inside, capture card to error card bin",
        (CM_INITIALIZE, 0x33) => "If card is inside, does not move the card",
        (CM_INITIALIZE, 0x34) => {
            "If card is inside, move card to cardholding position and retract counter will work"
        }
        (CM_INITIALIZE, 0x35) => "If card is inside, capture card to error card bin and retract counter will work",
        (CM_INITIALIZE, 0x37) => "If card is inside, does not move the card and retract counter will work",

        (CM_STATUS_REQUEST, 0x30) => "Report CRT-571 status",
        (CM_STATUS_REQUEST, 0x31) => "Report sensor status",

        (CM_CARD_MOVE, 0x30) => "Move card to card holding position",
        (CM_CARD_MOVE, 0x31) => "Move card to IC card position",
        (CM_CARD_MOVE, 0x32) => "Move card to RF card position",
        (CM_CARD_MOVE, 0x33) => "Move card to error card bin",
        (CM_CARD_MOVE, 0x39) => "Move card to gate",

        (CM_CARD_ENTRY, 0x30) => "Enable card entry from output gate",
        (CM_CARD_ENTRY, 0x31) => "Disable card entry from output gate",

        (CM_CARD_TYPE, 0x30) => "Autocheck IC card type",
        (CM_CARD_TYPE, 0x31) => "Autocheck RF card type",

        (CM_CPU_CARD, 0x30) => "CPU card cold reset",
        (CM_CPU_CARD, 0x31) => "CPU card power down",
        (CM_CPU_CARD, 0x32) => "CPU card status check",
        (CM_CPU_CARD, 0x33) => "T=0 CPU card APDU data exchange",
        (CM_CPU_CARD, 0x34) => "T=1 CPU card APDU data exchange",
        (CM_CPU_CARD, 0x38) => "CPU card hot reset",
        (CM_CPU_CARD, 0x39) => "Auto distinguish T=0/T=1 CPU card APDU data exchange",

        (CM_SAM_CARD, 0x30) => "SAM card cold reset",
        (CM_SAM_CARD, 0x31) => "SAM card power down",
        (CM_SAM_CARD, 0x32) => "SAM card status check",
        (CM_SAM_CARD, 0x33) => "T=0 SAM card APDU data exchange",
        (CM_SAM_CARD, 0x34) => "T=1 SAM card APDU data exchange",
        (CM_SAM_CARD, 0x38) => "SAM card hot reset",
        (CM_SAM_CARD, 0x39) => "Auto distinguish T=0/T=1 SAM card APDU data exchange",
        (CM_SAM_CARD, 0x40) => "Choose SAM card slot",

        (CM_SLE_CARD, 0x30) => "SLE4442/4428 card reset",
        (CM_SLE_CARD, 0x31) => "SLE4442/4428 card power down",
        (CM_SLE_CARD, 0x32) => "Browse SLE4442/4428 card status",
        (CM_SLE_CARD, 0x33) => "Operate SLE4442 card",
        (CM_SLE_CARD, 0x34) => "Operate SLE4428 card",

        (CM_IIC_CARD, 0x30) => "IIC card reset",
        (CM_IIC_CARD, 0x31) => "IIC card power down",
        (CM_IIC_CARD, 0x32) => "Check IIC card status",
        (CM_IIC_CARD, 0x33) => "Read IIC card",
        (CM_IIC_CARD, 0x34) => "Write IIC card",

        (CM_RF_CARD, 0x30) => "RF card startup",
        (CM_RF_CARD, 0x31) => "RF card power down",
        (CM_RF_CARD, 0x32) => "RF card operation status check",
        (CM_RF_CARD, 0x33) => "Mifare standard card read/write",
        (CM_RF_CARD, 0x34) => "Type A standard T=CL card APDU data exchange",
        (CM_RF_CARD, 0x35) => "Type B standard T=CL card APDU data exchange",
        (CM_RF_CARD, 0x39) => "RF card enable/disable",

        (CM_CARD_SERIAL_NUMBER, PM_READ) => "Read card serial number",
        (CM_READ_CONFIG, PM_READ) => "Read card configuration information",
        (CM_READ_VERSION, PM_READ) => "Read card software version information",

        (CM_RECYCLE_BIN_COUNTER, 0x30) => "Read number of counter of card error card bin",
        (CM_RECYCLE_BIN_COUNTER, 0x31) => "Initiate card error card bin counter",

        _ => return None,
    };
    Some(name)
}

/// Card position (ST0).
pub fn st0_name(st0: u8) -> Option<&'static str> {
    match st0 {
        ST0_NO_CARD => Some("No Card in CRT-571"),
        ST0_CARD_IN_GATE => Some("One Card in gate"),
        ST0_CARD_ON_POSITION => Some("One Card on RF/IC Card Position"),
        _ => None,
    }
}

/// Stacker fill level (ST1).
pub fn st1_name(st1: u8) -> Option<&'static str> {
    match st1 {
        ST1_STACKER_EMPTY => Some("No Card in stacker"),
        ST1_STACKER_FEW => Some("Few Card in stacker"),
        ST1_STACKER_ENOUGH => Some("Enough Cards in card box"),
        _ => None,
    }
}

/// Error card bin fill level (ST2).
pub fn st2_name(st2: u8) -> Option<&'static str> {
    match st2 {
        ST2_BIN_NOT_FULL => Some("Error card bin not full"),
        ST2_BIN_FULL => Some("Error card bin full"),
        _ => None,
    }
}

/// Message for a two-character device error code.
pub fn error_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "00" => "Reception of Undefined Command",
        "01" => "Command Parameter Error",
        "02" => "Command Sequence Error",
        "03" => "Out of Hardware Support Command",
        "04" => "Command Data Error",
        "05" => "IC Card Contact Not Release",
        "10" => "Card Jam",
        "12" => "Sensor Error",
        "13" => "Too Long-Card",
        "14" => "Too Short-Card",
        "16" => "Card Move Manually",
        "40" => "Move Card When Recycling",
        "41" => "Magnet of IC Card Error",
        "43" => "Disable To Move Card To IC Card Position",
        "45" => "Manually Move Card",
        "50" => "Received Card Counter Overflow",
        "51" => "Motor Error",
        "60" => "Short Circuit of IC Card Supply Power",
        "61" => "Activation of Card False",
        "62" => "Command Out Of IC Card Support",
        "65" => "Disability of IC Card",
        "66" => "Command Out Of IC Current Card Support",
        "67" => "IC Card Transmission Error",
        "68" => "IC Card Transmission Overtime",
        "69" => "CPU/SAM Non-Compliance To EMV Standard",
        "A0" => "Empty-Stacker",
        "A1" => "Full-Stacker",
        "B0" => "Not Reset",
        _ => return None,
    };
    Some(message)
}
