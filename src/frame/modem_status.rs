//! `MODEM_STATUS` (0x8A): unsolicited local-modem state transitions.

use crate::error::XBeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemStatus {
    HardwareReset,
    WatchdogTimerReset,
    Joined,
    Disassociated,
    CoordinatorStarted,
    NetworkSecurityKeyUpdated,
    NetworkWokeUp,
    NetworkWentToSleep,
    VoltageSupplyLimitExceeded,
    ModemConfigurationChanged,
    Unknown(u8),
}

impl From<u8> for ModemStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => ModemStatus::HardwareReset,
            0x01 => ModemStatus::WatchdogTimerReset,
            0x02 => ModemStatus::Joined,
            0x03 => ModemStatus::Disassociated,
            0x06 => ModemStatus::CoordinatorStarted,
            0x07 => ModemStatus::NetworkSecurityKeyUpdated,
            0x0B => ModemStatus::NetworkWokeUp,
            0x0C => ModemStatus::NetworkWentToSleep,
            0x0D => ModemStatus::VoltageSupplyLimitExceeded,
            0x12 => ModemStatus::ModemConfigurationChanged,
            other => ModemStatus::Unknown(other),
        }
    }
}

impl From<ModemStatus> for u8 {
    fn from(status: ModemStatus) -> u8 {
        match status {
            ModemStatus::HardwareReset => 0x00,
            ModemStatus::WatchdogTimerReset => 0x01,
            ModemStatus::Joined => 0x02,
            ModemStatus::Disassociated => 0x03,
            ModemStatus::CoordinatorStarted => 0x06,
            ModemStatus::NetworkSecurityKeyUpdated => 0x07,
            ModemStatus::NetworkWokeUp => 0x0B,
            ModemStatus::NetworkWentToSleep => 0x0C,
            ModemStatus::VoltageSupplyLimitExceeded => 0x0D,
            ModemStatus::ModemConfigurationChanged => 0x12,
            ModemStatus::Unknown(byte) => byte,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemStatusFrame {
    pub status: ModemStatus,
}

impl ModemStatusFrame {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        let byte = *body.first().ok_or_else(|| XBeeError::Decode {
            frame_type: 0x8A,
            reason: "MODEM_STATUS body is empty".into(),
        })?;
        Ok(Self {
            status: ModemStatus::from(byte),
        })
    }

    pub fn encode(&self) -> [u8; 1] {
        [self.status.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_round_trips() {
        let frame = ModemStatusFrame {
            status: ModemStatus::Joined,
        };
        assert_eq!(ModemStatusFrame::decode(&frame.encode()).unwrap(), frame);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let frame = ModemStatusFrame::decode(&[0x55]).unwrap();
        assert_eq!(frame.status, ModemStatus::Unknown(0x55));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(ModemStatusFrame::decode(&[]).is_err());
    }
}
