use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const NUM_REGISTERS: usize = 5;

/// Configuration registers read by the output stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    EnableOutLow = 0,
    EnableOutHigh = 1,
    EnablePwmLow = 2,
    EnablePwmHigh = 3,
    DutyCycle = 4,
}

impl Register {
    pub const ALL: [Register; NUM_REGISTERS] = [
        Register::EnableOutLow,
        Register::EnableOutHigh,
        Register::EnablePwmLow,
        Register::EnablePwmHigh,
        Register::DutyCycle,
    ];

    /// Decode a link address; anything past the bank is not a register.
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL.get(address as usize).copied()
    }

    pub fn address(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::EnableOutLow => "enableOutLow",
            Register::EnableOutHigh => "enableOutHigh",
            Register::EnablePwmLow => "enablePwmLow",
            Register::EnablePwmHigh => "enablePwmHigh",
            Register::DutyCycle => "dutyCycle",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reg| reg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownRegister(s.to_owned()))
    }
}

/// Register bank state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u8; NUM_REGISTERS],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGISTERS],
        }
    }

    pub fn get(&self, reg: Register) -> u8 {
        self.regs[reg as usize]
    }

    pub fn set(&mut self, reg: Register, value: u8) {
        self.regs[reg as usize] = value;
    }

    /// Register decode: load `payload` into the register selected by
    /// `address`. Returns the register if the address is in range, even when
    /// the stored value does not change.
    pub fn load(&mut self, address: u8, payload: u8) -> Option<Register> {
        let reg = Register::from_address(address)?;
        self.set(reg, payload);
        Some(reg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, u8)> + '_ {
        Register::ALL.into_iter().map(|reg| (reg, self.get(reg)))
    }

    pub fn as_array(&self) -> [u8; NUM_REGISTERS] {
        self.regs
    }

    pub fn clear(&mut self) {
        self.regs = [0; NUM_REGISTERS];
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (reg, value) in self.iter() {
            writeln!(
                f,
                "  [{}] {:<14} = 0x{:02x} (0b{:08b})",
                reg.address(),
                reg.name(),
                value,
                value
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_map_in_order() {
        for (idx, reg) in Register::ALL.into_iter().enumerate() {
            assert_eq!(Register::from_address(idx as u8), Some(reg));
            assert_eq!(reg.address() as usize, idx);
        }
        assert_eq!(Register::from_address(5), None);
        assert_eq!(Register::from_address(0x7F), None);
    }

    #[test]
    fn load_ignores_out_of_range() {
        let mut regs = RegisterFile::new();
        assert_eq!(regs.load(5, 0xFF), None);
        assert_eq!(regs, RegisterFile::new());
        assert_eq!(regs.load(4, 0x80), Some(Register::DutyCycle));
        assert_eq!(regs.get(Register::DutyCycle), 0x80);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            "enablePwmLow".parse::<Register>().ok(),
            Some(Register::EnablePwmLow)
        );
        assert_eq!(
            "DUTYCYCLE".parse::<Register>().ok(),
            Some(Register::DutyCycle)
        );
        assert!(matches!(
            "gain".parse::<Register>(),
            Err(Error::UnknownRegister(name)) if name == "gain"
        ));
    }
}
