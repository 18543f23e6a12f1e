use std::fmt;


pub const REGISTER_COUNT: usize = 8;


macro_rules! declare_registers {
    ($($name:ident $repr:ident),+) => {

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Registers {
    $($name),+
}

impl Registers {

    /// Return the register named by `name`, or `None` if `name` doesn't
    /// name one of the eight general-purpose registers.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            $(stringify!($repr) => Self::$name,)+
            _ => return None
        })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            $(Self::$name => stringify!($repr)),+
        }
    }

    pub const fn number(&self) -> u8 {
        *self as u8
    }

}

    };
}

declare_registers! {
    R0 r0,
    R1 r1,
    R2 r2,
    R3 r3,
    R4 r4,
    R5 r5,
    R6 r6,
    R7 r7
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_register_name() {
        for n in 0..REGISTER_COUNT {
            let name = format!("r{n}");
            let reg = Registers::from_name(&name).unwrap_or_else(|| panic!("{name} should be a valid register"));
            assert_eq!(reg.number() as usize, n);
            assert_eq!(reg.name(), name);
        }
    }

    #[test]
    fn rejects_non_register_names() {
        assert!(Registers::from_name("r8").is_none());
        assert!(Registers::from_name("ra").is_none());
        assert!(Registers::from_name("LOOP").is_none());
    }
}
