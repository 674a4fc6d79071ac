//! Screen identifiers.

use std::fmt;

/// Primary screens, navigable by number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Map, // 1
    Detail, // 2
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 2] = [Self::Map, Self::Detail];

    pub fn number(self) -> u8 {
        match self {
            Self::Map => 1,
            Self::Detail => 2,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Map),
            2 => Some(Self::Detail),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        match self {
            Self::Map => Self::Detail,
            Self::Detail => Self::Map,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Detail => "Site detail",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(3), None);
    }

    #[test]
    fn next_wraps() {
        assert_eq!(ScreenId::Map.next(), ScreenId::Detail);
        assert_eq!(ScreenId::Detail.next(), ScreenId::Map);
    }
}
