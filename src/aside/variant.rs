use std::fmt;
use std::str::FromStr;

/// The logical sub-caches sharing one fingerprint.
///
/// Each variant owns a key prefix so the same request key can hold an
/// independent result per variant in both tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Arbitrary payload stored under the bare fingerprint
    Raw,
    List,
    Count,
    ComputedInt,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Raw,
        Variant::List,
        Variant::Count,
        Variant::ComputedInt,
    ];

    /// Key prefix as laid out in the remote store.
    pub fn prefix(self) -> &'static str {
        match self {
            Variant::Raw => "",
            Variant::List => "c_list_",
            Variant::Count => "c_count_",
            Variant::ComputedInt => "c_calc_int_",
        }
    }

    pub fn logical_key(self, fingerprint: &str) -> String {
        format!("{}{}", self.prefix(), fingerprint)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Raw => "raw",
            Variant::List => "list",
            Variant::Count => "count",
            Variant::ComputedInt => "computed-int",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown variant '{s}' (expected raw, list, count or computed-int)"))
    }
}
