//! GraphQL enum arguments.
//!
//! Each enum serializes as its schema spelling and parses case-insensitively
//! through [`validate_enum`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::{ValidationError, validate_enum};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in schema order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            const WIRE: &'static [&'static str] = &[$($wire),+];

            /// Schema spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// Accepted spellings.
            #[must_use]
            pub const fn allowed() -> &'static [&'static str] {
                Self::WIRE
            }

            /// Parse `value`, naming `field` on failure.
            pub fn parse(value: &str, field: &'static str) -> Result<Self, ValidationError> {
                let canonical = validate_enum(value, Self::WIRE, field)?;
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == canonical)
                    .ok_or_else(|| ValidationError::NotAllowed {
                        field,
                        value: value.to_string(),
                        allowed: Self::WIRE.to_vec(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value, $field)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                Value::String(value.as_str().to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum! {
    /// Whether rankings compare against all rankings or all parses.
    RankingCompareType as "compare" {
        Rankings => "Rankings",
        Parses => "Parses",
    }
}

wire_enum! {
    /// Ranking window: today's board or all-time.
    RankingTimeframe as "timeframe" {
        Today => "Today",
        Historical => "Historical",
    }
}

wire_enum! {
    /// Metric for character rankings.
    CharacterRankingMetricType as "metric" {
        Default => "default",
        Dps => "dps",
        Hps => "hps",
        BossDps => "bossdps",
        PlayerScore => "playerscore",
        PlayerSpeed => "playerspeed",
        TankHps => "tankhps",
    }
}

wire_enum! {
    /// Metric for report (fight) rankings.
    ReportRankingMetricType as "playerMetric" {
        Default => "default",
        Dps => "dps",
        Hps => "hps",
        BossDps => "bossdps",
        PlayerScore => "playerscore",
        PlayerSpeed => "playerspeed",
        TankHps => "tankhps",
    }
}

wire_enum! {
    /// Event category for report event streams.
    EventDataType as "dataType" {
        All => "All",
        Buffs => "Buffs",
        Casts => "Casts",
        CombatantInfo => "CombatantInfo",
        DamageDone => "DamageDone",
        DamageTaken => "DamageTaken",
        Deaths => "Deaths",
        Debuffs => "Debuffs",
        Dispels => "Dispels",
        Healing => "Healing",
        Interrupts => "Interrupts",
        Resources => "Resources",
        Summons => "Summons",
        Threat => "Threat",
    }
}

wire_enum! {
    /// Data category for report graphs.
    GraphDataType as "dataType" {
        Summary => "Summary",
        Buffs => "Buffs",
        Casts => "Casts",
        DamageDone => "DamageDone",
        DamageTaken => "DamageTaken",
        Deaths => "Deaths",
        Debuffs => "Debuffs",
        Dispels => "Dispels",
        Healing => "Healing",
        Interrupts => "Interrupts",
        Resources => "Resources",
        Summons => "Summons",
        Survivability => "Survivability",
        Threat => "Threat",
    }
}

wire_enum! {
    /// Data category for report tables.
    TableDataType as "dataType" {
        Summary => "Summary",
        Buffs => "Buffs",
        Casts => "Casts",
        DamageDone => "DamageDone",
        DamageTaken => "DamageTaken",
        Deaths => "Deaths",
        Debuffs => "Debuffs",
        Dispels => "Dispels",
        Healing => "Healing",
        Interrupts => "Interrupts",
        Resources => "Resources",
        Summons => "Summons",
        Survivability => "Survivability",
        Threat => "Threat",
    }
}

wire_enum! {
    /// Which side of the fight to report on.
    HostilityType as "hostilityType" {
        Friendlies => "Friendlies",
        Enemies => "Enemies",
    }
}

wire_enum! {
    /// Fight filter by outcome.
    KillType as "killType" {
        All => "All",
        Encounters => "Encounters",
        Kills => "Kills",
        Trash => "Trash",
        Wipes => "Wipes",
    }
}

wire_enum! {
    /// Grouping for graphs and tables.
    ViewType as "viewBy" {
        Default => "Default",
        Ability => "Ability",
        Source => "Source",
        Target => "Target",
    }
}

wire_enum! {
    RoleType as "role" {
        Any => "Any",
        Dps => "DPS",
        Healer => "Healer",
        Tank => "Tank",
    }
}
