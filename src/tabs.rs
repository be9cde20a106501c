//! Address page tabs and the query-string keys each tab owns.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tab {
    Transactions,
    EcashOutpoints,
    EtokenBalances,
    EtokenOutpoints,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Transactions,
        Tab::EcashOutpoints,
        Tab::EtokenBalances,
        Tab::EtokenOutpoints,
    ];

    /// Value stored in the `currentTab` query parameter.
    pub fn slug(self) -> &'static str {
        match self {
            Tab::Transactions => "transactions",
            Tab::EcashOutpoints => "ecash-outpoints",
            Tab::EtokenBalances => "etoken-balances",
            Tab::EtokenOutpoints => "etoken-outpoints",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Transactions => "Transactions",
            Tab::EcashOutpoints => "eCash Outpoints",
            Tab::EtokenBalances => "eToken Balances",
            Tab::EtokenOutpoints => "eToken Outpoints",
        }
    }

    pub fn page_key(self) -> &'static str {
        match self {
            Tab::Transactions => "txp",
            Tab::EcashOutpoints => "ecop",
            Tab::EtokenBalances => "etbp",
            Tab::EtokenOutpoints => "etop",
        }
    }

    pub fn rows_key(self) -> &'static str {
        match self {
            Tab::Transactions => "txr",
            Tab::EcashOutpoints => "ecor",
            Tab::EtokenBalances => "etbr",
            Tab::EtokenOutpoints => "etor",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl Default for Tab {
    fn default() -> Self {
        Tab::Transactions
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Tab::ALL
            .into_iter()
            .find(|t| t.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown tab '{s}'"))
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
