//! Grouping & capping: exchange buckets with fixed cardinality limits.

use std::collections::HashSet;

use crate::config::{LayoutConfig, FALLBACK_GROUP};
use crate::market::{AssetClass, Instrument};

/// Only this asset class is visualized.
pub const ACCEPTED_CLASS: AssetClass = AssetClass::UsEquity;

/// A named bucket of instruments, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub members: Vec<Instrument>,
}

/// Ordered groups produced by [`group_instruments`].
#[derive(Debug, Clone, Default)]
pub struct GroupSet {
    pub groups: Vec<Group>,
}

impl GroupSet {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Total number of placed instruments.
    pub fn instrument_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// False when everything fell into the single fallback bucket, i.e. the
    /// feed carried no usable grouping key at all.
    pub fn has_real_grouping(&self) -> bool {
        match self.groups.as_slice() {
            [] => false,
            [only] => only.name != FALLBACK_GROUP,
            _ => true,
        }
    }
}

/// Partition instruments into capped groups, preserving source order.
///
/// Non-tradable instruments and other asset classes are skipped. A new group
/// key seen after `max_groups` groups exist drops the instrument; members past
/// `max_stocks_per_group` are dropped silently. Repeated symbols keep their
/// first placement.
pub fn group_instruments(instruments: &[Instrument], cfg: &LayoutConfig) -> GroupSet {
    let mut set = GroupSet::default();
    let mut placed: HashSet<&str> = HashSet::new();

    for inst in instruments {
        if !inst.tradable || inst.asset_class != ACCEPTED_CLASS || inst.symbol.trim().is_empty() {
            continue;
        }
        if placed.contains(inst.symbol.as_str()) {
            continue;
        }

        let key = inst.exchange_key().unwrap_or(FALLBACK_GROUP);

        let idx = match set.groups.iter().position(|g| g.name == key) {
            Some(i) => i,
            None => {
                if set.groups.len() >= cfg.max_groups {
                    continue;
                }
                set.groups.push(Group {
                    name: key.to_string(),
                    members: Vec::new(),
                });
                set.groups.len() - 1
            }
        };

        let group = &mut set.groups[idx];
        if group.members.len() < cfg.max_stocks_per_group {
            group.members.push(inst.clone());
            placed.insert(inst.symbol.as_str());
        }
    }

    set
}

/// Symbols that receive a snapshot request: the first `per_group` members of
/// every group, skipping blank and already-selected symbols.
pub fn snapshot_symbols(set: &GroupSet, per_group: usize) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for group in &set.groups {
        let mut taken = 0;
        for inst in &group.members {
            if taken >= per_group {
                break;
            }
            // Same key the layout uses to attach snapshots
            let sym = inst.symbol.as_str();
            if sym.trim().is_empty() || !seen.insert(sym) {
                continue;
            }
            out.push(sym.to_string());
            taken += 1;
        }
    }

    out
}

#[cfg(test)]
pub(crate) fn equity(symbol: &str, exchange: Option<&str>) -> Instrument {
    Instrument {
        symbol: symbol.to_string(),
        display_name: Some(format!("{} Corp", symbol)),
        tradable: true,
        asset_class: AssetClass::UsEquity,
        exchange: exchange.map(str::to_string),
    }
}
