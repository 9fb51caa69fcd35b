use std::collections::{BTreeMap, BTreeSet};

use crate::prelude::{Component, ConversionError, ConversionResult};

/// Ordered, component-complete list of survey frequencies in Hz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySet {
    frequencies: Vec<u32>,
}

impl FrequencySet {
    /// Builds a set directly; input is sorted and deduplicated.
    pub fn new(frequencies: impl IntoIterator<Item = u32>) -> Self {
        let unique: BTreeSet<u32> = frequencies.into_iter().collect();
        Self {
            frequencies: unique.into_iter().collect(),
        }
    }

    /// Scans channel names such as `XIP_030Hz` and checks that every
    /// component carries every frequency.
    pub fn from_channel_names<I, S>(names: I) -> ConversionResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut per_component: BTreeMap<Component, BTreeSet<u32>> = BTreeMap::new();
        for name in names {
            if let Some((component, frequency)) = parse_channel_name(name.as_ref()) {
                per_component.entry(component).or_default().insert(frequency);
            }
        }

        let all: BTreeSet<u32> = per_component.values().flatten().copied().collect();
        if all.is_empty() {
            return Err(ConversionError::NoFrequencies);
        }

        for component in Component::ALL {
            let present = per_component.get(&component);
            let missing: Vec<u32> = all
                .iter()
                .filter(|freq| present.map_or(true, |set| !set.contains(*freq)))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(ConversionError::FrequencyMismatch { component, missing });
            }
        }

        Ok(Self {
            frequencies: all.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.frequencies
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.frequencies.iter().copied()
    }
}

/// Splits `XIP_030Hz` into its component and frequency.
pub fn parse_channel_name(name: &str) -> Option<(Component, u32)> {
    if name.len() < 6 || !name.is_ascii() || !name.to_ascii_lowercase().ends_with("hz") {
        return None;
    }
    let component = Component::from_code(&name[..3])?;
    let digits = name[3..name.len() - 2].trim_start_matches('_');
    digits.parse().ok().map(|frequency| (component, frequency))
}
