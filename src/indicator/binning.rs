//! Derives an ordinal categorical variable from how many member flags each observation sets,
//! e.g. how many eye products a post mentions binned into "none" / "some" / "lots".

use crate::error::{McaError, Result};

#[derive(Debug, Clone, Default)]
pub struct CountBins {
    bins: Vec<(usize, String)>,
}

impl CountBins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations with at least `min_count` set flags (and fewer than the next bin's
    /// threshold) get `label`. Bins must be added in strictly ascending order, starting at 0.
    pub fn bin(mut self, min_count: usize, label: impl Into<String>) -> Self {
        self.bins.push((min_count, label.into()));
        self
    }

    fn check(&self) -> Result<()> {
        match self.bins.first() {
            None => return Err(McaError::InvalidTable("no count bins defined".into())),
            Some((min, label)) if *min != 0 => {
                return Err(McaError::InvalidTable(format!(
                    "first bin '{}' starts at {}, counts of 0 would be unlabelled",
                    label, min
                )))
            }
            _ => {}
        }
        if let Some(pair) = self.bins.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(McaError::InvalidTable(format!(
                "bin '{}' ({}) does not follow '{}' ({})",
                pair[1].1, pair[1].0, pair[0].1, pair[0].0
            )));
        }
        Ok(())
    }

    /// Labels each observation. `members` holds one flag column per member variable.
    pub fn classify(&self, members: &[Vec<bool>]) -> Result<Vec<String>> {
        self.check()?;
        let n_rows = match members.first() {
            Some(flags) => flags.len(),
            None => return Err(McaError::InvalidTable("no member variables given".into())),
        };
        if let Some(idx) = members.iter().position(|flags| flags.len() != n_rows) {
            return Err(McaError::InvalidTable(format!(
                "member {} has {} observations, expected {}",
                idx,
                members[idx].len(),
                n_rows
            )));
        }

        let mut labels = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            let count = members.iter().filter(|flags| flags[i]).count();
            // The first bin starts at 0, so some bin always matches.
            let label = self
                .bins
                .iter()
                .rev()
                .find(|(min, _)| *min <= count)
                .map(|(_, label)| label.clone())
                .unwrap_or_default();
            labels.push(label);
        }
        Ok(labels)
    }
}
