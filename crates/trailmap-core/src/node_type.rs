use serde::{Deserialize, Serialize};

/// Bundling hints used when a group of nodes is laid out around the active node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleInfo {
    pub is_active: bool,
    pub is_defined: bool,
    pub layout_vertical: bool,
    pub is_referenced: bool,
    pub is_referencing: bool,
}

impl BundleInfo {
    /// Majority vote over a set of bundle infos.
    ///
    /// A flag is set when at least half (rounded up) of the inputs set it. An empty
    /// input yields the default info.
    pub fn average<'a, I>(infos: I) -> BundleInfo
    where
        I: IntoIterator<Item = &'a BundleInfo>,
    {
        let mut total = 0usize;
        let mut counts = [0usize; 5];
        for info in infos {
            total += 1;
            let flags = [
                info.is_active,
                info.is_defined,
                info.layout_vertical,
                info.is_referenced,
                info.is_referencing,
            ];
            for (count, flag) in counts.iter_mut().zip(flags) {
                if flag {
                    *count += 1;
                }
            }
        }

        if total == 0 {
            return BundleInfo::default();
        }

        let threshold = total.div_ceil(2);
        BundleInfo {
            is_active: counts[0] >= threshold,
            is_defined: counts[1] >= threshold,
            layout_vertical: counts[2] >= threshold,
            is_referenced: counts[3] >= threshold,
            is_referencing: counts[4] >= threshold,
        }
    }
}
