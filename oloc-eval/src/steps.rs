//! Step recording and deduplication (§4.4). The evaluator hands every
//! re-serialized intermediate form to a `StepManager`; it decides what
//! actually survives into the ordered list a `CalcResult` exposes.

/// A single recorded simplification step: the fully re-serialized expression
/// after one rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub rendering: String,
}

#[derive(Default)]
pub struct StepManager {
    seen: std::collections::HashSet<String>,
    steps: Vec<Step>,
}

impl StepManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step. Exact duplicates of any prior rendering are dropped
    /// outright; among non-duplicates, a step with no "significant
    /// difference" from the immediately preceding one is dropped too — except
    /// the very first and very last steps, which this manager always keeps
    /// (the caller finalizes "last" by calling `force_push` for the final
    /// result).
    pub fn push(&mut self, rendering: impl Into<String>) {
        let rendering = rendering.into();
        if self.seen.contains(&rendering) {
            return;
        }
        if let Some(prev) = self.steps.last() {
            if !significantly_different(&prev.rendering, &rendering) {
                return;
            }
        }
        self.seen.insert(rendering.clone());
        self.steps.push(Step { rendering });
    }

    /// Always keep this step regardless of the significant-difference
    /// filter; used for the final result so the last entry is never dropped.
    pub fn force_push(&mut self, rendering: impl Into<String>) {
        let rendering = rendering.into();
        if self.steps.last().map(|s| s.rendering.as_str()) == Some(rendering.as_str()) {
            return;
        }
        self.seen.insert(rendering.clone());
        self.steps.push(Step { rendering });
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

/// Whether `b` differs "significantly" from `a`: more than two tokens
/// changed in kind/value, or the rendered length differs by more than three
/// characters. A coarse lexical diff is enough here — this gate only decides
/// whether to surface an intermediate step, not to alter the result.
fn significantly_different(a: &str, b: &str) -> bool {
    let len_diff = (a.chars().count() as i64 - b.chars().count() as i64).abs();
    if len_diff > 3 {
        return true;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    let mut diff_count = 0;
    for i in 0..max_len {
        let ca = a_chars.get(i);
        let cb = b_chars.get(i);
        if ca != cb {
            diff_count += 1;
        }
    }
    diff_count > 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_duplicate_is_dropped() {
        let mut m = StepManager::new();
        m.push("1+2");
        m.push("1+2");
        assert_eq!(m.into_steps().len(), 1);
    }

    #[test]
    fn insignificant_change_is_dropped() {
        let mut m = StepManager::new();
        m.push("12345");
        m.push("12346");
        assert_eq!(m.into_steps().len(), 1);
    }

    #[test]
    fn significant_change_is_kept() {
        let mut m = StepManager::new();
        m.push("1+2");
        m.push("99999");
        assert_eq!(m.into_steps().len(), 2);
    }

    #[test]
    fn force_push_always_keeps_final_step() {
        let mut m = StepManager::new();
        m.push("12345");
        m.force_push("12346");
        assert_eq!(m.into_steps().len(), 2);
    }
}
