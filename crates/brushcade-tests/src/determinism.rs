//! Byte-level determinism checks.

use std::fmt;

/// Result of running a generator several times.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    pub runs: usize,
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    pub diff_info: Option<DiffInfo>,
}

/// First byte where two runs disagree.
#[derive(Debug, Clone)]
pub struct DiffInfo {
    pub offset: usize,
    /// Byte from the first run, if it is that long.
    pub expected: Option<u8>,
    /// Byte from the differing run, if it is that long.
    pub actual: Option<u8>,
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |b: Option<u8>| b.map_or("EOF".to_string(), |b| format!("0x{:02X}", b));
        write!(
            f,
            "difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            show(self.expected),
            show(self.actual),
            self.run_index
        )
    }
}

impl DeterminismResult {
    /// Panic with the first difference if the runs disagreed.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "non-deterministic output over {} runs ({} bytes, hash {}): {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

/// BLAKE3 hex digest.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Run `generate_fn` `runs` times and compare every output with the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = generate_fn();
        let output = output.as_ref();
        if output == reference {
            continue;
        }

        let offset = reference
            .iter()
            .zip(output)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| reference.len().min(output.len()));
        return DeterminismResult {
            is_deterministic: false,
            runs,
            output_size: reference.len(),
            hash,
            diff_info: Some(DiffInfo {
                offset,
                expected: reference.get(offset).copied(),
                actual: output.get(offset).copied(),
                run_index,
            }),
        };
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_identical_runs() {
        let result = verify_determinism(|| vec![1u8, 2, 3], 3);
        assert!(result.is_deterministic);
        assert_eq!(result.output_size, 3);
        result.assert_deterministic();
    }

    #[test]
    fn test_reports_first_difference() {
        let counter = Cell::new(0u8);
        let result = verify_determinism(
            || {
                counter.set(counter.get() + 1);
                vec![7, 7, counter.get()]
            },
            2,
        );
        assert!(!result.is_deterministic);
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 2);
        assert_eq!((diff.expected, diff.actual), (Some(1), Some(2)));
    }

    #[test]
    fn test_length_difference() {
        let counter = Cell::new(1usize);
        let result = verify_determinism(
            || {
                counter.set(counter.get() + 1);
                vec![0u8; counter.get()]
            },
            2,
        );
        let diff = result.diff_info.unwrap();
        assert_eq!(diff.offset, 2);
        assert_eq!(diff.actual, Some(0));
        assert_eq!(diff.expected, None);
    }
}
