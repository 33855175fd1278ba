//! Natural ordering of stack names
//!
//! Digit runs compare by numeric value, so `svc2` sorts before `svc10`.
//! Comparison is byte-wise and locale-naive.

use stackls_common::StackRecord;
use std::cmp::Ordering;

/// Compare two strings in natural order
///
/// At the same position a digit sorts before any other byte. Two digit runs
/// compare by value with leading zeros ignored, and on equal value the run
/// with fewer leading zeros comes first. When one string is a prefix of the
/// other the shorter one comes first.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let (a, b) = (left.as_bytes(), right.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match (a[i].is_ascii_digit(), b[j].is_ascii_digit()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {
                if a[i] != b[j] {
                    return a[i].cmp(&b[j]);
                }
                i += 1;
                j += 1;
            }
            (true, true) => {
                let run_a = digit_run(a, i);
                let run_b = digit_run(b, j);

                let ordering = run_a
                    .significant(a)
                    .len()
                    .cmp(&run_b.significant(b).len())
                    .then_with(|| run_a.significant(a).cmp(run_b.significant(b)))
                    .then_with(|| run_a.zeros().cmp(&run_b.zeros()));
                if ordering != Ordering::Equal {
                    return ordering;
                }

                i = run_a.end;
                j = run_b.end;
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

struct DigitRun {
    start: usize,
    significant_start: usize,
    end: usize,
}

impl DigitRun {
    fn significant<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.significant_start..self.end]
    }

    fn zeros(&self) -> usize {
        self.significant_start - self.start
    }
}

fn digit_run(bytes: &[u8], start: usize) -> DigitRun {
    let mut significant_start = start;
    while significant_start < bytes.len() && bytes[significant_start] == b'0' {
        significant_start += 1;
    }

    let mut end = significant_start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    DigitRun {
        start,
        significant_start,
        end,
    }
}

/// Sort stacks by name in natural order, keeping the merge order of equal names
pub fn sort_stacks(stacks: &mut [StackRecord]) {
    stacks.sort_by(|a, b| natural_cmp(&a.name, &b.name));
}
