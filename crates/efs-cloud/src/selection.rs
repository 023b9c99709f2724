// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Mount target selection among equally valid candidates

use rand::Rng;

/// Chooses one of `candidates` equally valid entries.
///
/// Implementations must return an index in `0..candidates`; callers never
/// pass zero.
pub trait MountTargetPicker: Send + Sync {
    fn pick(&self, candidates: usize) -> usize;
}

/// Uniform random choice, used to spread mounts across zones
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl MountTargetPicker for RandomPicker {
    fn pick(&self, candidates: usize) -> usize {
        rand::thread_rng().gen_range(0..candidates)
    }
}

/// Always picks the first candidate
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl MountTargetPicker for FirstPicker {
    fn pick(&self, _candidates: usize) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picker_stays_in_range() {
        let picker = RandomPicker;
        for candidates in 1..8 {
            for _ in 0..64 {
                assert!(picker.pick(candidates) < candidates);
            }
        }
    }

    #[test]
    fn test_random_picker_single_candidate() {
        assert_eq!(RandomPicker.pick(1), 0);
    }

    #[test]
    fn test_first_picker() {
        assert_eq!(FirstPicker.pick(5), 0);
    }
}
