// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The packed version word of a FIL binary.
//!
//! | Bits | Field |
//! |------|-------|
//! | 0..10 | major |
//! | 10..20 | minor |
//! | 20..32 | patch |

use std::fmt;

const MAJOR_BITS: u32 = 10;
const MINOR_BITS: u32 = 10;
const PATCH_BITS: u32 = 12;

const MAJOR_MASK: u32 = (1 << MAJOR_BITS) - 1;
const MINOR_MASK: u32 = (1 << MINOR_BITS) - 1;
const PATCH_MASK: u32 = (1 << PATCH_BITS) - 1;

const MINOR_SHIFT: u32 = MAJOR_BITS;
const PATCH_SHIFT: u32 = MAJOR_BITS + MINOR_BITS;

/// A FIL format version.
///
/// Fields wider than their bit range are truncated when packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    /// The version written by [`encode`](super::encode).
    pub const CURRENT: Self = Self::new(1, 0, 0);

    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Unpacks a version word.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "every field is masked to at most 12 bits"
    )]
    pub const fn from_word(word: u32) -> Self {
        Self {
            major: (word & MAJOR_MASK) as u16,
            minor: ((word >> MINOR_SHIFT) & MINOR_MASK) as u16,
            patch: ((word >> PATCH_SHIFT) & PATCH_MASK) as u16,
        }
    }

    /// Packs this version into a word.
    #[must_use]
    pub const fn to_word(self) -> u32 {
        (self.major as u32 & MAJOR_MASK)
            | ((self.minor as u32 & MINOR_MASK) << MINOR_SHIFT)
            | ((self.patch as u32 & PATCH_MASK) << PATCH_SHIFT)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
