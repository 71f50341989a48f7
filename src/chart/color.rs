//! Dataset colors
//!
//! Colors only tell bars apart, so the default source is random. Tests and
//! callers wanting stable output plug in a [`Palette`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use serde::{Serialize, Serializer};

/// 24-bit RGB color, displayed as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    pub const MAX: u32 = 0xFF_FFFF;

    /// `None` when `value` does not fit in 24 bits
    pub fn new(value: u32) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Supplies one color per dataset at assembly time
pub trait ColorSource: Send + Sync {
    fn next_color(&self) -> Rgb;
}

/// Independent uniformly random colors
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomColors;

impl ColorSource for RandomColors {
    fn next_color(&self) -> Rgb {
        Rgb(rand::thread_rng().gen_range(0..=Rgb::MAX))
    }
}

/// Cycles through a fixed list of colors
#[derive(Debug, Default)]
pub struct Palette {
    colors: Vec<Rgb>,
    next: AtomicUsize,
}

impl Palette {
    pub fn new(colors: impl IntoIterator<Item = Rgb>) -> Self {
        Self {
            colors: colors.into_iter().collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl ColorSource for Palette {
    fn next_color(&self) -> Rgb {
        if self.colors.is_empty() {
            return Rgb(0);
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.colors.len();
        self.colors[index]
    }
}
