/// Index bounds of one stack. Slots `base + 1 .. capacity` are usable;
/// the top index sits at `base` when the stack is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackConfig {
    pub base: usize,
    pub capacity: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base: 10,
            capacity: 1000,
        }
    }
}

impl StackConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_stack: StackConfig,
    pub return_stack: StackConfig,
    /// Seed the dictionary with `push4` and `push8`.
    pub prelude: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_stack: StackConfig::default(),
            return_stack: StackConfig::default(),
            prelude: true,
        }
    }
}
