/// Size and depth ceilings the Validator enforces (spec.md §4.6). All
/// values are fixed by the specification; there is no operator override.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_body_bytes: usize,
    pub max_depth: usize,
    pub max_string_bytes: usize,
    pub max_array_len: usize,
    pub max_params_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
            max_depth: 10,
            max_string_bytes: 100 * 1024,
            max_array_len: 10_000,
            max_params_bytes: 5 * 1024 * 1024,
        }
    }
}
