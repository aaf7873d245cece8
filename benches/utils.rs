use rand::{Rng, SeedableRng, rngs::StdRng};

const TAG_POOL: [&str; 12] = [
    "PL", "BR", "DE", "DOCTOR", "DENTIST", "PHYSIO", "NURSE", "VIP", "PLUS", "STARTER", "ALL",
    "BETA",
];

/// Generate n random tag lists to evaluate against, with a fixed seed for
/// reproducibility.
pub fn generate_random_tag_lists(n: usize) -> Vec<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let count = rng.random_range(0..6);
            (0..count)
                .map(|_| {
                    let tag = TAG_POOL[rng.random_range(0..TAG_POOL.len())];
                    if rng.random_bool(0.5) {
                        tag.to_lowercase()
                    } else {
                        tag.to_string()
                    }
                })
                .collect()
        })
        .collect()
}

/// Builds an OR chain of `n` AND groups, e.g. `PL.DOCTOR,BR.VIP,...`.
pub fn generate_wide_expression(n: usize) -> String {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n)
        .map(|_| {
            let left = TAG_POOL[rng.random_range(0..TAG_POOL.len())];
            let right = TAG_POOL[rng.random_range(0..TAG_POOL.len())];
            format!("{left}.!{right}")
        })
        .collect::<Vec<_>>()
        .join(",")
}
