use rand::seq::SliceRandom;

pub const TASK_COLORS: [&str; 10] = [
    "#3B82F6", // blue
    "#EF4444", // red
    "#10B981", // green
    "#F59E0B", // yellow
    "#8B5CF6", // purple
    "#F97316", // orange
    "#EC4899", // pink
    "#06B6D4", // cyan
    "#84CC16", // lime
    "#6366F1", // indigo
];

pub fn random_color() -> String {
    TASK_COLORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TASK_COLORS[0])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_color_comes_from_palette() {
        for _ in 0..50 {
            assert!(TASK_COLORS.contains(&random_color().as_str()));
        }
    }
}
